use thiserror::Error;

use crate::object::ObjectKey;

/// Error taxonomy for the object/xref layer.
///
/// Variant names follow the kinds enumerated in the specification rather than
/// implementation accidents: each corresponds to exactly one of `IoError`,
/// `MalformedHeader`, `MissingStartxref`, `BadXref`, `UnresolvedObject`,
/// `MalformedObject`, `StreamLengthError`, `SecurityError`, `MalformedNesting`,
/// `ObjectIdMismatch`.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("no %PDF- or %FDF- header found within the scan window")]
    MalformedHeader,

    #[error("no startxref found within the EOF lookup range")]
    MissingStartxref,

    #[error("xref table or xref stream could not be parsed: {0}")]
    BadXref(String),

    #[error("xref entry for {0:?} does not resolve to a valid object header")]
    UnresolvedObject(ObjectKey),

    #[error("object grammar failed beyond recovery at offset {offset}")]
    MalformedObject { offset: usize },

    #[error("stream length is invalid: {0}")]
    StreamLengthError(String),

    #[error("security handler error: {0}")]
    SecurityError(String),

    #[error("recursion or nesting depth limit exceeded")]
    MalformedNesting,

    #[error("object id mismatch: expected {expected:?}, found {found:?}")]
    ObjectIdMismatch { expected: ObjectKey, found: ObjectKey },

    #[error("missing dictionary key /{0}")]
    DictKey(String),

    #[error("unexpected object type: expected {expected}, found {found}")]
    ObjectType { expected: &'static str, found: &'static str },

    #[error("the merged trailer has no /Root entry")]
    MissingRoot,

    #[error("offset {0} is out of bounds for this document")]
    Offset(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for the one error kind that is always fatal, in every [`crate::Mode`].
    pub fn is_always_fatal(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}
