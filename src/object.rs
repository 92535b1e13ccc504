//! The value tree: [`ObjectValue`], [`Dictionary`], [`Stream`] and the
//! [`ObjectKey`] identifying an indirect object. Adapted from the teacher's
//! `object.rs`, restructured so that indirect references are lazy
//! (`ObjectValue::Ref`) rather than eagerly resolved, per the data model in
//! section 3 of the spec.

use indexmap::IndexMap;
use log::warn;
use std::fmt;

use crate::error::{Error, Result};
use crate::scratch::Blob;

/// Identifies an indirect object: `(number, generation)`. Equality is
/// structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub number: u32,
    pub generation: u16,
}

impl ObjectKey {
    pub fn new(number: u32, generation: u16) -> Self {
        ObjectKey { number, generation }
    }
}

impl From<(u32, u16)> for ObjectKey {
    fn from((number, generation): (u32, u16)) -> Self {
        ObjectKey::new(number, generation)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

/// Literal strings are paren-delimited with escapes; hex strings are
/// `<...>`-delimited. Distinguishing the two matters for validation-mode
/// signals and for round-tripping signature byte ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringKind {
    #[default]
    Literal,
    Hex,
}

/// Dictionary object: an insertion-preserving mapping from `Name` bytes to
/// `ObjectValue`. Duplicate keys collapse last-wins with a logged recovery
/// warning, matching the spec's data model note on `Dict`.
#[derive(Clone, Default, PartialEq)]
pub struct Dictionary(IndexMap<Vec<u8>, ObjectValue>);

impl Dictionary {
    pub fn new() -> Self {
        Dictionary(IndexMap::new())
    }

    pub fn has(&self, key: &[u8]) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &[u8]) -> Result<&ObjectValue> {
        self.0.get(key).ok_or_else(|| Error::DictKey(String::from_utf8_lossy(key).into_owned()))
    }

    pub fn get_opt(&self, key: &[u8]) -> Option<&ObjectValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Result<&mut ObjectValue> {
        self.0.get_mut(key).ok_or_else(|| Error::DictKey(String::from_utf8_lossy(key).into_owned()))
    }

    /// Insert a key/value pair. If the key is already present, the new value
    /// wins (last-wins) and a recovery warning is logged, matching the
    /// observed-in-the-wild behavior of malformed dictionaries carrying a
    /// repeated key.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<Vec<u8>>,
        V: Into<ObjectValue>,
    {
        let key = key.into();
        if self.0.contains_key(&key) {
            warn!("duplicate dictionary key /{}, keeping the last value", String::from_utf8_lossy(&key));
        }
        self.0.insert(key, value.into());
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<ObjectValue> {
        self.0.swap_remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Vec<u8>, ObjectValue> {
        self.0.iter()
    }

    /// True if `/Type` is a `Name` equal to `type_name`.
    pub fn type_is(&self, type_name: &[u8]) -> bool {
        self.get(b"Type").and_then(ObjectValue::as_name).ok() == Some(type_name)
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

/// A stream object: a dictionary plus a raw (not filter-decoded by this
/// crate, except where object-stream expansion requires it) payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    pub dict: Dictionary,
    /// Raw bytes between `stream` and `endstream`, owned by the document's
    /// scratch allocator.
    pub content: Blob,
    /// Byte offset (absolute, header-translated) of the first content byte.
    /// `None` until [`crate::stream_reader::StreamReader`] has resolved it.
    pub start_position: Option<usize>,
}

impl Stream {
    pub fn new(dict: Dictionary, content: Blob, start_position: Option<usize>) -> Self {
        Stream { dict, content, start_position }
    }

    pub fn filter_names(&self) -> Result<Vec<&[u8]>> {
        let filter = self.dict.get(b"Filter")?;
        if let Ok(name) = filter.as_name() {
            Ok(vec![name])
        } else if let Ok(items) = filter.as_array() {
            items.iter().map(ObjectValue::as_name).collect()
        } else {
            Err(Error::ObjectType { expected: "Name or Array", found: filter.enum_variant() })
        }
    }
}

/// Tagged PDF object value. `Ref` is a lazy indirect-reference leaf: no
/// parsed value embeds another parsed value by sharing identity, per the
/// invariant in section 3 — walking the graph always goes back through
/// [`crate::object_store::ObjectStore::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectValue {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Name(Vec<u8>),
    String(Vec<u8>, StringKind),
    Array(Vec<ObjectValue>),
    Dict(Dictionary),
    Stream(Stream),
    Ref(ObjectKey),
}

impl ObjectValue {
    pub fn enum_variant(&self) -> &'static str {
        match self {
            ObjectValue::Null => "Null",
            ObjectValue::Bool(_) => "Boolean",
            ObjectValue::Int(_) => "Integer",
            ObjectValue::Real(_) => "Real",
            ObjectValue::Name(_) => "Name",
            ObjectValue::String(..) => "String",
            ObjectValue::Array(_) => "Array",
            ObjectValue::Dict(_) => "Dictionary",
            ObjectValue::Stream(_) => "Stream",
            ObjectValue::Ref(_) => "Reference",
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            ObjectValue::Bool(b) => Ok(*b),
            other => Err(Error::ObjectType { expected: "Boolean", found: other.enum_variant() }),
        }
    }

    /// Numeric objects: an `Int` returns exactly, a `Real` truncates, as the
    /// teacher's `as_i64` does for `Real`.
    pub fn as_i64(&self) -> Result<i64> {
        match self {
            ObjectValue::Int(i) => Ok(*i),
            ObjectValue::Real(r) => Ok(*r as i64),
            other => Err(Error::ObjectType { expected: "Integer", found: other.enum_variant() }),
        }
    }

    pub fn as_f64(&self) -> Result<f64> {
        match self {
            ObjectValue::Int(i) => Ok(*i as f64),
            ObjectValue::Real(r) => Ok(*r),
            other => Err(Error::ObjectType { expected: "Number", found: other.enum_variant() }),
        }
    }

    pub fn as_name(&self) -> Result<&[u8]> {
        match self {
            ObjectValue::Name(n) => Ok(n),
            other => Err(Error::ObjectType { expected: "Name", found: other.enum_variant() }),
        }
    }

    pub fn as_str(&self) -> Result<&[u8]> {
        match self {
            ObjectValue::String(s, _) => Ok(s),
            other => Err(Error::ObjectType { expected: "String", found: other.enum_variant() }),
        }
    }

    pub fn as_reference(&self) -> Result<ObjectKey> {
        match self {
            ObjectValue::Ref(key) => Ok(*key),
            other => Err(Error::ObjectType { expected: "Reference", found: other.enum_variant() }),
        }
    }

    pub fn as_array(&self) -> Result<&Vec<ObjectValue>> {
        match self {
            ObjectValue::Array(a) => Ok(a),
            other => Err(Error::ObjectType { expected: "Array", found: other.enum_variant() }),
        }
    }

    pub fn as_dict(&self) -> Result<&Dictionary> {
        match self {
            ObjectValue::Dict(d) => Ok(d),
            ObjectValue::Stream(s) => Ok(&s.dict),
            other => Err(Error::ObjectType { expected: "Dictionary", found: other.enum_variant() }),
        }
    }

    pub fn as_stream(&self) -> Result<&Stream> {
        match self {
            ObjectValue::Stream(s) => Ok(s),
            other => Err(Error::ObjectType { expected: "Stream", found: other.enum_variant() }),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ObjectValue::Null)
    }
}

impl From<bool> for ObjectValue {
    fn from(b: bool) -> Self {
        ObjectValue::Bool(b)
    }
}

impl From<i64> for ObjectValue {
    fn from(i: i64) -> Self {
        ObjectValue::Int(i)
    }
}

impl From<f64> for ObjectValue {
    fn from(r: f64) -> Self {
        ObjectValue::Real(r)
    }
}

impl From<Dictionary> for ObjectValue {
    fn from(d: Dictionary) -> Self {
        ObjectValue::Dict(d)
    }
}

impl From<Vec<ObjectValue>> for ObjectValue {
    fn from(a: Vec<ObjectValue>) -> Self {
        ObjectValue::Array(a)
    }
}

impl From<ObjectKey> for ObjectValue {
    fn from(k: ObjectKey) -> Self {
        ObjectValue::Ref(k)
    }
}
