#![forbid(unsafe_code)]
#![deny(clippy::all)]

//! A PDF object/cross-reference layer: header detection, xref chain
//! walking (classic tables, xref streams, hybrid `/XRefStm`, brute-force
//! repair), and lazy indirect-object resolution, with an optional
//! validation mode that records fine-grained PDF/A-1b conformance signals
//! as it parses. See [`document::open`] for the entry point.

mod brute_force;
mod cursor;
pub mod document;
pub mod encryption;
mod error;
pub mod filters;
mod grammar;
mod header;
mod lexer;
mod mode;
mod object;
pub mod object_store;
pub mod scratch;
pub mod validation;
mod xref;
mod xref_parser;
mod xref_resolver;

pub use crate::document::{open, ParsedDocument};
pub use crate::encryption::{IdentitySecurityHandler, Permissions, SecurityHandler};
pub use crate::error::{Error, Result};
pub use crate::header::FileHeader;
pub use crate::mode::{Mode, ParserConfig, DEFAULT_EOF_LOOKUP_RANGE, DEFAULT_MAX_RECURSION_DEPTH, MIN_EOF_LOOKUP_RANGE};
pub use crate::object::{Dictionary, ObjectKey, ObjectValue, Stream, StringKind};
pub use crate::object_store::ObjectStore;
pub use crate::scratch::{Blob, InMemoryScratch, ScratchAllocator};
pub use crate::validation::{HexStringSignal, ObjectCompliance, SignatureByteRangeCandidate, StreamCompliance, ValidationSink};
pub use crate::xref::{XrefEntry, XrefKind};
