//! Top-level assembly (section 6, external interfaces): wires
//! [`crate::header`], [`crate::xref_parser`] and [`crate::object_store`]
//! together into a single `open` entry point and the `ParsedDocument` it
//! hands back. Grounded on the teacher's `Reader::read`/`Document::new`
//! pairing in `reader.rs`/`document.rs`, generalized from an eager
//! "load every object up front" document into the lazy `ParsedDocument`
//! the data model calls for.

use std::collections::BTreeMap;

use crate::cursor::ByteCursor;
use crate::encryption::{IdentitySecurityHandler, Permissions, SecurityHandler};
use crate::error::{Error, Result};
use crate::grammar;
use crate::header::{parse_header, FileHeader};
use crate::mode::{ParserConfig, DEFAULT_MAX_RECURSION_DEPTH};
use crate::object::{Dictionary, ObjectKey, ObjectValue};
use crate::object_store::ObjectStore;
use crate::scratch::{InMemoryScratch, ScratchAllocator};
use crate::validation::ValidationSink;
use crate::xref::XrefEntry;
use crate::xref_parser::{object_header_at, parse_xref_chain};

/// A fully parsed PDF: the header/xref-derived metadata plus the lazy object
/// store that resolves individual indirect objects on demand.
pub struct ParsedDocument<'a> {
    pub version: f32,
    pub header_offset: usize,
    pub is_encrypted: bool,
    pub is_linearized: bool,
    pub is_xref_stream: bool,
    pub start_xref: u64,
    pub post_eof_data_size: i64,
    pub trailer: Dictionary,
    /// The trailer named directly by `startxref` — in a linearized file,
    /// this is the first-page-optimized trailer written by the linearizer.
    pub first_page_trailer: Dictionary,
    /// The trailer at the end of the `/Prev` chain — the original,
    /// pre-incremental-update revision.
    pub last_trailer: Dictionary,
    pub xref: BTreeMap<ObjectKey, XrefEntry>,
    store: ObjectStore<'a>,
}

/// Parse `buf` end to end: header, xref chain (with `/Prev`/`/XRefStm`
/// merging and brute-force repair per `config.mode`), decryption setup, and
/// (in validation mode) an eager pre-warm of every known object so the
/// diagnostics sink sees the whole document rather than just what a caller
/// happens to visit.
pub fn open(
    buf: &[u8], config: ParserConfig, mut security: Box<dyn SecurityHandler>, scratch: Box<dyn ScratchAllocator>,
) -> Result<ParsedDocument<'_>> {
    let header = parse_header(buf);
    let chain = parse_xref_chain(buf, &header, &config)?;
    let merged_xref = chain.resolver.get_merged_xref();
    let merged_trailer = chain.resolver.get_merged_trailer();

    if !merged_trailer.has(b"Root") && !config.mode.recover_on_bad_offsets {
        return Err(Error::MissingRoot);
    }

    let is_encrypted = merged_trailer.has(b"Encrypt");
    if is_encrypted {
        prepare_decryption(buf, &header, &merged_xref, &merged_trailer, config, security.as_mut())?;
    }

    let mut store = ObjectStore::new(buf, header.offset, merged_xref.clone(), config, is_encrypted, security, scratch);
    if let Some(sink) = &mut store.validation {
        sink.xref_eol_markers_comply_pdfa = chain.xref_eol_markers_comply_pdfa;
        sink.subsection_header_space_separated = chain.subsection_header_space_separated;
        sink.post_eof_data_size = compute_post_eof_data_size(buf);
        sink.header_comment_bytes = header.binary_comment_bytes;
    }

    // Pre-warm: in validation mode the diagnostics sink is only useful if
    // every reachable object has actually been visited once.
    if config.mode.record_diagnostics {
        for key in store.known_keys().collect::<Vec<_>>() {
            let _ = store.resolve(key);
        }
    }

    let is_linearized = detect_linearized(buf, &header);

    Ok(ParsedDocument {
        version: header.version,
        header_offset: header.offset,
        is_encrypted,
        is_linearized,
        is_xref_stream: chain.is_xref_stream,
        start_xref: chain.start_xref,
        post_eof_data_size: compute_post_eof_data_size(buf),
        trailer: merged_trailer,
        first_page_trailer: chain.resolver.last_trailer().cloned().unwrap_or_default(),
        last_trailer: chain.resolver.first_trailer().cloned().unwrap_or_default(),
        xref: merged_xref,
        store,
    })
}

/// Resolve `/Encrypt` (following one level of indirection via a throwaway
/// probe store) and hand it, plus the first `/ID` entry, to the security
/// handler before the real `ObjectStore` takes ownership of it. Mirrors the
/// data flow's "prepare decryption" step occurring before the object store
/// pre-warm.
fn prepare_decryption(
    buf: &[u8], header: &FileHeader, xref: &BTreeMap<ObjectKey, XrefEntry>, trailer: &Dictionary, config: ParserConfig,
    security: &mut dyn SecurityHandler,
) -> Result<()> {
    let mut probe =
        ObjectStore::new(buf, header.offset, xref.clone(), config, false, Box::new(IdentitySecurityHandler), Box::new(InMemoryScratch));
    let encrypt_value = match trailer.get(b"Encrypt") {
        Ok(ObjectValue::Ref(key)) => probe.resolve(*key).ok(),
        Ok(other) => Some(other.clone()),
        Err(_) => None,
    };
    let Some(encrypt_dict) = encrypt_value.and_then(|v| v.as_dict().ok().cloned()) else {
        return Ok(());
    };
    let file_id = trailer
        .get_opt(b"ID")
        .and_then(|v| v.as_array().ok())
        .and_then(|arr| arr.first())
        .and_then(|v| v.as_str().ok())
        .unwrap_or(b"");
    security.prepare_for_decryption(&encrypt_dict, file_id)
}

/// `postEOFDataSize` (section 4.9): bytes after the last `%%EOF`, minus a
/// single trailing EOL run, or `-1` if `%%EOF` is absent entirely.
fn compute_post_eof_data_size(buf: &[u8]) -> i64 {
    const EOF: &[u8] = b"%%EOF";
    if buf.len() < EOF.len() {
        return -1;
    }
    let Some(pos) = buf.windows(EOF.len()).rposition(|w| w == EOF) else { return -1 };
    let after = pos + EOF.len();
    let mut end = buf.len();
    if end >= after + 2 && &buf[end - 2..end] == b"\r\n" {
        end -= 2;
    } else if end > after && matches!(buf[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    end.saturating_sub(after) as i64
}

/// Whether the very first object in the file (right after the header line,
/// and the binary-comment line if one was found) is a linearization
/// dictionary (carries a `/Linearized` key).
fn detect_linearized(buf: &[u8], header: &FileHeader) -> bool {
    let mut cursor = ByteCursor::at(buf, header.offset);
    cursor.read_line();
    if header.binary_comment_bytes != (-1, -1, -1, -1) {
        cursor.read_line();
    }
    cursor.skip_spaces();
    let start = cursor.position();

    let Some((_, after_obj)) = object_header_at(buf, start) else { return false };
    let mut after_cursor = ByteCursor::at(buf, after_obj);
    after_cursor.skip_spaces();
    let after_obj = after_cursor.position();

    if !buf[after_obj..].starts_with(b"<<") {
        return false;
    }
    match grammar::parse_dictionary(buf, after_obj, 0, DEFAULT_MAX_RECURSION_DEPTH) {
        Ok((dict, _, _)) => dict.has(b"Linearized"),
        Err(_) => false,
    }
}

impl<'a> ParsedDocument<'a> {
    /// Resolve an indirect reference. A merely-unresolved object degrades to
    /// `ObjectValue::Null` per the error-handling design (section 7); this
    /// only returns `None` if the underlying error was always-fatal (e.g.
    /// I/O) and strict mode propagated it.
    pub fn resolve(&mut self, key: ObjectKey) -> Option<ObjectValue> {
        self.store.resolve(key).ok()
    }

    /// Every known object whose resolved value is a dictionary (or stream)
    /// with `/Type` equal to `type_name`.
    pub fn objects_by_type(&mut self, type_name: &[u8]) -> Vec<(ObjectKey, ObjectValue)> {
        let keys: Vec<ObjectKey> = self.store.known_keys().collect();
        let mut out = Vec::new();
        for key in keys {
            if let Ok(value) = self.store.resolve(key) {
                if value.as_dict().map(|d| d.type_is(type_name)).unwrap_or(false) {
                    out.push((key, value));
                }
            }
        }
        out
    }

    pub fn validation(&self) -> Option<&ValidationSink> {
        self.store.validation.as_ref()
    }

    /// Run the post-parse signature byte-range verification pass (section
    /// 4.9), resolving any indirect `/Contents` via the string locations
    /// recorded while parsing. A no-op outside validation mode.
    pub fn verify_signatures(&mut self) {
        let Some(sink) = self.store.validation.as_ref() else { return };
        let locations = sink.string_locations.clone();
        if let Some(sink) = self.store.validation.as_mut() {
            sink.verify_signature_byte_ranges(|key| locations.get(&key).copied());
        }
    }

    pub fn access_permissions(&self) -> Option<Permissions> {
        self.store.access_permissions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;

    fn minimal_pdf() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n");
        buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
        buf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n");
        let obj2 = buf.windows(7).position(|w| w == b"2 0 obj").unwrap();
        let xref_offset = buf.len();
        buf.extend_from_slice(b"xref\n0 3\n");
        buf.extend_from_slice(b"0000000000 65535 f\r\n");
        buf.extend_from_slice(b"0000000009 00000 n\r\n");
        buf.extend_from_slice(format!("{obj2:010} 00000 n\r\n").as_bytes());
        buf.extend_from_slice(b"trailer\n<< /Size 3 /Root 1 0 R >>\n");
        buf.extend_from_slice(format!("startxref\n{xref_offset}\n%%EOF").as_bytes());
        buf
    }

    #[test]
    fn opens_minimal_pdf_and_resolves_root() {
        let buf = minimal_pdf();
        let mut doc = open(&buf, ParserConfig::new(Mode::lenient()), Box::new(IdentitySecurityHandler), Box::new(InMemoryScratch)).unwrap();
        assert_eq!(doc.version, 1.4);
        assert!(!doc.is_xref_stream);
        assert!(!doc.is_encrypted);

        let root_key = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        let root = doc.resolve(root_key).unwrap();
        assert_eq!(root.as_dict().unwrap().get(b"Type").unwrap().as_name().unwrap(), b"Catalog");
    }

    #[test]
    fn objects_by_type_finds_the_pages_node() {
        let buf = minimal_pdf();
        let mut doc = open(&buf, ParserConfig::new(Mode::lenient()), Box::new(IdentitySecurityHandler), Box::new(InMemoryScratch)).unwrap();
        let pages = doc.objects_by_type(b"Pages");
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn post_eof_data_size_is_negative_one_without_eof_marker() {
        assert_eq!(compute_post_eof_data_size(b"no eof marker here"), -1);
    }

    #[test]
    fn post_eof_data_size_counts_trailing_bytes() {
        let buf = b"%%EOF\nTRAILING".to_vec();
        assert_eq!(compute_post_eof_data_size(&buf), "TRAILING".len() as i64);
    }

    #[test]
    fn validation_mode_prewarms_every_object() {
        let buf = minimal_pdf();
        let doc = open(&buf, ParserConfig::new(Mode::validation()), Box::new(IdentitySecurityHandler), Box::new(InMemoryScratch)).unwrap();
        let sink = doc.validation().unwrap();
        assert_eq!(sink.objects.len(), 2);
    }
}
