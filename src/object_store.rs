//! Lazy indirect-object resolution (section 4.6, component C6): the merged
//! xref map from [`crate::xref_parser`] tells us *where* an object's bytes
//! are; this module is the only place that actually reads them, caching the
//! result behind an `IndirectSlot` state machine so a diamond of references
//! (`/Parent` cycles, repeated `/Resources` lookups) costs one parse instead
//! of one per visit. Grounded on the teacher's `Document::get_object`
//! (`document.rs`) for the cache-then-parse shape, `reader.rs::Reader::read`
//! for the compressed-entry expansion via an object stream, and
//! `parser_aux.rs::decode_xref_stream`'s sibling `ObjectStream::new` for the
//! `/First`/`/N` index-block layout.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::warn;

use crate::brute_force::BruteForceScanner;
use crate::cursor::{is_eol, ByteCursor};
use crate::encryption::{Permissions, SecurityHandler};
use crate::error::{Error, Result};
use crate::filters;
use crate::grammar::{self, DictEntry};
use crate::mode::ParserConfig;
use crate::object::{Dictionary, ObjectKey, ObjectValue, Stream};
use crate::scratch::{Blob, ScratchAllocator};
use crate::stream_reader::read_stream_body;
use crate::validation::{self, ObjectCompliance, SignatureByteRangeCandidate, StreamCompliance, ValidationSink};
use crate::xref::XrefEntry;
use crate::xref_parser::object_header_at;

/// Cached outcome of resolving one indirect object.
#[derive(Clone)]
enum SlotState {
    Parsing,
    Parsed(ObjectValue),
    /// Resolution failed and the mode allows treating the object as null
    /// rather than propagating the error.
    Broken,
}

/// Decoded contents of one `/Type /ObjStm` container, indexed by the object
/// number each compressed object occupies (section 4.3's compressed-entry
/// note).
struct ObjectStreamCache {
    content: Blob,
    numbers: Vec<u32>,
    offsets: Vec<usize>,
}

/// Owns the raw buffer, the merged xref map, and every collaborator needed
/// to turn an [`ObjectKey`] into a fully parsed [`ObjectValue`]: the
/// scratch allocator for stream payloads, the security handler for
/// decryption, the brute-force scanner for offset repair, and (in
/// validation mode) the diagnostics sink.
pub struct ObjectStore<'a> {
    buf: &'a [u8],
    header_offset: usize,
    xref: BTreeMap<ObjectKey, XrefEntry>,
    config: ParserConfig,
    is_encrypted: bool,
    security: Box<dyn SecurityHandler>,
    scratch: Box<dyn ScratchAllocator>,
    scanner: BruteForceScanner<'a>,
    slots: HashMap<ObjectKey, SlotState>,
    object_streams: HashMap<u32, ObjectStreamCache>,
    /// Indirect `/Length` keys currently being resolved, to turn a `/Length`
    /// reference cycle into a dedicated error instead of silent recursion.
    length_in_flight: HashSet<ObjectKey>,
    pub validation: Option<ValidationSink>,
}

impl<'a> ObjectStore<'a> {
    pub fn new(
        buf: &'a [u8],
        header_offset: usize,
        xref: BTreeMap<ObjectKey, XrefEntry>,
        config: ParserConfig,
        is_encrypted: bool,
        security: Box<dyn SecurityHandler>,
        scratch: Box<dyn ScratchAllocator>,
    ) -> Self {
        let validation = config.mode.record_diagnostics.then(ValidationSink::new);
        ObjectStore {
            buf,
            header_offset,
            xref,
            config,
            is_encrypted,
            security,
            scratch,
            scanner: BruteForceScanner::new(buf),
            slots: HashMap::new(),
            object_streams: HashMap::new(),
            length_in_flight: HashSet::new(),
            validation,
        }
    }

    /// Every object number the merged xref map names, in ascending order.
    pub fn known_keys(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.xref.keys().copied()
    }

    /// Permissions the security handler was configured with, if known
    /// (section 6's `current_access_permission`).
    pub fn access_permissions(&self) -> Option<Permissions> {
        self.security.current_access_permission()
    }

    /// Resolve `key` to its value, parsing and caching on first visit.
    /// Errors are only propagated in strict mode; otherwise a failed
    /// resolution degrades to `Null` with a warning, matching the recovery
    /// posture of the rest of the crate.
    pub fn resolve(&mut self, key: ObjectKey) -> Result<ObjectValue> {
        match self.slots.get(&key) {
            Some(SlotState::Parsed(v)) => return Ok(v.clone()),
            Some(SlotState::Broken) => return Ok(ObjectValue::Null),
            Some(SlotState::Parsing) => {
                warn!("cycle detected resolving {key} (already in progress), returning Null");
                return Ok(ObjectValue::Null);
            }
            None => {}
        }
        self.slots.insert(key, SlotState::Parsing);
        match self.parse_object(key) {
            Ok(value) => {
                self.slots.insert(key, SlotState::Parsed(value.clone()));
                Ok(value)
            }
            Err(e) => {
                if e.is_always_fatal() || self.config.mode.is_strict() {
                    self.slots.insert(key, SlotState::Broken);
                    Err(e)
                } else {
                    warn!("failed to resolve {key}: {e}, treating as Null");
                    self.slots.insert(key, SlotState::Broken);
                    Ok(ObjectValue::Null)
                }
            }
        }
    }

    fn parse_object(&mut self, key: ObjectKey) -> Result<ObjectValue> {
        let Some(entry) = self.xref.get(&key).copied() else {
            return self.recover_missing_entry(key);
        };
        match entry {
            XrefEntry::Compressed { container, index } => self.resolve_compressed(key, container, index),
            XrefEntry::InUse(offset) => {
                let after_obj = self.locate_object_body(key, offset)?;
                self.parse_object_body(key, after_obj)
            }
        }
    }

    /// The xref map has no entry at all for `key`: fall back to a
    /// brute-force scan if the mode allows it, otherwise report it
    /// unresolved.
    fn recover_missing_entry(&mut self, key: ObjectKey) -> Result<ObjectValue> {
        if self.config.mode.recover_on_bad_offsets {
            if let Some(offset) = self.scanner.find_object(key) {
                if let Some((_, after_obj)) = object_header_at(self.buf, offset) {
                    return self.parse_object_body(key, after_obj);
                }
            }
        }
        Err(Error::UnresolvedObject(key))
    }

    /// Validate the xref-declared `offset` against the object header
    /// actually found there; repair via brute force on a mismatch when the
    /// mode allows it. Returns the position right after the `obj` keyword.
    ///
    /// `drop_instead_of_replace` (set by `Mode::validation()`) short-circuits
    /// the brute-force repair below: validation mode must report exactly
    /// what the declared offset produced, not a patched-over substitute.
    fn locate_object_body(&mut self, key: ObjectKey, declared_offset: u64) -> Result<usize> {
        let translated = self.header_offset + declared_offset as usize;
        let mismatch = match object_header_at(self.buf, translated) {
            Some((found_key, after_obj)) if found_key == key => {
                self.record_header_compliance(key, translated, true);
                return Ok(after_obj);
            }
            Some((found_key, _)) => Some(Error::ObjectIdMismatch { expected: key, found: found_key }),
            None => None,
        };
        self.record_header_compliance(key, translated, false);
        if self.config.mode.drop_instead_of_replace {
            return Err(mismatch.unwrap_or(Error::UnresolvedObject(key)));
        }
        if self.config.mode.recover_on_bad_offsets {
            if let Some(offset) = self.scanner.find_object(key) {
                if offset != translated {
                    warn!("xref offset {declared_offset} for {key} did not resolve; repairing via brute force to {offset}");
                }
                if let Some((_, after_obj)) = object_header_at(self.buf, offset) {
                    return Ok(after_obj);
                }
            }
        }
        Err(mismatch.unwrap_or(Error::UnresolvedObject(key)))
    }

    fn record_header_compliance(&mut self, key: ObjectKey, translated: usize, header_format_compliant: bool) {
        if let Some(sink) = &mut self.validation {
            let header_eol_compliant = translated > 0 && is_eol(self.buf[translated - 1]);
            sink.record_object(
                key,
                ObjectCompliance { header_format_compliant, header_eol_compliant, end_of_object_eol_compliant: true },
            );
        }
    }

    /// Parse the direct value after `N G obj`, and if it is a dictionary
    /// immediately followed by `stream`, read and (if encrypted) decrypt the
    /// stream body too. Mirrors spec 4.6 steps 4-5.
    ///
    /// In validation mode, dictionaries are parsed via
    /// `grammar::parse_dictionary` directly (rather than the generic
    /// `parse_direct_object` dispatch) so the per-key value spans are
    /// available for signature byte-range capture (section 4.3).
    fn parse_object_body(&mut self, key: ObjectKey, after_obj: usize) -> Result<ObjectValue> {
        let start = skip_ws(self.buf, after_obj);
        let want_entries = self.validation.is_some() && self.buf[start..].starts_with(b"<<");
        let (value, entries, after_value) = if want_entries {
            let (dict, entries, end) = grammar::parse_dictionary(self.buf, start, 0, self.config.max_recursion_depth)?;
            (ObjectValue::Dict(dict), entries, end)
        } else {
            let (value, end) = grammar::parse_direct_object(self.buf, start, 0, self.config.max_recursion_depth)?;
            (value, Vec::new(), end)
        };
        let after_value = skip_ws(self.buf, after_value);

        let (value, boundary) = if let ObjectValue::Dict(dict) = value {
            if self.buf[after_value..].starts_with(b"stream") {
                self.parse_stream_body(key, dict, after_value + b"stream".len())?
            } else {
                (ObjectValue::Dict(dict), after_value)
            }
        } else {
            if matches!(value, ObjectValue::String(..)) {
                self.record_string_location(key, start);
            }
            (value, after_value)
        };

        self.maybe_record_signature_candidate(key, &value, &entries, boundary);

        let endobj_pos = skip_ws(self.buf, boundary);
        let end_of_object_eol_compliant = self.consume_endobj(endobj_pos);
        if let Some(sink) = &mut self.validation {
            let mut compliance = sink.objects.get(&key).copied().unwrap_or_default();
            compliance.end_of_object_eol_compliant = end_of_object_eol_compliant;
            sink.record_object(key, compliance);
        }
        Ok(value)
    }

    /// Record the on-disk content span of a top-level indirect string
    /// object, so a later indirect `/Contents` lookup can find it without
    /// re-parsing (section 4.9 signature byte-range verification).
    fn record_string_location(&mut self, key: ObjectKey, token_start: usize) {
        if self.validation.is_none() {
            return;
        }
        if let Some((begin, end)) = string_token_bounds(self.buf, token_start) {
            self.validation.as_mut().unwrap().record_string_location(key, begin, end);
        }
    }

    /// If `value`'s dictionary looks like a signature candidate (section
    /// 4.3's capture note), record its `/Contents`/`/ByteRange` structure for
    /// the post-parse verification pass.
    fn maybe_record_signature_candidate(&mut self, key: ObjectKey, value: &ObjectValue, entries: &[DictEntry], after_obj: usize) {
        if self.validation.is_none() {
            return;
        }
        let dict = match value {
            ObjectValue::Dict(d) => d,
            ObjectValue::Stream(s) => &s.dict,
            _ => return,
        };
        if !validation::is_signature_candidate(dict) {
            return;
        }
        let buf = self.buf;
        let (contents_begin, contents_end, indirect_contents) = match dict.get_opt(b"Contents") {
            Some(ObjectValue::Ref(contents_key)) => (None, None, Some(*contents_key)),
            Some(ObjectValue::String(..)) => {
                let bounds =
                    entries.iter().find(|e| e.key.as_slice() == b"Contents").and_then(|e| string_token_bounds(buf, e.value_start));
                match bounds {
                    Some((b, e)) => (Some(b), Some(e), None),
                    None => (None, None, None),
                }
            }
            _ => return,
        };
        let byte_range = dict
            .get_opt(b"ByteRange")
            .and_then(|v| v.as_array().ok())
            .map(|arr| arr.iter().filter_map(|v| v.as_i64().ok()).collect::<Vec<_>>());
        let first_eof = find_next_percent_percent_eof(buf, after_obj);
        self.validation.as_mut().unwrap().record_signature_candidate(SignatureByteRangeCandidate {
            dict_key: Some(key),
            contents_begin,
            contents_end,
            indirect_contents,
            first_eof,
            byte_range,
        });
    }

    /// Read the stream body and return the value plus the position to
    /// resume scanning from: right after `endstream` if one was found, or
    /// exactly where the fallback scan landed (possibly directly on
    /// `endobj`, when a corrupt file has no `endstream` at all).
    fn parse_stream_body(
        &mut self, key: ObjectKey, dict: Dictionary, after_stream_keyword: usize,
    ) -> Result<(ObjectValue, usize)> {
        let declared_length = self.resolve_length(key, &dict)?;
        let body = read_stream_body(self.buf, after_stream_keyword, declared_length)?;
        if let Some(sink) = &mut self.validation {
            sink.record_stream(
                key,
                StreamCompliance {
                    stream_keyword_eol_compliant: body.stream_keyword_eol_compliant,
                    endstream_keyword_eol_compliant: body.endstream_keyword_eol_compliant,
                    origin_length: body.origin_length,
                },
            );
        }
        let mut payload = body.payload;
        if self.is_encrypted && !dict.type_is(b"XRef") {
            payload = self.security.decrypt_stream(key, &payload)?;
        }
        let body_end = body.content_start + body.origin_length;
        let content = self.scratch.alloc(payload);
        let stream = Stream::new(dict, content, Some(after_stream_keyword));

        let mut cursor = ByteCursor::at(self.buf, body_end);
        cursor.skip_spaces();
        let after_boundary = if self.buf[cursor.position()..].starts_with(b"endstream") {
            cursor.position() + "endstream".len()
        } else {
            cursor.position()
        };
        Ok((ObjectValue::Stream(stream), after_boundary))
    }

    /// Resolve `/Length`, following one level of indirection. A reference
    /// cycle (an object's `/Length` eventually pointing back at an object
    /// already being resolved for *its* `/Length`) is a dedicated error
    /// rather than a silent `None`, since a cyclic `/Length` means the
    /// stream's bounds are fundamentally unknowable without a full scan.
    fn resolve_length(&mut self, owner: ObjectKey, dict: &Dictionary) -> Result<Option<i64>> {
        let Some(value) = dict.get_opt(b"Length").cloned() else { return Ok(None) };
        match value {
            ObjectValue::Ref(len_key) => {
                if !self.length_in_flight.insert(len_key) {
                    return Err(Error::StreamLengthError(format!(
                        "/Length of {owner} cycles back through a reference to {len_key}"
                    )));
                }
                let result = self.resolve(len_key);
                self.length_in_flight.remove(&len_key);
                Ok(result?.as_i64().ok())
            }
            other => Ok(other.as_i64().ok()),
        }
    }

    fn consume_endobj(&self, pos: usize) -> bool {
        let eol_compliant = pos > 0 && is_eol(self.buf[pos - 1]);
        self.buf[pos..].starts_with(b"endobj") && eol_compliant
    }

    /// Expand a compressed entry by parsing (and caching) its container
    /// `/Type /ObjStm` stream, then extracting the value at the entry's
    /// index (section 4.3, compressed-entry note).
    fn resolve_compressed(&mut self, key: ObjectKey, container: u32, index: u32) -> Result<ObjectValue> {
        self.load_object_stream(container)?;
        let cache = self.object_streams.get(&container).expect("just loaded");
        let pos = if (index as usize) < cache.numbers.len() && cache.numbers[index as usize] == key.number {
            index as usize
        } else {
            cache.numbers.iter().position(|&n| n == key.number).ok_or(Error::UnresolvedObject(key))?
        };
        let offset = cache.offsets[pos];
        let content = cache.content.clone();
        grammar::direct_object(&content[offset..]).ok_or(Error::MalformedObject { offset })
    }

    fn load_object_stream(&mut self, container: u32) -> Result<()> {
        if self.object_streams.contains_key(&container) {
            return Ok(());
        }
        let container_key = ObjectKey::new(container, 0);
        let value = self.resolve(container_key)?;
        let stream = value.as_stream()?;
        let decoded = filters::decode_stream(&stream.dict, &stream.content)?;

        let first = stream.dict.get(b"First")?.as_i64()? as usize;
        let n = stream.dict.get(b"N")?.as_i64()?.max(0) as usize;
        let index_bytes = decoded.get(..first).ok_or(Error::Offset(first))?;
        let index_str = std::str::from_utf8(index_bytes)
            .map_err(|_| Error::StreamLengthError(format!("object stream {container} index block is not valid UTF-8")))?;
        let raw: Vec<usize> = index_str.split_whitespace().filter_map(|tok| tok.parse().ok()).collect();

        let mut numbers = Vec::with_capacity(n);
        let mut offsets = Vec::with_capacity(n);
        for pair in raw.chunks(2).take(n) {
            if let [num, rel_offset] = *pair {
                numbers.push(num as u32);
                offsets.push(first + rel_offset);
            } else {
                warn!("object stream {container} index block has an odd number of entries, truncating");
            }
        }

        self.object_streams.insert(container, ObjectStreamCache { content: Blob::new(decoded), numbers, offsets });
        Ok(())
    }
}

/// Skip whitespace and PDF comments without consuming a name/delimiter.
fn skip_ws(buf: &[u8], pos: usize) -> usize {
    let mut cursor = ByteCursor::at(buf, pos);
    cursor.skip_spaces();
    cursor.position()
}

/// The inner content span (first content byte, last content byte inclusive)
/// of a literal or hex string token starting at `token_start`. Re-derives
/// the closing delimiter directly rather than trusting a value-end position
/// that may include consumed trailing whitespace.
fn string_token_bounds(buf: &[u8], token_start: usize) -> Option<(usize, usize)> {
    match buf.get(token_start) {
        Some(b'<') if buf.get(token_start + 1) != Some(&b'<') => {
            let close = token_start + 1 + buf[token_start + 1..].iter().position(|&b| b == b'>')?;
            Some((token_start + 1, close.checked_sub(1)?))
        }
        Some(b'(') => {
            let mut i = token_start + 1;
            let mut depth = 1i32;
            while i < buf.len() {
                match buf[i] {
                    b'\\' => i += 1,
                    b'(' => depth += 1,
                    b')' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some((token_start + 1, i.checked_sub(1)?));
                        }
                    }
                    _ => {}
                }
                i += 1;
            }
            None
        }
        _ => None,
    }
}

/// Offset of the `F` in the nearest `%%EOF` at or after `from` (section 4.9).
fn find_next_percent_percent_eof(buf: &[u8], from: usize) -> Option<usize> {
    const EOF: &[u8] = b"%%EOF";
    if from >= buf.len() {
        return None;
    }
    buf[from..].windows(EOF.len()).position(|w| w == EOF).map(|rel| from + rel + EOF.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::IdentitySecurityHandler;
    use crate::mode::Mode;
    use crate::scratch::InMemoryScratch;

    fn store(buf: &[u8], xref: BTreeMap<ObjectKey, XrefEntry>, mode: Mode) -> ObjectStore<'_> {
        ObjectStore::new(
            buf,
            0,
            xref,
            ParserConfig::new(mode),
            false,
            Box::new(IdentitySecurityHandler),
            Box::new(InMemoryScratch),
        )
    }

    #[test]
    fn resolves_simple_dictionary_object() {
        let buf = b"1 0 obj\n<< /Type /Catalog >>\nendobj\n";
        let mut xref = BTreeMap::new();
        xref.insert(ObjectKey::new(1, 0), XrefEntry::InUse(0));
        let mut store = store(buf, xref, Mode::lenient());

        let value = store.resolve((1, 0).into()).unwrap();
        assert_eq!(value.as_dict().unwrap().get(b"Type").unwrap().as_name().unwrap(), b"Catalog");
    }

    #[test]
    fn resolves_stream_with_declared_length() {
        let buf = b"1 0 obj\n<< /Length 5 >>\nstream\nhello\nendstream\nendobj\n";
        let mut xref = BTreeMap::new();
        xref.insert(ObjectKey::new(1, 0), XrefEntry::InUse(0));
        let mut store = store(buf, xref, Mode::lenient());

        let value = store.resolve((1, 0).into()).unwrap();
        let stream = value.as_stream().unwrap();
        assert_eq!(&stream.content[..], b"hello");
    }

    #[test]
    fn caches_repeated_resolution() {
        let buf = b"1 0 obj\n<< /Type /Catalog >>\nendobj\n";
        let mut xref = BTreeMap::new();
        xref.insert(ObjectKey::new(1, 0), XrefEntry::InUse(0));
        let mut store = store(buf, xref, Mode::lenient());

        let a = store.resolve((1, 0).into()).unwrap();
        let b = store.resolve((1, 0).into()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn signature_candidate_is_captured_in_validation_mode() {
        let buf: &[u8] = b"7 0 obj\n<< /Type /Sig /Contents <AABBCC> /ByteRange [0 1 2 3] >>\nendobj\n%%EOF";
        let mut xref = BTreeMap::new();
        xref.insert(ObjectKey::new(7, 0), XrefEntry::InUse(0));
        let mut store = store(buf, xref, Mode::validation());

        store.resolve((7, 0).into()).unwrap();
        let sink = store.validation.as_ref().unwrap();
        assert_eq!(sink.signature_candidates.len(), 1);
        let candidate = &sink.signature_candidates[0];

        let needle = b"<AABBCC>";
        let open = buf.windows(needle.len()).position(|w| w == needle).unwrap();
        assert_eq!(candidate.contents_begin, Some(open + 1));
        assert_eq!(candidate.contents_end, Some(open + needle.len() - 2));

        let eof_pos = buf.windows(5).rposition(|w| w == b"%%EOF").unwrap();
        assert_eq!(candidate.first_eof, Some(eof_pos + 4));
        assert_eq!(candidate.byte_range, Some(vec![0, 1, 2, 3]));
    }

    #[test]
    fn indirect_length_cycle_is_a_dedicated_error() {
        // obj 1's /Length points at obj 2; obj 2's /Length points back at obj 1.
        let buf = b"1 0 obj\n<< /Length 2 0 R >>\nstream\nxx\nendstream\nendobj\n\
                    2 0 obj\n<< /Length 1 0 R >>\nstream\nyy\nendstream\nendobj\n";
        let mut xref = BTreeMap::new();
        xref.insert(ObjectKey::new(1, 0), XrefEntry::InUse(0));
        xref.insert(ObjectKey::new(2, 0), XrefEntry::InUse(55));
        let mut store = store(buf, xref, Mode::strict());

        let err = store.resolve((1, 0).into()).unwrap_err();
        assert!(matches!(err, Error::StreamLengthError(_)));
    }

    #[test]
    fn brute_force_recovers_mismatched_offset() {
        let buf = b"garbage padding\n1 0 obj\n<< /Type /Catalog >>\nendobj\n";
        let mut xref = BTreeMap::new();
        // Declared offset 0 points at "garbage", not the real object header.
        xref.insert(ObjectKey::new(1, 0), XrefEntry::InUse(0));
        let mut store = store(buf, xref, Mode::lenient());

        let value = store.resolve((1, 0).into()).unwrap();
        assert_eq!(value.as_dict().unwrap().get(b"Type").unwrap().as_name().unwrap(), b"Catalog");
    }

    #[test]
    fn strict_mode_propagates_unresolved_object() {
        let buf = b"garbage only, no objects here\n";
        let mut xref = BTreeMap::new();
        xref.insert(ObjectKey::new(1, 0), XrefEntry::InUse(0));
        let mut store = store(buf, xref, Mode::strict());

        let err = store.resolve((1, 0).into()).unwrap_err();
        assert!(matches!(err, Error::UnresolvedObject(_)));
    }

    #[test]
    fn compressed_object_resolves_via_container() {
        // Container object 10 0: an uncompressed /ObjStm with two entries.
        let buf = b"10 0 obj\n<< /Type /ObjStm /N 2 /First 7 /Length 17 >>\nstream\n5 0 7 5true false\nendstream\nendobj\n";
        let mut xref = BTreeMap::new();
        xref.insert(ObjectKey::new(10, 0), XrefEntry::InUse(0));
        xref.insert(ObjectKey::new(5, 0), XrefEntry::Compressed { container: 10, index: 0 });
        xref.insert(ObjectKey::new(7, 0), XrefEntry::Compressed { container: 10, index: 1 });
        let mut store = store(buf, xref, Mode::lenient());

        assert_eq!(store.resolve((5, 0).into()).unwrap(), ObjectValue::Bool(true));
        assert_eq!(store.resolve((7, 0).into()).unwrap(), ObjectValue::Bool(false));
    }
}
