//! PDF/A-1b conformance signal collection (section 4.9, component C9). Pure
//! bookkeeping: every field here defaults to the compliant value and is only
//! ever flipped to non-compliant by an observed violation — this sink never
//! mutates the bytes it was handed, it only records what it saw.

use std::collections::BTreeMap;

use crate::object::{Dictionary, ObjectKey};

/// Per-indirect-object compliance flags (`IndirectSlot`'s optional
/// validation fields, section 3).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectCompliance {
    pub header_format_compliant: bool,
    pub header_eol_compliant: bool,
    pub end_of_object_eol_compliant: bool,
}

/// Per-stream compliance flags plus the length actually observed on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamCompliance {
    pub stream_keyword_eol_compliant: bool,
    pub endstream_keyword_eol_compliant: bool,
    pub origin_length: usize,
}

/// Hex-string conformance: how many hex digits were seen, and whether every
/// non-whitespace byte inside the delimiters was one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexStringSignal {
    pub hex_digit_count: usize,
    pub hex_only: bool,
}

/// A `/Contents` + `/ByteRange` candidate discovered while parsing a
/// dictionary, with enough information for the post-parse verification pass
/// to check it without re-walking the whole document.
#[derive(Debug, Clone)]
pub struct SignatureByteRangeCandidate {
    pub dict_key: Option<ObjectKey>,
    /// Byte offset of the first byte of the `/Contents` hex string's content
    /// (just past the opening `<`), once resolved.
    pub contents_begin: Option<usize>,
    /// Byte offset one past the last content byte (just before the closing
    /// `>`), once resolved.
    pub contents_end: Option<usize>,
    /// If `/Contents` was itself an indirect reference, the key to resolve
    /// to find the offsets above.
    pub indirect_contents: Option<ObjectKey>,
    /// Byte offset of the `F` in the nearest `%%EOF` following the
    /// dictionary's close.
    pub first_eof: Option<usize>,
    pub byte_range: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationSink {
    pub post_eof_data_size: i64,
    pub xref_eol_markers_comply_pdfa: bool,
    pub subsection_header_space_separated: bool,
    pub objects: BTreeMap<ObjectKey, ObjectCompliance>,
    pub streams: BTreeMap<ObjectKey, StreamCompliance>,
    pub hex_strings: Vec<HexStringSignal>,
    /// The four bytes of the `%xxxx` header comment line, `-1` each if
    /// missing or invalid.
    pub header_comment_bytes: (i16, i16, i16, i16),
    pub signature_candidates: Vec<SignatureByteRangeCandidate>,
    /// Dictionaries (by the object key that owns them, if indirect) whose
    /// `/ByteRange` checked out exactly.
    pub good_byte_range: Vec<ObjectKey>,
    /// Byte range (first content byte, last content byte inclusive) of every
    /// top-level indirect string object seen, so an indirect `/Contents` can
    /// be resolved back to its on-disk location without re-parsing it.
    pub string_locations: BTreeMap<ObjectKey, (usize, usize)>,
}

impl ValidationSink {
    pub fn new() -> Self {
        ValidationSink {
            post_eof_data_size: -1,
            xref_eol_markers_comply_pdfa: true,
            subsection_header_space_separated: true,
            header_comment_bytes: (-1, -1, -1, -1),
            ..Default::default()
        }
    }

    pub fn record_object(&mut self, key: ObjectKey, compliance: ObjectCompliance) {
        self.objects.insert(key, compliance);
    }

    pub fn record_stream(&mut self, key: ObjectKey, compliance: StreamCompliance) {
        self.streams.insert(key, compliance);
    }

    pub fn record_hex_string(&mut self, signal: HexStringSignal) {
        self.hex_strings.push(signal);
    }

    pub fn record_signature_candidate(&mut self, candidate: SignatureByteRangeCandidate) {
        self.signature_candidates.push(candidate);
    }

    pub fn record_string_location(&mut self, key: ObjectKey, begin: usize, end: usize) {
        self.string_locations.insert(key, (begin, end));
    }

    /// Walk each recorded signature candidate, resolving indirect
    /// `/Contents` via `resolve_indirect_contents` when necessary, and check
    /// `/ByteRange == [0, contentsBegin, contentsEnd+1, firstEof-contentsEnd]`
    /// exactly. Intentionally does *not* replicate the original's narrower
    /// `1..2` loop-bound check (see design notes) — all three offsets are
    /// verified.
    pub fn verify_signature_byte_ranges<F>(&mut self, mut resolve_indirect_contents: F)
    where
        F: FnMut(ObjectKey) -> Option<(usize, usize)>,
    {
        let mut good = Vec::new();
        for candidate in &mut self.signature_candidates {
            if candidate.contents_begin.is_none() {
                if let Some(key) = candidate.indirect_contents {
                    if let Some((begin, end)) = resolve_indirect_contents(key) {
                        candidate.contents_begin = Some(begin);
                        candidate.contents_end = Some(end);
                    }
                }
            }
            let (Some(begin), Some(end), Some(first_eof), Some(byte_range)) =
                (candidate.contents_begin, candidate.contents_end, candidate.first_eof, &candidate.byte_range)
            else {
                continue;
            };
            if byte_range.len() != 4 {
                continue;
            }
            let expected = [0i64, begin as i64, end as i64 + 1, first_eof as i64 - end as i64];
            if byte_range.as_slice() == expected {
                if let Some(key) = candidate.dict_key {
                    good.push(key);
                }
            }
        }
        self.good_byte_range.extend(good);
    }
}

/// Does this dictionary look like a signature candidate: it has both
/// `/Contents` and `/ByteRange`, and is not typed as something other than
/// `/Sig`.
pub fn is_signature_candidate(dict: &Dictionary) -> bool {
    if !dict.has(b"Contents") || !dict.has(b"ByteRange") {
        return false;
    }
    match dict.get_opt(b"Type").and_then(|v| v.as_name().ok()) {
        Some(type_name) => type_name == b"Sig",
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_byte_range_matches_exactly() {
        let mut sink = ValidationSink::new();
        sink.record_signature_candidate(SignatureByteRangeCandidate {
            dict_key: Some((7, 0).into()),
            contents_begin: Some(100),
            contents_end: Some(150),
            indirect_contents: None,
            first_eof: Some(500),
            byte_range: Some(vec![0, 100, 151, 350]),
        });
        sink.verify_signature_byte_ranges(|_| None);
        assert_eq!(sink.good_byte_range, vec![ObjectKey::new(7, 0)]);
    }

    #[test]
    fn signature_byte_range_mismatch_is_excluded() {
        let mut sink = ValidationSink::new();
        sink.record_signature_candidate(SignatureByteRangeCandidate {
            dict_key: Some((7, 0).into()),
            contents_begin: Some(100),
            contents_end: Some(150),
            indirect_contents: None,
            first_eof: Some(500),
            byte_range: Some(vec![0, 999, 151, 350]),
        });
        sink.verify_signature_byte_ranges(|_| None);
        assert!(sink.good_byte_range.is_empty());
    }

    #[test]
    fn indirect_contents_resolved_via_callback() {
        let mut sink = ValidationSink::new();
        sink.record_signature_candidate(SignatureByteRangeCandidate {
            dict_key: Some((7, 0).into()),
            contents_begin: None,
            contents_end: None,
            indirect_contents: Some((8, 0).into()),
            first_eof: Some(500),
            byte_range: Some(vec![0, 100, 151, 350]),
        });
        sink.verify_signature_byte_ranges(|key| {
            assert_eq!(key, ObjectKey::new(8, 0));
            Some((100, 150))
        });
        assert_eq!(sink.good_byte_range, vec![ObjectKey::new(7, 0)]);
    }
}
