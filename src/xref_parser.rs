//! Walks the `startxref` chain (section 4.5, component C5): locates
//! `startxref`, dispatches each section to the classic-table or xref-stream
//! reader, follows `/Prev` (and `/XRefStm` for hybrid-reference files) with
//! explicit cycle detection, and falls back to
//! [`crate::brute_force::BruteForceScanner`] when an offset does not
//! resolve. Grounded on the teacher's `Reader::read`/`get_xref_start`
//! chain-walk in `reader.rs` and the classic-table grammar in
//! `nom_parser.rs::xref`, rewritten against byte offsets instead of `nom`
//! combinators so the repair path can substitute a corrected offset without
//! re-deriving position from `nom`'s remaining-span arithmetic. The
//! xref-stream field decoding is grounded on
//! `parser_aux.rs::decode_xref_stream`.

use std::collections::{BTreeMap, HashSet};

use log::warn;

use crate::brute_force::BruteForceScanner;
use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::filters::decode_stream;
use crate::header::FileHeader;
use crate::mode::{ParserConfig, DEFAULT_MAX_RECURSION_DEPTH};
use crate::object::{Dictionary, ObjectKey};
use crate::stream_reader::read_stream_body;
use crate::xref::{XrefEntry, XrefKind};
use crate::xref_resolver::XrefResolver;

/// Result of walking the whole xref chain: the accumulated sections, the
/// kind `startxref` itself pointed at, and the PDF/A-flavored conformance
/// signals the walk can only observe in passing.
pub struct ChainOutcome {
    pub resolver: XrefResolver,
    pub is_xref_stream: bool,
    pub xref_eol_markers_comply_pdfa: bool,
    pub subsection_header_space_separated: bool,
    /// Raw (header-relative) offsets that did not resolve directly and were
    /// patched via brute-force search.
    pub repaired_offsets: Vec<u64>,
    /// The raw (header-relative) offset `startxref` itself named, or the
    /// brute-force-recovered substitute if it was missing/unparsable.
    pub start_xref: u64,
}

pub fn parse_xref_chain(buf: &[u8], header: &FileHeader, config: &ParserConfig) -> Result<ChainOutcome> {
    let scanner = BruteForceScanner::new(buf);
    let mut walker = ChainWalker {
        buf,
        header_offset: header.offset,
        config,
        scanner,
        resolver: XrefResolver::new(),
        visited: HashSet::new(),
        xref_eol_markers_comply_pdfa: true,
        subsection_header_space_separated: true,
        repaired_offsets: Vec::new(),
        is_xref_stream: None,
    };

    let start = match find_startxref(buf, config.eof_lookup_range) {
        Some(v) => v,
        None => {
            if !config.mode.recover_on_bad_offsets {
                return Err(Error::MissingStartxref);
            }
            let (offset, _kind) = walker.scanner.nearest_xref(buf.len() as u64).ok_or(Error::MissingStartxref)?;
            walker.repaired_offsets.push(offset as u64);
            offset.saturating_sub(header.offset) as u64
        }
    };

    walker.walk(start)?;

    Ok(ChainOutcome {
        is_xref_stream: matches!(walker.is_xref_stream, Some(XrefKind::Stream)),
        resolver: walker.resolver,
        xref_eol_markers_comply_pdfa: walker.xref_eol_markers_comply_pdfa,
        subsection_header_space_separated: walker.subsection_header_space_separated,
        repaired_offsets: walker.repaired_offsets,
        start_xref: start,
    })
}

struct ChainWalker<'a> {
    buf: &'a [u8],
    header_offset: usize,
    config: &'a ParserConfig,
    scanner: BruteForceScanner<'a>,
    resolver: XrefResolver,
    visited: HashSet<u64>,
    xref_eol_markers_comply_pdfa: bool,
    subsection_header_space_separated: bool,
    repaired_offsets: Vec<u64>,
    is_xref_stream: Option<XrefKind>,
}

impl<'a> ChainWalker<'a> {
    fn resolve_offset(&mut self, raw_offset: u64) -> Result<(usize, XrefKind)> {
        let translated = self.header_offset + raw_offset as usize;
        if let Some(kind) = section_kind_at(self.buf, translated) {
            return Ok((translated, kind));
        }
        if self.config.mode.recover_on_bad_offsets {
            if let Some((offset, kind)) = self.scanner.nearest_xref(raw_offset) {
                self.repaired_offsets.push(raw_offset);
                return Ok((offset, kind));
            }
        }
        Err(Error::BadXref(format!("offset {raw_offset} does not resolve to a classic xref table or an xref stream")))
    }

    /// Parse the section at `translated` and fold it into the resolver,
    /// returning the `/Prev` and (classic-table only) `/XRefStm` offsets
    /// named by its trailer.
    fn ingest_section(&mut self, translated: usize, kind: XrefKind) -> Result<(Option<i64>, Option<i64>)> {
        self.resolver.next_xref_obj(translated as u64, kind);
        if self.is_xref_stream.is_none() {
            self.is_xref_stream = Some(kind);
        }
        match kind {
            XrefKind::Table => {
                let (entries, trailer, eol_ok, header_ok) = parse_classic_xref_section(self.buf, translated)?;
                self.xref_eol_markers_comply_pdfa &= eol_ok;
                self.subsection_header_space_separated &= header_ok;
                for (key, entry) in entries {
                    self.resolver.set_xref(key, entry);
                }
                let prev = trailer.get(b"Prev").ok().and_then(|v| v.as_i64().ok());
                let xrefstm = trailer.get(b"XRefStm").ok().and_then(|v| v.as_i64().ok());
                self.resolver.set_trailer(trailer);
                Ok((prev, xrefstm))
            }
            XrefKind::Stream => {
                let (entries, dict) = parse_xref_stream_section(self.buf, translated)?;
                for (key, entry) in entries {
                    self.resolver.set_xref(key, entry);
                }
                let prev = dict.get(b"Prev").ok().and_then(|v| v.as_i64().ok());
                self.resolver.set_trailer(dict);
                Ok((prev, None))
            }
        }
    }

    fn walk(&mut self, raw_start: u64) -> Result<()> {
        let mut next = Some(raw_start);
        while let Some(raw_offset) = next.take() {
            if !self.visited.insert(raw_offset) {
                warn!("cycle detected in xref /Prev chain revisiting offset {raw_offset}, stopping the walk");
                break;
            }
            let (translated, kind) = match self.resolve_offset(raw_offset) {
                Ok(v) => v,
                Err(e) => {
                    if self.config.mode.drop_instead_of_replace {
                        warn!("dropping unresolved xref section at offset {raw_offset}: {e}");
                        break;
                    }
                    return Err(e);
                }
            };
            let (prev, xrefstm) = self.ingest_section(translated, kind)?;

            if let Some(xrefstm_offset) = xrefstm.filter(|&p| p >= 0).map(|p| p as u64) {
                if self.visited.insert(xrefstm_offset) {
                    match self.resolve_offset(xrefstm_offset) {
                        Ok((t2, k2)) => {
                            if let Err(e) = self.ingest_section(t2, k2) {
                                warn!("failed to ingest hybrid /XRefStm section at offset {xrefstm_offset}: {e}");
                            }
                        }
                        Err(e) => warn!("hybrid /XRefStm offset {xrefstm_offset} did not resolve: {e}"),
                    }
                }
            }

            next = prev.filter(|&p| p >= 0).map(|p| p as u64);
        }
        Ok(())
    }
}

/// Scan backward within `eof_lookup_range` bytes of EOF for the last
/// `startxref` keyword and parse the integer that follows it.
fn find_startxref(buf: &[u8], eof_lookup_range: usize) -> Option<u64> {
    const KEYWORD: &[u8] = b"startxref";
    let window_start = buf.len().saturating_sub(eof_lookup_range);
    let window = &buf[window_start..];
    let rel = window.windows(KEYWORD.len()).rposition(|w| w == KEYWORD)?;
    let mut cursor = ByteCursor::at(buf, window_start + rel + KEYWORD.len());
    cursor.skip_spaces();
    let digits_start = cursor.position();
    while cursor.peek().map(|b| b.is_ascii_digit()).unwrap_or(false) {
        cursor.read();
    }
    std::str::from_utf8(&buf[digits_start..cursor.position()]).ok()?.parse().ok()
}

fn skip_ws(buf: &[u8], pos: usize) -> usize {
    let mut cursor = ByteCursor::at(buf, pos);
    cursor.skip_spaces();
    cursor.position()
}

/// Whether `pos` begins a classic `xref` keyword or an `N G obj` header,
/// without committing to parsing either fully.
fn section_kind_at(buf: &[u8], pos: usize) -> Option<XrefKind> {
    if pos >= buf.len() {
        return None;
    }
    if buf[pos..].starts_with(b"xref") && buf.get(pos + 4).map(|&b| !b.is_ascii_alphanumeric()).unwrap_or(true) {
        return Some(XrefKind::Table);
    }
    if object_header_at(buf, pos).is_some() {
        return Some(XrefKind::Stream);
    }
    None
}

/// Parses `<digits> <digits> obj` at `pos`, returning the object key and the
/// position right after the `obj` keyword.
pub(crate) fn object_header_at(buf: &[u8], pos: usize) -> Option<(ObjectKey, usize)> {
    let mut cursor = ByteCursor::at(buf, pos);
    let num_start = cursor.position();
    while cursor.peek().map(|b| b.is_ascii_digit()).unwrap_or(false) {
        cursor.read();
    }
    if cursor.position() == num_start {
        return None;
    }
    let number: u32 = std::str::from_utf8(&buf[num_start..cursor.position()]).ok()?.parse().ok()?;
    cursor.skip_spaces();
    let gen_start = cursor.position();
    while cursor.peek().map(|b| b.is_ascii_digit()).unwrap_or(false) {
        cursor.read();
    }
    if cursor.position() == gen_start {
        return None;
    }
    let generation: u16 = std::str::from_utf8(&buf[gen_start..cursor.position()]).ok()?.parse().ok()?;
    cursor.skip_spaces();
    if !buf[cursor.position()..].starts_with(b"obj") {
        return None;
    }
    cursor.seek(cursor.position() + 3);
    Some((ObjectKey::new(number, generation), cursor.position()))
}

fn parse_subsection_header(line: &[u8]) -> Option<(u32, u32)> {
    let mut parts = line.split(|&b| crate::cursor::is_whitespace(b)).filter(|s| !s.is_empty());
    let start: u32 = std::str::from_utf8(parts.next()?).ok()?.parse().ok()?;
    let count: u32 = std::str::from_utf8(parts.next()?).ok()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((start, count))
}

/// Parse the conforming fixed-width 20-byte entry at `pos`: 10-digit offset,
/// space, 5-digit generation, space, `n`/`f`, 2-byte EOL.
fn parse_fixed_entry(buf: &[u8], pos: usize) -> Option<(u64, u16, bool, usize, bool)> {
    let slice = buf.get(pos..pos + 20)?;
    if slice[10] != b' ' || slice[16] != b' ' || !matches!(slice[17], b'n' | b'f') {
        return None;
    }
    let offset: u64 = std::str::from_utf8(&slice[0..10]).ok()?.parse().ok()?;
    let generation: u16 = std::str::from_utf8(&slice[11..16]).ok()?.parse().ok()?;
    let in_use = slice[17] == b'n';
    let eol_compliant = matches!(&slice[18..20], b" \r" | b" \n" | b"\r\n");
    Some((offset, generation, in_use, pos + 20, eol_compliant))
}

/// Fallback for an entry line that does not conform to the 20-byte layout:
/// tolerant whitespace-delimited parse of `offset generation flag`.
fn parse_loose_entry(line: &[u8]) -> Option<(u64, u16, bool)> {
    let mut parts = line.split(|&b| crate::cursor::is_whitespace(b)).filter(|s| !s.is_empty());
    let offset: u64 = std::str::from_utf8(parts.next()?).ok()?.parse().ok()?;
    let generation: u16 = std::str::from_utf8(parts.next()?).ok()?.parse().ok()?;
    let flag = parts.next()?;
    let in_use = flag == b"n";
    Some((offset, generation, in_use))
}

fn parse_classic_xref_section(buf: &[u8], pos: usize) -> Result<(BTreeMap<ObjectKey, XrefEntry>, Dictionary, bool, bool)> {
    let mut cursor = ByteCursor::at(buf, pos);
    if !buf[cursor.position()..].starts_with(b"xref") {
        return Err(Error::BadXref("expected 'xref' keyword".to_string()));
    }
    cursor.seek(cursor.position() + 4);
    cursor.skip_spaces();

    let mut entries = BTreeMap::new();
    let mut eol_compliant = true;
    let mut header_space_separated = true;

    loop {
        if cursor.is_eof() || buf[cursor.position()..].starts_with(b"trailer") {
            break;
        }
        let header_line = cursor.read_line();
        let Some((start, count)) = parse_subsection_header(header_line) else {
            warn!("unparsable xref subsection header at around offset {}", cursor.position());
            break;
        };
        if header_line != format!("{start} {count}").as_bytes() {
            header_space_separated = false;
        }

        for i in 0..count {
            if cursor.is_eof() {
                break;
            }
            let entry_pos = cursor.position();
            if let Some((offset, generation, in_use, end, ok)) = parse_fixed_entry(buf, entry_pos) {
                eol_compliant &= ok;
                if in_use {
                    entries.insert(ObjectKey::new(start + i, generation), XrefEntry::InUse(offset));
                }
                cursor.seek(end);
            } else {
                eol_compliant = false;
                let line = cursor.read_line();
                match parse_loose_entry(line) {
                    Some((offset, generation, in_use)) if in_use => {
                        entries.insert(ObjectKey::new(start + i, generation), XrefEntry::InUse(offset));
                    }
                    Some(_) => {}
                    None => warn!("unparsable xref entry at offset {entry_pos}, skipping"),
                }
            }
        }
    }

    let trailer = if buf[cursor.position()..].starts_with(b"trailer") {
        cursor.seek(cursor.position() + 7);
        cursor.skip_spaces();
        let (dict, _entries, _end) = crate::grammar::parse_dictionary(buf, cursor.position(), 0, DEFAULT_MAX_RECURSION_DEPTH)?;
        dict
    } else {
        Dictionary::new()
    };

    Ok((entries, trailer, eol_compliant, header_space_separated))
}

fn parse_xref_stream_section(buf: &[u8], pos: usize) -> Result<(BTreeMap<ObjectKey, XrefEntry>, Dictionary)> {
    let (_key, after_obj) = object_header_at(buf, pos).ok_or_else(|| Error::BadXref("expected an 'N G obj' header".to_string()))?;
    let mut cur = skip_ws(buf, after_obj);
    if !buf[cur..].starts_with(b"<<") {
        return Err(Error::BadXref("xref stream object is missing its dictionary".to_string()));
    }
    let (dict, _entries, after_dict) = crate::grammar::parse_dictionary(buf, cur, 0, DEFAULT_MAX_RECURSION_DEPTH)?;
    cur = skip_ws(buf, after_dict);
    if !buf[cur..].starts_with(b"stream") {
        return Err(Error::BadXref("xref stream object is missing its 'stream' keyword".to_string()));
    }
    let declared_length = dict.get(b"Length").ok().and_then(|v| v.as_i64().ok());
    let body = read_stream_body(buf, cur + 6, declared_length)?;
    let decoded = decode_stream(&dict, &body.payload)?;
    let entries = decode_xref_stream_entries(&dict, &decoded)?;
    Ok((entries, dict))
}

fn read_be(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

fn read_field(content: &[u8], entry_start: usize, field_offset: usize, width: usize) -> u64 {
    if width == 0 {
        0
    } else {
        read_be(&content[entry_start + field_offset..entry_start + field_offset + width])
    }
}

/// Decode `/W`-widthed xref-stream entries, defaulting `/Index` to
/// `[0 Size]` and the type field to 1 when `W[0] == 0`, per PDF 32000-1
/// table 17/18 (grounded on `parser_aux.rs::decode_xref_stream`).
fn decode_xref_stream_entries(dict: &Dictionary, content: &[u8]) -> Result<BTreeMap<ObjectKey, XrefEntry>> {
    let w = dict.get(b"W")?.as_array()?;
    if w.len() < 3 {
        return Err(Error::BadXref("xref stream /W must have 3 entries".to_string()));
    }
    let w0 = w[0].as_i64()?.max(0) as usize;
    let w1 = w[1].as_i64()?.max(0) as usize;
    let w2 = w[2].as_i64()?.max(0) as usize;
    let entry_len = w0 + w1 + w2;
    if entry_len == 0 {
        return Err(Error::BadXref("xref stream /W entries sum to zero".to_string()));
    }

    let size = dict.get(b"Size")?.as_i64()?.max(0) as u32;
    let index: Vec<(u32, u32)> = match dict.get_opt(b"Index") {
        Some(v) => {
            let arr = v.as_array()?;
            arr.chunks(2)
                .filter_map(|pair| {
                    let start = pair.first()?.as_i64().ok()? as u32;
                    let count = pair.get(1)?.as_i64().ok()? as u32;
                    Some((start, count))
                })
                .collect()
        }
        None => vec![(0, size)],
    };

    let mut entries = BTreeMap::new();
    let mut cur = 0usize;
    for (start, count) in index {
        for i in 0..count {
            if cur + entry_len > content.len() {
                warn!("xref stream ran out of bytes before /Index section ({start} {count}) finished");
                break;
            }
            let entry_type = if w0 == 0 { 1 } else { read_field(content, cur, 0, w0) };
            let f2 = read_field(content, cur, w0, w1);
            let f3 = read_field(content, cur, w0 + w1, w2);
            let number = start + i;
            match entry_type {
                0 => {}
                1 => {
                    entries.insert(ObjectKey::new(number, f3 as u16), XrefEntry::InUse(f2));
                }
                2 => {
                    entries.insert(ObjectKey::new(number, 0), XrefEntry::Compressed { container: f2 as u32, index: f3 as u32 });
                }
                _ => {}
            }
            cur += entry_len;
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;

    fn cfg(mode: Mode) -> ParserConfig {
        ParserConfig::new(mode)
    }

    #[test]
    fn finds_last_startxref() {
        let buf = b"garbage startxref\n999\n%%EOF\nmore\nstartxref\n8\n%%EOF";
        assert_eq!(find_startxref(buf, 2048), Some(8));
    }

    #[test]
    fn parses_simple_classic_table_and_trailer() {
        let mut buf = b"%PDF-1.4\nxref\n0 2\n".to_vec();
        buf.extend_from_slice(b"0000000000 65535 f\r\n");
        buf.extend_from_slice(b"0000000017 00000 n\r\n");
        buf.extend_from_slice(b"trailer\n<< /Size 2 /Root 1 0 R >>\n");
        let (entries, trailer, eol_ok, header_ok) = parse_classic_xref_section(&buf, 9).unwrap();
        assert_eq!(entries.get(&ObjectKey::new(1, 0)), Some(&XrefEntry::InUse(17)));
        assert!(!entries.contains_key(&ObjectKey::new(0, 65535)));
        assert!(eol_ok);
        assert!(header_ok);
        assert_eq!(trailer.get(b"Size").unwrap().as_i64().unwrap(), 2);
    }

    #[test]
    fn full_chain_walk_follows_prev() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n");
        // oldest section, offset recorded after building the newer one.
        let old_xref_offset = buf.len();
        buf.extend_from_slice(b"xref\n0 2\n");
        buf.extend_from_slice(b"0000000000 65535 f\r\n");
        buf.extend_from_slice(b"0000000009 00000 n\r\n");
        buf.extend_from_slice(b"trailer\n<< /Size 2 /Root 1 0 R >>\n");

        let new_xref_offset = buf.len();
        buf.extend_from_slice(b"xref\n0 1\n");
        buf.extend_from_slice(b"0000000000 65535 f\r\n");
        buf.extend_from_slice(format!("trailer\n<< /Size 2 /Root 1 0 R /Prev {old_xref_offset} >>\n").as_bytes());
        buf.extend_from_slice(format!("startxref\n{new_xref_offset}\n%%EOF").as_bytes());

        let header = FileHeader { offset: 0, version: 1.4, binary_comment_bytes: (-1, -1, -1, -1) };
        let config = cfg(Mode::lenient());
        let outcome = parse_xref_chain(&buf, &header, &config).unwrap();
        assert!(!outcome.is_xref_stream);
        let merged = outcome.resolver.get_merged_xref();
        assert_eq!(merged.get(&ObjectKey::new(1, 0)), Some(&XrefEntry::InUse(9)));
        let trailer = outcome.resolver.get_merged_trailer();
        assert_eq!(trailer.get(b"Root").unwrap().as_reference().unwrap(), ObjectKey::new(1, 0));
    }

    #[test]
    fn cycle_in_prev_chain_is_broken() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n");
        let xref_offset = buf.len();
        buf.extend_from_slice(b"xref\n0 1\n");
        buf.extend_from_slice(b"0000000000 65535 f\r\n");
        buf.extend_from_slice(format!("trailer\n<< /Size 1 /Root 1 0 R /Prev {xref_offset} >>\n").as_bytes());
        buf.extend_from_slice(format!("startxref\n{xref_offset}\n%%EOF").as_bytes());

        let header = FileHeader { offset: 0, version: 1.4, binary_comment_bytes: (-1, -1, -1, -1) };
        let config = cfg(Mode::lenient());
        let outcome = parse_xref_chain(&buf, &header, &config).unwrap();
        assert_eq!(outcome.resolver.sections().len(), 1);
    }

    #[test]
    fn decodes_xref_stream_entries_type1_and_type2() {
        let mut dict = Dictionary::new();
        dict.set(
            "W",
            vec![crate::object::ObjectValue::Int(1), crate::object::ObjectValue::Int(2), crate::object::ObjectValue::Int(1)],
        );
        dict.set("Size", crate::object::ObjectValue::Int(2));
        // entry 0: type 1, offset 0x1234, gen 0
        // entry 1: type 2, container 5, index 3
        let content: Vec<u8> = vec![1, 0x12, 0x34, 0, 2, 0x00, 0x05, 3];
        let entries = decode_xref_stream_entries(&dict, &content).unwrap();
        assert_eq!(entries.get(&ObjectKey::new(0, 0)), Some(&XrefEntry::InUse(0x1234)));
        assert_eq!(entries.get(&ObjectKey::new(1, 0)), Some(&XrefEntry::Compressed { container: 5, index: 3 }));
    }
}
