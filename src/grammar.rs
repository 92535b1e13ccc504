//! Builds the value tree from lexical tokens: dictionaries, arrays and
//! indirect-reference placeholders (section 4.3, component C3). Streams are
//! *not* produced here — a dictionary value is just a `Dict`; the caller
//! (`object_store::parse_indirect_object`) peeks for a following `stream`
//! keyword and delegates the body to [`crate::stream_reader`], per the data
//! flow in section 2.
//!
//! `Ref` synthesis for `<int> <int> R` is handled the way the teacher's
//! `nom_parser.rs` handles it: `reference` is tried before `real`/`integer`
//! in the alternation, so two adjacent integers followed by `R` always
//! collapse into a single `Ref`, in both array and dictionary-value
//! position, without a separate stateful aggregator.

use log::warn;
use nom_locate::LocatedSpan;

use crate::error::{Error, Result};
use crate::lexer::{self, Span};
use crate::object::{Dictionary, ObjectValue, StringKind};

/// One `/Key value` pair as parsed from a dictionary, with the byte range of
/// the value token. Used by the validation sink to capture `/Contents` (and
/// similar) positions without the grammar depending on validation directly.
#[derive(Debug, Clone)]
pub struct DictEntry {
    pub key: Vec<u8>,
    pub value_start: usize,
    pub value_end: usize,
}

/// Recovery boundary keywords a damaged dictionary scan stops at.
const DICT_RECOVERY_STOPS: &[&[u8]] = &[b"endstream", b"endobj"];

fn span_at(buf: &[u8], pos: usize) -> Span<'_> {
    LocatedSpan::new(&buf[pos..])
}

fn consumed(buf_len_from_pos: usize, remaining: Span) -> usize {
    buf_len_from_pos - remaining.len()
}

/// Parse one direct object starting at `pos`, returning its value and the
/// position immediately after it (trailing whitespace/comments consumed).
pub fn parse_direct_object(buf: &[u8], pos: usize, depth: usize, max_depth: usize) -> Result<(ObjectValue, usize)> {
    if depth > max_depth {
        return Err(Error::MalformedNesting);
    }
    let input = span_at(buf, pos);
    let from_len = input.len();

    if let Ok((rest, _)) = lexer::null(input) {
        return Ok((ObjectValue::Null, with_trailing_space(buf, pos + consumed(from_len, rest))));
    }
    if let Ok((rest, b)) = lexer::boolean(input) {
        return Ok((ObjectValue::Bool(b), with_trailing_space(buf, pos + consumed(from_len, rest))));
    }
    if let Ok((rest, key)) = lexer::reference(input) {
        return Ok((ObjectValue::Ref(key), with_trailing_space(buf, pos + consumed(from_len, rest))));
    }
    if let Ok((rest, r)) = lexer::real(input) {
        return Ok((ObjectValue::Real(r), with_trailing_space(buf, pos + consumed(from_len, rest))));
    }
    if let Ok((rest, i)) = lexer::integer(input) {
        return Ok((ObjectValue::Int(i), with_trailing_space(buf, pos + consumed(from_len, rest))));
    }
    if let Ok((rest, bytes)) = lexer::literal_string(input) {
        return Ok((ObjectValue::String(bytes, StringKind::Literal), with_trailing_space(buf, pos + consumed(from_len, rest))));
    }
    if input.as_ref().first() == Some(&b'(') {
        if let Some(end) = recover_unbalanced_literal_string_end(buf, pos) {
            warn!("literal string at offset {pos} has an unbalanced closing paren; recovered via the CRLF-/CR-/ heuristic");
            let bytes = buf[pos + 1..end - 1].to_vec();
            return Ok((ObjectValue::String(bytes, StringKind::Literal), with_trailing_space(buf, end)));
        }
    }
    if input.as_ref().first() == Some(&b'<') && input.as_ref().get(1) != Some(&b'<') {
        if let Ok((rest, hex)) = lexer::hexadecimal_string(input) {
            return Ok((ObjectValue::String(hex.bytes, StringKind::Hex), with_trailing_space(buf, pos + consumed(from_len, rest))));
        }
    }
    if let Ok((rest, name)) = lexer::name(input) {
        return Ok((ObjectValue::Name(name), with_trailing_space(buf, pos + consumed(from_len, rest))));
    }
    if input.as_ref().first() == Some(&b'[') {
        return parse_array(buf, pos, depth, max_depth);
    }
    if input.as_ref().starts_with(b"<<") {
        let (dict, _entries, end) = parse_dictionary(buf, pos, depth, max_depth)?;
        return Ok((ObjectValue::Dict(dict), end));
    }

    Err(Error::MalformedObject { offset: pos })
}

fn consume_trailing_space(buf: &[u8], pos: usize) -> usize {
    let input = span_at(buf, pos);
    match lexer::space(input) {
        Ok((rest, _)) => consumed(input.len(), rest),
        Err(_) => 0,
    }
}

/// `token_end` plus however much trailing whitespace/comment immediately
/// follows it — the absolute position callers resume parsing from.
fn with_trailing_space(buf: &[u8], token_end: usize) -> usize {
    token_end + consume_trailing_space(buf, token_end)
}

/// Array: drops malformed entries, aborting early if a skip would cross
/// `endobj`/`endstream` (section 4.3).
fn parse_array(buf: &[u8], pos: usize, depth: usize, max_depth: usize) -> Result<(ObjectValue, usize)> {
    let mut cur = pos + 1; // consume '['
    cur += consume_trailing_space(buf, cur);
    let mut items = Vec::new();

    loop {
        if buf.get(cur) == Some(&b']') {
            cur += 1;
            break;
        }
        if cur >= buf.len() {
            break;
        }
        match parse_direct_object(buf, cur, depth + 1, max_depth) {
            Ok((value, end)) => {
                items.push(value);
                cur = end;
            }
            Err(_) => {
                if at_recovery_stop(buf, cur) {
                    warn!("array truncated at offset {cur}: hit endobj/endstream while recovering");
                    break;
                }
                warn!("dropping malformed array element at offset {cur}");
                cur += 1;
                cur += consume_trailing_space(buf, cur);
            }
        }
    }
    cur += consume_trailing_space(buf, cur);
    Ok((ObjectValue::Array(items), cur))
}

fn at_recovery_stop(buf: &[u8], pos: usize) -> bool {
    DICT_RECOVERY_STOPS.iter().any(|kw| buf[pos..].starts_with(kw))
}

/// Dictionary: `<< (/Name value)* >>`. A trailing `def` keyword (content
/// stream dictionaries, e.g. PostScript-flavored resource dicts) is consumed
/// if present. On malformed content, scans ahead to the next `/`, `>>`,
/// `endstream` or `endobj` and recovers at that boundary.
pub fn parse_dictionary(
    buf: &[u8], pos: usize, depth: usize, max_depth: usize,
) -> Result<(Dictionary, Vec<DictEntry>, usize)> {
    if depth > max_depth {
        return Err(Error::MalformedNesting);
    }
    let mut cur = pos + 2; // consume '<<'
    cur += consume_trailing_space(buf, cur);
    let mut dict = Dictionary::new();
    let mut entries = Vec::new();

    loop {
        if buf[cur..].starts_with(b">>") {
            cur += 2;
            break;
        }
        if cur >= buf.len() || at_recovery_stop(buf, cur) {
            warn!("dictionary truncated at offset {cur}: missing '>>'");
            break;
        }
        if buf.get(cur) != Some(&b'/') {
            // Malformed: scan ahead to a recognizable boundary.
            warn!("expected a name key at offset {cur}, scanning for recovery boundary");
            match scan_to_recovery_boundary(buf, cur) {
                Some(next) if buf.get(next) == Some(&b'/') => {
                    cur = next;
                    continue;
                }
                Some(next) if buf[next..].starts_with(b">>") => {
                    cur = next + 2;
                    break;
                }
                _ => break,
            }
        }
        let (key, after_key) = match lexer::name(span_at(buf, cur)) {
            Ok((rest, key)) => (key, cur + consumed(buf.len() - cur, rest)),
            Err(_) => {
                cur += 1;
                continue;
            }
        };
        let value_start = after_key + consume_trailing_space(buf, after_key);
        let (value, mut after_value) = match parse_direct_object(buf, value_start, depth + 1, max_depth) {
            Ok(v) => v,
            Err(_) => {
                warn!("malformed value for key /{} at offset {value_start}", String::from_utf8_lossy(&key));
                match scan_to_recovery_boundary(buf, value_start) {
                    Some(next) => {
                        cur = next;
                        continue;
                    }
                    None => break,
                }
            }
        };
        let value_end = after_value;
        // Optional trailing `def` (content-stream-flavored dictionaries).
        if buf[after_value..].starts_with(b"def") {
            let follows = buf.get(after_value + 3).copied();
            if follows.map(|b| !b.is_ascii_alphanumeric()).unwrap_or(true) {
                after_value += 3;
                after_value += consume_trailing_space(buf, after_value);
            }
        }
        entries.push(DictEntry { key: key.clone(), value_start, value_end });
        dict.set(key, value);
        cur = after_value;
    }
    Ok((dict, entries, cur))
}

/// Scan forward from `pos` for the nearest `/`, `>>`, `endstream` or
/// `endobj`, returning its offset.
fn scan_to_recovery_boundary(buf: &[u8], pos: usize) -> Option<usize> {
    let mut i = pos;
    while i < buf.len() {
        if buf[i] == b'/' || buf[i..].starts_with(b">>") {
            return Some(i);
        }
        if at_recovery_stop(buf, i) {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Convenience used by xref-stream / content-stream-adjacent callers that
/// just want a single value with no trailing-context needs (mirrors the
/// teacher's `parser::direct_object`).
pub fn direct_object(buf: &[u8]) -> Option<ObjectValue> {
    parse_direct_object(buf, 0, 0, crate::mode::DEFAULT_MAX_RECURSION_DEPTH).ok().map(|(v, _)| v)
}

/// `(` escape recovery: if an unbalanced `)` is followed by `CR LF /` or
/// `CR /`, lopdf-family parsers treat the string as closed there. This is a
/// documented-bug tolerance (section 4.2); callers that hit a
/// `MalformedObject` while inside what looks like a literal string may
/// retry with this heuristic by scanning for the pattern directly, rather
/// than re-deriving it inside the combinator grammar.
pub fn recover_unbalanced_literal_string_end(buf: &[u8], open_paren: usize) -> Option<usize> {
    let mut i = open_paren + 1;
    let mut depth = 1i32;
    while i < buf.len() {
        match buf[i] {
            b'\\' => i += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
                if buf[i + 1..].starts_with(b"\r\n/") || buf[i + 1..].starts_with(b"\r/") {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}
