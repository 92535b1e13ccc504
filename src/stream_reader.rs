//! Stream body extraction (section 4.8, component C8): a length-known fast
//! path, and a length-less fallback that scans for `endstream` (or, on
//! corrupt input, `endobj`) using a Boyer-Moore-style shortcut. No grounding
//! example in the corpus implements this particular scan; it is authored
//! directly from the algorithm description since it is the inner loop that
//! dominates throughput on damaged files.

use log::warn;

use crate::cursor::{is_eol, ByteCursor};
use crate::error::{Error, Result};

/// Outcome of reading a stream body: the payload bytes plus, in validation
/// mode, whether the `stream`/`endstream` keyword EOLs complied with PDF/A.
pub struct StreamBody {
    pub payload: Vec<u8>,
    pub stream_keyword_eol_compliant: bool,
    pub endstream_keyword_eol_compliant: bool,
    /// True length of the payload as derived from file positions, which may
    /// differ from a declared `/Length` that undershoots or overshoots.
    pub origin_length: usize,
    /// Absolute offset of the first content byte, so a caller can re-derive
    /// `content_start + origin_length` as the boundary to resume parsing
    /// from without re-scanning for `endstream` itself.
    pub content_start: usize,
}

const ENDSTREAM: &[u8] = b"endstream";
const ENDOBJ: &[u8] = b"endobj";

/// Read a stream body starting right after the `stream` keyword.
///
/// `declared_length` is `/Length` already resolved to a concrete integer (the
/// caller is responsible for resolving an indirect `/Length` and detecting
/// cycles — see `object_store::resolve_length`). `None` triggers the
/// fallback scan directly.
pub fn read_stream_body(buf: &[u8], after_stream_keyword: usize, declared_length: Option<i64>) -> Result<StreamBody> {
    let mut cursor = ByteCursor::at(buf, after_stream_keyword);
    let stream_keyword_eol_compliant = consume_stream_eol(&mut cursor);
    let content_start = cursor.position();

    if let Some(len) = declared_length {
        if len >= 0 {
            let len = len as usize;
            if let Some(candidate_end) = content_start.checked_add(len) {
                if candidate_end <= buf.len() {
                    let mut probe = ByteCursor::at(buf, candidate_end);
                    probe.skip_spaces();
                    if buf[probe.position()..].starts_with(ENDSTREAM) {
                        let payload = buf[content_start..candidate_end].to_vec();
                        let endstream_keyword_eol_compliant = preceding_eol_compliant(buf, probe.position());
                        return Ok(StreamBody {
                            payload,
                            stream_keyword_eol_compliant,
                            endstream_keyword_eol_compliant,
                            origin_length: len,
                            content_start,
                        });
                    }
                }
            }
            warn!("declared /Length {len} did not line up with a following endstream, falling back to a scan");
        }
    }

    let end = boyer_moore_scan_for_keyword(buf, content_start).ok_or(Error::StreamLengthError(
        "no endstream or endobj found after stream content".to_string(),
    ))?;
    let endstream_keyword_eol_compliant = preceding_eol_compliant(buf, end);
    let trailing_eol = preceding_eol_len(buf, end).min(end - content_start);
    let payload_end = end - trailing_eol;
    let payload = buf[content_start..payload_end].to_vec();
    Ok(StreamBody {
        payload,
        stream_keyword_eol_compliant,
        endstream_keyword_eol_compliant,
        origin_length: payload_end - content_start,
        content_start,
    })
}

/// After `stream`, the spec requires a single LF or CR LF (a lone CR is
/// tolerated here, recording non-compliance instead of failing).
fn consume_stream_eol(cursor: &mut ByteCursor) -> bool {
    match (cursor.peek(), cursor.peek_at(1)) {
        (Some(b'\r'), Some(b'\n')) => {
            cursor.read();
            cursor.read();
            true
        }
        (Some(b'\n'), _) => {
            cursor.read();
            true
        }
        (Some(b'\r'), _) => {
            cursor.read();
            false
        }
        _ => false,
    }
}

fn preceding_eol_compliant(buf: &[u8], keyword_pos: usize) -> bool {
    if keyword_pos >= 2 && &buf[keyword_pos - 2..keyword_pos] == b"\r\n" {
        return true;
    }
    keyword_pos >= 1 && is_eol(buf[keyword_pos - 1])
}

/// Number of EOL bytes (0, 1 for a lone `\n`/`\r`, or 2 for `\r\n`) immediately
/// preceding `pos`, so the fallback scan can exclude them from the payload
/// and `origin_length` the way the length-known fast path already does.
fn preceding_eol_len(buf: &[u8], pos: usize) -> usize {
    if pos >= 2 && &buf[pos - 2..pos] == b"\r\n" {
        2
    } else if pos >= 1 && is_eol(buf[pos - 1]) {
        1
    } else {
        0
    }
}

/// Boyer-Moore-style shortcut scan for `endstream`, falling back to `endobj`
/// if that is what the file actually contains (observed in corrupt PDFs).
/// Compares the byte at `position + len - 1` first; if it cannot possibly be
/// the last byte of either keyword, skips ahead by the full keyword length.
fn boyer_moore_scan_for_keyword(buf: &[u8], from: usize) -> Option<usize> {
    let len = ENDSTREAM.len(); // 9; ENDOBJ (6) is checked as a shorter-keyword fallback below.
    if from + len > buf.len() {
        return find_endobj_fallback(buf, from);
    }
    let mut pos = from;
    while pos + len <= buf.len() {
        let last = buf[pos + len - 1];
        if !last.is_ascii_lowercase() {
            pos += len;
            continue;
        }
        if &buf[pos..pos + len] == ENDSTREAM {
            return Some(pos);
        }
        // The byte that broke the match might itself begin a new candidate
        // match (e.g. matching on 'e' restarts a 1-byte overlap, 'en' a
        // 2-byte overlap). Find the longest suffix of what we scanned that
        // is a prefix of "endstream" and resume there instead of skipping
        // past a real match.
        let resume = longest_matching_prefix_suffix(&buf[pos..pos + len], ENDSTREAM);
        pos += resume.max(1);
    }
    find_endobj_fallback(buf, from)
}

fn find_endobj_fallback(buf: &[u8], from: usize) -> Option<usize> {
    let len = ENDOBJ.len();
    if from > buf.len() {
        return None;
    }
    buf[from..].windows(len).position(|w| w == ENDOBJ).map(|i| i + from)
}

/// Length of the longest proper suffix of `window` that is also a prefix of
/// `keyword`. Used to avoid skipping past an overlapping partial match of
/// `endstream` (e.g. scanning `...endendstream` must not skip over the
/// second `end`).
fn longest_matching_prefix_suffix(window: &[u8], keyword: &[u8]) -> usize {
    for suffix_len in (1..window.len()).rev() {
        let suffix = &window[window.len() - suffix_len..];
        if keyword.starts_with(suffix) {
            return window.len() - suffix_len;
        }
    }
    window.len()
}
