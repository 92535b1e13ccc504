//! File header detection (section 4.10, component C10): finds `%PDF-x.y` or
//! `%FDF-x.y`, tolerating a junk prefix (some producers emit bytes before
//! the header), and records the header byte offset that every other offset
//! in the file is translated by.

use crate::cursor::ByteCursor;

/// Lines of junk tolerated before a `%PDF-`/`%FDF-` header is found.
const MAX_JUNK_LINES: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    /// Byte offset of the `%` that begins the header comment. Every xref and
    /// object offset in the document is interpreted relative to this.
    pub offset: usize,
    pub version: f32,
    /// The four bytes of the binary-comment second line (`%` followed by
    /// four bytes ≥ 128, by convention), or `(-1, -1, -1, -1)` if absent.
    pub binary_comment_bytes: (i16, i16, i16, i16),
}

pub fn parse_header(buf: &[u8]) -> FileHeader {
    let mut cursor = ByteCursor::new(buf);
    for _ in 0..MAX_JUNK_LINES {
        if cursor.is_eof() {
            break;
        }
        let line_start = cursor.position();
        let line = cursor.read_line();
        if let Some(version) = extract_version(line) {
            let offset = line_start + line.iter().position(|&b| b == b'%').unwrap_or(0);
            let binary_comment_bytes = read_binary_comment(&mut cursor);
            return FileHeader { offset, version, binary_comment_bytes };
        }
        if cursor.position() == line_start {
            break; // no progress (e.g. empty buffer); avoid looping forever
        }
    }
    // No header found at all: treat offset 0 as the header and fall back to
    // the PDF 1.4 default per the spec's missing-version rule.
    FileHeader { offset: 0, version: 1.4, binary_comment_bytes: (-1, -1, -1, -1) }
}

fn extract_version(line: &[u8]) -> Option<f32> {
    let marker = if let Some(pos) = find_subslice(line, b"%PDF-") {
        pos + 5
    } else if let Some(pos) = find_subslice(line, b"%FDF-") {
        pos + 5
    } else {
        return None;
    };
    let rest = &line[marker..];
    let end = rest.iter().position(|b| !(b.is_ascii_digit() || *b == b'.')).unwrap_or(rest.len());
    std::str::from_utf8(&rest[..end]).ok()?.parse::<f32>().ok().or(Some(default_version(line)))
}

fn default_version(line: &[u8]) -> f32 {
    if find_subslice(line, b"%FDF-").is_some() {
        1.0
    } else {
        1.4
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// The second line, if it is a binary comment (`%` followed by ≥4 bytes each
/// ≥ 128), yields its first four bytes; otherwise `(-1,-1,-1,-1)` and the
/// cursor is left where it was.
fn read_binary_comment(cursor: &mut ByteCursor) -> (i16, i16, i16, i16) {
    let saved = cursor.position();
    let line = cursor.read_line();
    if line.first() == Some(&b'%') && line.len() >= 5 && line[1..5].iter().all(|&b| b >= 128) {
        (line[1] as i16, line[2] as i16, line[3] as i16, line[4] as i16)
    } else {
        cursor.seek(saved);
        (-1, -1, -1, -1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_header_at_start() {
        let h = parse_header(b"%PDF-1.4\n1 0 obj\n");
        assert_eq!(h.offset, 0);
        assert_eq!(h.version, 1.4);
    }

    #[test]
    fn tolerates_junk_prefix() {
        let h = parse_header(b"junk line\nmore junk\n%PDF-1.7\n");
        assert_eq!(h.offset, 20);
        assert_eq!(h.version, 1.7);
    }

    #[test]
    fn defaults_version_when_unparsable() {
        let h = parse_header(b"%PDF-\n");
        assert_eq!(h.version, 1.4);
    }

    #[test]
    fn captures_binary_comment_bytes() {
        let mut line = b"%PDF-1.5\n%".to_vec();
        line.extend_from_slice(&[200, 201, 202, 203]);
        line.push(b'\n');
        let h = parse_header(&line);
        assert_eq!(h.binary_comment_bytes, (200, 201, 202, 203));
    }

    #[test]
    fn missing_binary_comment_is_negative_one() {
        let h = parse_header(b"%PDF-1.5\n1 0 obj\n");
        assert_eq!(h.binary_comment_bytes, (-1, -1, -1, -1));
    }
}
