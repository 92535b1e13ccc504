//! Whole-file brute-force recovery (section 4.7, component C7): rebuilds a
//! missing or broken xref by scanning for `N G obj` headers, `xref` table
//! starts, and `/XRef` stream starts. Scans are computed lazily and cached;
//! every call site consults the cache rather than rescanning, per the design
//! note in section 9. Grounded on the chunked `XRefRecovery::scan_buffer`/
//! `find_object_pattern`/`parse_object_header` pattern from
//! `oxidize-pdf-core`, adapted to operate on the whole in-memory buffer at
//! once since the rest of this crate already holds the full file in memory
//! (mirrors the teacher's `Reader` doing the same).

use std::cell::OnceCell;
use std::collections::BTreeMap;

use crate::cursor::is_whitespace;
use crate::object::ObjectKey;
use crate::xref::XrefKind;

/// How far back from a `/XRef` occurrence to look for its `N G obj` header.
const XREF_STREAM_BACKSCAN_LIMIT: usize = 30 * 10;

pub struct BruteForceScanner<'a> {
    buf: &'a [u8],
    objects: OnceCell<BTreeMap<ObjectKey, usize>>,
    xref_table_starts: OnceCell<Vec<usize>>,
    xref_stream_starts: OnceCell<Vec<usize>>,
}

impl<'a> BruteForceScanner<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        BruteForceScanner {
            buf,
            objects: OnceCell::new(),
            xref_table_starts: OnceCell::new(),
            xref_stream_starts: OnceCell::new(),
        }
    }

    /// `(number, generation) -> byte offset of the first digit of the
    /// object number`.
    pub fn objects(&self) -> &BTreeMap<ObjectKey, usize> {
        self.objects.get_or_init(|| scan_objects(self.buf))
    }

    pub fn find_object(&self, key: ObjectKey) -> Option<usize> {
        self.objects().get(&key).copied()
    }

    /// Offsets of `xref` keywords that begin a classic table (not part of
    /// `startxref`).
    pub fn xref_table_starts(&self) -> &[usize] {
        self.xref_table_starts.get_or_init(|| scan_xref_table_starts(self.buf))
    }

    /// Offsets of the `N G obj` headers that own an `/XRef` stream.
    pub fn xref_stream_starts(&self) -> &[usize] {
        self.xref_stream_starts.get_or_init(|| scan_xref_stream_starts(self.buf, self.objects()))
    }

    /// Nearest candidate xref start to `expected`, among both tables and
    /// streams. Ties prefer tables (section 4.5, `bfSearchForXRef`).
    pub fn nearest_xref(&self, expected: u64) -> Option<(usize, XrefKind)> {
        let diff = |o: usize| (o as i64 - expected as i64).unsigned_abs();
        let best_table = self.xref_table_starts().iter().copied().min_by_key(|&o| diff(o));
        let best_stream = self.xref_stream_starts().iter().copied().min_by_key(|&o| diff(o));
        match (best_table, best_stream) {
            (Some(t), Some(s)) => {
                if diff(t) <= diff(s) {
                    Some((t, XrefKind::Table))
                } else {
                    Some((s, XrefKind::Stream))
                }
            }
            (Some(t), None) => Some((t, XrefKind::Table)),
            (None, Some(s)) => Some((s, XrefKind::Stream)),
            (None, None) => None,
        }
    }
}

/// Scan backward from `end` (exclusive) for a run of ASCII digits, returning
/// its start offset and parsed value. `None` if no digit immediately
/// precedes `end`.
fn digits_ending_at(buf: &[u8], end: usize) -> Option<(usize, u64)> {
    let mut start = end;
    while start > 0 && buf[start - 1].is_ascii_digit() {
        start -= 1;
    }
    if start == end {
        return None;
    }
    std::str::from_utf8(&buf[start..end]).ok()?.parse().ok().map(|v| (start, v))
}

fn scan_objects(buf: &[u8]) -> BTreeMap<ObjectKey, usize> {
    let mut found = BTreeMap::new();
    if buf.len() < 6 {
        return found;
    }
    let mut search_from = 6;
    while let Some(rel) = buf[search_from..].windows(4).position(|w| w == b" obj") {
        let space_pos = search_from + rel;
        search_from = space_pos + 4;

        let Some((gen_start, gen)) = digits_ending_at(buf, space_pos) else { continue };
        if gen_start == 0 || buf[gen_start - 1] != b' ' {
            continue;
        }
        let Some((num_start, num)) = digits_ending_at(buf, gen_start - 1) else { continue };
        if gen > u16::MAX as u64 || num > u32::MAX as u64 {
            continue;
        }
        found.insert(ObjectKey::new(num as u32, gen as u16), num_start);
    }
    found
}

fn scan_xref_table_starts(buf: &[u8]) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut search_from = 0;
    while search_from + 4 <= buf.len() {
        match buf[search_from..].windows(4).position(|w| w == b"xref") {
            Some(rel) => {
                let pos = search_from + rel;
                if pos > 0 && is_whitespace(buf[pos - 1]) {
                    starts.push(pos);
                }
                search_from = pos + 4;
            }
            None => break,
        }
    }
    starts
}

fn scan_xref_stream_starts(buf: &[u8], objects: &BTreeMap<ObjectKey, usize>) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut search_from = 0;
    let mut headers: Vec<usize> = objects.values().copied().collect();
    headers.sort_unstable();

    while search_from + 5 <= buf.len() {
        match buf[search_from..].windows(5).position(|w| w == b"/XRef") {
            Some(rel) => {
                let pos = search_from + rel;
                let window_start = pos.saturating_sub(XREF_STREAM_BACKSCAN_LIMIT);
                if let Some(&header) =
                    headers.iter().rev().find(|&&h| h >= window_start && h <= pos)
                {
                    starts.push(header);
                }
                search_from = pos + 5;
            }
            None => break,
        }
    }
    starts
}
