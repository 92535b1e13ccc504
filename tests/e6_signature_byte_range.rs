//! E6 — signature byte-range verification (section 4.9/4.3) with an
//! *indirect* `/Contents`: the signature dictionary references a separate
//! string object, which validation mode must resolve via
//! [`pdf_xref_core::ValidationSink::string_locations`] before the
//! `/ByteRange` check can run.

use pdf_xref_core::{open, IdentitySecurityHandler, InMemoryScratch, Mode, ParserConfig};

fn pad(n: i64) -> String {
    format!("{n:010}")
}

/// Builds a document with:
///   1 0 — Catalog
///   2 0 — Pages
///   3 0 — a bare indirect hex string, the signature's `/Contents`
///   4 0 — the `/Sig` dictionary, `/Contents 3 0 R`, placeholder `/ByteRange`
///
/// `/ByteRange` is written zero-padded to a fixed 10-digit width per field so
/// the byte layout doesn't shift once the real values are patched in below.
fn signed_pdf() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"%PDF-1.6\n");
    buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
    buf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n");
    buf.extend_from_slice(b"3 0 obj\n<AABBCC>\nendobj\n");

    let needle = b"<AABBCC>";
    let open_pos = buf.windows(needle.len()).position(|w| w == needle).unwrap();
    let contents_begin = open_pos + 1;
    let contents_end = open_pos + needle.len() - 2;

    let placeholder = format!(
        "4 0 obj\n<< /Type /Sig /Contents 3 0 R /ByteRange [{} {} {} {}] >>\nendobj\n",
        pad(0),
        pad(0),
        pad(0),
        pad(0)
    );
    buf.extend_from_slice(placeholder.as_bytes());

    let obj1 = buf.windows(7).position(|w| w == b"1 0 obj").unwrap();
    let obj2 = buf.windows(7).position(|w| w == b"2 0 obj").unwrap();
    let obj3 = buf.windows(7).position(|w| w == b"3 0 obj").unwrap();
    let obj4 = buf.windows(7).position(|w| w == b"4 0 obj").unwrap();

    let xref_offset = buf.len();
    buf.extend_from_slice(b"xref\n0 5\n");
    buf.extend_from_slice(b"0000000000 65535 f\r\n");
    for off in [obj1, obj2, obj3, obj4] {
        buf.extend_from_slice(format!("{off:010} 00000 n\r\n").as_bytes());
    }
    buf.extend_from_slice(b"trailer\n<< /Root 1 0 R /Size 5 >>\n");
    buf.extend_from_slice(format!("startxref\n{xref_offset}\n%%EOF").as_bytes());

    // Patch the placeholder /ByteRange with real values, same byte width.
    let first_eof = buf.windows(5).rposition(|w| w == b"%%EOF").unwrap() + 4;
    let real = format!(
        "[{} {} {} {}]",
        pad(0),
        pad(contents_begin as i64),
        pad(contents_end as i64 + 1),
        pad(first_eof as i64 - contents_end as i64)
    );
    let placeholder_bytes = format!("[{} {} {} {}]", pad(0), pad(0), pad(0), pad(0));
    let patch_at = buf.windows(placeholder_bytes.len()).position(|w| w == placeholder_bytes.as_bytes()).unwrap();
    assert_eq!(real.len(), placeholder_bytes.len());
    buf[patch_at..patch_at + real.len()].copy_from_slice(real.as_bytes());

    buf
}

#[test]
fn indirect_contents_byte_range_verifies() {
    let buf = signed_pdf();
    let mut doc = open(&buf, ParserConfig::new(Mode::validation()), Box::new(IdentitySecurityHandler), Box::new(InMemoryScratch)).unwrap();
    doc.verify_signatures();
    let sink = doc.validation().unwrap();
    assert_eq!(sink.good_byte_range, vec![pdf_xref_core::ObjectKey::new(4, 0)]);
}

#[test]
fn tampered_byte_range_does_not_verify() {
    let mut buf = signed_pdf();
    // Flip one digit of the patched /ByteRange so it no longer matches.
    let needle = b"/ByteRange [0000000000";
    let pos = buf.windows(needle.len()).position(|w| w == needle).unwrap() + needle.len() - 1;
    buf[pos] = b'9';
    let mut doc = open(&buf, ParserConfig::new(Mode::validation()), Box::new(IdentitySecurityHandler), Box::new(InMemoryScratch)).unwrap();
    doc.verify_signatures();
    let sink = doc.validation().unwrap();
    assert!(sink.good_byte_range.is_empty());
}
