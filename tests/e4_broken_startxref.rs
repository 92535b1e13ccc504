//! E4 — no `startxref` at all: lenient mode falls back to
//! [`pdf_xref_core::document`]'s brute-force recovery path and still opens
//! the document; strict mode refuses.

use pdf_xref_core::{open, Error, IdentitySecurityHandler, InMemoryScratch, Mode, ParserConfig};

fn pdf_missing_startxref() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"%PDF-1.4\n");
    buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
    buf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n");
    let obj1 = buf.windows(7).position(|w| w == b"1 0 obj").unwrap();
    let obj2 = buf.windows(7).position(|w| w == b"2 0 obj").unwrap();
    buf.extend_from_slice(b"xref\n0 3\n");
    buf.extend_from_slice(b"0000000000 65535 f\r\n");
    buf.extend_from_slice(format!("{obj1:010} 00000 n\r\n").as_bytes());
    buf.extend_from_slice(format!("{obj2:010} 00000 n\r\n").as_bytes());
    buf.extend_from_slice(b"trailer\n<< /Root 1 0 R /Size 3 >>\n%%EOF");
    buf
}

#[test]
fn lenient_mode_recovers_the_missing_startxref() {
    let buf = pdf_missing_startxref();
    let mut doc = open(&buf, ParserConfig::new(Mode::lenient()), Box::new(IdentitySecurityHandler), Box::new(InMemoryScratch)).unwrap();
    let root_key = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    let root = doc.resolve(root_key).unwrap();
    assert_eq!(root.as_dict().unwrap().get(b"Type").unwrap().as_name().unwrap(), b"Catalog");
}

#[test]
fn strict_mode_reports_the_missing_startxref() {
    let buf = pdf_missing_startxref();
    let err = open(&buf, ParserConfig::new(Mode::strict()), Box::new(IdentitySecurityHandler), Box::new(InMemoryScratch)).unwrap_err();
    assert!(matches!(err, Error::MissingStartxref));
}
