//! E5 — a stream's `/Length` is an indirect reference whose own `/Length`
//! points back at the first object. Strict mode must fail that single
//! resolution rather than recurse forever; the rest of the document stays
//! reachable.

use pdf_xref_core::{open, IdentitySecurityHandler, InMemoryScratch, Mode, ParserConfig};

fn pdf_with_length_cycle() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"%PDF-1.4\n");
    buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
    buf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n");
    // object 3's /Length is object 4; object 4's /Length is object 3.
    buf.extend_from_slice(b"3 0 obj\n<< /Length 4 0 R >>\nstream\nxx\nendstream\nendobj\n");
    buf.extend_from_slice(b"4 0 obj\n<< /Length 3 0 R >>\nstream\nyy\nendstream\nendobj\n");

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
    buf
}

#[test]
fn length_cycle_does_not_hang_and_the_rest_of_the_document_still_resolves() {
    let buf = pdf_with_length_cycle();
    let mut doc = open(&buf, ParserConfig::new(Mode::strict()), Box::new(IdentitySecurityHandler), Box::new(InMemoryScratch)).unwrap();

    // The cyclic stream fails to resolve; in strict mode that surfaces as
    // `None` through the public, error-swallowing `resolve` accessor.
    assert!(doc.resolve(pdf_xref_core::ObjectKey::new(3, 0)).is_none());

    // Unrelated objects are unaffected.
    let root_key = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    let root = doc.resolve(root_key).unwrap();
    assert_eq!(root.as_dict().unwrap().get(b"Type").unwrap().as_name().unwrap(), b"Catalog");
}
