//! E2 — cross-reference stream: `/Type /XRef` object holding the table,
//! `/W`-widthed binary entries, no classic `xref` keyword in sight.

use pdf_xref_core::{open, IdentitySecurityHandler, InMemoryScratch, Mode, ParserConfig};

fn be16(x: usize) -> [u8; 2] {
    [(x >> 8) as u8, x as u8]
}

fn xref_stream_pdf() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"%PDF-1.5\n");
    buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
    buf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n");
    let obj1 = buf.windows(7).position(|w| w == b"1 0 obj").unwrap();
    let obj2 = buf.windows(7).position(|w| w == b"2 0 obj").unwrap();
    let xref_offset = buf.len();

    // entries for object numbers 0..3: free, obj1, obj2, xref-stream itself.
    let mut content = Vec::new();
    content.extend_from_slice(&[0, 0, 0, 0]);
    content.push(1);
    content.extend_from_slice(&be16(obj1));
    content.push(0);
    content.push(1);
    content.extend_from_slice(&be16(obj2));
    content.push(0);
    content.push(1);
    content.extend_from_slice(&be16(xref_offset));
    content.push(0);

    buf.extend_from_slice(b"3 0 obj\n");
    buf.extend_from_slice(format!("<< /Type /XRef /Size 4 /W [1 2 1] /Root 1 0 R /Length {} >>\n", content.len()).as_bytes());
    buf.extend_from_slice(b"stream\n");
    buf.extend_from_slice(&content);
    buf.extend_from_slice(b"\nendstream\nendobj\n");
    buf.extend_from_slice(format!("startxref\n{xref_offset}\n%%EOF").as_bytes());
    buf
}

#[test]
fn document_reports_xref_stream_kind() {
    let buf = xref_stream_pdf();
    let doc = open(&buf, ParserConfig::new(Mode::lenient()), Box::new(IdentitySecurityHandler), Box::new(InMemoryScratch)).unwrap();
    assert!(doc.is_xref_stream);
    assert_eq!(doc.version, 1.5);
}

#[test]
fn resolves_catalog_and_pages_through_the_stream_table() {
    let buf = xref_stream_pdf();
    let mut doc = open(&buf, ParserConfig::new(Mode::lenient()), Box::new(IdentitySecurityHandler), Box::new(InMemoryScratch)).unwrap();
    let root_key = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    let root = doc.resolve(root_key).unwrap();
    let root_dict = root.as_dict().unwrap();
    assert_eq!(root_dict.get(b"Type").unwrap().as_name().unwrap(), b"Catalog");

    let pages_key = root_dict.get(b"Pages").unwrap().as_reference().unwrap();
    let pages = doc.resolve(pages_key).unwrap();
    assert_eq!(pages.as_dict().unwrap().get(b"Type").unwrap().as_name().unwrap(), b"Pages");
}
