//! E3 — hybrid-reference file: a classic `xref` table is the section
//! `startxref` names directly, but its trailer carries `/XRefStm` pointing at
//! an xref-stream section that supplies an object the classic table never
//! mentions. The classic (newer) section still wins on overlapping keys.

use pdf_xref_core::{open, IdentitySecurityHandler, InMemoryScratch, Mode, ParserConfig};

fn be16(x: usize) -> [u8; 2] {
    [(x >> 8) as u8, x as u8]
}

fn hybrid_pdf() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"%PDF-1.5\n");
    buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
    buf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n");
    let obj1 = buf.windows(7).position(|w| w == b"1 0 obj").unwrap();
    let obj2 = buf.windows(7).position(|w| w == b"2 0 obj").unwrap();

    // xref-stream object 3 0: covers object 2 (also in the classic table,
    // but with a deliberately wrong offset to prove the classic table wins)
    // and is the only section that names object 2 at all in this layout.
    let xrefstm_offset = buf.len();
    let mut content = Vec::new();
    content.extend_from_slice(&[0, 0, 0, 0]); // object 0: free
    content.push(1);
    content.extend_from_slice(&be16(0xFFF)); // object 1: deliberately wrong offset
    content.push(0);
    content.push(1);
    content.extend_from_slice(&be16(obj2)); // object 2: correct offset
    content.push(0);
    buf.extend_from_slice(b"3 0 obj\n");
    buf.extend_from_slice(format!("<< /Type /XRef /Size 3 /W [1 2 1] /Length {} >>\n", content.len()).as_bytes());
    buf.extend_from_slice(b"stream\n");
    buf.extend_from_slice(&content);
    buf.extend_from_slice(b"\nendstream\nendobj\n");

    // classic table, the section startxref names: only object 1, correctly.
    let classic_offset = buf.len();
    buf.extend_from_slice(b"xref\n0 2\n");
    buf.extend_from_slice(b"0000000000 65535 f\r\n");
    buf.extend_from_slice(format!("{obj1:010} 00000 n\r\n").as_bytes());
    buf.extend_from_slice(format!("trailer\n<< /Size 3 /Root 1 0 R /XRefStm {xrefstm_offset} >>\n").as_bytes());
    buf.extend_from_slice(format!("startxref\n{classic_offset}\n%%EOF").as_bytes());
    buf
}

#[test]
fn classic_section_wins_and_hybrid_section_fills_the_gap() {
    let buf = hybrid_pdf();
    let mut doc = open(&buf, ParserConfig::new(Mode::lenient()), Box::new(IdentitySecurityHandler), Box::new(InMemoryScratch)).unwrap();
    assert!(!doc.is_xref_stream, "startxref names the classic table, not the stream");

    // Object 1 resolves via the classic table's correct offset, not the
    // xref stream's deliberately wrong one.
    let root_key = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    let root = doc.resolve(root_key).unwrap();
    assert_eq!(root.as_dict().unwrap().get(b"Type").unwrap().as_name().unwrap(), b"Catalog");

    // Object 2 is only named by the hybrid xref stream section.
    let pages_key = root.as_dict().unwrap().get(b"Pages").unwrap().as_reference().unwrap();
    let pages = doc.resolve(pages_key).unwrap();
    assert_eq!(pages.as_dict().unwrap().get(b"Type").unwrap().as_name().unwrap(), b"Pages");
}
