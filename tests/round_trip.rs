//! End-to-end tests: build a small `.docx`, list its fields, fill it and
//! read the result back.

use std::collections::HashMap;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use docfill::xml::Document;
use docfill::{ErrorKind, RunId, Session, SessionOptions, Stage};
use zip::write::SimpleFileOptions;

const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// A PNG-ish blob that must survive byte for byte.
const MEDIA: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff, 0x10, 0x7f];

fn run(text: &str, fill: Option<&str>) -> String {
    let props = match fill {
        Some(fill) => format!(r#"<w:rPr><w:shd w:val="clear" w:color="auto" w:fill="{}"/></w:rPr>"#, fill),
        None => "<w:rPr><w:b/></w:rPr>".to_string(),
    };
    format!(r#"<w:p><w:r>{}<w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, props, text)
}

fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
        W, body
    )
}

fn write_docx(path: &Path, body: &str) {
    let mut zip = zip::ZipWriter::new(fs::File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .unwrap();
    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#)
        .unwrap();
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(document_xml(body).as_bytes()).unwrap();
    zip.start_file("word/media/image1.png", options).unwrap();
    zip.write_all(MEDIA).unwrap();
    zip.finish().unwrap();
}

fn read_entries(path: &Path) -> HashMap<String, Vec<u8>> {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut entries = HashMap::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut data = Vec::new();
        file.read_to_end(&mut data).unwrap();
        entries.insert(file.name().to_string(), data);
    }
    entries
}

fn invoice_body() -> String {
    [
        run("Client Name", Some("FFFF00")),
        run("Invoice", None),
        run("Due Date", Some("D9D9D9")),
        run("Client Name", Some("FFFF00")),
        run("Not a field", Some("auto")),
    ]
    .concat()
}

#[test]
fn test_extract_fields() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("invoice.docx");
    write_docx(&input, &invoice_body());

    let fields = docfill::extract_fields(&input).unwrap();
    assert_eq!(fields, ["Client Name", "Due Date"]);
}

#[test]
fn test_fill_replaces_only_highlighted_runs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("invoice.docx");
    let output = dir.path().join("filled.docx");
    write_docx(&input, &invoice_body());

    let mut values = HashMap::new();
    values.insert("Client Name".to_string(), "Acme Corp".to_string());
    values.insert("Due Date".to_string(), "   ".to_string());
    let patched = docfill::fill(&input, &output, &values).unwrap();
    assert_eq!(patched, 2);

    let entries = read_entries(&output);
    let xml = String::from_utf8(entries["word/document.xml"].clone()).unwrap();
    assert!(xml.contains("Acme Corp"));
    assert!(xml.contains("Invoice"));
    assert!(xml.contains("Due Date"));
    assert!(xml.contains("Not a field"));
    assert!(!xml.contains("Client Name"));

    // Replaced runs keep their highlight and so remain fields.
    assert_eq!(docfill::extract_fields(&output).unwrap(), ["Acme Corp", "Due Date"]);
}

#[test]
fn test_other_entries_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("invoice.docx");
    let output = dir.path().join("filled.docx");
    write_docx(&input, &invoice_body());

    docfill::fill(&input, &output, &HashMap::new()).unwrap();

    let before = read_entries(&input);
    let after = read_entries(&output);
    assert_eq!(before.len(), after.len());
    for (name, data) in &before {
        if name != "word/document.xml" {
            assert_eq!(&after[name], data, "{} changed", name);
        }
    }
    assert_eq!(after["word/media/image1.png"], MEDIA);

    // An empty replacement map leaves the main part structurally unchanged.
    let original = Document::parse(&before["word/document.xml"]).unwrap();
    let rewritten = Document::parse(&after["word/document.xml"]).unwrap();
    assert_eq!(original, rewritten);
}

#[test]
fn test_serialize_round_trip() {
    let xml = document_xml(&invoice_body());
    let doc = Document::parse(xml.as_bytes()).unwrap();
    let once = doc.serialize().unwrap();
    let reparsed = Document::parse(&once).unwrap();
    assert_eq!(doc, reparsed);
    assert_eq!(reparsed.serialize().unwrap(), once);
}

#[test]
fn test_fill_by_run_position() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("invoice.docx");
    let output = dir.path().join("filled.docx");
    write_docx(&input, &invoice_body());

    let mut session = Session::open(&input, SessionOptions::default()).unwrap();
    let runs = session.runs();
    assert_eq!(runs.len(), 3);
    assert_eq!(runs[2].text, "Client Name");

    let mut values = HashMap::new();
    values.insert(runs[2].id, "Second Client".to_string());
    assert_eq!(session.apply_runs(&values), 1);
    session.save(&output).unwrap();

    assert_eq!(
        docfill::extract_fields(&output).unwrap(),
        ["Client Name", "Due Date", "Second Client"]
    );
    assert_eq!(runs[0].id, RunId(0));
}

#[test]
fn test_fill_with_source() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("invoice.docx");
    let output = dir.path().join("filled.docx");
    write_docx(&input, &invoice_body());

    let mut values = HashMap::new();
    values.insert("Due Date".to_string(), "2024-12-31".to_string());

    let mut session = Session::open(&input, SessionOptions::default()).unwrap();
    assert_eq!(session.fill_with(&mut values, &output).unwrap(), 1);
    assert_eq!(
        docfill::extract_fields(&output).unwrap(),
        ["Client Name", "2024-12-31"]
    );
}

#[test]
fn test_stored_compact_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("invoice.docx");
    let output = dir.path().join("filled.docx");
    write_docx(&input, &invoice_body());

    let options = SessionOptions::new()
        .with_indent(0)
        .with_compression(docfill::Compression::Stored);
    docfill::fill_with_options(&input, &output, &HashMap::new(), options).unwrap();

    let mut archive = zip::ZipArchive::new(fs::File::open(&output).unwrap()).unwrap();
    let part = archive.by_name("word/document.xml").unwrap();
    assert_eq!(part.compression(), zip::CompressionMethod::Stored);
}

#[test]
fn test_missing_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("invoice.docx");
    write_docx(&input, &invoice_body());

    let output = dir.path().join("no/such/dir/filled.docx");
    let err = docfill::fill(&input, &output, &HashMap::new()).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Repackage));
    assert_eq!(err.kind(), ErrorKind::IoFailure);
    assert!(!output.exists());
}

#[test]
fn test_not_a_container() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plain.docx");
    fs::write(&input, "just text").unwrap();

    let err = docfill::extract_fields(&input).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Expand));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
