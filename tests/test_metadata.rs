//! Metadata, metrics, chunking, search, and the path-based entry
//! points.

mod common;

use common::{PdfBuilder, minimal_pdf};
use pdf_sift::{parse_from_bytes, parse_from_path, quick_info};
use std::io::Write;

fn pdf_with_info() -> Vec<u8> {
    PdfBuilder::new()
        .root(1)
        .trailer_entry("Info", "6 0 R")
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
        .object(
            3,
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R >>",
        )
        .stream_object(4, "", b"BT /F1 12 Tf 100 700 Td (Hello) Tj ET")
        .object(
            6,
            "<< /Title (Demo) /Author (A) /Producer (pdf_sift tests) \
             /CustomTag (extra) >>",
        )
        .build()
}

#[test]
fn info_dictionary_round_trips() {
    let doc = parse_from_bytes(pdf_with_info(), "info.pdf").unwrap();
    let metadata = doc.metadata();
    assert_eq!(metadata["Title"], "Demo");
    assert_eq!(metadata["Author"], "A");
    assert_eq!(metadata["Producer"], "pdf_sift tests");
    // Non-standard keys come along too.
    assert_eq!(metadata["CustomTag"], "extra");
}

#[test]
fn missing_info_yields_empty_metadata() {
    let doc = parse_from_bytes(minimal_pdf(), "minimal.pdf").unwrap();
    assert!(doc.metadata().is_empty());
}

#[test]
fn metrics_count_document_structure() {
    let doc = parse_from_bytes(minimal_pdf(), "minimal.pdf").unwrap();
    let m = doc.metrics();

    assert_eq!(m.version, "1.4");
    assert_eq!(m.object_count, 5);
    assert_eq!(m.page_count, 1);
    assert_eq!(m.font_count, 2);
    assert_eq!(m.stream_object_count, 1);
    assert_eq!(m.character_count, 5); // "Hello"
    assert_eq!(m.text_chunk_count, 1);
    assert_eq!(m.xref_entry_count, 6); // objects 0..=5
    assert_eq!(m.object_type_counts["Catalog"], 1);
    assert_eq!(m.object_type_counts["Pages"], 1);
    assert_eq!(m.object_type_counts["Page"], 1);
    assert_eq!(m.object_type_counts["Font"], 1);
    assert!(m.parse_time_ms >= 0.0);
}

#[test]
fn metrics_serialize_to_json_and_csv() {
    let doc = parse_from_bytes(minimal_pdf(), "minimal.pdf").unwrap();
    let m = doc.metrics();

    let json: serde_json::Value = serde_json::from_str(&m.to_json()).unwrap();
    assert_eq!(json["page_count"], 1);
    assert_eq!(json["version"], "1.4");

    let row = m.to_csv_row();
    assert_eq!(
        row.split(',').count(),
        pdf_sift::metrics::CSV_HEADER.split(',').count()
    );
}

#[test]
fn text_chunks_respect_newline_boundaries() {
    // Forty lines of forty characters: chunks break between lines.
    let mut content = Vec::new();
    content.extend_from_slice(b"BT /F1 10 Tf 0 800 Td 12 TL ");
    for _ in 0..40 {
        content.extend_from_slice(format!("({}) Tj T* ", "x".repeat(40)).as_bytes());
    }
    content.extend_from_slice(b"ET");

    let bytes = PdfBuilder::new()
        .root(1)
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
        .object(
            3,
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R >>",
        )
        .stream_object(4, "", &content)
        .build();

    let doc = parse_from_bytes(bytes, "chunky.pdf").unwrap();
    assert!(doc.text_chunks().len() > 1);
    for chunk in doc.text_chunks() {
        assert!(chunk.len() <= 1000);
        assert!(!chunk.starts_with('\n'));
    }
    let rejoined = doc.text_chunks().join("\n");
    assert_eq!(rejoined, doc.full_text());
}

#[test]
fn search_returns_regex_matches() {
    let doc = parse_from_bytes(minimal_pdf(), "minimal.pdf").unwrap();
    assert_eq!(doc.search("Hel+o").unwrap(), vec!["Hello".to_string()]);
    assert_eq!(doc.search(r"l+").unwrap(), vec!["ll".to_string()]);
    assert!(doc.search("missing").unwrap().is_empty());
}

#[test]
fn search_rejects_bad_patterns() {
    let doc = parse_from_bytes(minimal_pdf(), "minimal.pdf").unwrap();
    assert!(matches!(
        doc.search("(unclosed"),
        Err(pdf_sift::Error::InvalidPattern(_))
    ));
}

#[test]
fn parse_from_path_and_quick_info() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&minimal_pdf()).unwrap();
    file.flush().unwrap();

    let doc = parse_from_path(file.path()).unwrap();
    assert_eq!(doc.page_count(), 1);

    let info = quick_info(file.path()).unwrap();
    assert_eq!(info.version, "1.4");
    assert_eq!(info.page_count, Some(1));
    assert_eq!(info.file_size, minimal_pdf().len() as u64);
}

#[test]
fn quick_info_rejects_non_pdf() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"not a pdf at all").unwrap();
    file.flush().unwrap();
    assert!(quick_info(file.path()).is_err());
}
