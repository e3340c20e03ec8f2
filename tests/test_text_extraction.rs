//! Text extraction through real stream encodings: flate with a PNG
//! predictor, ToUnicode CMaps, and multi-stream /Contents arrays.

mod common;

use common::PdfBuilder;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use pdf_sift::parse_from_bytes;
use std::io::Write;

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// PNG Up-filter encode: every row is `2 || (row - previous_row)`.
fn png_up_encode(data: &[u8], columns: usize) -> Vec<u8> {
    assert!(data.len() % columns == 0);
    let mut out = Vec::new();
    for (row_idx, row) in data.chunks(columns).enumerate() {
        out.push(2u8);
        for (i, &byte) in row.iter().enumerate() {
            let up = if row_idx > 0 {
                data[(row_idx - 1) * columns + i]
            } else {
                0
            };
            out.push(byte.wrapping_sub(up));
        }
    }
    out
}

#[test]
fn flate_with_png_predictor_content_stream() {
    // Pad the content to a whole number of 4-byte rows; trailing spaces
    // are harmless between operators.
    let mut content = b"BT /F1 12 Tf 100 700 Td (Hello) Tj ET".to_vec();
    while content.len() % 4 != 0 {
        content.push(b' ');
    }

    let encoded = zlib(&png_up_encode(&content, 4));
    let bytes = PdfBuilder::new()
        .root(1)
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
        .object(
            3,
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R >>",
        )
        .stream_object(
            4,
            "/Filter /FlateDecode /DecodeParms << /Predictor 12 /Columns 4 >>",
            &encoded,
        )
        .build();

    let doc = parse_from_bytes(bytes, "predictor.pdf").unwrap();
    assert_eq!(doc.page_text(1).unwrap(), "Hello");
    assert_eq!(doc.metrics().flate_streams, 1);
}

#[test]
fn plain_flate_content_stream() {
    let encoded = zlib(b"BT /F1 10 Tf 10 10 Td (compressed) Tj ET");
    let bytes = PdfBuilder::new()
        .root(1)
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
        .object(
            3,
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R >>",
        )
        .stream_object(4, "/Filter /FlateDecode", &encoded)
        .build();

    let doc = parse_from_bytes(bytes, "flate.pdf").unwrap();
    assert_eq!(doc.page_text(1).unwrap(), "compressed");
}

#[test]
fn tounicode_cmap_translates_cid_codes() {
    let cmap = b"/CIDInit /ProcSet findresource begin\n\
        begincmap\n\
        beginbfchar\n\
        <0041> <0041>\n\
        <0042> <00E9>\n\
        endbfchar\n\
        endcmap\n\
        end end";

    let bytes = PdfBuilder::new()
        .root(1)
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
        .object(
            3,
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>",
        )
        .stream_object(4, "", b"BT /F1 12 Tf 10 10 Td [ <00410042> ] TJ ET")
        .object(
            5,
            "<< /Type /Font /Subtype /Type0 /BaseFont /Embedded \
             /Encoding /Identity-H /ToUnicode 6 0 R >>",
        )
        .stream_object(6, "", cmap)
        .build();

    let doc = parse_from_bytes(bytes, "tounicode.pdf").unwrap();
    assert_eq!(doc.page_text(1).unwrap(), "A\u{00E9}");
}

#[test]
fn contents_array_concatenates_streams() {
    let bytes = PdfBuilder::new()
        .root(1)
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
        .object(
            3,
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 7 0 R >> >> /Contents [4 0 R 5 0 R] >>",
        )
        .stream_object(4, "", b"BT /F1 10 Tf 0 100 Td (foo) Tj ET")
        .stream_object(5, "", b"BT /F1 10 Tf 50 100 Td (bar) Tj ET")
        .object(
            7,
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica \
             /Encoding /WinAnsiEncoding >>",
        )
        .build();

    let doc = parse_from_bytes(bytes, "array-contents.pdf").unwrap();
    let text = doc.page_text(1).unwrap();
    assert!(text.contains("foo"), "text was {:?}", text);
    assert!(text.contains("bar"), "text was {:?}", text);
    // Same row, left to right.
    assert!(text.find("foo").unwrap() < text.find("bar").unwrap());
}

#[test]
fn rows_are_emitted_top_down() {
    let bytes = PdfBuilder::new()
        .root(1)
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
        .object(
            3,
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R >>",
        )
        // The lower line comes first in the stream; reading order must
        // still put the higher line first.
        .stream_object(
            4,
            "",
            b"BT /F1 10 Tf 0 50 Td (below) Tj 1 0 0 1 0 700 Tm (above) Tj ET",
        )
        .build();

    let doc = parse_from_bytes(bytes, "rows.pdf").unwrap();
    assert_eq!(doc.page_text(1).unwrap(), "above\nbelow");
}

#[test]
fn escaped_parens_in_show_strings() {
    let bytes = PdfBuilder::new()
        .root(1)
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
        .object(
            3,
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R >>",
        )
        .stream_object(4, "", b"BT /F1 10 Tf 10 10 Td (a\\(b\\)c) Tj ET")
        .build();

    let doc = parse_from_bytes(bytes, "escapes.pdf").unwrap();
    assert_eq!(doc.page_text(1).unwrap(), "a(b)c");
}

#[test]
fn unsupported_filter_keeps_page_usable() {
    // A page whose second content stream declares LZW: the raw bytes
    // stay in place (no text from them), the first stream still works.
    let bytes = PdfBuilder::new()
        .root(1)
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
        .object(
            3,
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents [4 0 R 5 0 R] >>",
        )
        .stream_object(4, "", b"BT /F1 10 Tf 10 10 Td (kept) Tj ET")
        .stream_object(5, "/Filter /LZWDecode", b"\x80\x0b\x60\x50")
        .build();

    let doc = parse_from_bytes(bytes, "lzw.pdf").unwrap();
    assert!(doc.page_text(1).unwrap().contains("kept"));
    assert_eq!(doc.metrics().lzw_streams, 1);
}
