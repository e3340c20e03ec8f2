//! Shared helpers for integration tests: a small PDF builder that
//! assembles syntactically valid files with a correct classic xref
//! table, so tests can exercise the real pipeline end to end.

#![allow(dead_code)]

/// Builds a PDF byte buffer with real xref offsets.
pub struct PdfBuilder {
    version: String,
    objects: Vec<(u32, u16, Vec<u8>)>,
    trailer_extras: Vec<(String, String)>,
    root: Option<u32>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self {
            version: "1.4".to_string(),
            objects: Vec::new(),
            trailer_extras: Vec::new(),
            root: None,
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Add an object body (everything between `N G obj` and `endobj`).
    pub fn object(mut self, num: u32, body: &str) -> Self {
        self.objects.push((num, 0, body.as_bytes().to_vec()));
        self
    }

    /// Add a stream object. `/Length` is computed; `extra_dict` supplies
    /// further entries like `/Filter /FlateDecode`.
    pub fn stream_object(mut self, num: u32, extra_dict: &str, data: &[u8]) -> Self {
        let mut body = Vec::new();
        let dict = if extra_dict.is_empty() {
            format!("<< /Length {} >>", data.len())
        } else {
            format!("<< /Length {} {} >>", data.len(), extra_dict)
        };
        body.extend_from_slice(dict.as_bytes());
        body.extend_from_slice(b"\nstream\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\nendstream");
        self.objects.push((num, 0, body));
        self
    }

    /// Set the trailer's /Root reference.
    pub fn root(mut self, num: u32) -> Self {
        self.root = Some(num);
        self
    }

    /// Add an extra trailer entry, e.g. `("Info", "6 0 R")`.
    pub fn trailer_entry(mut self, key: &str, value: &str) -> Self {
        self.trailer_extras.push((key.to_string(), value.to_string()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(format!("%PDF-{}\n", self.version).as_bytes());

        let mut offsets: Vec<(u32, u16, usize)> = Vec::new();
        for (num, gen, body) in &self.objects {
            offsets.push((*num, *gen, out.len()));
            out.extend_from_slice(format!("{} {} obj\n", num, gen).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let max_num = offsets.iter().map(|(n, _, _)| *n).max().unwrap_or(0);
        let xref_offset = out.len();

        out.extend_from_slice(format!("xref\n0 {}\n", max_num + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for num in 1..=max_num {
            match offsets.iter().find(|(n, _, _)| *n == num) {
                Some((_, gen, offset)) => {
                    out.extend_from_slice(format!("{:010} {:05} n \n", offset, gen).as_bytes());
                },
                None => out.extend_from_slice(b"0000000000 65535 f \n"),
            }
        }

        let mut trailer = format!("trailer\n<< /Size {}", max_num + 1);
        if let Some(root) = self.root {
            trailer.push_str(&format!(" /Root {} 0 R", root));
        }
        for (key, value) in &self.trailer_extras {
            trailer.push_str(&format!(" /{} {}", key, value));
        }
        trailer.push_str(" >>\n");
        out.extend_from_slice(trailer.as_bytes());
        out.extend_from_slice(format!("startxref\n{}\n%%EOF\n", xref_offset).as_bytes());
        out
    }
}

/// The S1 document: catalog, one-page tree, a WinAnsi Type1 font, and
/// a content stream showing "Hello".
pub fn minimal_pdf() -> Vec<u8> {
    PdfBuilder::new()
        .root(1)
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
        .object(
            3,
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>",
        )
        .stream_object(4, "", b"BT /F1 12 Tf 100 700 Td (Hello) Tj ET")
        .object(
            5,
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica \
             /Encoding /WinAnsiEncoding >>",
        )
        .build()
}
