//! Document statistics.
//!
//! A [`Metrics`] record is filled in during the parse and frozen with
//! the document. Three serializations are supported: pretty JSON
//! (serde), a fixed-column CSV row, and a human-readable layout via
//! `Display`. [`MetricsCollection`] aggregates records across documents
//! for batch runs.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Statistics for one parsed document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Metrics {
    /// Logical name (file path or caller-supplied label)
    pub name: String,
    /// Input size in bytes
    pub file_size: u64,
    /// Wall-clock time for the whole parse
    pub parse_time_ms: f64,
    /// Wall-clock time for the text-extraction stages
    pub text_extraction_time_ms: f64,
    /// PDF version from the header, e.g. "1.4"
    pub version: String,
    /// Objects materialized into the table
    pub object_count: usize,
    /// Pages reachable from the catalog
    pub page_count: usize,
    /// Fonts in the document font table (including /DefaultFont)
    pub font_count: usize,
    /// Objects carrying a stream payload
    pub stream_object_count: usize,
    /// /XObject streams with /Subtype /Image
    pub image_count: usize,
    /// Characters of extracted text across all pages
    pub character_count: usize,
    /// Chunks produced from the document text
    pub text_chunk_count: usize,
    /// Entries in the cross-reference table
    pub xref_entry_count: usize,
    /// Streams declaring /FlateDecode (or the /FlatDecode alias)
    pub flate_streams: usize,
    /// Streams declaring /ASCII85Decode
    pub ascii85_streams: usize,
    /// Streams declaring /LZWDecode
    pub lzw_streams: usize,
    /// Streams declaring /RunLengthDecode
    pub run_length_streams: usize,
    /// Streams declaring /DCTDecode
    pub dct_streams: usize,
    /// Streams declaring /JPXDecode
    pub jpx_streams: usize,
    /// Streams declaring /CCITTFaxDecode
    pub ccitt_fax_streams: usize,
    /// Streams declaring /JBIG2Decode
    pub jbig2_streams: usize,
    /// Count per /Type value seen in object dictionaries
    pub object_type_counts: BTreeMap<String, usize>,
}

/// Fixed CSV column order shared by the header and every row.
pub const CSV_HEADER: &str = "Name,FileSize,ParseTimeMs,Version,ObjectCount,PageCount,FontCount,\
StreamObjectCount,CharacterCount,TextChunkCount,ImageCount,FlateStreams,ASCII85Streams,\
LZWStreams,RunLengthStreams,DCTStreams,JPXStreams,CCITTFaxStreams,JBIG2Streams";

impl Metrics {
    /// Create an empty record for a named input.
    pub fn new(name: impl Into<String>, file_size: u64) -> Self {
        Self {
            name: name.into(),
            file_size,
            ..Default::default()
        }
    }

    /// Bump the counter for one declared filter name.
    pub fn record_filter(&mut self, filter: &str) {
        match filter {
            "FlateDecode" | "FlatDecode" => self.flate_streams += 1,
            "ASCII85Decode" => self.ascii85_streams += 1,
            "LZWDecode" => self.lzw_streams += 1,
            "RunLengthDecode" => self.run_length_streams += 1,
            "DCTDecode" => self.dct_streams += 1,
            "JPXDecode" => self.jpx_streams += 1,
            "CCITTFaxDecode" => self.ccitt_fax_streams += 1,
            "JBIG2Decode" => self.jbig2_streams += 1,
            _ => {},
        }
    }

    /// Total filter declarations counted.
    pub fn total_filter_count(&self) -> usize {
        self.flate_streams
            + self.ascii85_streams
            + self.lzw_streams
            + self.run_length_streams
            + self.dct_streams
            + self.jpx_streams
            + self.ccitt_fax_streams
            + self.jbig2_streams
    }

    /// Objects per page; zero when there are no pages.
    pub fn object_density(&self) -> f64 {
        if self.page_count == 0 {
            0.0
        } else {
            self.object_count as f64 / self.page_count as f64
        }
    }

    /// Extracted characters per page; zero when there are no pages.
    pub fn text_density(&self) -> f64 {
        if self.page_count == 0 {
            0.0
        } else {
            self.character_count as f64 / self.page_count as f64
        }
    }

    /// One-line summary for progress output.
    pub fn compact_summary(&self) -> String {
        format!(
            "{}: {} pages, {} objects, {} chars, {:.1} ms",
            self.name, self.page_count, self.object_count, self.character_count, self.parse_time_ms
        )
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            log::error!("metrics JSON serialization failed: {}", e);
            String::from("{}")
        })
    }

    /// One CSV row matching [`CSV_HEADER`].
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{:.3},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            escape_csv(&self.name),
            self.file_size,
            self.parse_time_ms,
            escape_csv(&self.version),
            self.object_count,
            self.page_count,
            self.font_count,
            self.stream_object_count,
            self.character_count,
            self.text_chunk_count,
            self.image_count,
            self.flate_streams,
            self.ascii85_streams,
            self.lzw_streams,
            self.run_length_streams,
            self.dct_streams,
            self.jpx_streams,
            self.ccitt_fax_streams,
            self.jbig2_streams
        )
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PDF analysis for: {}", self.name)?;
        writeln!(f, "File size: {} bytes", self.file_size)?;
        writeln!(f, "Parse time: {:.3} ms", self.parse_time_ms)?;
        writeln!(f, "PDF version: {}", self.version)?;
        writeln!(f)?;
        writeln!(f, "Document structure:")?;
        writeln!(f, "- Objects: {}", self.object_count)?;
        writeln!(f, "- Stream objects: {}", self.stream_object_count)?;
        writeln!(f, "- Pages: {}", self.page_count)?;
        writeln!(f, "- Fonts: {}", self.font_count)?;
        writeln!(f, "- Images: {}", self.image_count)?;
        writeln!(f, "- XRef entries: {}", self.xref_entry_count)?;
        writeln!(f)?;
        writeln!(f, "Text statistics:")?;
        writeln!(f, "- Extraction time: {:.3} ms", self.text_extraction_time_ms)?;
        writeln!(f, "- Characters: {}", self.character_count)?;
        writeln!(f, "- Chunks: {}", self.text_chunk_count)?;
        writeln!(f)?;
        writeln!(f, "Stream filters:")?;
        writeln!(f, "- FlateDecode: {}", self.flate_streams)?;
        writeln!(f, "- ASCII85Decode: {}", self.ascii85_streams)?;
        writeln!(f, "- LZWDecode: {}", self.lzw_streams)?;
        writeln!(f, "- RunLengthDecode: {}", self.run_length_streams)?;
        writeln!(f, "- DCTDecode: {}", self.dct_streams)?;
        writeln!(f, "- JPXDecode: {}", self.jpx_streams)?;
        writeln!(f, "- CCITTFaxDecode: {}", self.ccitt_fax_streams)?;
        writeln!(f, "- JBIG2Decode: {}", self.jbig2_streams)?;
        writeln!(f)?;
        writeln!(f, "Object types:")?;
        for (type_name, count) in &self.object_type_counts {
            writeln!(f, "- {}: {}", type_name, count)?;
        }
        Ok(())
    }
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// An ordered set of metrics from a batch run.
#[derive(Debug, Default)]
pub struct MetricsCollection {
    records: Vec<Metrics>,
}

impl MetricsCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one document's record.
    pub fn add(&mut self, metrics: Metrics) {
        self.records.push(metrics);
    }

    /// The collected records in insertion order.
    pub fn records(&self) -> &[Metrics] {
        &self.records
    }

    /// Number of collected records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// CSV export: header row plus one row per record.
    pub fn export_csv(&self) -> String {
        let mut out = String::from(CSV_HEADER);
        out.push('\n');
        for record in &self.records {
            out.push_str(&record.to_csv_row());
            out.push('\n');
        }
        out
    }

    /// Mean of every numeric field across the collection.
    pub fn averages(&self) -> Metrics {
        let mut avg = Metrics::new("average", 0);
        if self.records.is_empty() {
            return avg;
        }

        for m in &self.records {
            avg.file_size += m.file_size;
            avg.parse_time_ms += m.parse_time_ms;
            avg.text_extraction_time_ms += m.text_extraction_time_ms;
            avg.object_count += m.object_count;
            avg.page_count += m.page_count;
            avg.font_count += m.font_count;
            avg.stream_object_count += m.stream_object_count;
            avg.image_count += m.image_count;
            avg.character_count += m.character_count;
            avg.text_chunk_count += m.text_chunk_count;
            avg.xref_entry_count += m.xref_entry_count;
            avg.flate_streams += m.flate_streams;
            avg.ascii85_streams += m.ascii85_streams;
            avg.lzw_streams += m.lzw_streams;
            avg.run_length_streams += m.run_length_streams;
            avg.dct_streams += m.dct_streams;
            avg.jpx_streams += m.jpx_streams;
            avg.ccitt_fax_streams += m.ccitt_fax_streams;
            avg.jbig2_streams += m.jbig2_streams;
        }

        let n = self.records.len();
        avg.file_size /= n as u64;
        avg.parse_time_ms /= n as f64;
        avg.text_extraction_time_ms /= n as f64;
        avg.object_count /= n;
        avg.page_count /= n;
        avg.font_count /= n;
        avg.stream_object_count /= n;
        avg.image_count /= n;
        avg.character_count /= n;
        avg.text_chunk_count /= n;
        avg.xref_entry_count /= n;
        avg.flate_streams /= n;
        avg.ascii85_streams /= n;
        avg.lzw_streams /= n;
        avg.run_length_streams /= n;
        avg.dct_streams /= n;
        avg.jpx_streams /= n;
        avg.ccitt_fax_streams /= n;
        avg.jbig2_streams /= n;
        avg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_filter_counts() {
        let mut m = Metrics::new("a.pdf", 10);
        m.record_filter("FlateDecode");
        m.record_filter("FlatDecode");
        m.record_filter("DCTDecode");
        m.record_filter("NotAFilter");
        assert_eq!(m.flate_streams, 2);
        assert_eq!(m.dct_streams, 1);
        assert_eq!(m.total_filter_count(), 3);
    }

    #[test]
    fn test_csv_row_matches_header_arity() {
        let m = Metrics::new("a.pdf", 10);
        let header_cols = CSV_HEADER.split(',').count();
        let row_cols = m.to_csv_row().split(',').count();
        assert_eq!(header_cols, row_cols);
    }

    #[test]
    fn test_csv_escaping() {
        let mut m = Metrics::new("weird,name\".pdf", 1);
        m.version = "1.4".to_string();
        let row = m.to_csv_row();
        assert!(row.starts_with("\"weird,name\"\".pdf\","));
    }

    #[test]
    fn test_json_round_trip_shape() {
        let mut m = Metrics::new("a.pdf", 10);
        m.object_type_counts.insert("Page".to_string(), 3);
        let json = m.to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "a.pdf");
        assert_eq!(value["object_type_counts"]["Page"], 3);
    }

    #[test]
    fn test_densities() {
        let mut m = Metrics::new("a.pdf", 10);
        assert_eq!(m.object_density(), 0.0);
        m.page_count = 2;
        m.object_count = 10;
        m.character_count = 500;
        assert_eq!(m.object_density(), 5.0);
        assert_eq!(m.text_density(), 250.0);
    }

    #[test]
    fn test_collection_csv_and_averages() {
        let mut collection = MetricsCollection::new();
        let mut a = Metrics::new("a.pdf", 100);
        a.page_count = 2;
        let mut b = Metrics::new("b.pdf", 300);
        b.page_count = 4;
        collection.add(a);
        collection.add(b);

        let csv = collection.export_csv();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.starts_with("Name,"));

        let avg = collection.averages();
        assert_eq!(avg.file_size, 200);
        assert_eq!(avg.page_count, 3);
    }

    #[test]
    fn test_display_layout() {
        let mut m = Metrics::new("a.pdf", 10);
        m.version = "1.4".to_string();
        m.object_type_counts.insert("Catalog".to_string(), 1);
        let text = format!("{}", m);
        assert!(text.contains("PDF analysis for: a.pdf"));
        assert!(text.contains("Document structure:"));
        assert!(text.contains("- Catalog: 1"));
    }
}
