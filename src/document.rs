//! PDF document model and the batch parse pipeline.
//!
//! A parse is single-shot: header, xref (with recovery), object table,
//! stream decoding, page tree, fonts, text, chunks, metrics — then the
//! document is frozen. Everything the accessors return is owned by the
//! document; no stage runs lazily after construction.
//!
//! Failure policy follows the layering: a bad header or an
//! unrecoverable xref/trailer kills the parse, everything below that
//! logs a warning and leaves a gap (missing object, raw stream, empty
//! page text) instead of failing.

use crate::error::{Error, Result};
use crate::fonts::{self, Font};
use crate::lexer::{Token, token};
use crate::metrics::Metrics;
use crate::object::{Object, ObjectRef, extract_filter_names, resolve};
use crate::page::{self, Page};
use crate::parser::parse_object;
use crate::text;
use crate::xref::{self, XRefTable};
use crate::xref_reconstruction;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

/// A parsed, frozen PDF document.
pub struct PdfDocument {
    name: String,
    version: String,
    xref: XRefTable,
    trailer: HashMap<String, Object>,
    objects: HashMap<u32, Object>,
    pages: Vec<Page>,
    fonts: HashMap<String, Font>,
    full_text: String,
    text_chunks: Vec<String>,
    metrics: Metrics,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("objects", &self.objects.len())
            .field("pages", &self.pages.len())
            .field("fonts", &self.fonts.len())
            .finish_non_exhaustive()
    }
}

/// Parse a PDF from a file on disk.
pub fn parse_from_path(path: impl AsRef<Path>) -> Result<PdfDocument> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    PdfDocument::parse(data, path.display().to_string())
}

/// Parse a PDF from an in-memory buffer under a logical name.
pub fn parse_from_bytes(data: Vec<u8>, logical_name: &str) -> Result<PdfDocument> {
    PdfDocument::parse(data, logical_name.to_string())
}

/// Basic information about a PDF, gathered cheaply from the header plus
/// an opportunistic full parse for the page count.
#[derive(Debug, Clone)]
pub struct QuickInfo {
    /// File path
    pub name: String,
    /// Size in bytes
    pub file_size: u64,
    /// Page count; `None` when the full parse failed
    pub page_count: Option<usize>,
    /// Version from the header
    pub version: String,
    /// Time spent gathering this record
    pub parse_time_ms: f64,
}

/// Gather [`QuickInfo`] for a file.
///
/// The header check is fatal; a failed full parse only costs the page
/// count.
pub fn quick_info(path: impl AsRef<Path>) -> Result<QuickInfo> {
    let path = path.as_ref();
    let start = Instant::now();
    let data = std::fs::read(path)?;
    let version = parse_header(&data)?;

    let page_count = match PdfDocument::parse(data.clone(), path.display().to_string()) {
        Ok(doc) => Some(doc.page_count()),
        Err(e) => {
            log::warn!("quick_info: full parse of {} failed: {}", path.display(), e);
            None
        },
    };

    Ok(QuickInfo {
        name: path.display().to_string(),
        file_size: data.len() as u64,
        page_count,
        version,
        parse_time_ms: start.elapsed().as_secs_f64() * 1000.0,
    })
}

/// Validate the `%PDF-` header and return the version string ("1.4").
fn parse_header(data: &[u8]) -> Result<String> {
    if !data.starts_with(b"%PDF-") {
        let found = data.iter().take(8).map(|&b| b as char).collect::<String>();
        return Err(Error::InvalidHeader(found));
    }
    let version: String = data[5..]
        .iter()
        .take_while(|&&b| b.is_ascii_digit() || b == b'.')
        .map(|&b| b as char)
        .collect();
    if version.is_empty() {
        return Err(Error::InvalidHeader("%PDF- with no version".to_string()));
    }
    Ok(version)
}

impl PdfDocument {
    /// Run the full batch parse over an owned buffer.
    fn parse(data: Vec<u8>, name: String) -> Result<Self> {
        let start = Instant::now();
        let mut metrics = Metrics::new(name.clone(), data.len() as u64);

        let version = parse_header(&data)?;
        metrics.version = version.clone();

        let (xref_table, trailer) = locate_structure(&data)?;

        let mut objects = load_objects(&data, &xref_table);
        resolve_indirect_lengths(&mut objects);
        decode_streams(&mut objects);

        let mut pages = page::collect_pages(&trailer, &objects);
        let fonts = fonts::build_font_table(&pages, &objects);

        let text_start = Instant::now();
        for page in &mut pages {
            page.runs = text::extract_runs(&page.contents, &fonts);
            page.text = text::assemble_reading_order(&page.runs);
        }
        let full_text = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let text_chunks = text::chunk_text(&full_text, text::CHUNK_SIZE);
        metrics.text_extraction_time_ms = text_start.elapsed().as_secs_f64() * 1000.0;

        update_metrics(&mut metrics, &objects, &pages, &fonts, &text_chunks, &xref_table);
        metrics.parse_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        Ok(Self {
            name,
            version,
            xref: xref_table,
            trailer,
            objects,
            pages,
            fonts,
            full_text,
            text_chunks,
            metrics,
        })
    }

    /// Logical name of the input (path or caller-supplied label).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// PDF version from the header, e.g. "1.4".
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of pages reachable from the catalog.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of objects in the table.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of fonts in the font table (including /DefaultFont).
    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// The parsed pages.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Look up an object by number.
    pub fn get_object(&self, num: u32) -> Option<&Object> {
        self.objects.get(&num)
    }

    /// Resolve a reference against the object table.
    ///
    /// # Errors
    ///
    /// `Error::ObjectNotFound` when the reference dangles.
    pub fn resolve_ref(&self, r: ObjectRef) -> Result<&Object> {
        self.objects
            .get(&r.num)
            .ok_or(Error::ObjectNotFound(r.num, r.gen))
    }

    /// Extracted text of a page (1-based).
    ///
    /// # Errors
    ///
    /// `Error::OutOfRange` when the index is not in `1..=page_count`.
    pub fn page_text(&self, page_number: usize) -> Result<&str> {
        self.page(page_number).map(|p| p.text.as_str())
    }

    /// Width and height of a page (1-based), from its MediaBox.
    ///
    /// # Errors
    ///
    /// `Error::OutOfRange` when the index is not in `1..=page_count`.
    pub fn page_dimensions(&self, page_number: usize) -> Result<(f64, f64)> {
        self.page(page_number).map(|p| (p.width(), p.height()))
    }

    fn page(&self, page_number: usize) -> Result<&Page> {
        if page_number == 0 || page_number > self.pages.len() {
            return Err(Error::OutOfRange(page_number));
        }
        Ok(&self.pages[page_number - 1])
    }

    /// The whole document's text: page texts joined with blank lines.
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Document text split into chunks of at most 1000 bytes, broken on
    /// newline boundaries.
    pub fn text_chunks(&self) -> &[String] {
        &self.text_chunks
    }

    /// Document metadata from the trailer's /Info dictionary.
    ///
    /// Standard keys (Title, Author, Subject, Keywords, Creator,
    /// Producer, CreationDate, ModDate) plus whatever else the /Info
    /// dictionary carries. Missing /Info yields an empty map.
    pub fn metadata(&self) -> HashMap<String, String> {
        let mut out = HashMap::new();
        let Some(info) = self.trailer.get("Info") else {
            return out;
        };
        let Some(dict) = resolve(&self.objects, info).as_dict() else {
            log::warn!("/Info does not resolve to a dictionary");
            return out;
        };

        for (key, value) in dict {
            if let Some(text) = metadata_value(resolve(&self.objects, value)) {
                out.insert(key.clone(), text);
            }
        }
        out
    }

    /// All regex matches over the document text.
    ///
    /// # Errors
    ///
    /// `Error::InvalidPattern` when the pattern does not compile.
    pub fn search(&self, pattern: &str) -> Result<Vec<String>> {
        let re = regex::Regex::new(pattern)?;
        Ok(re
            .find_iter(&self.full_text)
            .map(|m| m.as_str().to_string())
            .collect())
    }

    /// The document statistics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// The cross-reference table the parse ended up with.
    pub fn xref(&self) -> &XRefTable {
        &self.xref
    }

    /// The trailer dictionary.
    pub fn trailer(&self) -> &HashMap<String, Object> {
        &self.trailer
    }
}

/// Locate the xref table and trailer, running the recovery ladder when
/// the declared structure is unusable.
fn locate_structure(data: &[u8]) -> Result<(XRefTable, HashMap<String, Object>)> {
    match xref::find_startxref(data) {
        Ok(offset) => match xref::parse_xref_at(data, offset) {
            Ok(result) => Ok(result),
            Err(first_err) => {
                log::warn!("xref at declared offset {} unusable: {}", offset, first_err);

                // Stage 1: the offset is often just slightly wrong.
                if let Some(nearby) = xref_reconstruction::find_nearby_xref(data, offset) {
                    if nearby != offset {
                        log::info!("retrying xref at nearby offset {}", nearby);
                        if let Ok(result) = xref::parse_xref_at(data, nearby) {
                            return Ok(result);
                        }
                    }
                }

                // Stage 2: full rebuild.
                xref_reconstruction::rebuild_xref(data)
            },
        },
        Err(e) => {
            log::warn!("{}; falling back to full rebuild", e);
            xref_reconstruction::rebuild_xref(data)
        },
    }
}

/// Materialize every in-use xref entry into an object.
///
/// Per-object problems (bad offset, header mismatch, unparseable body)
/// are warnings that leave a gap in the table.
fn load_objects(data: &[u8], xref_table: &XRefTable) -> HashMap<u32, Object> {
    let mut objects = HashMap::new();

    for (obj_num, entry) in xref_table.iter() {
        if !entry.in_use || entry.offset == 0 {
            continue;
        }
        match read_object_at(data, entry.offset, obj_num, entry.generation) {
            Ok(obj) => {
                objects.insert(obj_num, obj);
            },
            Err(e) => {
                log::warn!("skipping object {}: {}", obj_num, e);
            },
        }
    }

    log::debug!("loaded {} objects", objects.len());
    objects
}

/// Read one `N G obj ... endobj` record at a byte offset.
fn read_object_at(
    data: &[u8],
    offset: u64,
    expected_num: u32,
    expected_gen: u16,
) -> Result<Object> {
    let slice = data.get(offset as usize..).ok_or_else(|| {
        Error::StructuralCorruption(format!("offset {} beyond end of file", offset))
    })?;

    let header_err =
        |what: &str| Error::StructuralCorruption(format!("bad object header: {}", what));

    let (rest, tok) = token(slice).map_err(|_| header_err("no leading token"))?;
    let Token::Integer(num) = tok else {
        return Err(header_err("object number missing"));
    };
    let (rest, tok) = token(rest).map_err(|_| header_err("no generation token"))?;
    let Token::Integer(gen) = tok else {
        return Err(header_err("generation missing"));
    };
    let (rest, tok) = token(rest).map_err(|_| header_err("no obj keyword"))?;
    if !matches!(tok, Token::ObjStart) {
        return Err(header_err("obj keyword missing"));
    }

    if num != expected_num as i64 || gen != expected_gen as i64 {
        return Err(Error::StructuralCorruption(format!(
            "object header mismatch: expected {} {} obj, found {} {} obj",
            expected_num, expected_gen, num, gen
        )));
    }

    let (_, obj) = parse_object(rest).map_err(|e| {
        Error::StructuralCorruption(format!("object {} body unparseable: {}", expected_num, e))
    })?;
    Ok(obj)
}

/// Second pass over streams whose `/Length` is an indirect reference:
/// now that the table exists the reference can be resolved, and the
/// declared length wins when it is smaller than the scanned interval.
fn resolve_indirect_lengths(objects: &mut HashMap<u32, Object>) {
    let mut truncations: Vec<(u32, usize)> = Vec::new();

    for (&num, obj) in objects.iter() {
        let Object::Stream { dict, data } = obj else {
            continue;
        };
        let Some(length_ref) = dict.get("Length").and_then(|l| l.as_reference()) else {
            continue;
        };
        let Some(declared) = objects
            .get(&length_ref.num)
            .and_then(|o| o.as_integer())
        else {
            log::warn!(
                "stream {} has dangling /Length reference {}; keeping scanned length",
                num,
                length_ref
            );
            continue;
        };
        let declared = declared.max(0) as usize;
        if declared < data.len() {
            truncations.push((num, declared));
        }
    }

    for (num, len) in truncations {
        if let Some(Object::Stream { data, .. }) = objects.get_mut(&num) {
            log::debug!("truncating stream {} to declared length {}", num, len);
            *data = data.slice(..len);
        }
    }
}

/// Decode every filtered stream in place. Failures keep the raw bytes.
fn decode_streams(objects: &mut HashMap<u32, Object>) {
    let keys: Vec<u32> = objects
        .iter()
        .filter(|(_, obj)| {
            matches!(obj, Object::Stream { dict, .. } if dict.contains_key("Filter"))
        })
        .map(|(&num, _)| num)
        .collect();

    for num in keys {
        let decoded = {
            let obj = &objects[&num];
            obj.decode_stream_data()
        };
        match decoded {
            Ok(bytes) => {
                if let Some(Object::Stream { data, .. }) = objects.get_mut(&num) {
                    *data = bytes::Bytes::from(bytes);
                }
            },
            Err(Error::UnsupportedFilter(filter)) => {
                log::warn!("stream {}: filter {} not implemented, keeping raw bytes", num, filter);
            },
            Err(e) => {
                log::warn!("stream {}: decode failed ({}), keeping raw bytes", num, e);
            },
        }
    }
}

/// Fill in the counting side of the metrics record.
fn update_metrics(
    metrics: &mut Metrics,
    objects: &HashMap<u32, Object>,
    pages: &[Page],
    fonts: &HashMap<String, Font>,
    chunks: &[String],
    xref_table: &XRefTable,
) {
    metrics.object_count = objects.len();
    metrics.page_count = pages.len();
    metrics.font_count = fonts.len();
    metrics.text_chunk_count = chunks.len();
    metrics.xref_entry_count = xref_table.len();
    metrics.character_count = pages.iter().map(|p| p.text.chars().count()).sum();

    for obj in objects.values() {
        if let Object::Stream { dict, .. } = obj {
            metrics.stream_object_count += 1;
            if let Some(filter) = dict.get("Filter") {
                for name in extract_filter_names(filter) {
                    metrics.record_filter(&name);
                }
            }
        }

        if let Some(dict) = obj.as_dict() {
            if let Some(type_name) = dict.get("Type").and_then(|t| t.as_name()) {
                *metrics
                    .object_type_counts
                    .entry(type_name.to_string())
                    .or_insert(0) += 1;

                if type_name == "XObject"
                    && dict.get("Subtype").and_then(|s| s.as_name()) == Some("Image")
                {
                    metrics.image_count += 1;
                }
            }
        }
    }
}

/// Render one metadata value as text.
///
/// Strings may be UTF-16BE with a BOM (common for /Title); everything
/// else is treated as Latin-1-ish bytes. Names and numbers are
/// stringified, other kinds are skipped.
fn metadata_value(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes) => Some(decode_text_string(bytes)),
        Object::Name(name) => Some(name.clone()),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(r) => Some(r.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        // UTF-16BE with BOM
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from(pair[0]) << 8 | u16::from(pair[1]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_versions() {
        assert_eq!(parse_header(b"%PDF-1.4\nrest").unwrap(), "1.4");
        assert_eq!(parse_header(b"%PDF-1.7\n").unwrap(), "1.7");
    }

    #[test]
    fn test_parse_header_rejects_non_pdf() {
        assert!(matches!(parse_header(b"GIF89a..."), Err(Error::InvalidHeader(_))));
        assert!(matches!(parse_header(b"%PDF-x"), Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn test_decode_text_string_utf16be() {
        // "Ab" as UTF-16BE with BOM
        let bytes = [0xFE, 0xFF, 0x00, 0x41, 0x00, 0x62];
        assert_eq!(decode_text_string(&bytes), "Ab");
    }

    #[test]
    fn test_decode_text_string_latin1() {
        assert_eq!(decode_text_string(b"caf\xe9"), "caf\u{00E9}");
    }

    #[test]
    fn test_read_object_at_mismatch() {
        let data = b"5 0 obj\n42\nendobj";
        assert!(read_object_at(data, 0, 5, 0).is_ok());
        assert!(read_object_at(data, 0, 6, 0).is_err());
        assert!(read_object_at(data, 0, 5, 1).is_err());
    }

    #[test]
    fn test_read_object_at_bad_offset() {
        assert!(read_object_at(b"short", 999, 1, 0).is_err());
    }

    #[test]
    fn test_resolve_indirect_lengths_truncates() {
        let mut objects = HashMap::new();
        let mut dict = HashMap::new();
        dict.insert(
            "Length".to_string(),
            Object::Reference(ObjectRef::new(2, 0)),
        );
        objects.insert(
            1,
            Object::Stream {
                dict,
                data: bytes::Bytes::from_static(b"ABCDE\n"),
            },
        );
        objects.insert(2, Object::Integer(5));

        resolve_indirect_lengths(&mut objects);
        match &objects[&1] {
            Object::Stream { data, .. } => assert_eq!(&data[..], b"ABCDE"),
            _ => panic!("stream vanished"),
        }
    }
}
