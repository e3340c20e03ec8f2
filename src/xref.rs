//! Cross-reference table parser.
//!
//! The xref table maps object numbers to byte offsets, turning the flat
//! input buffer into an addressable object table. Only classic xref
//! tables (PDF 1.0-1.4) are parsed here; a cross-reference stream at the
//! declared offset fails this layer and flows into the recovery path
//! (see `xref_reconstruction`).
//!
//! The whole layer works on the document's byte buffer directly: the
//! parse is a single-shot batch, so there is no seekable reader to
//! thread through.

use crate::error::{Error, Result};
use crate::lexer::{Token, token};
use crate::object::Object;
use crate::parser::parse_object;
use std::collections::HashMap;

/// Cross-reference table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XRefEntry {
    /// Absolute byte offset of the object header
    pub offset: u64,
    /// Generation number
    pub generation: u16,
    /// In-use (`n`) vs free (`f`). Free entries are retained but never
    /// dereferenced.
    pub in_use: bool,
}

impl XRefEntry {
    /// Create an in-use entry.
    pub fn in_use(offset: u64, generation: u16) -> Self {
        Self {
            offset,
            generation,
            in_use: true,
        }
    }

    /// Create a free entry.
    pub fn free(next_free: u64, generation: u16) -> Self {
        Self {
            offset: next_free,
            generation,
            in_use: false,
        }
    }
}

/// Cross-reference table mapping object numbers to entries.
#[derive(Debug, Clone, Default)]
pub struct XRefTable {
    entries: HashMap<u32, XRefEntry>,
}

impl XRefTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any previous one for the object number.
    pub fn insert(&mut self, object_number: u32, entry: XRefEntry) {
        self.entries.insert(object_number, entry);
    }

    /// Insert an entry, keeping whichever has the larger offset.
    ///
    /// The rebuild scan can see the same object number several times
    /// (incremental updates append newer copies later in the file); the
    /// highest-offset copy is the surviving one.
    pub fn insert_latest(&mut self, object_number: u32, entry: XRefEntry) {
        match self.entries.get(&object_number) {
            Some(existing) if existing.offset >= entry.offset => {},
            _ => {
                self.entries.insert(object_number, entry);
            },
        }
    }

    /// Get an entry by object number.
    pub fn get(&self, object_number: u32) -> Option<&XRefEntry> {
        self.entries.get(&object_number)
    }

    /// Check whether an object number is present.
    pub fn contains(&self, object_number: u32) -> bool {
        self.entries.contains_key(&object_number)
    }

    /// Iterate over all (object number, entry) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &XRefEntry)> {
        self.entries.iter().map(|(n, e)| (*n, e))
    }

    /// Object numbers in ascending order.
    pub fn object_numbers(&self) -> Vec<u32> {
        let mut nums: Vec<u32> = self.entries.keys().copied().collect();
        nums.sort_unstable();
        nums
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How far from the end of the file `startxref` is searched for.
const STARTXREF_WINDOW: usize = 1024;

/// Upper bound on a single subsection's entry count, to stop a corrupt
/// header from allocating the world.
const MAX_SUBSECTION_COUNT: u64 = 1_000_000;

/// Find the xref offset declared by the trailing `startxref` line.
///
/// Scans the last KiB of the buffer for the final `startxref` keyword
/// and parses the decimal offset that follows it.
///
/// # Errors
///
/// `Error::StructuralCorruption` when the keyword or its offset is
/// missing. Callers treat this as a signal to rebuild (spec: warn, fall
/// back to linear rebuild).
pub fn find_startxref(data: &[u8]) -> Result<u64> {
    let tail_start = data.len().saturating_sub(STARTXREF_WINDOW);
    let tail = &data[tail_start..];

    let pos = find_last(tail, b"startxref")
        .ok_or_else(|| Error::StructuralCorruption("startxref not found in file tail".into()))?;

    let after = &tail[pos + b"startxref".len()..];
    match token(after) {
        Ok((_, Token::Integer(offset))) if offset >= 0 => Ok(offset as u64),
        _ => Err(Error::StructuralCorruption(
            "startxref is not followed by a decimal offset".into(),
        )),
    }
}

fn find_last(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).rev().find(|&i| &haystack[i..i + needle.len()] == needle)
}

/// Parse the classic xref table at `offset` and the trailer after it.
///
/// The table is the literal keyword `xref`, then one or more
/// `FIRST COUNT` subsection headers each followed by COUNT fixed-width
/// entries (`NNNNNNNNNN GGGGG n|f`), terminated by the `trailer`
/// keyword and a dictionary. A few bytes of leading whitespace before
/// `xref` are tolerated.
///
/// # Errors
///
/// `Error::StructuralCorruption` when the keyword is absent, a
/// subsection header is malformed, or the trailer dictionary cannot be
/// parsed. The caller then enters the recovery ladder.
pub fn parse_xref_at(data: &[u8], offset: u64) -> Result<(XRefTable, HashMap<String, Object>)> {
    let offset = offset as usize;
    if offset >= data.len() {
        return Err(Error::StructuralCorruption(format!(
            "xref offset {} beyond end of file ({})",
            offset,
            data.len()
        )));
    }

    // Tolerate a little leading whitespace before the keyword.
    let mut pos = offset;
    let scan_limit = (offset + 8).min(data.len());
    while pos < scan_limit && data[pos].is_ascii_whitespace() {
        pos += 1;
    }
    if !data[pos..].starts_with(b"xref") {
        return Err(Error::StructuralCorruption(format!(
            "no xref keyword at offset {}",
            offset
        )));
    }
    log::debug!("parsing classic xref table at offset {}", pos);

    let mut lines = LineCursor::new(data, pos);
    lines.next_line(); // consume the "xref" line

    let mut table = XRefTable::new();

    loop {
        let Some(line) = lines.peek_line() else {
            return Err(Error::StructuralCorruption("xref table ran off end of file".into()));
        };
        let trimmed = trim_ascii(line);

        if trimmed.starts_with(b"trailer") {
            break;
        }
        if trimmed.is_empty() || trimmed.starts_with(b"%") {
            lines.next_line();
            continue;
        }

        // Subsection header: FIRST COUNT
        let header = std::str::from_utf8(trimmed).ok().ok_or_else(|| {
            Error::StructuralCorruption("non-ASCII xref subsection header".into())
        })?;
        let mut parts = header.split_ascii_whitespace();
        let (first, count) = match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), None) => {
                let first: u32 = a.parse().map_err(|_| {
                    Error::StructuralCorruption(format!("bad xref subsection start: {:?}", a))
                })?;
                let count: u64 = b.parse().map_err(|_| {
                    Error::StructuralCorruption(format!("bad xref subsection count: {:?}", b))
                })?;
                (first, count)
            },
            _ => {
                return Err(Error::StructuralCorruption(format!(
                    "malformed xref subsection header: {:?}",
                    header
                )));
            },
        };
        if count > MAX_SUBSECTION_COUNT {
            return Err(Error::StructuralCorruption(format!(
                "xref subsection count {} exceeds limit",
                count
            )));
        }
        lines.next_line();
        log::debug!("xref subsection: first={} count={}", first, count);

        let mut i: u32 = 0;
        while (i as u64) < count {
            let Some(line) = lines.peek_line() else {
                return Err(Error::StructuralCorruption(
                    "xref entries ran off end of file".into(),
                ));
            };
            let trimmed = trim_ascii(line);
            if trimmed.is_empty() {
                lines.next_line();
                continue;
            }
            if trimmed.starts_with(b"trailer") {
                log::warn!(
                    "xref subsection declared {} entries but only {} present before trailer",
                    count,
                    i
                );
                break;
            }

            match parse_xref_entry(trimmed) {
                Some(entry) => table.insert(first + i, entry),
                None => {
                    // Keep the numbering aligned: a garbled line still
                    // occupies its slot, as a free placeholder.
                    log::warn!("malformed xref entry for object {}: {:?}", first + i, trimmed);
                    table.insert(first + i, XRefEntry::free(0, 65535));
                },
            }
            lines.next_line();
            i += 1;
        }
    }

    // The trailer dictionary follows the `trailer` keyword.
    let trailer_pos = lines.position();
    let trailer = parse_trailer_from(&data[trailer_pos..])?;

    log::debug!("parsed xref table with {} entries", table.len());
    Ok((table, trailer))
}

/// Parse a trailer dictionary starting at (or shortly before) the
/// `trailer` keyword.
pub fn parse_trailer_from(data: &[u8]) -> Result<HashMap<String, Object>> {
    let pos = find_sub(data, b"trailer")
        .ok_or_else(|| Error::StructuralCorruption("trailer keyword not found".into()))?;
    let after = &data[pos + b"trailer".len()..];

    match parse_object(after) {
        Ok((_, Object::Dictionary(dict))) => Ok(dict),
        Ok((_, other)) => Err(Error::StructuralCorruption(format!(
            "trailer is a {}, not a dictionary",
            other.type_name()
        ))),
        Err(e) => Err(Error::StructuralCorruption(format!(
            "trailer dictionary unparseable: {}",
            e
        ))),
    }
}

fn find_sub(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Parse one `NNNNNNNNNN GGGGG n|f` entry. Lenient about field widths;
/// strict about field count and the use flag.
fn parse_xref_entry(line: &[u8]) -> Option<XRefEntry> {
    let text = std::str::from_utf8(line).ok()?;
    let mut parts = text.split_ascii_whitespace();
    let offset: u64 = parts.next()?.parse().ok()?;
    let generation: u16 = parts.next()?.parse().ok()?;
    let flag = parts.next()?;

    match flag {
        "n" => Some(XRefEntry::in_use(offset, generation)),
        "f" => Some(XRefEntry::free(offset, generation)),
        _ => None,
    }
}

fn trim_ascii(line: &[u8]) -> &[u8] {
    let start = line.iter().position(|b| !b.is_ascii_whitespace());
    let end = line.iter().rposition(|b| !b.is_ascii_whitespace());
    match (start, end) {
        (Some(s), Some(e)) => &line[s..=e],
        _ => &[],
    }
}

/// Line-oriented cursor over a byte buffer, tolerant of CR, LF, and
/// CRLF endings (old Mac-produced PDFs use bare CR).
struct LineCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> LineCursor<'a> {
    fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    fn position(&self) -> usize {
        self.pos
    }

    /// The current line, without consuming it.
    fn peek_line(&self) -> Option<&'a [u8]> {
        if self.pos >= self.data.len() {
            return None;
        }
        let end = self.line_end();
        Some(&self.data[self.pos..end])
    }

    /// Advance past the current line and its terminator.
    fn next_line(&mut self) {
        if self.pos >= self.data.len() {
            return;
        }
        let end = self.line_end();
        self.pos = end;
        if self.pos < self.data.len() {
            if self.data[self.pos] == b'\r' {
                self.pos += 1;
                if self.pos < self.data.len() && self.data[self.pos] == b'\n' {
                    self.pos += 1;
                }
            } else if self.data[self.pos] == b'\n' {
                self.pos += 1;
            }
        }
    }

    fn line_end(&self) -> usize {
        self.data[self.pos..]
            .iter()
            .position(|&b| b == b'\r' || b == b'\n')
            .map(|i| self.pos + i)
            .unwrap_or(self.data.len())
    }
}
