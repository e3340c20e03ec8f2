//! Cross-reference recovery for damaged PDFs.
//!
//! When the classic xref table cannot be read, recovery runs in two
//! stages:
//!
//! 1. **Nearby search** — the declared offset is often off by a few
//!    bytes (editors that rewrite headers without fixing `startxref`).
//!    Scan ±1 KiB around it for the `xref` keyword and retry once.
//! 2. **Full rebuild** — scan the whole buffer for `N G obj` headers
//!    and synthesize an in-use entry per hit. Incremental updates mean
//!    the same object number can appear several times; the copy with
//!    the largest offset wins. The trailer is then found by scanning
//!    backward from the end of the file.
//!
//! If the rebuild finds no objects, or no trailer dictionary parses,
//! the whole document parse fails with a structural error.

use crate::error::{Error, Result};
use crate::xref::{XRefEntry, XRefTable, parse_trailer_from};
use crate::object::Object;
use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// `N G obj` headers, anchored loosely; hits are validated below.
    static ref RE_OBJ_HEADER: regex::bytes::Regex =
        regex::bytes::Regex::new(r"(\d+)\s+(\d+)\s+obj").unwrap();
}

/// How far around the declared offset the nearby search looks.
const NEARBY_WINDOW: usize = 1024;

/// Scan ±1 KiB around `declared` for the `xref` keyword.
///
/// Returns the absolute offset of the keyword if found. The caller
/// retries `parse_xref_at` there exactly once.
pub fn find_nearby_xref(data: &[u8], declared: u64) -> Option<u64> {
    let declared = declared as usize;
    let start = declared.saturating_sub(NEARBY_WINDOW);
    let end = declared.saturating_add(NEARBY_WINDOW).min(data.len());
    if start >= end {
        return None;
    }

    let window = &data[start..end];
    window
        .windows(4)
        .position(|w| w == b"xref")
        .map(|i| (start + i) as u64)
}

/// Rebuild the xref table by scanning the whole buffer for object
/// headers, then locate the trailer by scanning backward from EOF.
///
/// # Errors
///
/// `Error::StructuralCorruption` when no object headers are found, or
/// when no trailer dictionary can be parsed anywhere in the file.
pub fn rebuild_xref(data: &[u8]) -> Result<(XRefTable, HashMap<String, Object>)> {
    log::info!("rebuilding xref table by scanning {} bytes", data.len());

    let mut table = XRefTable::new();
    let mut hits = 0usize;

    for capture in RE_OBJ_HEADER.captures_iter(data) {
        let full = capture.get(0).unwrap();

        // A header must sit at a token boundary: reject matches whose
        // digits continue to the left (e.g. the "1 0 obj" inside
        // "11 0 obj") and matches not followed by object syntax.
        let start = full.start();
        if start > 0 && data[start - 1].is_ascii_digit() {
            continue;
        }
        if !looks_like_object_body(&data[full.end()..]) {
            log::debug!("skipping false object header at offset {}", start);
            continue;
        }

        let obj_num: u32 = match parse_capture(&capture, 1) {
            Some(n) => n,
            None => continue,
        };
        let gen_num: u16 = match parse_capture(&capture, 2) {
            Some(n) => n,
            None => continue,
        };

        table.insert_latest(obj_num, XRefEntry::in_use(start as u64, gen_num));
        hits += 1;
    }

    log::info!("rebuild scan found {} object headers ({} distinct)", hits, table.len());

    if table.is_empty() {
        return Err(Error::StructuralCorruption(
            "rebuild found no object headers".into(),
        ));
    }

    let trailer = find_trailer_backward(data)?;
    Ok((table, trailer))
}

fn parse_capture<T: std::str::FromStr>(capture: &regex::bytes::Captures<'_>, i: usize) -> Option<T> {
    std::str::from_utf8(capture.get(i)?.as_bytes())
        .ok()?
        .parse()
        .ok()
}

/// Whether the bytes after `obj` begin a plausible PDF value.
fn looks_like_object_body(rest: &[u8]) -> bool {
    let mut i = 0;
    while i < rest.len() && rest[i].is_ascii_whitespace() {
        i += 1;
    }
    match rest.get(i) {
        None => false,
        Some(&b) => {
            matches!(b, b'<' | b'[' | b'(' | b'/' | b't' | b'f' | b'n' | b'-' | b'+')
                || b.is_ascii_digit()
        },
    }
}

/// Scan backward from end of file for the last `trailer` keyword whose
/// following dictionary parses.
fn find_trailer_backward(data: &[u8]) -> Result<HashMap<String, Object>> {
    let keyword = b"trailer";
    if data.len() < keyword.len() {
        return Err(Error::StructuralCorruption("file too small for a trailer".into()));
    }

    let mut pos = data.len() - keyword.len();
    loop {
        if &data[pos..pos + keyword.len()] == keyword {
            match parse_trailer_from(&data[pos..]) {
                Ok(dict) => {
                    log::debug!("recovered trailer at offset {}", pos);
                    return Ok(dict);
                },
                Err(e) => {
                    log::debug!("trailer candidate at offset {} rejected: {}", pos, e);
                },
            }
        }
        if pos == 0 {
            break;
        }
        pos -= 1;
    }

    Err(Error::StructuralCorruption(
        "no parseable trailer dictionary found during recovery".into(),
    ))
}
