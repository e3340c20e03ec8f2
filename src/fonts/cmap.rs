//! ToUnicode CMap parser.
//!
//! A ToUnicode CMap declares code-to-unicode mappings in two block
//! kinds:
//!
//! ```text
//! beginbfchar
//! <0041> <0041>
//! endbfchar
//! beginbfrange
//! <0020> <007E> <0020>
//! endbfrange
//! ```
//!
//! Blocks are located with regexes over the decoded stream text (the
//! CMap grammar is line-oriented PostScript, which regex handles fine —
//! unlike content streams, there are no nested string operands here).
//! Later entries override earlier ones.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref RE_BFCHAR_BLOCK: regex::Regex =
        regex::Regex::new(r"(?s)beginbfchar(.*?)endbfchar").unwrap();
    static ref RE_BFRANGE_BLOCK: regex::Regex =
        regex::Regex::new(r"(?s)beginbfrange(.*?)endbfrange").unwrap();
    static ref RE_BFCHAR_PAIR: regex::Regex =
        regex::Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>").unwrap();
    static ref RE_BFRANGE_TRIPLE: regex::Regex =
        regex::Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>").unwrap();
}

/// Guard against hostile ranges blowing up the map.
const MAX_RANGE_SPAN: u32 = 65_536;

/// Parse a decoded ToUnicode stream into `map`, overriding any existing
/// entries for the codes it mentions.
///
/// Malformed entries are skipped with a warning; the caller keeps
/// whatever encoding-seeded map it already has (spec: ToUnicode parse
/// failure downgrades to encoding-only).
pub fn parse_tounicode(data: &[u8], map: &mut HashMap<u32, char>) {
    let text = String::from_utf8_lossy(data);

    // Blocks apply in file order so that later entries override earlier
    // ones, whichever kind they are.
    let mut blocks: Vec<(usize, bool, regex::Captures<'_>)> = Vec::new();
    for cap in RE_BFCHAR_BLOCK.captures_iter(&text) {
        let start = cap.get(0).unwrap().start();
        blocks.push((start, false, cap));
    }
    for cap in RE_BFRANGE_BLOCK.captures_iter(&text) {
        let start = cap.get(0).unwrap().start();
        blocks.push((start, true, cap));
    }
    blocks.sort_by_key(|(start, _, _)| *start);

    for (_, is_range, block) in &blocks {
        if *is_range {
            apply_bfrange_block(&block[1], map);
        } else {
            apply_bfchar_block(&block[1], map);
        }
    }
}

fn apply_bfchar_block(body: &str, map: &mut HashMap<u32, char>) {
    for pair in RE_BFCHAR_PAIR.captures_iter(body) {
        let (Some(src), Some(dst)) = (parse_hex_u32(&pair[1]), parse_hex_u32(&pair[2])) else {
            log::warn!("ToUnicode bfchar entry unparseable: {:?}", &pair[0]);
            continue;
        };
        match char::from_u32(dst) {
            Some(ch) => {
                map.insert(src, ch);
            },
            None => {
                log::warn!("ToUnicode bfchar maps 0x{:04X} to invalid scalar 0x{:X}", src, dst)
            },
        }
    }
}

fn apply_bfrange_block(body: &str, map: &mut HashMap<u32, char>) {
    for triple in RE_BFRANGE_TRIPLE.captures_iter(body) {
        let (Some(lo), Some(hi), Some(dst_start)) = (
            parse_hex_u32(&triple[1]),
            parse_hex_u32(&triple[2]),
            parse_hex_u32(&triple[3]),
        ) else {
            log::warn!("ToUnicode bfrange entry unparseable: {:?}", &triple[0]);
            continue;
        };

        if hi < lo || hi - lo > MAX_RANGE_SPAN {
            log::warn!("ToUnicode bfrange 0x{:04X}..0x{:04X} rejected", lo, hi);
            continue;
        }

        for (i, code) in (lo..=hi).enumerate() {
            if let Some(ch) = char::from_u32(dst_start + i as u32) {
                map.insert(code, ch);
            }
        }
    }
}

fn parse_hex_u32(hex: &str) -> Option<u32> {
    u32::from_str_radix(hex, 16).ok()
}
