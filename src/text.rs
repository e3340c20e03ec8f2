//! Text extraction: the BT..ET interpreter, reading-order assembly,
//! and chunking.
//!
//! The interpreter tracks the text matrix `Tm` and text-line matrix
//! `Tlm` through the operator subset of the page-description language
//! and emits one positioned [`TextRun`] per showing operator. Glyph
//! widths are approximated at 0.6 em, which is good enough to decide
//! word gaps and reading order without font metrics.
//!
//! Reading order buckets runs into rows by `floor(y / line_height)`,
//! sorts rows top-to-bottom (PDF y grows upward) and runs left-to-right
//! within a row.

use crate::content::{Operator, TextItem, parse_content_stream};
use crate::fonts::{DEFAULT_FONT, Font};
use std::collections::HashMap;

/// Maximum chunk size in bytes.
pub const CHUNK_SIZE: usize = 1000;

/// Approximate glyph advance as a fraction of the font size.
const GLYPH_WIDTH_EM: f64 = 0.6;

/// Row height as a multiple of the average font size.
const LINE_HEIGHT_FACTOR: f64 = 1.5;

/// Fallback line height when a page has no runs to average over.
const DEFAULT_LINE_HEIGHT: f64 = 14.0;

/// A positioned piece of shown text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// X position at the start of the showing operator
    pub x: f64,
    /// Y position at the start of the showing operator
    pub y: f64,
    /// Font size from the last Tf
    pub font_size: f64,
    /// Font resource name from the last Tf
    pub font_name: String,
    /// Decoded text
    pub text: String,
}

impl TextRun {
    /// Estimated x position of the run's right edge.
    fn end_x(&self) -> f64 {
        self.x + self.text.chars().count() as f64 * self.font_size * GLYPH_WIDTH_EM
    }
}

/// Text state carried through a page's content stream.
struct TextState {
    tm: [f64; 6],
    tlm: [f64; 6],
    font_name: String,
    font_size: f64,
    leading: f64,
}

const IDENTITY: [f64; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

impl TextState {
    fn new() -> Self {
        Self {
            tm: IDENTITY,
            tlm: IDENTITY,
            font_name: String::new(),
            font_size: 0.0,
            leading: 0.0,
        }
    }

    fn begin_text(&mut self) {
        self.tm = IDENTITY;
        self.tlm = IDENTITY;
    }

    fn translate_line(&mut self, tx: f64, ty: f64) {
        self.tlm[4] += tx;
        self.tlm[5] += ty;
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.tlm[5] -= self.leading;
        self.tm = self.tlm;
    }
}

/// Interpret a page's content stream and emit text runs in stream order.
pub fn extract_runs(contents: &[u8], fonts: &HashMap<String, Font>) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut state = TextState::new();

    for op in parse_content_stream(contents) {
        match op {
            Operator::BeginText => state.begin_text(),
            Operator::EndText => {},
            Operator::SetFont { name, size } => {
                state.font_name = name;
                state.font_size = size;
            },
            Operator::SetTextMatrix(m) => {
                state.tm = m;
                state.tlm = m;
            },
            Operator::MoveText { tx, ty } => state.translate_line(tx, ty),
            Operator::MoveTextSetLeading { tx, ty } => {
                state.leading = -ty;
                state.translate_line(tx, ty);
            },
            Operator::SetLeading(l) => state.leading = l,
            Operator::NextLine => state.next_line(),
            Operator::ShowText(bytes) => show(&bytes, &mut state, fonts, &mut runs),
            Operator::ShowTextAdjusted(items) => {
                for item in items {
                    match item {
                        TextItem::Text(bytes) => show(&bytes, &mut state, fonts, &mut runs),
                        TextItem::Offset(adj) => {
                            // Thousandths of an em; positive moves left.
                            state.tm[4] -= adj / 1000.0 * state.font_size;
                        },
                    }
                }
            },
            Operator::NextLineShowText(bytes) => {
                state.next_line();
                show(&bytes, &mut state, fonts, &mut runs);
            },
            Operator::SetSpacingShowText { text, .. } => {
                // Word/char spacing operands are beyond this level of
                // precision; behave as '.
                state.next_line();
                show(&text, &mut state, fonts, &mut runs);
            },
            Operator::Other(_) => {},
        }
    }

    runs
}

fn show(
    bytes: &[u8],
    state: &mut TextState,
    fonts: &HashMap<String, Font>,
    runs: &mut Vec<TextRun>,
) {
    let font = fonts
        .get(&state.font_name)
        .or_else(|| fonts.get(DEFAULT_FONT));
    let Some(font) = font else {
        return;
    };

    let text = decode_string(bytes, font);
    if text.is_empty() {
        return;
    }

    let advance = text.chars().count() as f64 * state.font_size * GLYPH_WIDTH_EM;
    runs.push(TextRun {
        x: state.tm[4],
        y: state.tm[5],
        font_size: state.font_size,
        font_name: state.font_name.clone(),
        text,
    });
    state.tm[4] += advance;
}

/// Decode a show-operator string through the font's code map.
///
/// Identity-encoded (CID) fonts carry big-endian two-byte codes; all
/// other encodings are one byte per code. NULs from unmapped codes are
/// dropped rather than embedded in the output.
fn decode_string(bytes: &[u8], font: &Font) -> String {
    let mut out = String::new();

    if font.encoding.starts_with("Identity") {
        let mut i = 0;
        while i + 1 < bytes.len() {
            let code = u32::from(bytes[i]) << 8 | u32::from(bytes[i + 1]);
            push_decoded(&mut out, font, code);
            i += 2;
        }
        if i < bytes.len() {
            push_decoded(&mut out, font, u32::from(bytes[i]));
        }
    } else {
        for &byte in bytes {
            push_decoded(&mut out, font, u32::from(byte));
        }
    }

    out
}

fn push_decoded(out: &mut String, font: &Font, code: u32) {
    if let Some(ch) = font.decode_code(code) {
        if ch != '\0' {
            out.push(ch);
        }
    }
}

/// Assemble runs into reading-order text for one page.
///
/// Rows are emitted top-to-bottom, runs left-to-right, with a space
/// inserted when the x-gap between adjacent runs exceeds twice the font
/// size and a newline between rows.
pub fn assemble_reading_order(runs: &[TextRun]) -> String {
    if runs.is_empty() {
        return String::new();
    }

    let avg_font_size = runs.iter().map(|r| r.font_size).sum::<f64>() / runs.len() as f64;
    let line_height = if avg_font_size > 0.0 {
        avg_font_size * LINE_HEIGHT_FACTOR
    } else {
        DEFAULT_LINE_HEIGHT
    };

    let mut rows: HashMap<i64, Vec<&TextRun>> = HashMap::new();
    for run in runs {
        rows.entry((run.y / line_height).floor() as i64)
            .or_default()
            .push(run);
    }

    let mut row_keys: Vec<i64> = rows.keys().copied().collect();
    // Larger y is higher on the page, so larger keys come first.
    row_keys.sort_unstable_by(|a, b| b.cmp(a));

    let mut out = String::new();
    for (i, key) in row_keys.iter().enumerate() {
        let row = rows.get_mut(key).unwrap();
        row.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

        if i > 0 {
            out.push('\n');
        }
        let mut prev: Option<&TextRun> = None;
        for &run in row.iter() {
            if let Some(prev) = prev {
                let gap = run.x - prev.end_x();
                if gap > run.font_size * 2.0 {
                    out.push(' ');
                }
            }
            out.push_str(&run.text);
            prev = Some(run);
        }
    }

    out
}

/// Split document text into prefix-greedy chunks broken on newline
/// boundaries. A single line longer than `max` becomes its own
/// oversized chunk; there is no mid-line split.
pub fn chunk_text(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.split('\n') {
        if !current.is_empty() && current.len() + line.len() + 1 > max {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
