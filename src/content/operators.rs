//! Content-stream operators.
//!
//! Only the text subset is represented structurally; every other
//! operator (graphics state, paths, color, XObjects) is carried as
//! [`Operator::Other`] and skipped by the interpreter.

/// One element of a `TJ` operand array.
#[derive(Debug, Clone, PartialEq)]
pub enum TextItem {
    /// A string to show
    Text(Vec<u8>),
    /// A kerning adjustment in thousandths of an em; positive values
    /// move the next glyph left
    Offset(f64),
}

/// A content-stream operator with its decoded operands.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// `BT` — begin a text object, resetting the text matrices
    BeginText,
    /// `ET` — end the text object
    EndText,
    /// `/Name size Tf` — select font and size
    SetFont {
        /// Resource name without the slash
        name: String,
        /// Font size in text-space units
        size: f64,
    },
    /// `a b c d e f Tm` — set the text matrix (and line matrix)
    SetTextMatrix([f64; 6]),
    /// `tx ty Td` — translate the line matrix
    MoveText {
        /// X displacement
        tx: f64,
        /// Y displacement
        ty: f64,
    },
    /// `tx ty TD` — as `Td`, also setting leading to `-ty`
    MoveTextSetLeading {
        /// X displacement
        tx: f64,
        /// Y displacement
        ty: f64,
    },
    /// `l TL` — set leading
    SetLeading(f64),
    /// `T*` — move to the start of the next line
    NextLine,
    /// `(string) Tj` — show text
    ShowText(Vec<u8>),
    /// `[ ... ] TJ` — show text with kerning adjustments
    ShowTextAdjusted(Vec<TextItem>),
    /// `(string) '` — next line, then show
    NextLineShowText(Vec<u8>),
    /// `aw ac (string) "` — set word/char spacing, next line, show
    SetSpacingShowText {
        /// Word spacing (ignored by the interpreter)
        word_spacing: f64,
        /// Character spacing (ignored by the interpreter)
        char_spacing: f64,
        /// The string to show
        text: Vec<u8>,
    },
    /// Any operator outside the text subset; operands are dropped
    Other(String),
}
