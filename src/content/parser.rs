//! Content-stream scanner.
//!
//! Content streams are postfix: operands come first, then the operator
//! name (`100 700 Td`, `(Hello) Tj`). Operands are ordinary PDF values,
//! so they are read with the same object parser used for the document
//! body — which is what makes literal strings with escaped parens
//! (`(ab\)c) Tj`) safe. A regex scanner cannot get that right; this one
//! never looks inside a string operand.
//!
//! Unknown operators are kept as [`Operator::Other`] so the interpreter
//! can skip them; unparseable bytes (e.g. inline image payloads) are
//! skipped one byte at a time.

use crate::content::operators::{Operator, TextItem};
use crate::lexer::{is_pdf_delimiter, is_pdf_whitespace, skip_ws};
use crate::object::Object;
use crate::parser::parse_object;

/// Parse a content stream into a flat operator sequence.
pub fn parse_content_stream(data: &[u8]) -> Vec<Operator> {
    let mut operators = Vec::new();
    let mut operands: Vec<Object> = Vec::new();
    let mut input = data;

    while !input.is_empty() {
        if let Ok((rest, _)) = skip_ws(input) {
            input = rest;
        }
        if input.is_empty() {
            break;
        }

        // Operand? (number, string, name, array, dictionary, ...)
        if let Ok((rest, obj)) = parse_object(input) {
            operands.push(obj);
            input = rest;
            continue;
        }

        // Operator name: a run of regular characters ('  " and * are
        // regular in PDF syntax, so Tj, T*, ' and " all land here).
        if let Some((name, rest)) = scan_operator_name(input) {
            operators.push(build_operator(&name, std::mem::take(&mut operands)));
            input = rest;
            continue;
        }

        // Neither: skip a byte and resynchronize.
        input = &input[1..];
    }

    operators
}

/// Read an operator name from the front of the input.
fn scan_operator_name(input: &[u8]) -> Option<(String, &[u8])> {
    let end = input
        .iter()
        .position(|&b| is_pdf_whitespace(b) || is_pdf_delimiter(b))
        .unwrap_or(input.len());
    if end == 0 {
        return None;
    }
    let name = std::str::from_utf8(&input[..end]).ok()?.to_string();
    Some((name, &input[end..]))
}

/// Combine an operator name with its operand stack.
fn build_operator(name: &str, operands: Vec<Object>) -> Operator {
    match name {
        "BT" => Operator::BeginText,
        "ET" => Operator::EndText,
        "Tf" => {
            let font = operands.first().and_then(|o| o.as_name());
            let size = operands.get(1).and_then(|o| o.as_number());
            match (font, size) {
                (Some(font), Some(size)) => Operator::SetFont {
                    name: font.to_string(),
                    size,
                },
                _ => other(name, &operands),
            }
        },
        "Tm" => {
            let nums: Vec<f64> = operands.iter().filter_map(|o| o.as_number()).collect();
            if nums.len() == 6 {
                Operator::SetTextMatrix([nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]])
            } else {
                other(name, &operands)
            }
        },
        "Td" | "TD" => {
            let tx = operands.first().and_then(|o| o.as_number());
            let ty = operands.get(1).and_then(|o| o.as_number());
            match (tx, ty) {
                (Some(tx), Some(ty)) if name == "Td" => Operator::MoveText { tx, ty },
                (Some(tx), Some(ty)) => Operator::MoveTextSetLeading { tx, ty },
                _ => other(name, &operands),
            }
        },
        "TL" => match operands.first().and_then(|o| o.as_number()) {
            Some(leading) => Operator::SetLeading(leading),
            None => other(name, &operands),
        },
        "T*" => Operator::NextLine,
        "Tj" => match operands.into_iter().next_back() {
            Some(Object::String(text)) => Operator::ShowText(text),
            _ => Operator::Other("Tj".to_string()),
        },
        "TJ" => match operands.into_iter().next_back() {
            Some(Object::Array(items)) => Operator::ShowTextAdjusted(text_items(items)),
            _ => Operator::Other("TJ".to_string()),
        },
        "'" => match operands.into_iter().next_back() {
            Some(Object::String(text)) => Operator::NextLineShowText(text),
            _ => Operator::Other("'".to_string()),
        },
        "\"" => {
            let mut iter = operands.into_iter();
            let word = iter.next().and_then(|o| o.as_number());
            let ch = iter.next().and_then(|o| o.as_number());
            let text = iter.next();
            match (word, ch, text) {
                (Some(word_spacing), Some(char_spacing), Some(Object::String(text))) => {
                    Operator::SetSpacingShowText {
                        word_spacing,
                        char_spacing,
                        text,
                    }
                },
                _ => Operator::Other("\"".to_string()),
            }
        },
        _ => Operator::Other(name.to_string()),
    }
}

fn other(name: &str, operands: &[Object]) -> Operator {
    log::debug!("operator {} with unusable operands ({})", name, operands.len());
    Operator::Other(name.to_string())
}

fn text_items(items: Vec<Object>) -> Vec<TextItem> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Object::String(s) => Some(TextItem::Text(s)),
            Object::Integer(i) => Some(TextItem::Offset(i as f64)),
            Object::Real(r) => Some(TextItem::Offset(r)),
            _ => None,
        })
        .collect()
}
