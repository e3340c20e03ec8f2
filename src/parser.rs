//! PDF object parser.
//!
//! Combines tokens from the lexer into complete objects using recursive
//! descent: read a token, decide the object kind, recurse for arrays and
//! dictionaries. A dictionary followed by the `stream` keyword becomes a
//! stream object whose payload is split off by `/Length` (or, when the
//! length is missing or an unresolved reference, by scanning for
//! `endstream`).
//!
//! All entry points take a byte slice and return the unconsumed
//! remainder, so callers can keep advancing through a larger buffer.

use crate::error::{Error, Result};
use crate::lexer::{Token, token};
use crate::object::{Object, ObjectRef};
use nom::IResult;
use std::collections::HashMap;

/// Decode escape sequences in PDF literal strings.
///
/// Handles the single-character escapes (`\n \r \t \b \f \( \) \\`),
/// 1-3 digit octal escapes, and backslash-newline line continuations.
/// Unknown escapes keep the backslash literal.
pub fn decode_literal_string_escapes(raw: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] != b'\\' || i + 1 >= raw.len() {
            result.push(raw[i]);
            i += 1;
            continue;
        }

        match raw[i + 1] {
            b'n' => {
                result.push(b'\n');
                i += 2;
            },
            b'r' => {
                result.push(b'\r');
                i += 2;
            },
            b't' => {
                result.push(b'\t');
                i += 2;
            },
            b'b' => {
                result.push(0x08);
                i += 2;
            },
            b'f' => {
                result.push(0x0C);
                i += 2;
            },
            b'(' => {
                result.push(b'(');
                i += 2;
            },
            b')' => {
                result.push(b')');
                i += 2;
            },
            b'\\' => {
                result.push(b'\\');
                i += 2;
            },
            // Line continuation: backslash-newline is dropped entirely.
            b'\n' => {
                i += 2;
            },
            b'\r' => {
                i += 2;
                if i < raw.len() && raw[i] == b'\n' {
                    i += 1;
                }
            },
            c if (b'0'..b'8').contains(&c) => {
                let mut octal = 0u32;
                let mut len = 0;
                while len < 3 && i + 1 + len < raw.len() && (b'0'..b'8').contains(&raw[i + 1 + len])
                {
                    octal = octal * 8 + (raw[i + 1 + len] - b'0') as u32;
                    len += 1;
                }
                result.push((octal & 0xFF) as u8);
                i += 1 + len;
            },
            other => {
                result.push(other);
                i += 2;
            },
        }
    }

    result
}

/// Decode a hex string body to bytes.
///
/// Whitespace is ignored; an odd trailing digit is padded with 0.
pub fn decode_hex(hex_bytes: &[u8]) -> Result<Vec<u8>> {
    let digits: Vec<u8> = hex_bytes
        .iter()
        .filter(|&&c| !c.is_ascii_whitespace())
        .copied()
        .collect();

    let mut result = Vec::with_capacity(digits.len() / 2 + 1);
    for chunk in digits.chunks(2) {
        let hi = hex_value(chunk[0])?;
        let lo = if chunk.len() == 2 { hex_value(chunk[1])? } else { 0 };
        result.push(hi << 4 | lo);
    }
    Ok(result)
}

fn hex_value(c: u8) -> Result<u8> {
    (c as char)
        .to_digit(16)
        .map(|v| v as u8)
        .ok_or_else(|| Error::Decode(format!("invalid hex digit: {:?}", c as char)))
}

/// Parse a single PDF object from the front of `input`.
///
/// Handles every value kind: null, booleans, numbers, strings, names,
/// arrays, dictionaries, streams, and `N G R` references (which are
/// stored unresolved).
///
/// # Errors
///
/// Returns `Err` when the input does not start with a valid object.
/// Unclosed arrays and dictionaries at end of input are returned as-is,
/// which keeps truncated real-world files usable.
pub fn parse_object(input: &[u8]) -> IResult<&[u8], Object> {
    let (input, tok) = token(input)?;

    match tok {
        Token::Null => Ok((input, Object::Null)),
        Token::True => Ok((input, Object::Boolean(true))),
        Token::False => Ok((input, Object::Boolean(false))),
        Token::Real(r) => Ok((input, Object::Real(r))),
        Token::Name(name) => Ok((input, Object::Name(name))),

        Token::Integer(i) => {
            // Reference token: INT INT R in a value position.
            if let Ok((after_gen, Token::Integer(gen))) = token(input) {
                if let Ok((after_r, Token::R)) = token(after_gen) {
                    return Ok((
                        after_r,
                        Object::Reference(ObjectRef::new(i as u32, gen as u16)),
                    ));
                }
            }
            Ok((input, Object::Integer(i)))
        },

        Token::LiteralString(bytes) => {
            Ok((input, Object::String(decode_literal_string_escapes(bytes))))
        },

        Token::HexString(hex) => match decode_hex(hex) {
            Ok(decoded) => Ok((input, Object::String(decoded))),
            Err(_) => Err(nom::Err::Failure(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Fail,
            ))),
        },

        Token::ArrayStart => parse_array(input),

        Token::DictStart => {
            let (remaining, dict_obj) = parse_dictionary(input)?;

            // A dictionary directly followed by `stream` is a stream object.
            if let Ok((stream_input, Token::StreamStart)) = token(remaining) {
                let dict = match dict_obj {
                    Object::Dictionary(d) => d,
                    _ => unreachable!("parse_dictionary returns Dictionary"),
                };
                let (final_input, data) = parse_stream_data(stream_input, &dict)?;
                return Ok((
                    final_input,
                    Object::Stream {
                        dict,
                        data: bytes::Bytes::from(data),
                    },
                ));
            }

            Ok((remaining, dict_obj))
        },

        _ => Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag))),
    }
}

/// Split off stream data after the `stream` keyword.
///
/// The keyword must be followed by CRLF or LF; a lone CR is accepted
/// with a warning. When `/Length` is a direct integer it bounds the
/// payload, but if the declared span overruns the actual `endstream`
/// position the scan result wins. Indirect `/Length` values cannot be
/// resolved at this layer, so they also fall back to the scan; the
/// document layer re-checks them once the object table exists.
fn parse_stream_data<'a>(
    input: &'a [u8],
    dict: &HashMap<String, Object>,
) -> IResult<&'a [u8], Vec<u8>> {
    let input = if input.starts_with(b"\r\n") {
        &input[2..]
    } else if input.starts_with(b"\n") {
        &input[1..]
    } else if input.starts_with(b"\r") {
        log::warn!("stream keyword followed by bare CR; accepting in lenient mode");
        &input[1..]
    } else {
        log::warn!("no newline after stream keyword");
        input
    };

    let scan_end = find_endstream(input);

    if let Some(declared) = dict.get("Length").and_then(|o| o.as_integer()) {
        let declared = declared.max(0) as usize;
        // Prefer the declared length when it fits inside the scanned
        // interval; otherwise trust the scan.
        let length = match scan_end {
            Some(end) => declared.min(end),
            None => declared,
        };
        if length <= input.len() {
            let data = input[..length].to_vec();
            let mut remaining = &input[length..];
            if let Ok((rest, Token::StreamEnd)) = token(remaining) {
                remaining = rest;
            } else if let Some(end) = scan_end {
                // Declared length undershot the real payload; skip ahead.
                remaining = &input[end..];
                if let Ok((rest, Token::StreamEnd)) = token(remaining) {
                    remaining = rest;
                }
            }
            return Ok((remaining, data));
        }
    }

    if let Some(end) = scan_end {
        let data = trim_stream_tail(&input[..end]).to_vec();
        let remaining = &input[end..];
        let (remaining, _) = token(remaining)?; // consume endstream
        return Ok((remaining, data));
    }

    Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Eof)))
}

/// Find the byte position of the `endstream` keyword.
fn find_endstream(input: &[u8]) -> Option<usize> {
    let keyword = b"endstream";
    input
        .windows(keyword.len())
        .position(|window| window == keyword)
}

/// Drop the EOL that separates stream data from `endstream`.
fn trim_stream_tail(data: &[u8]) -> &[u8] {
    if data.ends_with(b"\r\n") {
        &data[..data.len() - 2]
    } else if data.ends_with(b"\n") || data.ends_with(b"\r") {
        &data[..data.len() - 1]
    } else {
        data
    }
}

/// Parse a PDF array body: elements up to the closing `]`.
fn parse_array(input: &[u8]) -> IResult<&[u8], Object> {
    let mut objects = Vec::new();
    let mut remaining = input;

    loop {
        match token(remaining) {
            Ok((inp, Token::ArrayEnd)) => return Ok((inp, Object::Array(objects))),
            Ok(_) => match parse_object(remaining) {
                Ok((inp, obj)) => {
                    objects.push(obj);
                    remaining = inp;
                },
                Err(e) => {
                    if remaining.is_empty() {
                        return Ok((remaining, Object::Array(objects)));
                    }
                    return Err(e);
                },
            },
            // EOF or junk before ]: return what we have.
            Err(_) => return Ok((remaining, Object::Array(objects))),
        }
    }
}

/// Parse a PDF dictionary body: `/Key value` pairs up to `>>`.
fn parse_dictionary(input: &[u8]) -> IResult<&[u8], Object> {
    let mut dict = HashMap::new();
    let mut remaining = input;

    loop {
        match token(remaining) {
            Ok((inp, Token::DictEnd)) => return Ok((inp, Object::Dictionary(dict))),
            Ok((inp, Token::Name(key))) => match parse_object(inp) {
                Ok((inp, value)) => {
                    dict.insert(key, value);
                    remaining = inp;
                },
                Err(e) => {
                    if inp.is_empty() {
                        return Ok((inp, Object::Dictionary(dict)));
                    }
                    return Err(e);
                },
            },
            Ok(_) => {
                if remaining.is_empty() {
                    return Ok((remaining, Object::Dictionary(dict)));
                }
                return Err(nom::Err::Error(nom::error::Error::new(
                    remaining,
                    nom::error::ErrorKind::Tag,
                )));
            },
            Err(_) => {
                // EOF before >>: return what we have.
                return Ok((remaining, Object::Dictionary(dict)));
            },
        }
    }
}
