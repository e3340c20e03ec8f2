//! PDF lexer (tokenizer).
//!
//! Low-level tokenization of PDF byte streams. The lexer recognizes the
//! primitive token types of the PDF syntax:
//!
//! - Numbers: integers (42, -123) and reals (3.14, -.5, 5.)
//! - Strings: literal ((Hello)) and hexadecimal (<48656C6C6F>)
//! - Names: identifiers starting with / (/Type), with #XX hex escapes
//! - Keywords: true, false, null, obj, endobj, stream, endstream, R
//! - Delimiters: `[`, `]`, `<<`, `>>`
//!
//! Whitespace (space, tab, CR, LF, NUL, form feed) and comments (% to
//! end of line) are skipped between tokens. Every parser consumes from
//! the front of its input and returns the remainder, so callers always
//! know how many bytes a token took.
//!
//! Literal strings are returned raw: paren balancing and escape skipping
//! happen here, but escape *decoding* happens at the parser level.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_till, take_while},
    character::complete::{char, digit1, one_of},
    combinator::{map, opt, value},
    sequence::{delimited, preceded},
};

/// Token types recognized by the PDF lexer.
#[derive(Debug, PartialEq, Clone)]
pub enum Token<'a> {
    /// Integer number (e.g., 42, -123)
    Integer(i64),
    /// Real (floating-point) number (e.g., 3.14, -2.5, .5)
    Real(f64),
    /// Literal string bytes, escapes not yet decoded
    LiteralString(&'a [u8]),
    /// Hexadecimal string bytes, whitespace preserved
    HexString(&'a [u8]),
    /// Name without the leading slash, #XX escapes decoded
    Name(String),
    /// Boolean true keyword
    True,
    /// Boolean false keyword
    False,
    /// Null keyword
    Null,
    /// Array start delimiter [
    ArrayStart,
    /// Array end delimiter ]
    ArrayEnd,
    /// Dictionary start delimiter <<
    DictStart,
    /// Dictionary end delimiter >>
    DictEnd,
    /// Indirect object start keyword "obj"
    ObjStart,
    /// Indirect object end keyword "endobj"
    ObjEnd,
    /// Stream start keyword "stream"
    StreamStart,
    /// Stream end keyword "endstream"
    StreamEnd,
    /// Reference keyword "R" (as in "10 0 R")
    R,
}

/// PDF whitespace per the spec: space, tab, CR, LF, NUL, form feed.
pub fn is_pdf_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n' | 0x00 | 0x0C)
}

/// PDF delimiter characters.
pub fn is_pdf_delimiter(c: u8) -> bool {
    matches!(c, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

fn whitespace(input: &[u8]) -> IResult<&[u8], ()> {
    let (remaining, ws) = take_while(is_pdf_whitespace)(input)?;
    if ws.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Space)));
    }
    Ok((remaining, ()))
}

/// A comment runs from % to the next CR or LF.
fn comment(input: &[u8]) -> IResult<&[u8], ()> {
    value((), preceded(char('%'), take_till(|c| c == b'\r' || c == b'\n')))(input)
}

/// Skip any amount of whitespace and comments.
pub fn skip_ws(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let mut remaining = input;
    loop {
        if let Ok((rest, _)) = whitespace(remaining) {
            remaining = rest;
            continue;
        }
        if let Ok((rest, _)) = comment(remaining) {
            remaining = rest;
            continue;
        }
        break;
    }
    Ok((remaining, input))
}

/// Parse an integer or real number.
///
/// PDF allows leading +/- and numbers that start or end with the decimal
/// point (.5, 5., -.002).
fn parse_number(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (rest, sign) = opt(one_of("+-"))(input)?;
    let (rest, int_part) = opt(digit1)(rest)?;
    let (rest, frac_part) = opt(preceded(char('.'), opt(digit1)))(rest)?;

    if int_part.is_none() && frac_part.is_none() {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit)));
    }

    let digit_err = || nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit));

    if frac_part.is_some() {
        let mut num = String::new();
        if sign == Some('-') {
            num.push('-');
        }
        match int_part {
            Some(int) => num.push_str(std::str::from_utf8(int).map_err(|_| digit_err())?),
            None => num.push('0'),
        }
        num.push('.');
        if let Some(Some(frac)) = frac_part {
            num.push_str(std::str::from_utf8(frac).map_err(|_| digit_err())?);
        } else {
            num.push('0');
        }
        let val: f64 = num.parse().map_err(|_| digit_err())?;
        Ok((rest, Token::Real(val)))
    } else {
        let int_bytes = int_part.ok_or_else(digit_err)?;
        let int_str = std::str::from_utf8(int_bytes).map_err(|_| digit_err())?;
        let mut val: i64 = int_str.parse().map_err(|_| digit_err())?;
        if sign == Some('-') {
            val = -val;
        }
        Ok((rest, Token::Integer(val)))
    }
}

/// Parse a literal string enclosed in parentheses.
///
/// Tracks paren depth so nested `(Hello (World))` works, and skips over
/// escape sequences so `\(` and `\)` do not disturb the balance. This is
/// the one place where regex-style scanning would go wrong, so the scan
/// is byte-by-byte.
fn parse_literal_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (remaining, _) = char('(')(input)?;
    let mut depth = 1;
    let mut pos = 0;

    while depth > 0 && pos < remaining.len() {
        match remaining[pos] {
            b'\\' => {
                // Skip the escape; octal escapes may take up to 3 digits.
                pos += 1;
                if pos < remaining.len() {
                    if remaining[pos].is_ascii_digit() {
                        let mut digits = 0;
                        while digits < 3
                            && pos < remaining.len()
                            && (b'0'..b'8').contains(&remaining[pos])
                        {
                            pos += 1;
                            digits += 1;
                        }
                    } else {
                        pos += 1;
                    }
                }
            },
            b'(' => {
                depth += 1;
                pos += 1;
            },
            b')' => {
                depth -= 1;
                pos += 1;
            },
            _ => pos += 1,
        }
    }

    if depth != 0 {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)));
    }

    let content = &remaining[..pos - 1];
    Ok((&remaining[pos..], Token::LiteralString(content)))
}

/// Parse a hexadecimal string enclosed in angle brackets.
///
/// `<<` is a dictionary start, never a hex string.
fn parse_hex_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    if input.len() >= 2 && input[0] == b'<' && input[1] == b'<' {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)));
    }

    delimited(
        char('<'),
        map(
            take_while(|c: u8| c.is_ascii_hexdigit() || c.is_ascii_whitespace()),
            Token::HexString,
        ),
        char('>'),
    )(input)
}

/// Decode #XX escape sequences in PDF names.
///
/// `/A#20B` is the name "A B". Invalid sequences keep the `#` literal.
pub fn decode_name_escapes(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '#' {
            result.push(ch);
            continue;
        }
        let h1 = chars.next();
        let h2 = chars.next();
        if let (Some(h1), Some(h2)) = (h1, h2) {
            if let (Some(d1), Some(d2)) = (h1.to_digit(16), h2.to_digit(16)) {
                result.push((d1 * 16 + d2) as u8 as char);
                continue;
            }
            result.push('#');
            result.push(h1);
            result.push(h2);
        } else {
            result.push('#');
            if let Some(h1) = h1 {
                result.push(h1);
            }
        }
    }

    result
}

/// Parse a name starting with /.
fn parse_name(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    preceded(
        char('/'),
        map(
            take_while(|c: u8| !is_pdf_whitespace(c) && !is_pdf_delimiter(c)),
            |bytes: &[u8]| {
                let name_str = std::str::from_utf8(bytes).unwrap_or("");
                Token::Name(decode_name_escapes(name_str))
            },
        ),
    )(input)
}

/// Parse PDF keywords and delimiters.
///
/// Order matters: multi-character keywords before their prefixes
/// (endstream before stream, << before <).
fn parse_keyword(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    alt((
        value(Token::False, tag(b"false")),
        value(Token::True, tag(b"true")),
        value(Token::Null, tag(b"null")),
        value(Token::ObjEnd, tag(b"endobj")),
        value(Token::StreamEnd, tag(b"endstream")),
        value(Token::StreamStart, tag(b"stream")),
        value(Token::ObjStart, tag(b"obj")),
        value(Token::DictStart, tag(b"<<")),
        value(Token::DictEnd, tag(b">>")),
        value(Token::ArrayStart, tag(b"[")),
        value(Token::ArrayEnd, tag(b"]")),
        value(Token::R, tag(b"R")),
    ))(input)
}

/// Parse a single PDF token, skipping leading whitespace and comments.
///
/// # Errors
///
/// Returns `Err` if the input does not start with a valid token after
/// the skip.
pub fn token(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (input, _) = skip_ws(input)?;

    alt((
        parse_keyword,
        parse_name,
        parse_number,
        parse_literal_string,
        parse_hex_string,
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integers() {
        assert_eq!(token(b"42"), Ok((&b""[..], Token::Integer(42))));
        assert_eq!(token(b"-123"), Ok((&b""[..], Token::Integer(-123))));
        assert_eq!(token(b"0"), Ok((&b""[..], Token::Integer(0))));
    }

    #[test]
    fn test_parse_reals() {
        assert_eq!(token(b"-2.5"), Ok((&b""[..], Token::Real(-2.5))));
        assert_eq!(token(b".5"), Ok((&b""[..], Token::Real(0.5))));
        assert_eq!(token(b"5."), Ok((&b""[..], Token::Real(5.0))));
        assert_eq!(token(b"-.002"), Ok((&b""[..], Token::Real(-0.002))));
    }

    #[test]
    fn test_parse_literal_string() {
        assert_eq!(token(b"(Hello)"), Ok((&b""[..], Token::LiteralString(b"Hello"))));
        assert_eq!(token(b"()"), Ok((&b""[..], Token::LiteralString(b""))));
    }

    #[test]
    fn test_parse_literal_string_nested_parens() {
        assert_eq!(
            token(b"(Hello (nested) World)"),
            Ok((&b""[..], Token::LiteralString(b"Hello (nested) World")))
        );
    }

    #[test]
    fn test_parse_literal_string_escaped_paren() {
        // The escaped paren must not close the string.
        assert_eq!(
            token(b"(Open \\( Close \\))"),
            Ok((&b""[..], Token::LiteralString(b"Open \\( Close \\)")))
        );
    }

    #[test]
    fn test_parse_literal_string_unbalanced() {
        assert!(token(b"(never closed").is_err());
    }

    #[test]
    fn test_parse_hex_string() {
        assert_eq!(token(b"<48656C6C6F>"), Ok((&b""[..], Token::HexString(b"48656C6C6F"))));
        assert_eq!(token(b"<>"), Ok((&b""[..], Token::HexString(b""))));
    }

    #[test]
    fn test_dict_start_vs_hex_string() {
        assert_eq!(token(b"<<"), Ok((&b""[..], Token::DictStart)));
        assert_eq!(token(b"<ABC>"), Ok((&b""[..], Token::HexString(b"ABC"))));
    }

    #[test]
    fn test_parse_name() {
        assert_eq!(token(b"/Type"), Ok((&b""[..], Token::Name("Type".to_string()))));
        assert_eq!(token(b"/A#20B"), Ok((&b""[..], Token::Name("A B".to_string()))));
        assert_eq!(token(b"/A#ZZ"), Ok((&b""[..], Token::Name("A#ZZ".to_string()))));
    }

    #[test]
    fn test_decode_name_escapes_directly() {
        assert_eq!(decode_name_escapes("Type"), "Type");
        assert_eq!(decode_name_escapes("A#20B#23C"), "A B#C");
        assert_eq!(decode_name_escapes("A#"), "A#");
        assert_eq!(decode_name_escapes("A#2"), "A#2");
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(token(b"true"), Ok((&b""[..], Token::True)));
        assert_eq!(token(b"null"), Ok((&b""[..], Token::Null)));
        assert_eq!(token(b"obj"), Ok((&b""[..], Token::ObjStart)));
        assert_eq!(token(b"endobj"), Ok((&b""[..], Token::ObjEnd)));
        assert_eq!(token(b"endstream"), Ok((&b""[..], Token::StreamEnd)));
        assert_eq!(token(b"R"), Ok((&b""[..], Token::R)));
    }

    #[test]
    fn test_skip_whitespace_and_comments() {
        assert_eq!(token(b"  \n\t42"), Ok((&b""[..], Token::Integer(42))));
        assert_eq!(token(b"% a comment\n42"), Ok((&b""[..], Token::Integer(42))));
        assert_eq!(token(b"% one\n% two\n  42"), Ok((&b""[..], Token::Integer(42))));
    }

    #[test]
    fn test_token_sequence() {
        let input = b"1 0 obj << /Type /Catalog >> endobj";
        let (rest, t) = token(input).unwrap();
        assert_eq!(t, Token::Integer(1));
        let (rest, t) = token(rest).unwrap();
        assert_eq!(t, Token::Integer(0));
        let (rest, t) = token(rest).unwrap();
        assert_eq!(t, Token::ObjStart);
        let (rest, t) = token(rest).unwrap();
        assert_eq!(t, Token::DictStart);
        let (rest, t) = token(rest).unwrap();
        assert_eq!(t, Token::Name("Type".to_string()));
        let (rest, t) = token(rest).unwrap();
        assert_eq!(t, Token::Name("Catalog".to_string()));
        let (rest, t) = token(rest).unwrap();
        assert_eq!(t, Token::DictEnd);
        let (rest, t) = token(rest).unwrap();
        assert_eq!(t, Token::ObjEnd);
        assert!(rest.is_empty());
    }
}
