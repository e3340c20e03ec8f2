//! ASCIIHexDecode implementation.
//!
//! Pairs of hex digits become bytes; whitespace is ignored; `>` ends
//! the stream; an odd trailing digit is padded with 0.

use crate::error::{Error, Result};

/// Decode ASCIIHex data.
///
/// # Errors
///
/// `Error::Decode` on bytes that are neither hex digits, whitespace,
/// nor the `>` end marker.
pub fn ascii_hex_decode(input: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(input.len() / 2);
    let mut pending: Option<u8> = None;

    for &byte in input {
        if byte == b'>' {
            break;
        }
        if byte.is_ascii_whitespace() {
            continue;
        }
        let digit = (byte as char).to_digit(16).ok_or_else(|| {
            Error::Decode(format!("ASCIIHexDecode: invalid byte 0x{:02x}", byte))
        })? as u8;

        match pending.take() {
            Some(hi) => output.push(hi << 4 | digit),
            None => pending = Some(digit),
        }
    }

    // Odd digit count: the last digit is the high nibble.
    if let Some(hi) = pending {
        output.push(hi << 4);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_simple() {
        assert_eq!(ascii_hex_decode(b"48656C6C6F").unwrap(), b"Hello");
    }

    #[test]
    fn test_decode_with_whitespace_and_eod() {
        assert_eq!(ascii_hex_decode(b"48 65 6C\n6C 6F>trailing junk").unwrap(), b"Hello");
    }

    #[test]
    fn test_decode_odd_digit_padded() {
        assert_eq!(ascii_hex_decode(b"ABC").unwrap(), vec![0xAB, 0xC0]);
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(ascii_hex_decode(b"").unwrap(), b"");
        assert_eq!(ascii_hex_decode(b">").unwrap(), b"");
    }

    #[test]
    fn test_decode_invalid_byte() {
        assert!(ascii_hex_decode(b"4G").is_err());
    }
}
