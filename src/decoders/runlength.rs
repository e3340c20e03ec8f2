//! RunLengthDecode implementation.
//!
//! Length byte `n`:
//! - `n < 128`: copy the next `n + 1` bytes literally
//! - `n > 128`: repeat the next byte `257 - n` times
//! - `n == 128`: end of data
//!
//! The decoder walks the input by splitting runs off the front of the
//! remaining slice, one header at a time.

use crate::error::{Error, Result};

/// Decode run-length encoded data.
///
/// # Errors
///
/// `Error::Decode` when a run header promises more bytes than remain.
pub fn run_length_decode(input: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut rest = input;

    while let Some((&header, tail)) = rest.split_first() {
        match header {
            128 => break,
            0..=127 => {
                let needed = header as usize + 1;
                if tail.len() < needed {
                    return Err(Error::Decode(format!(
                        "RunLengthDecode: literal run of {} bytes truncated at {}",
                        needed,
                        tail.len()
                    )));
                }
                let (literal, remaining) = tail.split_at(needed);
                output.extend_from_slice(literal);
                rest = remaining;
            },
            129..=255 => {
                let Some((&value, remaining)) = tail.split_first() else {
                    return Err(Error::Decode(
                        "RunLengthDecode: repeat run missing its byte".to_string(),
                    ));
                };
                output.extend(std::iter::repeat_n(value, 257 - header as usize));
                rest = remaining;
            },
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_literal_run() {
        assert_eq!(run_length_decode(&[4, b'H', b'e', b'l', b'l', b'o']).unwrap(), b"Hello");
    }

    #[test]
    fn test_decode_repeat_run() {
        assert_eq!(run_length_decode(&[252, b'A']).unwrap(), b"AAAAA");
    }

    #[test]
    fn test_decode_mixed() {
        assert_eq!(run_length_decode(&[1, b'H', b'i', 254, b'X']).unwrap(), b"HiXXX");
    }

    #[test]
    fn test_decode_stops_at_eod() {
        assert_eq!(run_length_decode(&[1, b'H', b'i', 128, 99, 99]).unwrap(), b"Hi");
    }

    #[test]
    fn test_decode_extremes() {
        let mut input = vec![127];
        input.extend_from_slice(&[b'A'; 128]);
        assert_eq!(run_length_decode(&input).unwrap(), vec![b'A'; 128]);

        assert_eq!(run_length_decode(&[129, b'B']).unwrap(), vec![b'B'; 128]);
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(run_length_decode(&[]).unwrap(), b"");
    }

    #[test]
    fn test_decode_truncated_literal() {
        assert!(run_length_decode(&[4, b'A', b'B']).is_err());
    }

    #[test]
    fn test_decode_truncated_repeat() {
        assert!(run_length_decode(&[252]).is_err());
    }
}
