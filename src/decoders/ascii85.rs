//! ASCII85Decode (Base85) implementation.
//!
//! Adobe-variant base-85: 5 characters in `!`..=`u` encode 4 bytes,
//! `z` is shorthand for a group of four zero bytes, and the stream may
//! end with the optional `~>` marker. Whitespace is ignored.
//!
//! Decoding runs in two phases: the input is first normalized into a
//! buffer of bare group characters (whitespace dropped, `z` expanded to
//! `!!!!!`, everything from `~` on discarded), then that buffer is
//! consumed in 5-character chunks. A trailing chunk of n characters
//! yields n-1 bytes after `u`-padding.

use crate::error::{Error, Result};

/// Decode ASCII85 data.
///
/// # Errors
///
/// `Error::Decode` on characters outside the alphabet, a `z` inside a
/// group, a dangling single-character final group, or a 5-character
/// group whose value exceeds 32 bits.
pub fn ascii85_decode(input: &[u8]) -> Result<Vec<u8>> {
    let groups = normalize(input)?;

    let mut output = Vec::with_capacity(groups.len() / 5 * 4 + 4);
    for chunk in groups.chunks(5) {
        if chunk.len() == 5 {
            output.extend_from_slice(&group_value(chunk)?.to_be_bytes());
        } else {
            if chunk.len() == 1 {
                return Err(Error::Decode(
                    "ASCII85Decode: final group has a single character".to_string(),
                ));
            }
            let mut padded = [b'u'; 5];
            padded[..chunk.len()].copy_from_slice(chunk);
            let bytes = group_value(&padded)?.to_be_bytes();
            output.extend_from_slice(&bytes[..chunk.len() - 1]);
        }
    }

    Ok(output)
}

/// Strip whitespace, expand `z`, and stop at the `~>` marker, leaving
/// only characters in the `!`..=`u` alphabet.
fn normalize(input: &[u8]) -> Result<Vec<u8>> {
    let mut groups = Vec::with_capacity(input.len());

    for &byte in input {
        match byte {
            b'~' => break,
            b'!'..=b'u' if byte != b'z' => groups.push(byte),
            b'z' => {
                // Only legal between groups, never inside one.
                if groups.len() % 5 != 0 {
                    return Err(Error::Decode(
                        "ASCII85Decode: 'z' inside a group".to_string(),
                    ));
                }
                groups.extend_from_slice(b"!!!!!");
            },
            _ if byte.is_ascii_whitespace() => {},
            _ => {
                return Err(Error::Decode(format!(
                    "ASCII85Decode: invalid byte 0x{:02x}",
                    byte
                )));
            },
        }
    }

    Ok(groups)
}

/// Fold five group characters into their 32-bit value.
///
/// The fold runs in 64 bits: the all-`u` group is 85^5 - 1, which does
/// not fit in a u32, and such groups are invalid rather than wrapped.
fn group_value(chunk: &[u8]) -> Result<u32> {
    let value = chunk
        .iter()
        .fold(0u64, |acc, &c| acc * 85 + u64::from(c - b'!'));

    u32::try_from(value)
        .map_err(|_| Error::Decode("ASCII85Decode: group value exceeds 32 bits".to_string()))
}
