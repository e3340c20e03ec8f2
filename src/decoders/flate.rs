//! FlateDecode (zlib/deflate) implementation.
//!
//! The most common PDF filter by far. Uses the flate2 crate. Some
//! generators emit raw deflate without the two-byte zlib wrapper, so a
//! raw-deflate pass runs as fallback; a truncated stream that yielded
//! partial output is returned as-is with a warning rather than dropped.

use crate::error::{Error, Result};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use std::io::Read;

/// Inflate a zlib stream.
///
/// # Errors
///
/// `Error::Decode` when neither zlib nor raw deflate produce any output.
pub fn flate_decode(input: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut decoder = ZlibDecoder::new(input);

    match decoder.read_to_end(&mut output) {
        Ok(_) => Ok(output),
        Err(zlib_err) => {
            if !output.is_empty() {
                log::warn!(
                    "FlateDecode: stream truncated after {} bytes: {}",
                    output.len(),
                    zlib_err
                );
                return Ok(output);
            }

            // Fallback: raw deflate without the zlib wrapper.
            output.clear();
            let mut deflate = DeflateDecoder::new(input);
            match deflate.read_to_end(&mut output) {
                Ok(_) if !output.is_empty() => {
                    log::warn!("FlateDecode: zlib wrapper missing, raw deflate succeeded");
                    Ok(output)
                },
                _ => Err(Error::Decode(format!(
                    "FlateDecode failed: {} ({} input bytes)",
                    zlib_err,
                    input.len()
                ))),
            }
        },
    }
}
