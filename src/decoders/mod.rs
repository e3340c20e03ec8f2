//! Stream decoder implementations for PDF filters.
//!
//! Recognized filters and their behavior:
//! - `FlateDecode` (alias `FlatDecode`) — zlib inflate, then predictor
//! - `ASCII85Decode` — base-85
//! - `ASCIIHexDecode` — hex
//! - `RunLengthDecode` — run-length
//! - `DCTDecode`, `JPXDecode` — pass-through (JPEG payloads carry no text)
//! - `LZWDecode`, `CCITTFaxDecode`, `JBIG2Decode` — declared but not
//!   implemented; surface `UnsupportedFilter` so the caller can log and
//!   keep the raw bytes
//!
//! Filters apply in the order given: the first filter decodes the
//! outermost layer. `/DecodeParms` mirrors the filter arity, and the
//! predictor (when declared) runs after its owning filter's main stage.

use crate::error::{Error, Result};

mod ascii85;
mod ascii_hex;
mod flate;
mod predictor;
mod runlength;

pub use ascii_hex::ascii_hex_decode;
pub use ascii85::ascii85_decode;
pub use flate::flate_decode;
pub use predictor::{DecodeParams, decode_predictor};
pub use runlength::run_length_decode;

/// Apply a filter pipeline to raw stream bytes.
///
/// `params` must have one slot per filter (see
/// [`crate::object::extract_decode_params`]); pass an empty slice when
/// there are no DecodeParms.
///
/// # Errors
///
/// `Error::UnsupportedFilter` for declared-but-unimplemented filters,
/// `Error::Decode` when a decoder rejects its input. In both cases the
/// caller keeps the raw bytes and logs a warning (spec: filters are
/// best-effort).
pub fn decode_stream(
    data: &[u8],
    filters: &[String],
    params: &[Option<DecodeParams>],
) -> Result<Vec<u8>> {
    let mut current = data.to_vec();

    for (i, filter_name) in filters.iter().enumerate() {
        let filter_params = params.get(i).and_then(|p| p.as_ref());
        current = apply_filter(&current, filter_name, filter_params)?;
    }

    Ok(current)
}

/// Apply one filter stage, including its post-prediction.
fn apply_filter(data: &[u8], name: &str, params: Option<&DecodeParams>) -> Result<Vec<u8>> {
    match name {
        // FlatDecode is a long-lived misspelling that shipped in enough
        // generators to be part of the format now.
        "FlateDecode" | "FlatDecode" => {
            let inflated = flate_decode(data)?;
            match params {
                Some(p) if p.predictor >= 2 => decode_predictor(&inflated, p),
                _ => Ok(inflated),
            }
        },
        "ASCII85Decode" => ascii85_decode(data),
        "ASCIIHexDecode" => ascii_hex_decode(data),
        "RunLengthDecode" => run_length_decode(data),
        // Image codecs: the payload is opaque to text extraction.
        "DCTDecode" | "JPXDecode" => Ok(data.to_vec()),
        "LZWDecode" | "CCITTFaxDecode" | "JBIG2Decode" => {
            Err(Error::UnsupportedFilter(name.to_string()))
        },
        _ => Err(Error::UnsupportedFilter(name.to_string())),
    }
}

/// Whether a filter name has a real decoder (pass-throughs count).
pub fn is_supported(name: &str) -> bool {
    matches!(
        name,
        "FlateDecode"
            | "FlatDecode"
            | "ASCII85Decode"
            | "ASCIIHexDecode"
            | "RunLengthDecode"
            | "DCTDecode"
            | "JPXDecode"
    )
}
