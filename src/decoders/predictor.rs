//! PNG and TIFF predictor decoding.
//!
//! Predictors are a reversible per-row transform applied before the
//! main compression stage on encode, so they must be reversed after
//! inflation on decode. PNG predictors (10-15) prefix every row with a
//! one-byte filter tag (0 None, 1 Sub, 2 Up, 3 Average, 4 Paeth); the
//! TIFF predictor (2) is plain horizontal differencing.
//!
//! All arithmetic is modulo 256. `bytes_per_pixel` governs what counts
//! as the "left" neighbor when a pixel spans several bytes.

use crate::error::{Error, Result};

/// Decode parameters from a /DecodeParms dictionary.
#[derive(Debug, Clone)]
pub struct DecodeParams {
    /// Predictor algorithm (1 = none, 2 = TIFF, 10-15 = PNG)
    pub predictor: i64,
    /// Samples per row
    pub columns: usize,
    /// Color components per sample
    pub colors: usize,
    /// Bits per component
    pub bits_per_component: usize,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            columns: 1,
            colors: 1,
            bits_per_component: 8,
        }
    }
}

impl DecodeParams {
    /// Bytes spanned by one pixel, rounded up.
    pub fn bytes_per_pixel(&self) -> usize {
        (self.colors * self.bits_per_component).div_ceil(8).max(1)
    }

    /// Bytes of sample data per row, rounded up.
    pub fn row_length(&self) -> usize {
        (self.columns * self.colors * self.bits_per_component)
            .div_ceil(8)
            .max(1)
    }
}

/// Reverse the predictor declared in `params`.
///
/// # Errors
///
/// `Error::Decode` when the predictor value is unknown or the data
/// length does not match the declared row geometry (PNG only; TIFF
/// with non-8-bit samples passes through unchanged).
pub fn decode_predictor(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    match params.predictor {
        1 => Ok(data.to_vec()),
        2 => decode_tiff(data, params),
        10..=15 => decode_png(data, params),
        other => Err(Error::Decode(format!("unsupported predictor: {}", other))),
    }
}

/// TIFF predictor 2: each sample is the sum of the encoded sample and
/// the decoded sample one pixel to the left. Implemented for 8-bit
/// samples; other depths pass through unchanged.
fn decode_tiff(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    if params.bits_per_component != 8 {
        log::warn!(
            "TIFF predictor with {}-bit samples not implemented, passing through",
            params.bits_per_component
        );
        return Ok(data.to_vec());
    }

    let row_length = params.row_length();
    let colors = params.colors.max(1);
    let mut output = Vec::with_capacity(data.len());

    for row in data.chunks(row_length) {
        let row_start = output.len();
        for (i, &byte) in row.iter().enumerate() {
            if i < colors {
                output.push(byte);
            } else {
                let left = output[row_start + i - colors];
                output.push(byte.wrapping_add(left));
            }
        }
    }

    Ok(output)
}

/// PNG predictors 10-15: every encoded row is `tag || row_length bytes`.
/// The tag picks the per-row filter regardless of the declared
/// predictor value (encoders may vary it row by row).
fn decode_png(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    let row_length = params.row_length();
    let stride = row_length + 1;
    let bpp = params.bytes_per_pixel();

    if data.is_empty() {
        return Ok(Vec::new());
    }
    if !data.len().is_multiple_of(stride) {
        return Err(Error::Decode(format!(
            "PNG predictor: data length {} is not a multiple of row stride {}",
            data.len(),
            stride
        )));
    }

    let rows = data.len() / stride;
    let mut output: Vec<u8> = Vec::with_capacity(rows * row_length);

    for row_idx in 0..rows {
        let row = &data[row_idx * stride..(row_idx + 1) * stride];
        let tag = row[0];
        let encoded = &row[1..];
        let row_start = output.len();

        for (i, &byte) in encoded.iter().enumerate() {
            let left = if i >= bpp { output[row_start + i - bpp] } else { 0 };
            let up = if row_idx > 0 {
                output[row_start - row_length + i]
            } else {
                0
            };
            let up_left = if row_idx > 0 && i >= bpp {
                output[row_start - row_length + i - bpp]
            } else {
                0
            };

            let predicted = match tag {
                0 => 0,
                1 => left,
                2 => up,
                3 => (((left as u16) + (up as u16)) / 2) as u8,
                4 => paeth(left, up, up_left),
                other => {
                    return Err(Error::Decode(format!(
                        "PNG predictor: invalid filter tag {} in row {}",
                        other, row_idx
                    )));
                },
            };
            output.push(byte.wrapping_add(predicted));
        }
    }

    Ok(output)
}

/// Paeth filter function from the PNG specification: pick the neighbor
/// closest to `a + b - c`, ties broken a, then b, then c.
fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_params(columns: usize) -> DecodeParams {
        DecodeParams {
            predictor: 12,
            columns,
            colors: 1,
            bits_per_component: 8,
        }
    }

    #[test]
    fn test_predictor_none_is_identity() {
        let params = DecodeParams::default();
        assert_eq!(decode_predictor(b"abc", &params).unwrap(), b"abc");
    }

    #[test]
    fn test_png_none_rows() {
        let encoded = [0, 10, 20, 30, 0, 40, 50, 60];
        let out = decode_predictor(&encoded, &png_params(3)).unwrap();
        assert_eq!(out, vec![10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_png_sub() {
        // Sub: out[i] = enc[i] + out[i-1]
        let encoded = [1, 10, 5, 5];
        let out = decode_predictor(&encoded, &png_params(3)).unwrap();
        assert_eq!(out, vec![10, 15, 20]);
    }

    #[test]
    fn test_png_up() {
        let encoded = [2, 10, 20, 30, 2, 5, 5, 5];
        let out = decode_predictor(&encoded, &png_params(3)).unwrap();
        assert_eq!(out, vec![10, 20, 30, 15, 25, 35]);
    }

    #[test]
    fn test_png_average() {
        // Row 0, Average with no up row: out[0]=10, out[1]=6+10/2=11.
        let encoded = [3, 10, 6];
        let out = decode_predictor(&encoded, &png_params(2)).unwrap();
        assert_eq!(out, vec![10, 11]);
    }

    #[test]
    fn test_png_paeth_first_row() {
        // No up row: Paeth degenerates to left.
        let encoded = [4, 10, 5, 5];
        let out = decode_predictor(&encoded, &png_params(3)).unwrap();
        assert_eq!(out, vec![10, 15, 20]);
    }

    #[test]
    fn test_png_bad_stride_is_error() {
        let encoded = [2, 10, 20]; // stride should be 4 for columns=3
        assert!(decode_predictor(&encoded, &png_params(3)).is_err());
    }

    #[test]
    fn test_png_invalid_tag_is_error() {
        let encoded = [9, 1, 2, 3];
        assert!(decode_predictor(&encoded, &png_params(3)).is_err());
    }

    #[test]
    fn test_tiff_horizontal_differencing() {
        let params = DecodeParams {
            predictor: 2,
            columns: 4,
            colors: 1,
            bits_per_component: 8,
        };
        // Row: 10, +5, +5, +5 -> 10, 15, 20, 25
        let out = decode_predictor(&[10, 5, 5, 5], &params).unwrap();
        assert_eq!(out, vec![10, 15, 20, 25]);
    }

    #[test]
    fn test_tiff_multi_color() {
        let params = DecodeParams {
            predictor: 2,
            columns: 2,
            colors: 2,
            bits_per_component: 8,
        };
        // Two interleaved channels: (10, 100), (+5, +10) -> 10,100,15,110
        let out = decode_predictor(&[10, 100, 5, 10], &params).unwrap();
        assert_eq!(out, vec![10, 100, 15, 110]);
    }

    #[test]
    fn test_tiff_non_8bit_passes_through() {
        let params = DecodeParams {
            predictor: 2,
            columns: 4,
            colors: 1,
            bits_per_component: 4,
        };
        let data = [0x12, 0x34];
        assert_eq!(decode_predictor(&data, &params).unwrap(), data);
    }

    #[test]
    fn test_paeth_tie_breaking() {
        assert_eq!(paeth(1, 1, 1), 1); // all equal: a wins
        assert_eq!(paeth(0, 5, 5), 0); // p=0, pa=0: a wins
        assert_eq!(paeth(5, 0, 5), 0); // p=0, pb=0: b wins
    }

    #[test]
    fn test_bytes_per_pixel_rounding() {
        let p = DecodeParams {
            predictor: 12,
            columns: 10,
            colors: 3,
            bits_per_component: 8,
        };
        assert_eq!(p.bytes_per_pixel(), 3);
        assert_eq!(p.row_length(), 30);

        let p1 = DecodeParams {
            predictor: 12,
            columns: 10,
            colors: 1,
            bits_per_component: 1,
        };
        assert_eq!(p1.bytes_per_pixel(), 1);
        assert_eq!(p1.row_length(), 2);
    }
}
