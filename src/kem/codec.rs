//! Message symbol codec and the little-endian matrix byte layout.
//!
//! A message of `message_bytes` bytes is read as a little-endian bit
//! string, cut into 2-bit symbols, and each symbol `v` becomes the matrix
//! entry `v · step` with `step = ⌊q/4⌋`. Decoding rounds every entry to the
//! nearest multiple of the step, so any per-entry noise strictly below
//! `step/2` (q/8 for power-of-two q) is absorbed.

use std::io::{Cursor, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{encoding_err, Result};
use crate::math::{ModQ, ZMatrix};
use crate::params::FrodoParams;

/// Map a message to its nbar×nbar symbol matrix
///
/// Missing trailing bytes are treated as zero.
pub fn encode_message(message: &[u8], params: &FrodoParams) -> ZMatrix {
    let nbar = params.nbar;
    let step = params.step() as i64;
    let bit = |i: usize| -> i64 {
        message
            .get(i / 8)
            .map_or(0, |&byte| ((byte >> (i % 8)) & 1) as i64)
    };

    let data = (0..nbar * nbar)
        .map(|i| (bit(2 * i) | (bit(2 * i + 1) << 1)) * step)
        .collect();
    ZMatrix::from_vec(nbar, nbar, data)
}

/// Recover the message from a (possibly noisy) symbol matrix
pub fn decode_message(matrix: &ZMatrix, params: &FrodoParams) -> Vec<u8> {
    let q = params.q;
    let step = params.step() as u128;
    let mut message = vec![0u8; params.message_bytes];
    let total_bits = params.message_bytes * 8;

    for (i, &entry) in matrix.as_slice().iter().enumerate() {
        let v = ModQ::from_signed(entry, q) as u128;
        // round(v / step) = floor((2v + step) / 2step)
        let symbol = (((2 * v + step) / (2 * step)) % 4) as u8;
        for (offset, b) in [symbol & 1, (symbol >> 1) & 1].into_iter().enumerate() {
            let pos = 2 * i + offset;
            if pos < total_bits {
                message[pos / 8] |= b << (pos % 8);
            }
        }
    }
    message
}

/// Bytes per stored entry: 16 bits whenever q fits, 32 bits otherwise
pub fn entry_width(q: u64) -> usize {
    if q <= 1 << 16 {
        2
    } else {
        4
    }
}

/// Append a matrix as little-endian entries in row-major order
///
/// Entries are stored as `(x + q) mod q`, 16 bits wide for q ≤ 2^16.
pub fn write_matrix<W: Write>(writer: &mut W, matrix: &ZMatrix, q: u64) -> Result<()> {
    let wide = entry_width(q) == 4;
    for &x in matrix.as_slice() {
        let v = ModQ::from_signed(x, q);
        if wide {
            let v = u32::try_from(v).map_err(|_| encoding_err!("entry {} does not fit in 32 bits", v))?;
            writer.write_u32::<LittleEndian>(v)?;
        } else {
            writer.write_u16::<LittleEndian>(v as u16)?;
        }
    }
    Ok(())
}

/// Serialize a matrix into a fresh byte vector
pub fn matrix_to_bytes(matrix: &ZMatrix, q: u64) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(entry_width(q) * matrix.rows() * matrix.cols());
    write_matrix(&mut out, matrix, q)?;
    Ok(out)
}

/// Parse a rows×cols matrix stored by [`write_matrix`]
pub fn matrix_from_bytes(bytes: &[u8], rows: usize, cols: usize, q: u64) -> Result<ZMatrix> {
    let width = entry_width(q);
    if bytes.len() != width * rows * cols {
        return Err(encoding_err!(
            "expected {} bytes for a {}x{} matrix, got {}",
            width * rows * cols,
            rows,
            cols,
            bytes.len()
        ));
    }
    let mut cursor = Cursor::new(bytes);
    let mut data = Vec::with_capacity(rows * cols);
    for _ in 0..rows * cols {
        let v = if width == 4 {
            cursor.read_u32::<LittleEndian>()? as u64
        } else {
            cursor.read_u16::<LittleEndian>()? as u64
        };
        if v >= q {
            return Err(encoding_err!("entry {} is not reduced mod {}", v, q));
        }
        data.push(v as i64);
    }
    Ok(ZMatrix::from_vec(rows, cols, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_encode_known_message() {
        let params = FrodoParams::reference();
        let mut message = vec![0u8; 16];
        // 0b1110_0100: symbols 0, 1, 2, 3
        message[0] = 0xE4;
        let m = encode_message(&message, &params);
        let step = params.step() as i64;
        assert_eq!(&m.row(0)[..4], &[0, step, 2 * step, 3 * step]);
        assert!(m.as_slice()[4..].iter().all(|&x| x == 0));
    }

    #[test]
    fn test_codec_roundtrip() {
        let params = FrodoParams::reference();
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(99);
        for _ in 0..200 {
            let mut message = vec![0u8; params.message_bytes];
            rng.fill(&mut message[..]);
            let decoded = decode_message(&encode_message(&message, &params), &params);
            assert_eq!(decoded, message);
        }
    }

    #[test]
    fn test_codec_noise_tolerance() {
        for params in [FrodoParams::reference(), FrodoParams::weak_prime()] {
            let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(1234);
            // strictly below step/2, which is q/8 for power-of-two q
            let max_noise = ((params.step() - 1) / 2) as i64;
            for _ in 0..200 {
                let mut message = vec![0u8; params.message_bytes];
                rng.fill(&mut message[..]);
                let encoded = encode_message(&message, &params);
                let noisy = encoded
                    .map(|x| x + rng.gen_range(-max_noise..=max_noise))
                    .reduce_mod(params.q);
                assert_eq!(decode_message(&noisy, &params), message);
            }
        }
    }

    #[test]
    fn test_noise_at_extremes() {
        let params = FrodoParams::reference();
        let message = vec![0xFFu8; 16];
        let edge = (params.q / 8 - 1) as i64;
        for noise in [edge, -edge] {
            let noisy = encode_message(&message, &params).map(|x| x + noise);
            assert_eq!(decode_message(&noisy, &params), message);
        }
    }

    #[test]
    fn test_matrix_bytes_roundtrip() {
        let q = 1 << 15;
        let m = ZMatrix::from_rows(vec![vec![0, -1, 3], vec![q as i64 - 1, 17, -3]]);
        let bytes = matrix_to_bytes(&m, q).unwrap();
        assert_eq!(bytes.len(), 12);
        // -1 is stored as q - 1
        assert_eq!(&bytes[2..4], &((q - 1) as u16).to_le_bytes());
        let back = matrix_from_bytes(&bytes, 2, 3, q).unwrap();
        assert_eq!(back, m.reduce_mod(q));
    }

    #[test]
    fn test_wide_modulus_uses_32_bits() {
        let q = 65537;
        let m = ZMatrix::from_rows(vec![vec![65536, -1]]);
        let bytes = matrix_to_bytes(&m, q).unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(matrix_from_bytes(&bytes, 1, 2, q).unwrap().as_slice(), &[65536, 65536]);
    }

    #[test]
    fn test_matrix_rejects_unreduced_entry() {
        let bytes = 40000u16.to_le_bytes();
        assert!(matrix_from_bytes(&bytes, 1, 1, 1 << 15).is_err());
    }

    #[test]
    fn test_matrix_wrong_length() {
        assert!(matrix_from_bytes(&[0u8; 5], 1, 3, 1 << 15).is_err());
    }
}
