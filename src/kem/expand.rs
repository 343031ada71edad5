//! Seed expansion of the public matrix A

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake128;

use crate::math::ZMatrix;

/// Expand a seed into a rows×cols matrix over Z_q
///
/// SHAKE128(seed) yields `2·rows·cols` bytes; every little-endian 16-bit
/// chunk reduced mod q is one entry, filled row-major.
pub fn expand_a(seed: &[u8], rows: usize, cols: usize, q: u64) -> ZMatrix {
    let mut hasher = Shake128::default();
    hasher.update(seed);
    let mut reader = hasher.finalize_xof();

    let mut buf = vec![0u8; 2 * rows * cols];
    reader.read(&mut buf);

    let data = buf
        .chunks_exact(2)
        .map(|chunk| (u16::from_le_bytes([chunk[0], chunk[1]]) as u64 % q) as i64)
        .collect();
    ZMatrix::from_vec(rows, cols, data)
}
