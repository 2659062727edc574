//! Fixed-width little-endian float vectors.
//!
//! A byte field of `n` bytes holds `n / 4` single-precision floats, packed
//! back to back in stream order. [`f32_from_le_bytes`] insists that `n` is a
//! multiple of four; [`f32_from_le_bytes_truncated`] drops the remainder.

use std::io::{ErrorKind, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{NodeError, NodeResult};
use crate::node::Node;

const FORMAT: &str = "f32le";
const WIDTH: usize = 4;

/// Decode a whole buffer; a length that is not a multiple of four is an error.
pub fn f32_from_le_bytes(bytes: &[u8]) -> NodeResult<Vec<f32>> {
    if bytes.len() % WIDTH != 0 {
        return Err(NodeError::decode(
            FORMAT,
            format!(
                "{} bytes is not a multiple of {WIDTH} ({} trailing)",
                bytes.len(),
                bytes.len() % WIDTH
            ),
        ));
    }
    read_f32_le(bytes, bytes.len() / WIDTH)
}

/// Decode `floor(len / 4)` floats and ignore any trailing bytes.
pub fn f32_from_le_bytes_truncated(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(WIDTH)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Read exactly `count` floats from `reader`.
///
/// A reader that runs dry early is a decode error; the result is never
/// short or zero-padded.
pub fn read_f32_le<R: Read>(mut reader: R, count: usize) -> NodeResult<Vec<f32>> {
    let mut out = vec![0f32; count];
    reader
        .read_f32_into::<LittleEndian>(&mut out)
        .map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => NodeError::decode(
                FORMAT,
                format!("short read: expected {} bytes", count * WIDTH),
            ),
            _ => NodeError::Io {
                context: "reading f32 vector".into(),
                source: e,
            },
        })?;
    Ok(out)
}

impl Node {
    /// Interpret a bytes node as a little-endian `f32` vector.
    pub fn to_f32_vec(&self) -> NodeResult<Vec<f32>> {
        f32_from_le_bytes(self.as_bytes()?)
    }
}
