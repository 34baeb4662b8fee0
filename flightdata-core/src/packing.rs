//! 12-bit word packing
//!
//! Packed recorder dumps store two 12-bit words in three bytes:
//!
//! ```text
//! byte 0: w0 bits 0-7
//! byte 1: w0 bits 8-11 (low nibble) | w1 bits 0-3 (high nibble)
//! byte 2: w1 bits 4-11
//! ```
//!
//! Unpacking widens each word into a 16-bit container so the stream can be
//! fed to the [`ByteAligner`](crate::aligner::ByteAligner).

use crate::constants::{PACKED_12BIT_GROUP, TWELVE_BIT_MASK, WORD_SIZE};
use alloc::vec::Vec;
use bytes::{BufMut, Bytes, BytesMut};

#[cfg(feature = "logging")]
use tracing::trace;

#[inline]
fn unpack_group(group: &[u8]) -> (u16, u16) {
    let (b0, b1, b2) = (group[0] as u16, group[1] as u16, group[2] as u16);
    (b0 | (b1 & 0x0F) << 8, b1 >> 4 | b2 << 4)
}

/// Unpack 12-bit words, three bytes to two words.
///
/// Trailing bytes that do not form a whole group are ignored.
pub fn unpack_12bit(packed: &[u8]) -> Vec<u16> {
    let mut words = Vec::with_capacity(packed.len() / PACKED_12BIT_GROUP * 2);
    for group in packed.chunks_exact(PACKED_12BIT_GROUP) {
        let (w0, w1) = unpack_group(group);
        words.push(w0);
        words.push(w1);
    }
    words
}

/// Unpack 12-bit words straight into 16-bit container bytes
pub fn unpack_12bit_to_bytes(packed: &[u8], little_endian: bool) -> Bytes {
    let groups = packed.len() / PACKED_12BIT_GROUP;
    let mut out = BytesMut::with_capacity(groups * 2 * WORD_SIZE);
    for group in packed.chunks_exact(PACKED_12BIT_GROUP) {
        let (w0, w1) = unpack_group(group);
        if little_endian {
            out.put_u16_le(w0);
            out.put_u16_le(w1);
        } else {
            out.put_u16(w0);
            out.put_u16(w1);
        }
    }
    out.freeze()
}

/// Pack words into 12-bit groups, two words to three bytes.
///
/// Only the low 12 bits of each word are kept. An odd final word is packed
/// with a zero partner.
pub fn pack_12bit(words: &[u16]) -> Vec<u8> {
    let mut packed = Vec::with_capacity(words.len().div_ceil(2) * PACKED_12BIT_GROUP);
    for pair in words.chunks(2) {
        let w0 = pair[0] & TWELVE_BIT_MASK;
        let w1 = pair.get(1).map_or(0, |w| w & TWELVE_BIT_MASK);
        packed.push((w0 & 0xFF) as u8);
        packed.push(((w0 >> 8) | (w1 & 0x0F) << 4) as u8);
        packed.push((w1 >> 4) as u8);
    }
    packed
}

/// Iterator adapter unpacking a chunked 12-bit stream.
///
/// Chunks may split a 3-byte group; the leftover bytes are carried into the
/// next chunk. Each item holds the 16-bit container bytes of all whole
/// groups available so far. Leftover bytes at the end of the stream are
/// dropped.
#[derive(Debug)]
pub struct Unpack12Bit<I> {
    chunks: I,
    carry: Vec<u8>,
    little_endian: bool,
}

impl<I> Unpack12Bit<I> {
    /// Wrap a chunk iterator
    pub fn new(chunks: I, little_endian: bool) -> Self {
        Self {
            chunks,
            carry: Vec::with_capacity(PACKED_12BIT_GROUP),
            little_endian,
        }
    }
}

impl<I, B> Iterator for Unpack12Bit<I>
where
    I: Iterator<Item = B>,
    B: AsRef<[u8]>,
{
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        loop {
            let Some(chunk) = self.chunks.next() else {
                #[cfg_attr(not(feature = "logging"), allow(unused_variables))]
                let dropped = self.carry.len();
                self.carry.clear();
                #[cfg(feature = "logging")]
                trace!("Dropping {} trailing packed bytes", dropped);
                return None;
            };
            let chunk = chunk.as_ref();

            let out = if self.carry.is_empty() {
                let whole = chunk.len() - chunk.len() % PACKED_12BIT_GROUP;
                self.carry.extend_from_slice(&chunk[whole..]);
                unpack_12bit_to_bytes(&chunk[..whole], self.little_endian)
            } else {
                let mut joined = core::mem::take(&mut self.carry);
                joined.extend_from_slice(chunk);
                let whole = joined.len() - joined.len() % PACKED_12BIT_GROUP;
                self.carry.extend_from_slice(&joined[whole..]);
                unpack_12bit_to_bytes(&joined[..whole], self.little_endian)
            };

            if !out.is_empty() {
                return Some(out);
            }
        }
    }
}
