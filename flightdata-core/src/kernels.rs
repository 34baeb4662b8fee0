//! Numeric kernels: safe word reads, constant detection and power-of-two tests
//!
//! The `read_*` functions follow a "safe read" policy suited to speculative
//! scanning: a negative index wraps once against the buffer length and any
//! read that would run past either end returns 0 instead of failing.
//!
//! Unchecked counterparts are crate-private. They are only called by the
//! aligner after it has proven the whole window is in bounds.

/// Normalize `idx` against `len` and return the start of a `width`-byte read,
/// or `None` if the read does not fit.
#[inline]
fn read_start(len: usize, idx: isize, width: usize) -> Option<usize> {
    let idx = if idx < 0 { idx + len as isize } else { idx };
    if idx < 0 {
        return None;
    }
    let idx = idx as usize;
    match idx.checked_add(width) {
        Some(end) if end <= len => Some(idx),
        _ => None,
    }
}

/// Read a little-endian 16-bit word at `idx`, or 0 if out of bounds
#[inline]
pub fn read_u16_le(buf: &[u8], idx: isize) -> u16 {
    match read_start(buf.len(), idx, 2) {
        Some(i) => u16::from_le_bytes([buf[i], buf[i + 1]]),
        None => 0,
    }
}

/// Read a big-endian 16-bit word at `idx`, or 0 if out of bounds
#[inline]
pub fn read_u16_be(buf: &[u8], idx: isize) -> u16 {
    match read_start(buf.len(), idx, 2) {
        Some(i) => u16::from_be_bytes([buf[i], buf[i + 1]]),
        None => 0,
    }
}

/// Read a little-endian 32-bit word at `idx`, or 0 if out of bounds
#[inline]
pub fn read_u32_le(buf: &[u8], idx: isize) -> u32 {
    match read_start(buf.len(), idx, 4) {
        Some(i) => u32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]),
        None => 0,
    }
}

/// Read a big-endian 32-bit word at `idx`, or 0 if out of bounds
#[inline]
pub fn read_u32_be(buf: &[u8], idx: isize) -> u32 {
    match read_start(buf.len(), idx, 4) {
        Some(i) => u32::from_be_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]),
        None => 0,
    }
}

/// Read a 16-bit word in the requested byte order without bounds checks.
///
/// # Safety
///
/// `idx + 1` must be a valid index into `buf`.
#[inline(always)]
pub(crate) unsafe fn read_u16_unchecked(buf: &[u8], idx: usize, little_endian: bool) -> u16 {
    let pair = [*buf.get_unchecked(idx), *buf.get_unchecked(idx + 1)];
    if little_endian {
        u16::from_le_bytes(pair)
    } else {
        u16::from_be_bytes(pair)
    }
}

/// Endian-selected safe 16-bit read
#[inline]
pub fn read_u16(buf: &[u8], idx: isize, little_endian: bool) -> u16 {
    if little_endian {
        read_u16_le(buf, idx)
    } else {
        read_u16_be(buf, idx)
    }
}

/// True if every element equals the first (vacuously true for `len <= 1`)
pub fn is_constant<T: PartialEq>(data: &[T]) -> bool {
    match data.split_first() {
        Some((first, rest)) => rest.iter().all(|v| v == first),
        None => true,
    }
}

/// `is_constant` for bytes, comparing eight bytes at a time
pub fn is_constant_u8(data: &[u8]) -> bool {
    let Some(&first) = data.first() else {
        return true;
    };
    let pattern = u64::from_ne_bytes([first; 8]);
    let mut chunks = data.chunks_exact(8);
    for chunk in &mut chunks {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        if u64::from_ne_bytes(word) != pattern {
            return false;
        }
    }
    chunks.remainder().iter().all(|&b| b == first)
}

/// `is_constant` for 16-bit words, comparing four words at a time
pub fn is_constant_u16(data: &[u16]) -> bool {
    let Some(&first) = data.first() else {
        return true;
    };
    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        if chunk[0] != first || chunk[1] != first || chunk[2] != first || chunk[3] != first {
            return false;
        }
    }
    chunks.remainder().iter().all(|&w| w == first)
}

/// A borrowed sample array of one of the supported element widths
#[derive(Debug, Clone, Copy)]
pub enum Samples<'a> {
    /// 8-bit unsigned samples
    U8(&'a [u8]),
    /// 16-bit unsigned samples
    U16(&'a [u16]),
    /// 32-bit unsigned samples
    U32(&'a [u32]),
    /// 64-bit unsigned samples
    U64(&'a [u64]),
    /// 64-bit signed samples
    I64(&'a [i64]),
    /// 64-bit float samples
    F64(&'a [f64]),
}

impl Samples<'_> {
    /// Number of samples
    pub fn len(&self) -> usize {
        match self {
            Samples::U8(d) => d.len(),
            Samples::U16(d) => d.len(),
            Samples::U32(d) => d.len(),
            Samples::U64(d) => d.len(),
            Samples::I64(d) => d.len(),
            Samples::F64(d) => d.len(),
        }
    }

    /// True if there are no samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width-dispatched [`is_constant`]
    pub fn is_constant(&self) -> bool {
        match self {
            Samples::U8(d) => is_constant_u8(d),
            Samples::U16(d) => is_constant_u16(d),
            Samples::U32(d) => is_constant(d),
            Samples::U64(d) => is_constant(d),
            Samples::I64(d) => is_constant(d),
            Samples::F64(d) => is_constant(d),
        }
    }
}

/// True if `n` is a positive integer power of two (1, 2, 4, ...)
pub fn is_power2(n: f64) -> bool {
    if !(n >= 1.0) || n.fract() != 0.0 || n > u64::MAX as f64 {
        return false;
    }
    (n as u64).is_power_of_two()
}

/// True if `n` is a power of two or a reciprocal power of two (1/2, 1/4, ...)
pub fn is_power2_fraction(n: f64) -> bool {
    if n >= 1.0 {
        return is_power2(n);
    }
    if !(n > 0.0) {
        return false;
    }
    is_power2(1.0 / n)
}

/// Swap every pair of bytes in place; a trailing odd byte is left untouched
pub fn swap_byte_pairs(data: &mut [u8]) {
    for pair in data.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
}

/// Reverse the byte order of every 16-bit word in place
pub fn swap_u16(data: &mut [u16]) {
    for word in data.iter_mut() {
        *word = word.swap_bytes();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u16() {
        let buf = [0x01, 0x02, 0x03];
        assert_eq!(read_u16_le(&buf, 0), 0x0201);
        assert_eq!(read_u16_be(&buf, 0), 0x0102);
        assert_eq!(read_u16_le(&buf, 1), 0x0302);
        assert_eq!(read_u16_le(&buf, 2), 0);
        assert_eq!(read_u16_le(&buf, -2), 0x0302);
        assert_eq!(read_u16_be(&buf, -3), 0x0102);
        assert_eq!(read_u16_le(&buf, -4), 0);
        assert_eq!(read_u16_le(&[], 0), 0);
    }

    #[test]
    fn test_read_u32() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x05];
        assert_eq!(read_u32_le(&buf, 0), 0x0403_0201);
        assert_eq!(read_u32_be(&buf, 1), 0x0203_0405);
        assert_eq!(read_u32_le(&buf, 2), 0);
        assert_eq!(read_u32_be(&buf, -4), 0x0203_0405);
        assert_eq!(read_u32_le(&buf, isize::MAX), 0);
    }

    #[test]
    fn test_unchecked_matches_checked() {
        let buf = [0xAB, 0xCD, 0xEF];
        for idx in 0..2 {
            let le = unsafe { read_u16_unchecked(&buf, idx, true) };
            let be = unsafe { read_u16_unchecked(&buf, idx, false) };
            assert_eq!(le, read_u16_le(&buf, idx as isize));
            assert_eq!(be, read_u16_be(&buf, idx as isize));
        }
    }

    #[test]
    fn test_is_constant() {
        assert!(is_constant::<u32>(&[]));
        assert!(is_constant(&[5u32]));
        assert!(is_constant(&[1.5f64, 1.5, 1.5]));
        assert!(!is_constant(&[1i64, 1, 2]));

        let mut bytes = [7u8; 19];
        assert!(is_constant_u8(&bytes));
        bytes[18] = 8;
        assert!(!is_constant_u8(&bytes));
        bytes[18] = 7;
        bytes[3] = 0;
        assert!(!is_constant_u8(&bytes));

        let mut words = [300u16; 9];
        assert!(is_constant_u16(&words));
        words[8] = 1;
        assert!(!is_constant_u16(&words));
    }

    #[test]
    fn test_samples_dispatch() {
        assert!(Samples::U8(&[1, 1, 1]).is_constant());
        assert!(!Samples::U16(&[1, 2]).is_constant());
        assert!(Samples::F64(&[]).is_constant());
        assert!(Samples::F64(&[]).is_empty());
        assert_eq!(Samples::I64(&[1, 2, 3]).len(), 3);
    }

    #[test]
    fn test_is_power2() {
        let powers: Vec<u32> = (0..2000).filter(|&i| is_power2(i as f64)).collect();
        assert_eq!(powers, vec![1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024]);
        assert!(!is_power2(-2.0));
        assert!(!is_power2(0.5));
        assert!(!is_power2(f64::NAN));
    }

    #[test]
    fn test_is_power2_fraction() {
        let powers: Vec<u32> = (0..2000)
            .filter(|&i| is_power2_fraction(i as f64))
            .collect();
        assert_eq!(powers, vec![1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024]);
        for x in [0.5, 0.25, 0.125, 0.0625, 0.03125, 0.015625] {
            assert!(is_power2_fraction(x), "{x}");
        }
        assert!(!is_power2_fraction(0.75));
        assert!(!is_power2_fraction(2.2));
        assert!(!is_power2_fraction(-0.5));
    }

    #[test]
    fn test_swap() {
        let mut data = [1u8, 2, 3, 4, 5];
        swap_byte_pairs(&mut data);
        assert_eq!(data, [2, 1, 4, 3, 5]);

        let mut words = [0x1234u16, 0xABCD];
        swap_u16(&mut words);
        assert_eq!(words, [0x3412, 0xCDAB]);
    }
}
