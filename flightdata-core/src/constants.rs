//! Constants for recorder frame formats

/// Label reported for ARINC 717 frames
pub const ARINC_717_LABEL: &str = "717";

/// ARINC 717 sync words for subframes 1 to 4 (12-bit values)
pub const ARINC_717_SYNC_WORDS: [u16; 4] = [0x247, 0x5B8, 0xA47, 0xDB8];

/// Only the low 12 bits of a 16-bit container word carry ARINC 717 data
pub const ARINC_717_SYNC_MASK: u16 = 0x0FFF;

/// Words-per-subframe rates defined for ARINC 717
pub const ARINC_717_WPS: [u16; 5] = [64, 128, 256, 512, 1024];

/// Bytes per 16-bit container word
pub const WORD_SIZE: usize = 2;

/// Smallest words-per-subframe accepted by default
pub const DEFAULT_MIN_WPS: u16 = 64;

/// Largest words-per-subframe accepted by default
pub const DEFAULT_MAX_WPS: u16 = 1024;

/// Default repair limit in seconds for masked-array repair
pub const DEFAULT_REPAIR_DURATION: f64 = 10.0;

/// Packed 12-bit streams store two words in this many bytes
pub const PACKED_12BIT_GROUP: usize = 3;

/// Mask selecting the 12 data bits of a word
pub const TWELVE_BIT_MASK: u16 = 0x0FFF;
