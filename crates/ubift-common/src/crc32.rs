//! CRC32 over UBI/UBIFS on-flash structures.
//!
//! Both the UBI EC/VID headers and UBIFS node headers use the IEEE 802.3
//! polynomial (the same one `zlib`/`crc32()` in the Linux kernel use), so one
//! hasher wrapper covers every checksum in the stack.

use crc::{Crc, CRC_32_ISO_HDLC};

const HASHER: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Computes the IEEE 802.3 CRC32 of `data`.
pub fn checksum(data: &[u8]) -> u32 {
    HASHER.checksum(data)
}

/// Computes the CRC32 of `bytes` with the 4 bytes at `crc_field_offset`
/// treated as zero, matching the on-flash convention of storing the CRC
/// inside the structure it protects.
///
/// Panics if `crc_field_offset + 4 > bytes.len()`.
pub fn checksum_with_field_zeroed(bytes: &[u8], crc_field_offset: usize) -> u32 {
    assert!(crc_field_offset + 4 <= bytes.len());
    let mut digest = HASHER.digest();
    digest.update(&bytes[..crc_field_offset]);
    digest.update(&[0u8; 4]);
    digest.update(&bytes[crc_field_offset + 4..]);
    digest.finalize()
}
