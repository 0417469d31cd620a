#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

/// CRC32 checksums.
pub mod crc32;
/// Fixed-width byte strings for on-flash names (volume names, dentry names).
pub mod bytestr;
/// Endian-aware fixed-width number types.
pub mod types;
