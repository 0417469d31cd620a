//! Endianness markers used by the fixed-width number types in
//! [`super::number`].
//!
//! UBI headers are big-endian on flash; UBIFS nodes are little-endian. Both
//! layers share the same generic number types parameterised over one of
//! these zero-sized marker types, so there's exactly one place that knows
//! how to read/write a `u16`/`u32`/`u64` in a given byte order.

/// A type-level marker for a byte order, implemented by [`LittleEndian`] and
/// [`BigEndian`].
pub trait Endianness: Copy + Sized {
    fn get_u16(bytes: [u8; 2]) -> u16;
    fn set_u16(value: u16, bytes: &mut [u8; 2]);
    fn get_u32(bytes: [u8; 4]) -> u32;
    fn set_u32(value: u32, bytes: &mut [u8; 4]);
    fn get_u64(bytes: [u8; 8]) -> u64;
    fn set_u64(value: u64, bytes: &mut [u8; 8]);
}

/// Little-endian byte order, as used by UBIFS on-flash nodes.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, bytemuck::Zeroable, bytemuck::Pod)]
pub struct LittleEndian;

/// Big-endian byte order, as used by UBI EC/VID headers and the volume
/// table.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, bytemuck::Zeroable, bytemuck::Pod)]
pub struct BigEndian;

impl Endianness for LittleEndian {
    #[inline]
    fn get_u16(bytes: [u8; 2]) -> u16 {
        u16::from_le_bytes(bytes)
    }
    #[inline]
    fn set_u16(value: u16, bytes: &mut [u8; 2]) {
        bytes.copy_from_slice(&value.to_le_bytes());
    }
    #[inline]
    fn get_u32(bytes: [u8; 4]) -> u32 {
        u32::from_le_bytes(bytes)
    }
    #[inline]
    fn set_u32(value: u32, bytes: &mut [u8; 4]) {
        bytes.copy_from_slice(&value.to_le_bytes());
    }
    #[inline]
    fn get_u64(bytes: [u8; 8]) -> u64 {
        u64::from_le_bytes(bytes)
    }
    #[inline]
    fn set_u64(value: u64, bytes: &mut [u8; 8]) {
        bytes.copy_from_slice(&value.to_le_bytes());
    }
}

impl Endianness for BigEndian {
    #[inline]
    fn get_u16(bytes: [u8; 2]) -> u16 {
        u16::from_be_bytes(bytes)
    }
    #[inline]
    fn set_u16(value: u16, bytes: &mut [u8; 2]) {
        bytes.copy_from_slice(&value.to_be_bytes());
    }
    #[inline]
    fn get_u32(bytes: [u8; 4]) -> u32 {
        u32::from_be_bytes(bytes)
    }
    #[inline]
    fn set_u32(value: u32, bytes: &mut [u8; 4]) {
        bytes.copy_from_slice(&value.to_be_bytes());
    }
    #[inline]
    fn get_u64(bytes: [u8; 8]) -> u64 {
        u64::from_be_bytes(bytes)
    }
    #[inline]
    fn set_u64(value: u64, bytes: &mut [u8; 8]) {
        bytes.copy_from_slice(&value.to_be_bytes());
    }
}
