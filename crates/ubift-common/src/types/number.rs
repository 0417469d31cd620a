use crate::types::endian::{BigEndian, Endianness, LittleEndian};
use core::marker::PhantomData;

/// A 16-bit field stored in byte order `E`, read directly out of a
/// `#[repr(C, packed)]` on-flash struct.
#[repr(transparent)]
#[derive(Clone, Copy, bytemuck::Zeroable, bytemuck::Pod)]
pub struct U16<E: Endianness> {
    bytes: [u8; 2],
    _marker: PhantomData<E>,
}

impl<E: Endianness> U16<E> {
    pub fn new(value: u16) -> Self {
        let mut bytes = [0; 2];
        E::set_u16(value, &mut bytes);
        Self {
            bytes,
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> u16 {
        E::get_u16(self.bytes)
    }
}

impl<E: Endianness> core::fmt::Debug for U16<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("U16").field(&self.get()).finish()
    }
}

/// A 32-bit field stored in byte order `E`.
#[repr(transparent)]
#[derive(Clone, Copy, bytemuck::Zeroable, bytemuck::Pod)]
pub struct U32<E: Endianness> {
    bytes: [u8; 4],
    _marker: PhantomData<E>,
}

impl<E: Endianness> U32<E> {
    pub fn new(value: u32) -> Self {
        let mut bytes = [0; 4];
        E::set_u32(value, &mut bytes);
        Self {
            bytes,
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> u32 {
        E::get_u32(self.bytes)
    }
}

impl<E: Endianness> core::fmt::Debug for U32<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("U32").field(&self.get()).finish()
    }
}

/// A 64-bit field stored in byte order `E`.
#[repr(transparent)]
#[derive(Clone, Copy, bytemuck::Zeroable, bytemuck::Pod)]
pub struct U64<E: Endianness> {
    bytes: [u8; 8],
    _marker: PhantomData<E>,
}

impl<E: Endianness> U64<E> {
    pub fn new(value: u64) -> Self {
        let mut bytes = [0; 8];
        E::set_u64(value, &mut bytes);
        Self {
            bytes,
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> u64 {
        E::get_u64(self.bytes)
    }
}

impl<E: Endianness> core::fmt::Debug for U64<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("U64").field(&self.get()).finish()
    }
}

/// A big-endian `u16`, as used by UBI on-flash structures.
pub type BE16 = U16<BigEndian>;
/// A big-endian `u32`.
pub type BE32 = U32<BigEndian>;
/// A big-endian `u64`.
pub type BE64 = U64<BigEndian>;

/// A little-endian `u16`, as used by UBIFS on-flash nodes.
pub type LE16 = U16<LittleEndian>;
/// A little-endian `u32`.
pub type LE32 = U32<LittleEndian>;
/// A little-endian `u64`.
pub type LE64 = U64<LittleEndian>;
