//! Endian-aware fixed-width number types for reading on-flash structures
//! directly out of byte slices with `bytemuck`.

pub mod endian;
pub mod number;

pub use endian::{BigEndian, Endianness, LittleEndian};
pub use number::{BE16, BE32, BE64, LE16, LE32, LE64};
