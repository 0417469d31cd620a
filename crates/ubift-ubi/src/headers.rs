//! Raw on-flash layouts for the UBI erase-counter header, volume
//! identifier header, and volume table record.
//!
//! Every struct here is read by value straight out of image bytes via
//! `bytemuck::pod_read_unaligned`, never by pointer cast.

use ubift_common::types::{BE16, BE32, BE64};

pub const EC_HEADER_MAGIC: [u8; 4] = *b"UBI#";
pub const VID_HEADER_MAGIC: [u8; 4] = *b"UBI!";
pub const UBI_VERSION: u8 = 1;

/// Volume id reserved for the layout volume (the redundant pair of volume
/// table copies).
pub const LAYOUT_VOLUME_ID: u32 = 0x7FFF_EFFF;

pub const VTBL_RECORD_SIZE: usize = core::mem::size_of::<VtblRecordRaw>();

#[repr(C, packed)]
#[derive(Clone, Copy, bytemuck::NoUninit, bytemuck::AnyBitPattern)]
pub struct EcHeaderRaw {
    pub magic: [u8; 4],
    pub version: u8,
    pub padding1: [u8; 3],
    pub ec: BE64,
    pub vid_hdr_offset: BE32,
    pub data_offset: BE32,
    pub image_seq: BE32,
    pub padding2: [u8; 32],
    pub hdr_crc: BE32,
}

static_assertions::const_assert_eq!(core::mem::size_of::<EcHeaderRaw>(), 64);

impl EcHeaderRaw {
    /// Offset of `hdr_crc` within the struct, for CRC-with-field-zeroed.
    pub const CRC_OFFSET: usize = 60;

    pub fn has_magic(&self) -> bool {
        self.magic == EC_HEADER_MAGIC
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolType {
    Dynamic = 1,
    Static = 2,
}

impl VolType {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::Dynamic),
            2 => Some(Self::Static),
            _ => None,
        }
    }
}

#[repr(C, packed)]
#[derive(Clone, Copy, bytemuck::NoUninit, bytemuck::AnyBitPattern)]
pub struct VidHeaderRaw {
    pub magic: [u8; 4],
    pub version: u8,
    pub vol_type: u8,
    pub copy_flag: u8,
    pub compat: u8,
    pub vol_id: BE32,
    pub lnum: BE32,
    pub padding1: [u8; 4],
    pub data_size: BE32,
    pub used_ebs: BE32,
    pub data_pad: BE32,
    pub data_crc: BE32,
    pub padding2: [u8; 4],
    pub sqnum: BE64,
    pub padding3: [u8; 12],
    pub hdr_crc: BE32,
}

static_assertions::const_assert_eq!(core::mem::size_of::<VidHeaderRaw>(), 64);

impl VidHeaderRaw {
    pub const CRC_OFFSET: usize = 60;

    pub fn has_magic(&self) -> bool {
        self.magic == VID_HEADER_MAGIC
    }
}

#[repr(C, packed)]
#[derive(Clone, Copy, bytemuck::NoUninit, bytemuck::AnyBitPattern)]
pub struct VtblRecordRaw {
    pub reserved_pebs: BE32,
    pub alignment: BE32,
    pub data_pad: BE32,
    pub vol_type: u8,
    pub upd_marker: u8,
    pub name_len: BE16,
    pub name: [u8; 128],
    pub flags: u8,
    pub padding: [u8; 23],
    pub crc: BE32,
}

static_assertions::const_assert_eq!(core::mem::size_of::<VtblRecordRaw>(), 172);

impl VtblRecordRaw {
    pub const CRC_OFFSET: usize = 168;

    pub fn is_empty_record(&self) -> bool {
        self.name_len.get() == 0 && self.reserved_pebs.get() == 0
    }
}
