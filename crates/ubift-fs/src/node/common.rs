use crate::error::FsError;
use ubift_common::crc32::checksum;
use ubift_common::types::{LE32, LE64};

pub const NODE_MAGIC: u32 = 0x0610_1831;
pub const COMMON_HEADER_SIZE: usize = core::mem::size_of::<CommonHeaderRaw>();

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Inode = 0,
    Data = 1,
    Dentry = 2,
    XattrEntry = 3,
    Truncation = 4,
    Padding = 5,
    Superblock = 6,
    Master = 7,
    Reference = 8,
    Index = 9,
    CommitStart = 10,
    Orphan = 11,
}

impl NodeType {
    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => Self::Inode,
            1 => Self::Data,
            2 => Self::Dentry,
            3 => Self::XattrEntry,
            4 => Self::Truncation,
            5 => Self::Padding,
            6 => Self::Superblock,
            7 => Self::Master,
            8 => Self::Reference,
            9 => Self::Index,
            10 => Self::CommitStart,
            11 => Self::Orphan,
            _ => return None,
        })
    }
}

/// The 24-byte header common to every UBIFS node (`ubifs_ch`).
#[repr(C, packed)]
#[derive(Clone, Copy, bytemuck::NoUninit, bytemuck::AnyBitPattern)]
pub struct CommonHeaderRaw {
    pub magic: LE32,
    pub crc: LE32,
    pub sqnum: LE64,
    pub len: LE32,
    pub node_type: u8,
    pub group_type: u8,
    pub padding: [u8; 2],
}

/// Parses and CRC-validates the node starting at `bytes[0..]`. The CRC
/// covers every byte from offset 8 (just past the magic and CRC fields)
/// through the node's declared length.
pub fn parse_and_validate(bytes: &[u8], lnum: u32, offset: u32) -> Result<CommonHeaderRaw, FsError> {
    if bytes.len() < COMMON_HEADER_SIZE {
        return Err(FsError::BadNodeMagic {
            lnum,
            offset,
            magic: 0,
        });
    }
    let header: CommonHeaderRaw = bytemuck::pod_read_unaligned(&bytes[..COMMON_HEADER_SIZE]);
    if header.magic.get() != NODE_MAGIC {
        return Err(FsError::BadNodeMagic {
            lnum,
            offset,
            magic: header.magic.get(),
        });
    }
    let len = header.len.get() as usize;
    if bytes.len() < len || len < COMMON_HEADER_SIZE {
        return Err(FsError::NodeCrcMismatch { lnum, offset });
    }
    let computed = checksum(&bytes[8..len]);
    if computed != header.crc.get() {
        return Err(FsError::NodeCrcMismatch { lnum, offset });
    }
    Ok(header)
}
