use super::common::{parse_and_validate, NodeType, COMMON_HEADER_SIZE};
use crate::compress::Compression;
use crate::error::FsError;
use crate::key::Key;

/// Decoded fields from an inode node.
#[derive(Debug, Clone)]
pub struct InodeNode {
    pub key: Key,
    pub size: u64,
    pub atime_sec: u64,
    pub ctime_sec: u64,
    pub mtime_sec: u64,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
    pub mode: u32,
    pub flags: u32,
    pub data_len: u32,
    pub compr_type: Compression,
    /// Fast-symlink target or small xattr payload stored inline, `data_len`
    /// bytes trailing the fixed header.
    pub inline_data: Vec<u8>,
    pub sqnum: u64,
}

mod field_offset {
    pub const KEY: usize = 0;
    pub const CREAT_SQNUM: usize = 8;
    pub const SIZE: usize = 16;
    pub const ATIME_SEC: usize = 24;
    pub const CTIME_SEC: usize = 32;
    pub const MTIME_SEC: usize = 40;
    pub const ATIME_NSEC: usize = 48;
    pub const CTIME_NSEC: usize = 52;
    pub const MTIME_NSEC: usize = 56;
    pub const NLINK: usize = 60;
    pub const UID: usize = 64;
    pub const GID: usize = 68;
    pub const MODE: usize = 72;
    pub const FLAGS: usize = 76;
    pub const DATA_LEN: usize = 80;
    pub const XATTR_CNT: usize = 84;
    pub const XATTR_SIZE: usize = 88;
    pub const XATTR_NAMES: usize = 96;
    pub const COMPR_TYPE: usize = 100;
    pub const FIXED_SIZE: usize = 126;
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap())
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
}

impl InodeNode {
    pub fn parse(bytes: &[u8], lnum: u32, offset: u32) -> Result<Self, FsError> {
        let header = parse_and_validate(bytes, lnum, offset)?;
        if header.node_type != NodeType::Inode as u8 {
            return Err(FsError::UnknownNodeType(header.node_type));
        }
        let payload = &bytes[COMMON_HEADER_SIZE..header.len.get() as usize];
        if payload.len() < field_offset::FIXED_SIZE {
            return Err(FsError::NodeCrcMismatch { lnum, offset });
        }
        let key = Key::from_raw(payload[field_offset::KEY..field_offset::KEY + 8].try_into().unwrap())
            .ok_or(FsError::NodeCrcMismatch { lnum, offset })?;
        let data_len = read_u32(payload, field_offset::DATA_LEN);
        let compr_type = Compression::from_raw(read_u16(payload, field_offset::COMPR_TYPE))
            .ok_or(FsError::UnknownCompression(0))?;
        let inline_data = payload
            .get(field_offset::FIXED_SIZE..field_offset::FIXED_SIZE + data_len as usize)
            .unwrap_or(&[])
            .to_vec();

        let _xattr_cnt = read_u32(payload, field_offset::XATTR_CNT);
        let _xattr_size = read_u32(payload, field_offset::XATTR_SIZE);
        let _xattr_names = read_u32(payload, field_offset::XATTR_NAMES);
        let _creat_sqnum = read_u64(payload, field_offset::CREAT_SQNUM);

        Ok(Self {
            key,
            size: read_u64(payload, field_offset::SIZE),
            atime_sec: read_u64(payload, field_offset::ATIME_SEC),
            ctime_sec: read_u64(payload, field_offset::CTIME_SEC),
            mtime_sec: read_u64(payload, field_offset::MTIME_SEC),
            nlink: read_u32(payload, field_offset::NLINK),
            uid: read_u32(payload, field_offset::UID),
            gid: read_u32(payload, field_offset::GID),
            mode: read_u32(payload, field_offset::MODE),
            flags: read_u32(payload, field_offset::FLAGS),
            data_len,
            compr_type,
            inline_data,
            sqnum: header.sqnum.get(),
        })
    }

    pub fn is_unlinked(&self) -> bool {
        self.nlink == 0
    }
}
