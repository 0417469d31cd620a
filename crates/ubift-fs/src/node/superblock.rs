use super::common::{parse_and_validate, NodeType, COMMON_HEADER_SIZE};
use crate::compress::Compression;
use crate::error::FsError;

/// Decoded fields from the superblock node (LEB 0).
#[derive(Debug, Clone)]
pub struct Superblock {
    pub min_io_size: u32,
    pub leb_size: u32,
    pub leb_cnt: u32,
    pub max_leb_cnt: u32,
    pub log_lebs: u32,
    pub lpt_lebs: u32,
    pub orph_lebs: u32,
    pub fanout: u32,
    pub fmt_version: u32,
    pub default_compr: Compression,
}

/// Byte offsets of the fields we consume, relative to the start of the
/// payload that follows the 24-byte common header.
mod field_offset {
    pub const FLAGS: usize = 4;
    pub const MIN_IO_SIZE: usize = 8;
    pub const LEB_SIZE: usize = 12;
    pub const LEB_CNT: usize = 16;
    pub const MAX_LEB_CNT: usize = 20;
    pub const MAX_BUD_BYTES: usize = 24;
    pub const LOG_LEBS: usize = 32;
    pub const LPT_LEBS: usize = 36;
    pub const ORPH_LEBS: usize = 40;
    pub const JHEAD_CNT: usize = 44;
    pub const FANOUT: usize = 48;
    pub const LSAVE_CNT: usize = 52;
    pub const FMT_VERSION: usize = 56;
    pub const DEFAULT_COMPR: usize = 60;
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
}

impl Superblock {
    /// Parses and validates the superblock node, which occupies the whole
    /// of LEB 0.
    pub fn parse(leb: &[u8]) -> Result<Self, FsError> {
        let header = parse_and_validate(leb, 0, 0)?;
        if header.node_type != NodeType::Superblock as u8 {
            return Err(FsError::InvalidSuperblock("node type is not superblock"));
        }
        let payload = &leb[COMMON_HEADER_SIZE..];
        if payload.len() < field_offset::DEFAULT_COMPR + 2 {
            return Err(FsError::InvalidSuperblock("superblock payload too short"));
        }
        let _flags = read_u32(payload, field_offset::FLAGS);
        let _max_bud_bytes = read_u32(payload, field_offset::MAX_BUD_BYTES);
        let _jhead_cnt = read_u32(payload, field_offset::JHEAD_CNT);
        let _lsave_cnt = read_u32(payload, field_offset::LSAVE_CNT);
        let default_compr = Compression::from_raw(read_u16(payload, field_offset::DEFAULT_COMPR))
            .ok_or(FsError::InvalidSuperblock("unknown default compression tag"))?;

        Ok(Self {
            min_io_size: read_u32(payload, field_offset::MIN_IO_SIZE),
            leb_size: read_u32(payload, field_offset::LEB_SIZE),
            leb_cnt: read_u32(payload, field_offset::LEB_CNT),
            max_leb_cnt: read_u32(payload, field_offset::MAX_LEB_CNT),
            log_lebs: read_u32(payload, field_offset::LOG_LEBS),
            lpt_lebs: read_u32(payload, field_offset::LPT_LEBS),
            orph_lebs: read_u32(payload, field_offset::ORPH_LEBS),
            fanout: read_u32(payload, field_offset::FANOUT),
            fmt_version: read_u32(payload, field_offset::FMT_VERSION),
            default_compr,
        })
    }
}
