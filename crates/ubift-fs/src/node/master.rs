use super::common::{parse_and_validate, NodeType, COMMON_HEADER_SIZE};
use crate::error::FsError;

/// Decoded fields from a master node (LEB 1 or LEB 2).
#[derive(Debug, Clone, Copy)]
pub struct MasterNode {
    pub commit_number: u64,
    pub log_lnum: u32,
    pub root_lnum: u32,
    pub root_offs: u32,
    pub root_len: u32,
    pub gc_lnum: u32,
    pub lpt_lnum: u32,
    pub lpt_offs: u32,
}

mod field_offset {
    pub const HIGHEST_INUM: usize = 0;
    pub const CMT_NO: usize = 8;
    pub const FLAGS: usize = 16;
    pub const LOG_LNUM: usize = 20;
    pub const ROOT_LNUM: usize = 24;
    pub const ROOT_OFFS: usize = 28;
    pub const ROOT_LEN: usize = 32;
    pub const GC_LNUM: usize = 36;
    pub const LPT_LNUM: usize = 88;
    pub const LPT_OFFS: usize = 92;
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap())
}

impl MasterNode {
    pub fn parse(leb: &[u8], lnum: u32) -> Result<Self, FsError> {
        let header = parse_and_validate(leb, lnum, 0)?;
        if header.node_type != NodeType::Master as u8 {
            return Err(FsError::InvalidSuperblock("node type is not master"));
        }
        let payload = &leb[COMMON_HEADER_SIZE..];
        if payload.len() < field_offset::LPT_OFFS + 4 {
            return Err(FsError::InvalidSuperblock("master payload too short"));
        }
        let _highest_inum = read_u64(payload, field_offset::HIGHEST_INUM);
        let _flags = read_u32(payload, field_offset::FLAGS);
        Ok(Self {
            commit_number: read_u64(payload, field_offset::CMT_NO),
            log_lnum: read_u32(payload, field_offset::LOG_LNUM),
            root_lnum: read_u32(payload, field_offset::ROOT_LNUM),
            root_offs: read_u32(payload, field_offset::ROOT_OFFS),
            root_len: read_u32(payload, field_offset::ROOT_LEN),
            gc_lnum: read_u32(payload, field_offset::GC_LNUM),
            lpt_lnum: read_u32(payload, field_offset::LPT_LNUM),
            lpt_offs: read_u32(payload, field_offset::LPT_OFFS),
        })
    }
}

/// Parses both master node copies (LEBs 1 and 2) and picks whichever
/// validates with the higher commit number, per the bootstrap contract.
pub fn pick_master(leb1: Option<&[u8]>, leb2: Option<&[u8]>) -> Result<MasterNode, FsError> {
    let a = leb1.and_then(|leb| MasterNode::parse(leb, 1).ok());
    let b = leb2.and_then(|leb| MasterNode::parse(leb, 2).ok());
    match (a, b) {
        (Some(a), Some(b)) => Ok(if b.commit_number > a.commit_number { b } else { a }),
        (Some(a), None) => Ok(a),
        (None, Some(b)) => Ok(b),
        (None, None) => Err(FsError::NoValidMaster),
    }
}
