use super::common::{parse_and_validate, NodeType, COMMON_HEADER_SIZE};
use crate::error::FsError;

/// A truncation node: records that an inode's data was truncated from
/// `old_size` to `new_size` between commits.
#[derive(Debug, Clone, Copy)]
pub struct TruncationNode {
    pub inum: u32,
    pub old_size: u64,
    pub new_size: u64,
    pub sqnum: u64,
}

impl TruncationNode {
    pub fn parse(bytes: &[u8], lnum: u32, offset: u32) -> Result<Self, FsError> {
        let header = parse_and_validate(bytes, lnum, offset)?;
        if header.node_type != NodeType::Truncation as u8 {
            return Err(FsError::UnknownNodeType(header.node_type));
        }
        let node_len = header.len.get() as usize;
        let payload = &bytes[COMMON_HEADER_SIZE..node_len];
        if payload.len() < 32 {
            return Err(FsError::NodeCrcMismatch { lnum, offset });
        }
        Ok(Self {
            inum: u32::from_le_bytes(payload[0..4].try_into().unwrap()),
            old_size: u64::from_le_bytes(payload[16..24].try_into().unwrap()),
            new_size: u64::from_le_bytes(payload[24..32].try_into().unwrap()),
            sqnum: header.sqnum.get(),
        })
    }
}
