use super::common::{parse_and_validate, NodeType, COMMON_HEADER_SIZE};
use crate::error::FsError;

/// A log-area reference node: points at one active "bud" LEB holding
/// unindexed writes for a given journal head.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceNode {
    pub lnum: u32,
    pub offs: u32,
    pub jhead: u32,
    pub sqnum: u64,
}

impl ReferenceNode {
    pub fn parse(bytes: &[u8], lnum: u32, offset: u32) -> Result<Self, FsError> {
        let header = parse_and_validate(bytes, lnum, offset)?;
        if header.node_type != NodeType::Reference as u8 {
            return Err(FsError::UnknownNodeType(header.node_type));
        }
        let node_len = header.len.get() as usize;
        let payload = &bytes[COMMON_HEADER_SIZE..node_len];
        if payload.len() < 12 {
            return Err(FsError::NodeCrcMismatch { lnum, offset });
        }
        Ok(Self {
            lnum: u32::from_le_bytes(payload[0..4].try_into().unwrap()),
            offs: u32::from_le_bytes(payload[4..8].try_into().unwrap()),
            jhead: u32::from_le_bytes(payload[8..12].try_into().unwrap()),
            sqnum: header.sqnum.get(),
        })
    }
}
