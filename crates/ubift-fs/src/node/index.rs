use super::common::{parse_and_validate, NodeType, COMMON_HEADER_SIZE};
use crate::error::FsError;
use crate::key::Key;

/// One entry of an index node: the key of the subtree it roots, and where
/// to find that subtree (or leaf node).
#[derive(Debug, Clone, Copy)]
pub struct Branch {
    pub key: Key,
    pub lnum: u32,
    pub offs: u32,
    pub len: u32,
}

const BRANCH_SIZE: usize = 20;

/// An internal B+-tree node: a fixed-fanout array of branches, each
/// pointing either to another index node (if `level > 0`) or to a leaf
/// (data/dentry/inode) node.
#[derive(Debug, Clone)]
pub struct IndexNode {
    pub level: u16,
    pub branches: Vec<Branch>,
}

impl IndexNode {
    pub fn parse(bytes: &[u8], lnum: u32, offset: u32) -> Result<Self, FsError> {
        let header = parse_and_validate(bytes, lnum, offset)?;
        if header.node_type != NodeType::Index as u8 {
            return Err(FsError::UnknownNodeType(header.node_type));
        }
        let node_len = header.len.get() as usize;
        let payload = &bytes[COMMON_HEADER_SIZE..node_len];
        if payload.len() < 4 {
            return Err(FsError::NodeCrcMismatch { lnum, offset });
        }
        let child_cnt = u16::from_le_bytes(payload[0..2].try_into().unwrap()) as usize;
        let level = u16::from_le_bytes(payload[2..4].try_into().unwrap());

        let mut branches = Vec::with_capacity(child_cnt);
        let mut cursor = 4;
        for _ in 0..child_cnt {
            let entry = payload
                .get(cursor..cursor + BRANCH_SIZE)
                .ok_or(FsError::NodeCrcMismatch { lnum, offset })?;
            let key = Key::from_raw(entry[0..8].try_into().unwrap())
                .ok_or(FsError::NodeCrcMismatch { lnum, offset })?;
            branches.push(Branch {
                key,
                lnum: u32::from_le_bytes(entry[8..12].try_into().unwrap()),
                offs: u32::from_le_bytes(entry[12..16].try_into().unwrap()),
                len: u32::from_le_bytes(entry[16..20].try_into().unwrap()),
            });
            cursor += BRANCH_SIZE;
        }

        Ok(Self { level, branches })
    }

    pub fn is_leaf_level(&self) -> bool {
        self.level == 0
    }
}
