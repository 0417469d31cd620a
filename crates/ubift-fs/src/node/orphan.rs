use super::common::{parse_and_validate, NodeType, COMMON_HEADER_SIZE};
use crate::error::FsError;

/// An orphan node: a batch of inode numbers that were unlinked while still
/// open at the last commit, kept around until a later commit garbage
/// collects them. Every inode listed here is live (recoverable) material.
#[derive(Debug, Clone)]
pub struct OrphanNode {
    pub commit_number: u64,
    pub inodes: Vec<u64>,
    pub sqnum: u64,
}

impl OrphanNode {
    pub fn parse(bytes: &[u8], lnum: u32, offset: u32) -> Result<Self, FsError> {
        let header = parse_and_validate(bytes, lnum, offset)?;
        if header.node_type != NodeType::Orphan as u8 {
            return Err(FsError::UnknownNodeType(header.node_type));
        }
        let node_len = header.len.get() as usize;
        let payload = &bytes[COMMON_HEADER_SIZE..node_len];
        if payload.len() < 8 {
            return Err(FsError::NodeCrcMismatch { lnum, offset });
        }
        let raw_cmt_no = u64::from_le_bytes(payload[0..8].try_into().unwrap());
        // The top bit marks "last orphan node of this commit"; mask it off
        // to recover the plain commit number.
        let commit_number = raw_cmt_no & !(1u64 << 63);

        let mut inodes = Vec::new();
        let mut cursor = 8;
        while cursor + 8 <= payload.len() {
            inodes.push(u64::from_le_bytes(payload[cursor..cursor + 8].try_into().unwrap()));
            cursor += 8;
        }

        Ok(Self {
            commit_number,
            inodes,
            sqnum: header.sqnum.get(),
        })
    }
}
