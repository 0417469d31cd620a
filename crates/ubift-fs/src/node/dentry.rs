use super::common::{parse_and_validate, NodeType, COMMON_HEADER_SIZE};
use crate::error::FsError;
use crate::key::Key;

/// A directory-entry node. `child_inum == 0` denotes a deletion tombstone:
/// the name of a removed file, kept so recovery can correlate it with a
/// salvaged inode.
#[derive(Debug, Clone)]
pub struct DentryNode {
    pub key: Key,
    pub child_inum: u64,
    pub dirent_type: u8,
    pub name: Vec<u8>,
    pub sqnum: u64,
}

const INUM_OFFSET: usize = 8;
const TYPE_OFFSET: usize = 16;
const NLEN_OFFSET: usize = 18;
const FIXED_SIZE: usize = 24;

impl DentryNode {
    pub fn parse(bytes: &[u8], lnum: u32, offset: u32) -> Result<Self, FsError> {
        let header = parse_and_validate(bytes, lnum, offset)?;
        if header.node_type != NodeType::Dentry as u8 && header.node_type != NodeType::XattrEntry as u8 {
            return Err(FsError::UnknownNodeType(header.node_type));
        }
        let node_len = header.len.get() as usize;
        let payload = &bytes[COMMON_HEADER_SIZE..node_len];
        if payload.len() < FIXED_SIZE {
            return Err(FsError::NodeCrcMismatch { lnum, offset });
        }
        let key = Key::from_raw(payload[0..8].try_into().unwrap())
            .ok_or(FsError::NodeCrcMismatch { lnum, offset })?;
        let child_inum = u64::from_le_bytes(payload[INUM_OFFSET..INUM_OFFSET + 8].try_into().unwrap());
        let dirent_type = payload[TYPE_OFFSET];
        let nlen = u16::from_le_bytes(payload[NLEN_OFFSET..NLEN_OFFSET + 2].try_into().unwrap()) as usize;
        let name = payload
            .get(FIXED_SIZE..FIXED_SIZE + nlen)
            .ok_or(FsError::NodeCrcMismatch { lnum, offset })?
            .to_vec();

        Ok(Self {
            key,
            child_inum,
            dirent_type,
            name,
            sqnum: header.sqnum.get(),
        })
    }

    pub fn is_tombstone(&self) -> bool {
        self.child_inum == 0
    }

    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyType;
    use crate::node::common::{CommonHeaderRaw, NODE_MAGIC};
    use ubift_common::crc32::checksum;
    use ubift_common::types::{LE32, LE64};

    fn build_dentry(parent: u32, hash: u32, child_inum: u64, name: &str) -> Vec<u8> {
        let key = Key::new(parent, KeyType::Dentry, hash);
        let mut fixed = Vec::new();
        fixed.extend_from_slice(&key.to_raw());
        fixed.extend_from_slice(&child_inum.to_le_bytes());
        fixed.push(0); // padding
        fixed.push(1); // dirent type: regular file
        fixed.extend_from_slice(&(name.len() as u16).to_le_bytes());
        fixed.extend_from_slice(&[0u8; 4]);
        fixed.extend_from_slice(name.as_bytes());

        let len = (COMMON_HEADER_SIZE + fixed.len()) as u32;
        let mut header = CommonHeaderRaw {
            magic: LE32::new(NODE_MAGIC),
            crc: LE32::new(0),
            sqnum: LE64::new(2),
            len: LE32::new(len),
            node_type: NodeType::Dentry as u8,
            group_type: 0,
            padding: [0; 2],
        };
        let mut bytes = vec![0u8; len as usize];
        bytes[..COMMON_HEADER_SIZE].copy_from_slice(bytemuck::bytes_of(&header));
        bytes[COMMON_HEADER_SIZE..].copy_from_slice(&fixed);
        let crc = checksum(&bytes[8..]);
        header.crc = LE32::new(crc);
        bytes[..COMMON_HEADER_SIZE].copy_from_slice(bytemuck::bytes_of(&header));
        bytes
    }

    #[test]
    fn parses_a_live_dentry() {
        let bytes = build_dentry(1, 42, 17, "readme.txt");
        let dentry = DentryNode::parse(&bytes, 0, 0).unwrap();
        assert_eq!(dentry.child_inum, 17);
        assert_eq!(dentry.name_lossy(), "readme.txt");
        assert!(!dentry.is_tombstone());
    }

    #[test]
    fn zero_child_inum_is_a_tombstone() {
        let bytes = build_dentry(1, 42, 0, "deleted.txt");
        let dentry = DentryNode::parse(&bytes, 0, 0).unwrap();
        assert!(dentry.is_tombstone());
    }
}
