use super::common::{parse_and_validate, NodeType, COMMON_HEADER_SIZE};
use crate::compress::{self, Compression};
use crate::error::FsError;
use crate::key::Key;

/// A data node: one block's worth of (possibly compressed) file content.
#[derive(Debug, Clone)]
pub struct DataNode {
    pub key: Key,
    pub size: u32,
    pub compr_type: Compression,
    pub compressed: Vec<u8>,
    pub sqnum: u64,
}

const SIZE_OFFSET: usize = 8;
const COMPR_OFFSET: usize = 12;
const FIXED_SIZE: usize = 16;

impl DataNode {
    pub fn parse(bytes: &[u8], lnum: u32, offset: u32) -> Result<Self, FsError> {
        let header = parse_and_validate(bytes, lnum, offset)?;
        if header.node_type != NodeType::Data as u8 {
            return Err(FsError::UnknownNodeType(header.node_type));
        }
        let node_len = header.len.get() as usize;
        let payload = &bytes[COMMON_HEADER_SIZE..node_len];
        if payload.len() < FIXED_SIZE {
            return Err(FsError::NodeCrcMismatch { lnum, offset });
        }
        let key = Key::from_raw(payload[0..8].try_into().unwrap())
            .ok_or(FsError::NodeCrcMismatch { lnum, offset })?;
        let size = u32::from_le_bytes(payload[SIZE_OFFSET..SIZE_OFFSET + 4].try_into().unwrap());
        let compr_raw = u16::from_le_bytes(payload[COMPR_OFFSET..COMPR_OFFSET + 2].try_into().unwrap());
        let compr_type = Compression::from_raw(compr_raw).ok_or(FsError::UnknownCompression(compr_raw as u8))?;
        let compressed = payload[FIXED_SIZE..].to_vec();

        Ok(Self {
            key,
            size,
            compr_type,
            compressed,
            sqnum: header.sqnum.get(),
        })
    }

    /// Decompresses this node's payload, verifying it against the declared
    /// uncompressed `size`.
    pub fn decompress(&self, lnum: u32, offset: u32) -> Result<Vec<u8>, FsError> {
        compress::decompress(self.compr_type, &self.compressed, self.size, lnum, offset)
    }

    /// The block offset (in bytes) this data node covers within the file,
    /// derived from the key's payload field (a UBIFS block number).
    pub fn file_offset(&self) -> u64 {
        const UBIFS_BLOCK_SIZE: u64 = 4096;
        self.key.payload as u64 * UBIFS_BLOCK_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyType;
    use crate::node::common::{CommonHeaderRaw, NODE_MAGIC};
    use ubift_common::crc32::checksum;
    use ubift_common::types::{LE32, LE64};

    fn build_data_node(inum: u32, block: u32, payload: &[u8]) -> Vec<u8> {
        let key = Key::new(inum, KeyType::Data, block);
        let mut fixed = Vec::new();
        fixed.extend_from_slice(&key.to_raw());
        fixed.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        fixed.extend_from_slice(&0u16.to_le_bytes()); // Compression::None
        fixed.extend_from_slice(&[0u8; 2]);
        fixed.extend_from_slice(payload);

        let len = (COMMON_HEADER_SIZE + fixed.len()) as u32;
        let mut header = CommonHeaderRaw {
            magic: LE32::new(NODE_MAGIC),
            crc: LE32::new(0),
            sqnum: LE64::new(3),
            len: LE32::new(len),
            node_type: NodeType::Data as u8,
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
    fn parses_and_decompresses_uncompressed_payload() {
        let bytes = build_data_node(10, 0, b"hello world");
        let node = DataNode::parse(&bytes, 0, 0).unwrap();
        assert_eq!(node.key.inum, 10);
        assert_eq!(node.decompress(0, 0).unwrap(), b"hello world");
    }
}
