//! Raw on-flash UBIFS node layouts, one submodule per node type, plus a
//! [`Node`] enum that dispatches on the common header's type tag.

pub mod common;
pub mod data;
pub mod dentry;
pub mod index;
pub mod inode;
pub mod master;
pub mod orphan;
pub mod reference;
pub mod superblock;
pub mod trun;

pub use common::{CommonHeaderRaw, NodeType, NODE_MAGIC};
pub use data::DataNode;
pub use dentry::DentryNode;
pub use index::{Branch, IndexNode};
pub use inode::InodeNode;
pub use master::MasterNode;
pub use orphan::OrphanNode;
pub use reference::ReferenceNode;
pub use superblock::Superblock;
pub use trun::TruncationNode;

use crate::error::FsError;
use crate::key::{Key, KeyType};

/// Any leaf or housekeeping node that can appear in the index, the
/// journal, or a loose scan of a LEB.
#[derive(Debug, Clone)]
pub enum Node {
    Inode(InodeNode),
    Data(DataNode),
    Dentry(DentryNode),
    XattrEntry(DentryNode),
    Truncation(TruncationNode),
    Index(IndexNode),
    Reference(ReferenceNode),
    Orphan(OrphanNode),
    /// Padding and commit-start nodes carry no payload this toolkit reads;
    /// kept as a variant so a loose LEB scan can still account for every
    /// byte it walks past.
    Housekeeping(NodeType),
}

impl Node {
    pub fn sqnum(&self) -> u64 {
        match self {
            Node::Inode(n) => n.sqnum,
            Node::Data(n) => n.sqnum,
            Node::Dentry(n) | Node::XattrEntry(n) => n.sqnum,
            Node::Truncation(n) => n.sqnum,
            Node::Index(_) => 0,
            Node::Reference(n) => n.sqnum,
            Node::Orphan(n) => n.sqnum,
            Node::Housekeeping(_) => 0,
        }
    }
}

/// Peeks the node type from the common header and dispatches to the
/// matching type-specific parser, which re-validates magic and CRC.
pub fn parse_node(bytes: &[u8], lnum: u32, offset: u32) -> Result<Node, FsError> {
    let header = common::parse_and_validate(bytes, lnum, offset)?;
    let node_type =
        NodeType::from_raw(header.node_type).ok_or(FsError::UnknownNodeType(header.node_type))?;
    Ok(match node_type {
        NodeType::Inode => Node::Inode(InodeNode::parse(bytes, lnum, offset)?),
        NodeType::Data => Node::Data(DataNode::parse(bytes, lnum, offset)?),
        NodeType::Dentry => Node::Dentry(DentryNode::parse(bytes, lnum, offset)?),
        NodeType::XattrEntry => Node::XattrEntry(DentryNode::parse(bytes, lnum, offset)?),
        NodeType::Truncation => Node::Truncation(TruncationNode::parse(bytes, lnum, offset)?),
        NodeType::Index => Node::Index(IndexNode::parse(bytes, lnum, offset)?),
        NodeType::Reference => Node::Reference(ReferenceNode::parse(bytes, lnum, offset)?),
        NodeType::Orphan => Node::Orphan(OrphanNode::parse(bytes, lnum, offset)?),
        NodeType::Padding | NodeType::CommitStart | NodeType::Superblock | NodeType::Master => {
            Node::Housekeeping(node_type)
        }
    })
}

/// The index key a node would occupy in the TNC, for the node types that
/// carry one. Truncation nodes have no natural key of their own; they're
/// keyed on their target inode so a key-based lookup still finds the
/// most recent one.
pub fn key_of(node: &Node) -> Option<Key> {
    match node {
        Node::Inode(n) => Some(n.key),
        Node::Data(n) => Some(n.key),
        Node::Dentry(n) | Node::XattrEntry(n) => Some(n.key),
        Node::Truncation(n) => Some(Key::new(n.inum, KeyType::Truncation, 0)),
        Node::Index(_) | Node::Reference(_) | Node::Orphan(_) | Node::Housekeeping(_) => None,
    }
}

/// Node length, read straight from the common header without validating
/// the whole node — used by a loose LEB scan to step past a node whose
/// payload it doesn't care to fully decode yet.
pub fn peek_len(bytes: &[u8]) -> Option<u32> {
    if bytes.len() < common::COMMON_HEADER_SIZE {
        return None;
    }
    let header: CommonHeaderRaw = bytemuck::pod_read_unaligned(&bytes[..common::COMMON_HEADER_SIZE]);
    if header.magic.get() != NODE_MAGIC {
        return None;
    }
    Some(header.len.get())
}
