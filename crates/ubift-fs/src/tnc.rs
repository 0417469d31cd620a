//! Traversal of the on-disk TNC (Tree Node Cache) B+-tree: the index of
//! every live inode, data, dentry and xattr-entry node, rooted at the
//! master node's `root_lnum`/`root_offs`/`root_len` pointer.

use crate::error::FsError;
use crate::key::Key;
use crate::node::{parse_node, Branch, IndexNode, Node};
use ubift_core::Cancellation;
use ubift_ubi::UbiVolume;

/// A pointer to a node: which LEB, what byte offset within it, and how
/// many bytes it occupies.
#[derive(Debug, Clone, Copy)]
pub struct NodePtr {
    pub lnum: u32,
    pub offs: u32,
    pub len: u32,
}

fn read_node(volume: &UbiVolume, ptr: NodePtr) -> Result<Node, FsError> {
    let leb = volume.read_leb(ptr.lnum)?;
    let start = ptr.offs as usize;
    let end = start + ptr.len as usize;
    let bytes = leb
        .get(start..end)
        .ok_or(FsError::NodeCrcMismatch {
            lnum: ptr.lnum,
            offset: ptr.offs,
        })?;
    parse_node(bytes, ptr.lnum, ptr.offs)
}

fn read_index(volume: &UbiVolume, ptr: NodePtr) -> Result<IndexNode, FsError> {
    match read_node(volume, ptr)? {
        Node::Index(index) => Ok(index),
        _ => Err(FsError::NodeCrcMismatch {
            lnum: ptr.lnum,
            offset: ptr.offs,
        }),
    }
}

fn branch_ptr(branch: &Branch) -> NodePtr {
    NodePtr {
        lnum: branch.lnum,
        offs: branch.offs,
        len: branch.len,
    }
}

/// Picks the branch a descending lookup for `key` should follow: the
/// last branch whose key is `<= key`, falling back to the first branch
/// if `key` precedes everything in this node.
fn choose_branch<'a>(branches: &'a [Branch], key: Key) -> Option<&'a Branch> {
    match branches.binary_search_by(|b| b.key.cmp(&key)) {
        Ok(idx) => Some(&branches[idx]),
        Err(0) => branches.first(),
        Err(idx) => Some(&branches[idx - 1]),
    }
}

/// Descends the index tree looking for the exact key. Returns `None` if
/// the key isn't present.
pub fn lookup(volume: &UbiVolume, root: NodePtr, key: Key) -> Result<Option<Node>, FsError> {
    let mut current = root;
    loop {
        let index = read_index(volume, current)?;
        let Some(branch) = choose_branch(&index.branches, key) else {
            return Ok(None);
        };
        if index.is_leaf_level() {
            let node = read_node(volume, branch_ptr(branch))?;
            return Ok(if branch.key == key { Some(node) } else { None });
        }
        current = branch_ptr(branch);
    }
}

/// Collects every leaf node whose key falls in `[start, end]`, in key
/// order. Used for directory listings and other range scans.
///
/// `cancel` is checked once per LEB-backed node visited (index node or
/// leaf), so a caller can abort a scan over a large subtree without
/// waiting for it to finish.
pub fn range(
    volume: &UbiVolume,
    root: NodePtr,
    start: Key,
    end: Key,
    cancel: &Cancellation,
) -> Result<Vec<Node>, FsError> {
    let mut out = Vec::new();
    collect_range(volume, root, start, end, cancel, &mut out)?;
    Ok(out)
}

fn collect_range(
    volume: &UbiVolume,
    ptr: NodePtr,
    start: Key,
    end: Key,
    cancel: &Cancellation,
    out: &mut Vec<Node>,
) -> Result<(), FsError> {
    if cancel.is_cancelled() {
        return Err(FsError::Cancelled);
    }
    let index = read_index(volume, ptr)?;
    for branch in &index.branches {
        if branch.key > end {
            break;
        }
        if index.is_leaf_level() {
            if branch.key >= start {
                out.push(read_node(volume, branch_ptr(branch))?);
            }
        } else {
            collect_range(volume, branch_ptr(branch), start, end, cancel, out)?;
        }
    }
    Ok(())
}

/// Collects every leaf node reachable from `root`, in key order. Used to
/// enumerate every inode the committed tree still references.
pub fn collect_all(volume: &UbiVolume, root: NodePtr, cancel: &Cancellation) -> Result<Vec<Node>, FsError> {
    let mut out = Vec::new();
    collect_subtree(volume, root, cancel, &mut out)?;
    Ok(out)
}

fn collect_subtree(
    volume: &UbiVolume,
    ptr: NodePtr,
    cancel: &Cancellation,
    out: &mut Vec<Node>,
) -> Result<(), FsError> {
    if cancel.is_cancelled() {
        return Err(FsError::Cancelled);
    }
    let index = read_index(volume, ptr)?;
    for branch in &index.branches {
        if index.is_leaf_level() {
            out.push(read_node(volume, branch_ptr(branch))?);
        } else {
            collect_subtree(volume, branch_ptr(branch), cancel, out)?;
        }
    }
    Ok(())
}
