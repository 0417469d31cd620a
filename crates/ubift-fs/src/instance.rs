//! Top-level handle to a parsed UBIFS filesystem: superblock, master,
//! on-disk TNC and journal overlay combined into the query surface the
//! rest of the toolkit (and eventually the CLI) reads from.

use crate::error::FsError;
use crate::journal;
use crate::key::{Key, KeyType};
use crate::layout::{VolumeLayout, MASTER_LNUM_1, MASTER_LNUM_2, SUPERBLOCK_LNUM};
use crate::node::master::pick_master;
use crate::node::{key_of, DataNode, DentryNode, InodeNode, MasterNode, Node, Superblock};
use crate::overlay::Overlay;
use crate::tnc::{self, NodePtr};
use ubift_core::Cancellation;
use ubift_ubi::UbiVolume;

pub struct UbifsInstance {
    volume: UbiVolume,
    pub superblock: Superblock,
    pub master: MasterNode,
    pub layout: VolumeLayout,
    overlay: Overlay<Key, Node>,
}

impl UbifsInstance {
    /// Parses the superblock and master nodes, computes the area layout,
    /// and replays the journal on top of the committed index.
    pub fn open(volume: UbiVolume) -> Result<Self, FsError> {
        let sb_leb = volume.read_leb(SUPERBLOCK_LNUM)?;
        let superblock = Superblock::parse(&sb_leb)?;

        let leb1 = volume.read_leb(MASTER_LNUM_1).ok();
        let leb2 = volume.read_leb(MASTER_LNUM_2).ok();
        let master = pick_master(leb1.as_deref(), leb2.as_deref())?;

        let layout = VolumeLayout::from_superblock(&superblock, volume.leb_count);
        let buds = journal::discover_bud_lnums(&volume, layout.log)?;
        let overlay = journal::build_overlay(&volume, &buds)?;

        Ok(Self {
            volume,
            superblock,
            master,
            layout,
            overlay,
        })
    }

    fn root_ptr(&self) -> NodePtr {
        NodePtr {
            lnum: self.master.root_lnum,
            offs: self.master.root_offs,
            len: self.master.root_len,
        }
    }

    /// Looks a key up, consulting the journal overlay first since it can
    /// only ever be more recent than the committed tree.
    pub fn lookup(&self, key: Key) -> Result<Option<Node>, FsError> {
        if let Some(node) = self.overlay.get(&key) {
            return Ok(Some(node.clone()));
        }
        tnc::lookup(&self.volume, self.root_ptr(), key)
    }

    /// Range-scans `[start, end]`, merging the on-disk index with
    /// whatever the journal overlay has for the same range. `cancel` is
    /// observed at LEB-granularity boundaries by the underlying TNC walk.
    pub fn range(&self, start: Key, end: Key, cancel: &Cancellation) -> Result<Vec<Node>, FsError> {
        let mut merged = Overlay::new();
        for node in tnc::range(&self.volume, self.root_ptr(), start, end, cancel)? {
            if let Some(key) = key_of(&node) {
                merged.upsert(key, node.sqnum(), node);
            }
        }
        for (key, node) in self.overlay.range(start..=end) {
            merged.upsert(*key, node.sqnum(), node.clone());
        }
        Ok(merged.iter().map(|(_, node)| node.clone()).collect())
    }

    pub fn stat_inode(&self, ino: u64) -> Result<InodeNode, FsError> {
        let key = Key::new(ino as u32, KeyType::Inode, 0);
        match self.lookup(key)? {
            Some(Node::Inode(inode)) => Ok(inode),
            _ => Err(FsError::NoSuchInode(ino)),
        }
    }

    /// Concatenates every data node belonging to `ino`, decompressing
    /// each and placing it at its block offset, then truncates or zero-
    /// pads the result to the inode's declared size.
    pub fn read_inode(&self, ino: u64, cancel: &Cancellation) -> Result<Vec<u8>, FsError> {
        let inode = self.stat_inode(ino)?;
        let start = Key::range_start(ino as u32, KeyType::Data);
        let end = Key::range_end(ino as u32, KeyType::Data);

        let data_nodes: Vec<DataNode> = self
            .range(start, end, cancel)?
            .into_iter()
            .filter_map(|n| match n {
                Node::Data(d) => Some(d),
                _ => None,
            })
            .collect();
        reassemble_data(inode.size as usize, data_nodes)
    }

    /// Lists the live (non-tombstone) directory entries of `ino`.
    pub fn list_dir(&self, ino: u64, cancel: &Cancellation) -> Result<Vec<DentryNode>, FsError> {
        let start = Key::range_start(ino as u32, KeyType::Dentry);
        let end = Key::range_end(ino as u32, KeyType::Dentry);
        Ok(self
            .range(start, end, cancel)?
            .into_iter()
            .filter_map(|n| match n {
                Node::Dentry(d) => Some(d),
                _ => None,
            })
            .filter(|d| !d.is_tombstone())
            .collect())
    }

    /// Every node the committed tree plus journal overlay currently
    /// reference, committed nodes first. Used by callers (recovery's
    /// tombstone correlation, in particular) that need to see dentries
    /// the ordinary query surface filters out, such as tombstones.
    pub fn all_nodes(&self, cancel: &Cancellation) -> Result<Vec<Node>, FsError> {
        let mut out = tnc::collect_all(&self.volume, self.root_ptr(), cancel)?;
        out.extend(self.overlay.iter().map(|(_, node)| node.clone()));
        Ok(out)
    }

    /// Every inode the committed tree plus journal overlay currently
    /// reference, deduplicated by inode number.
    pub fn list_inodes(&self, cancel: &Cancellation) -> Result<Vec<InodeNode>, FsError> {
        let mut by_inum = std::collections::BTreeMap::new();
        for node in self.all_nodes(cancel)? {
            if let Node::Inode(inode) = node {
                by_inum.insert(inode.key.inum, inode);
            }
        }
        Ok(by_inum.into_values().collect())
    }

    /// Full scan for every dentry (committed or journaled) whose
    /// `child_inum` matches `ino` — used to find the name(s) that used to
    /// point at an inode whose own dentry has since been removed.
    pub fn find_dentries_for(&self, ino: u64, cancel: &Cancellation) -> Result<Vec<DentryNode>, FsError> {
        Ok(self
            .all_nodes(cancel)?
            .into_iter()
            .filter_map(|n| match n {
                Node::Dentry(d) if d.child_inum == ino => Some(d),
                _ => None,
            })
            .collect())
    }
}

/// Concatenates decompressed data nodes at their block offsets into a
/// buffer of exactly `size` bytes, zero-padding any gap. Shared by the
/// live read path above and recovery's tombstone data reassembly, which
/// has to do the same thing over a pool of stale/loose data nodes instead
/// of an index range scan.
pub fn reassemble_data(size: usize, mut data_nodes: Vec<DataNode>) -> Result<Vec<u8>, FsError> {
    data_nodes.sort_by_key(|d| d.file_offset());
    let mut buf = vec![0u8; size];
    for data in data_nodes {
        let decompressed = data.decompress(0, 0)?;
        let at = data.file_offset() as usize;
        if at >= buf.len() {
            continue;
        }
        let copy_len = decompressed.len().min(buf.len() - at);
        buf[at..at + copy_len].copy_from_slice(&decompressed[..copy_len]);
    }
    Ok(buf)
}
