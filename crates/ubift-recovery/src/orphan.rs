//! The orphan area: a log of inodes that were unlinked while still open
//! at the last commit. Every inode it names, and all of that inode's
//! data nodes, are recoverable until a later commit garbage collects
//! them.

use crate::error::RecoveryError;
use crate::model::RecoveredObject;
use ubift_core::Cancellation;
use ubift_fs::{scan_leb, FsError, Key, KeyType, Node, UbifsInstance};
use ubift_ubi::UbiVolume;

/// Reads every orphan node in the orphan area and recovers the inode (and
/// its data) for each inode number it names. `cancel` is checked once per
/// LEB in the orphan area and once per data reassembly.
pub fn recover_orphans(
    volume: &UbiVolume,
    instance: &UbifsInstance,
    cancel: &Cancellation,
) -> Result<Vec<RecoveredObject>, RecoveryError> {
    let orphan_area = instance.layout.orphan;
    let mut inodes = Vec::new();
    for lnum in orphan_area.start..orphan_area.end {
        if lnum >= volume.leb_count {
            break;
        }
        if cancel.is_cancelled() {
            return Err(FsError::Cancelled.into());
        }
        let leb = volume.read_leb(lnum)?;
        for (_offset, node) in scan_leb(&leb, lnum, false) {
            if let Node::Orphan(orphan) = node {
                inodes.extend(orphan.inodes);
            }
        }
    }

    let mut out = Vec::new();
    for ino in inodes {
        if cancel.is_cancelled() {
            return Err(FsError::Cancelled.into());
        }
        let key = Key::new(ino as u32, KeyType::Inode, 0);
        let Some(Node::Inode(inode)) = instance.lookup(key)? else {
            continue;
        };
        let data = instance.read_inode(ino, cancel).unwrap_or_else(|err| {
            tracing::warn!(ino, %err, "orphan inode data could not be fully reassembled");
            Vec::new()
        });
        out.push(RecoveredObject {
            inode,
            data,
            name: None,
            parent: None,
        });
    }
    Ok(out)
}
