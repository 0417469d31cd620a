//! Full-LEB scan for nodes the current index and journal overlay don't
//! resolve through anymore: superseded writes left behind after a commit
//! rewrote their key's slot, still intact until the LEB they live in is
//! erased.

use crate::error::RecoveryError;
use ubift_core::Cancellation;
use ubift_fs::{key_of, scan_leb, FsError, Node, UbifsInstance};
use ubift_ubi::UbiVolume;

/// Scans every LEB in `[0, leb_count)`, resyncing past unreadable
/// stretches, and keeps whichever nodes the live instance no longer
/// serves for their own key — either because a newer write replaced them,
/// or because nothing currently resolves that key at all. `cancel` is
/// checked once per LEB.
pub fn scan_loose_nodes(
    volume: &UbiVolume,
    instance: &UbifsInstance,
    cancel: &Cancellation,
) -> Result<Vec<Node>, RecoveryError> {
    let mut out = Vec::new();
    for lnum in 0..volume.leb_count {
        if cancel.is_cancelled() {
            return Err(FsError::Cancelled.into());
        }
        let leb = volume.read_leb(lnum)?;
        for (_offset, node) in scan_leb(&leb, lnum, true) {
            if is_loose(&node, instance)? {
                out.push(node);
            }
        }
    }
    Ok(out)
}

fn is_loose(node: &Node, instance: &UbifsInstance) -> Result<bool, ubift_fs::FsError> {
    let Some(key) = key_of(node) else {
        return Ok(false);
    };
    match instance.lookup(key)? {
        Some(current) => Ok(current.sqnum() != node.sqnum()),
        None => Ok(true),
    }
}
