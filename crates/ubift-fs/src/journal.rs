//! Replays the journal: the log area's reference nodes point at "bud"
//! LEBs holding writes the on-disk index hasn't absorbed yet. Scanning
//! those LEBs and overlaying them on top of the committed TNC gives a
//! fully up to date view without a full tree rebuild.

use crate::error::FsError;
use crate::key::Key;
use crate::layout::LebRange;
use crate::node::{key_of, Node};
use crate::overlay::Overlay;
use crate::scan::scan_leb;
use std::collections::BTreeSet;
use ubift_ubi::UbiVolume;

/// Reads every reference node in the log area, in LEB order, to discover
/// which LEBs are currently serving as journal buds.
pub fn discover_bud_lnums(volume: &UbiVolume, log: LebRange) -> Result<BTreeSet<u32>, FsError> {
    let mut buds = BTreeSet::new();
    for lnum in log.start..log.end {
        if lnum >= volume.leb_count {
            break;
        }
        let leb = volume.read_leb(lnum)?;
        for (_offset, node) in scan_leb(&leb, lnum, false) {
            if let Node::Reference(reference) = node {
                buds.insert(reference.lnum);
            }
        }
    }
    Ok(buds)
}

/// Scans every discovered bud LEB and folds its nodes into a single
/// overlay, in the same "higher sequence number wins" sense the index
/// itself is governed by.
pub fn build_overlay(volume: &UbiVolume, buds: &BTreeSet<u32>) -> Result<Overlay<Key, Node>, FsError> {
    let mut overlay = Overlay::new();
    for &lnum in buds {
        if lnum >= volume.leb_count {
            continue;
        }
        let leb = volume.read_leb(lnum)?;
        for (_offset, node) in scan_leb(&leb, lnum, false) {
            if let Some(key) = key_of(&node) {
                overlay.upsert(key, node.sqnum(), node);
            }
        }
    }
    Ok(overlay)
}
