//! Ties the individual recovery passes together: stale PEBs, the orphan
//! area, tombstone correlation, and a full loose-node salvage scan.

use crate::correlate::correlate_tombstones;
use crate::error::RecoveryError;
use crate::loose::scan_loose_nodes;
use crate::model::RecoveredObject;
use crate::orphan::recover_orphans;
use crate::report::RecoveryReport;
use crate::stale::{find_stale_pebs, scan_stale_peb};
use std::collections::HashSet;
use ubift_core::Cancellation;
use ubift_fs::{reassemble_data, scan_leb, DataNode, DentryNode, InodeNode, Node, UbifsInstance};
use ubift_ubi::{UbiInstance, UbiVolume};

pub struct RecoveryOutcome {
    pub objects: Vec<RecoveredObject>,
    pub report: RecoveryReport,
}

/// Runs every recovery pass against one UBIFS instance and its backing
/// UBI volume, producing the union of recoverable deleted material.
/// `cancel` is observed between passes and, within each pass, at
/// LEB-granularity boundaries.
pub fn recover(
    ubi: &UbiInstance,
    volume: &UbiVolume,
    instance: &UbifsInstance,
    cancel: &Cancellation,
) -> Result<RecoveryOutcome, RecoveryError> {
    let mut report = RecoveryReport::default();

    let stale_pebs = find_stale_pebs(ubi);
    report.stale_pebs_found = stale_pebs.len();

    let mut inode_pool: Vec<InodeNode> = Vec::new();
    let mut dentry_pool: Vec<DentryNode> = Vec::new();
    let mut data_pool: Vec<DataNode> = Vec::new();

    for peb in &stale_pebs {
        if cancel.is_cancelled() {
            return Err(ubift_fs::FsError::Cancelled.into());
        }
        match scan_stale_peb(peb, ubi) {
            Ok(nodes) => bucket_candidates(nodes, &mut inode_pool, &mut dentry_pool, &mut data_pool),
            Err(_) => {
                report.crc_failures_suppressed += 1;
                tracing::warn!(offset = peb.offset, "stale PEB scan failed, skipping");
            }
        }
    }

    let loose_nodes = scan_loose_nodes(volume, instance, cancel)?;
    report.loose_nodes_salvaged = loose_nodes.len();
    bucket_candidates(loose_nodes, &mut inode_pool, &mut dentry_pool, &mut data_pool);

    let mut objects = recover_orphans(volume, instance, cancel)?;
    report.orphan_inodes_recovered = objects.len();

    let tombstone_objects = correlate_tombstones(instance, &dentry_pool, &inode_pool, &data_pool, cancel)?;
    report.tombstones_correlated = tombstone_objects.len();
    let mut correlated_inums: HashSet<u32> = objects.iter().map(|object| object.inode.key.inum).collect();
    correlated_inums.extend(tombstone_objects.iter().map(|object| object.inode.key.inum));
    objects.extend(tombstone_objects);

    // Loose/stale inodes no tombstone ever claimed still get surfaced,
    // attached under the synthetic orphan parent (`parent: None`) instead
    // of being discarded.
    for inode in &inode_pool {
        if correlated_inums.contains(&inode.key.inum) {
            continue;
        }
        let data_nodes: Vec<DataNode> = data_pool
            .iter()
            .filter(|d| d.key.inum == inode.key.inum)
            .cloned()
            .collect();
        let data = reassemble_data(inode.size as usize, data_nodes)?;
        objects.push(RecoveredObject {
            inode: inode.clone(),
            data,
            name: None,
            parent: None,
        });
    }

    report.lebs_scanned = volume.leb_count as usize;
    report.lebs_with_valid_header = (0..volume.leb_count)
        .filter_map(|lnum| volume.read_leb(lnum).ok())
        .filter(|leb| !scan_leb(leb, 0, false).is_empty())
        .count();

    Ok(RecoveryOutcome { objects, report })
}

fn bucket_candidates(
    nodes: Vec<Node>,
    inodes: &mut Vec<InodeNode>,
    dentries: &mut Vec<DentryNode>,
    data: &mut Vec<DataNode>,
) {
    for node in nodes {
        match node {
            Node::Inode(inode) => inodes.push(inode),
            Node::Dentry(dentry) | Node::XattrEntry(dentry) => dentries.push(dentry),
            Node::Data(d) => data.push(d),
            _ => {}
        }
    }
}
