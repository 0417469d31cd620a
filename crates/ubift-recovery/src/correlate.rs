//! Reattaches deleted material to a name. A tombstoned dentry (child-
//! inode = 0) only records *that* a name was removed, not what it used to
//! point at — that's recovered by finding the most recent prior dentry
//! under the same key (same parent directory, same name hash) among
//! loose/stale material the garbage collector hasn't reclaimed yet, then
//! pairing its former child-inode with a recovered inode by sequence
//! number proximity.

use crate::model::RecoveredObject;
use ubift_core::Cancellation;
use ubift_fs::{reassemble_data, DataNode, DentryNode, InodeNode, UbifsInstance};

/// Correlates each committed tombstone against a pool of loose/stale
/// dentry nodes (to recover the name's former child-inode), a pool of
/// recovered inode nodes (to recover that inode's last known state), and a
/// pool of recovered data nodes (to reassemble the inode's former
/// content).
pub fn correlate_tombstones(
    instance: &UbifsInstance,
    loose_dentries: &[DentryNode],
    inode_pool: &[InodeNode],
    data_pool: &[DataNode],
    cancel: &Cancellation,
) -> Result<Vec<RecoveredObject>, ubift_fs::FsError> {
    let tombstones: Vec<DentryNode> = instance
        .all_nodes(cancel)?
        .into_iter()
        .filter_map(|n| match n {
            ubift_fs::Node::Dentry(d) if d.is_tombstone() => Some(d),
            _ => None,
        })
        .collect();

    let mut out = Vec::new();
    for tombstone in &tombstones {
        let Some(former) = loose_dentries
            .iter()
            .filter(|d| d.key == tombstone.key && !d.is_tombstone() && d.sqnum < tombstone.sqnum)
            .max_by_key(|d| d.sqnum)
        else {
            continue;
        };

        let best_inode = inode_pool
            .iter()
            .filter(|candidate| {
                candidate.key.inum as u64 == former.child_inum && candidate.sqnum <= tombstone.sqnum
            })
            .max_by_key(|candidate| candidate.sqnum);

        if let Some(inode) = best_inode {
            let data_nodes: Vec<DataNode> = data_pool
                .iter()
                .filter(|d| d.key.inum == inode.key.inum)
                .cloned()
                .collect();
            let data = reassemble_data(inode.size as usize, data_nodes)?;
            out.push(RecoveredObject {
                inode: inode.clone(),
                data,
                name: Some(former.name_lossy()),
                parent: Some(tombstone.key.inum as u64),
            });
        }
    }
    Ok(out)
}
