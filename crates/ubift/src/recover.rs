//! `ubift_recover` / `ubift_info`: the L4 recovery engine driven across
//! every UBI volume found in the image.

use crate::error::UbiftError;
use crate::fs::ROOT_INODE;
use crate::model::{dirent_kind, InfoRow};
use crate::UbiftImage;
use std::fs;
use std::path::Path;
use ubift_core::Cancellation;
use ubift_fs::UbifsInstance;
use ubift_mtd::MtdScanner;
use ubift_recovery::{recover, RecoveryQuality};

/// One UBI volume's recovery outcome, named so a caller driving several
/// partitions/volumes can tell rows apart.
#[derive(Debug, Clone, serde::Serialize)]
pub struct VolumeRecoveryOutcome {
    pub partition_offset: usize,
    pub volume_name: String,
    pub info: InfoRow,
}

fn quality_name(quality: RecoveryQuality) -> &'static str {
    match quality {
        RecoveryQuality::Complete => "complete",
        RecoveryQuality::Recovered => "recovered",
        RecoveryQuality::Partial => "partial",
        RecoveryQuality::Unreliable => "unreliable",
    }
}

impl UbiftImage {
    /// Runs the recovery engine over every volume of every UBI partition
    /// in the image, returning one outcome row per volume. This is what
    /// `ubift_info` surfaces directly and `ubift_recover` uses to decide
    /// what to write.
    fn recover_all(&self) -> Result<Vec<(VolumeRecoveryOutcome, UbifsInstance, Vec<ubift_recovery::RecoveredObject>)>, UbiftError> {
        let mut out = Vec::new();
        for partition in MtdScanner::scan(&self.image, &self.cancel) {
            if !partition.is_ubi() {
                continue;
            }
            let ubi = match self.ubi_instance(partition.offset, None) {
                Ok(ubi) => ubi,
                Err(err) => {
                    tracing::warn!(offset = partition.offset, %err, "skipping unreadable UBI partition");
                    continue;
                }
            };
            let volumes = ubi.volumes().unwrap_or_default();
            for volume in volumes {
                let name = volume.name.clone();
                let instance = match UbifsInstance::open(volume.clone()) {
                    Ok(instance) => instance,
                    Err(err) => {
                        tracing::warn!(volume = %name, %err, "skipping unreadable UBIFS volume");
                        continue;
                    }
                };
                let outcome = recover(&ubi, &volume, &instance, &self.cancel)?;
                let info = InfoRow {
                    quality: quality_name(outcome.report.quality()).to_string(),
                    stale_pebs_found: outcome.report.stale_pebs_found,
                    orphan_inodes_recovered: outcome.report.orphan_inodes_recovered,
                    tombstones_correlated: outcome.report.tombstones_correlated,
                    loose_nodes_salvaged: outcome.report.loose_nodes_salvaged,
                    crc_failures_suppressed: outcome.report.crc_failures_suppressed,
                    lebs_scanned: outcome.report.lebs_scanned,
                    lebs_with_valid_header: outcome.report.lebs_with_valid_header,
                };
                out.push((
                    VolumeRecoveryOutcome {
                        partition_offset: partition.offset,
                        volume_name: name,
                        info,
                    },
                    instance,
                    outcome.objects,
                ));
            }
        }
        Ok(out)
    }

    /// Aggregate recoverability statistics across the whole image, one row
    /// per UBI volume found.
    pub fn ubift_info(&self) -> Result<Vec<VolumeRecoveryOutcome>, UbiftError> {
        Ok(self
            .recover_all()?
            .into_iter()
            .map(|(outcome, _, _)| outcome)
            .collect())
    }

    /// Writes `<output>/<volume-name>/` (the live tree) per UBI volume,
    /// plus a sibling `deleted/` subtree when `deleted` is set. Per-object
    /// write failures are recorded in the returned outcome rather than
    /// aborting the whole command.
    pub fn ubift_recover(
        &self,
        output_dir: impl AsRef<Path>,
        deleted: bool,
    ) -> Result<Vec<VolumeRecoveryOutcome>, UbiftError> {
        let output_dir = output_dir.as_ref();
        let mut outcomes = Vec::new();
        for (outcome, instance, objects) in self.recover_all()? {
            let volume_dir = output_dir.join(&outcome.volume_name);
            if let Err(source) = write_live_tree(&instance, ROOT_INODE, &volume_dir, &self.cancel) {
                tracing::warn!(volume = %outcome.volume_name, %source, "live tree write incomplete");
            }
            if deleted {
                let deleted_dir = volume_dir.join("deleted");
                if let Err(source) = write_recovered_objects(&objects, &deleted_dir) {
                    tracing::warn!(volume = %outcome.volume_name, %source, "deleted tree write incomplete");
                }
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

fn write_live_tree(instance: &UbifsInstance, ino: u64, dir: &Path, cancel: &Cancellation) -> Result<(), UbiftError> {
    fs::create_dir_all(dir).map_err(|source| UbiftError::RecoveryWrite {
        path: dir.to_path_buf(),
        source,
    })?;
    for dentry in instance.list_dir(ino, cancel).map_err(UbiftError::from)? {
        let child_path = dir.join(dentry.name_lossy());
        match dirent_kind(dentry.dirent_type) {
            "dir" => write_live_tree(instance, dentry.child_inum, &child_path, cancel)?,
            _ => {
                let data = instance.read_inode(dentry.child_inum, cancel).unwrap_or_default();
                fs::write(&child_path, data).map_err(|source| UbiftError::RecoveryWrite {
                    path: child_path.clone(),
                    source,
                })?;
            }
        }
    }
    Ok(())
}

/// Recovered objects have no reliable directory structure (their former
/// parent may itself be gone); each is written as one flat file, named by
/// its recovered name when one was correlated, falling back to its inode
/// number.
fn write_recovered_objects(
    objects: &[ubift_recovery::RecoveredObject],
    dir: &Path,
) -> Result<(), UbiftError> {
    fs::create_dir_all(dir).map_err(|source| UbiftError::RecoveryWrite {
        path: dir.to_path_buf(),
        source,
    })?;
    for object in objects {
        let file_name = object
            .name
            .clone()
            .unwrap_or_else(|| format!("inode_{}", object.inode.key.inum));
        let path = dir.join(file_name);
        fs::write(&path, &object.data).map_err(|source| UbiftError::RecoveryWrite {
            path: path.clone(),
            source,
        })?;
    }
    Ok(())
}
