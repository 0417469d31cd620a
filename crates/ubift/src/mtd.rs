//! `mtdls` / `mtdcat` / `pebcat`: the L1 partition and PEB-level reads.

use crate::error::UbiftError;
use crate::model::PartitionRow;
use crate::UbiftImage;
use ubift_mtd::{MtdPartition, MtdScanner, PartitionKind};

fn describe(kind: PartitionKind) -> String {
    match kind {
        PartitionKind::Ubi { peb_size } => format!("ubi (peb_size={peb_size:#x})"),
        PartitionKind::Unknown => "unknown".to_string(),
    }
}

impl UbiftImage {
    /// Lists the partitions `MtdScanner` detects in the image.
    pub fn mtdls(&self) -> Vec<PartitionRow> {
        MtdScanner::scan(&self.image, &self.cancel)
            .into_iter()
            .enumerate()
            .map(|(index, partition)| PartitionRow {
                index,
                offset: partition.offset,
                length: partition.length,
                description: describe(partition.kind),
            })
            .collect()
    }

    /// Raw bytes of the `partition_index`-th detected partition.
    pub fn mtdcat(&self, partition_index: usize) -> Result<Vec<u8>, UbiftError> {
        let partitions = MtdScanner::scan(&self.image, &self.cancel);
        let partition = partitions
            .get(partition_index)
            .ok_or(UbiftError::NoSuchPartitionIndex {
                index: partition_index,
                count: partitions.len(),
            })?;
        Ok(self.image.slice_at(partition.offset, partition.length)?.to_vec())
    }

    /// Raw bytes of one PEB within the `partition_index`-th partition.
    /// Only meaningful for a partition whose kind is `Ubi`, since raw PEB
    /// size is otherwise unknown.
    pub fn pebcat(&self, partition_index: usize, peb_index: usize) -> Result<Vec<u8>, UbiftError> {
        let partitions = MtdScanner::scan(&self.image, &self.cancel);
        let partition = partitions
            .get(partition_index)
            .ok_or(UbiftError::NoSuchPartitionIndex {
                index: partition_index,
                count: partitions.len(),
            })?;
        let peb_size = match partition.kind {
            PartitionKind::Ubi { peb_size } => peb_size,
            PartitionKind::Unknown => {
                return Err(UbiftError::NoSuchPartition {
                    offset: partition.offset,
                })
            }
        };
        let peb_count = partition.length / peb_size;
        if peb_index >= peb_count {
            return Err(UbiftError::NoSuchPeb {
                index: peb_index,
                count: peb_count,
            });
        }
        let offset = partition.offset + peb_index * peb_size;
        Ok(self.image.slice_at(offset, peb_size)?.to_vec())
    }

    /// Resolves the `MtdPartition` a caller's `partition_offset` refers to,
    /// either by detection or, when `peb_size_override` is supplied, via
    /// the explicit-geometry bypass path (per the "user supplies offset
    /// and PEB size" contract).
    pub(crate) fn resolve_partition(
        &self,
        partition_offset: usize,
        peb_size_override: Option<usize>,
    ) -> Result<MtdPartition, UbiftError> {
        if let Some(peb_size) = peb_size_override {
            return Ok(MtdScanner::scan_with_geometry(
                &self.image,
                partition_offset,
                peb_size,
            )?);
        }
        MtdScanner::scan(&self.image, &self.cancel)
            .into_iter()
            .find(|partition| partition.offset == partition_offset)
            .ok_or(UbiftError::NoSuchPartition {
                offset: partition_offset,
            })
    }
}
