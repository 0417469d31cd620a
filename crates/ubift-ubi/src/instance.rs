use crate::error::UbiError;
use crate::headers::LAYOUT_VOLUME_ID;
use crate::leb_map::build_leb_map;
use crate::peb::{Peb, PebStatus};
use crate::volume::UbiVolume;
use crate::vtbl::VolumeTable;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use ubift_core::Image;
use ubift_mtd::{MtdPartition, PartitionKind};

/// A reconstructed UBI instance: every PEB in one MTD partition, the
/// resolved `(vol_id, lnum) -> PEB` mapping, and the decoded volume table.
pub struct UbiInstance {
    image: Image,
    partition_offset: usize,
    peb_size: usize,
    pebs: Arc<Vec<Peb>>,
    leb_map: Arc<BTreeMap<(u32, u32), usize>>,
    leb_size: usize,
    table: VolumeTable,
    /// Volume ids with mapped LEBs but absent from the layout volume.
    orphan_volume_ids: Vec<u32>,
}

impl UbiInstance {
    /// Enumerates every PEB in `partition`, resolves the LEB map, and
    /// decodes the layout volume.
    pub fn build(image: &Image, partition: &MtdPartition) -> Result<Self, UbiError> {
        let peb_size = match partition.kind {
            PartitionKind::Ubi { peb_size } => peb_size,
            PartitionKind::Unknown => {
                return Err(UbiError::NotUbiPartition {
                    offset: partition.offset,
                })
            }
        };

        let mut pebs = Vec::new();
        let mut offset = partition.offset;
        while offset + peb_size <= partition.end() {
            pebs.push(Peb::parse(image, offset, peb_size));
            offset += peb_size;
        }
        tracing::debug!(count = pebs.len(), peb_size, "enumerated PEBs");

        let leb_map = build_leb_map(&pebs)?;
        let table = VolumeTable::build(image, &leb_map, &pebs).unwrap_or_default();

        let mapped_vol_ids: std::collections::BTreeSet<u32> = leb_map
            .keys()
            .map(|&(vol_id, _)| vol_id)
            .filter(|&vol_id| vol_id != LAYOUT_VOLUME_ID)
            .collect();
        let orphan_volume_ids: Vec<u32> = mapped_vol_ids
            .iter()
            .copied()
            .filter(|vol_id| !table.volumes.contains_key(vol_id))
            .collect();
        for &vol_id in &orphan_volume_ids {
            tracing::warn!(vol_id, "volume referenced by mapped PEBs but absent from layout volume");
        }

        let leb_size = representative_leb_size(&pebs, peb_size);

        Ok(Self {
            image: image.clone(),
            partition_offset: partition.offset,
            peb_size,
            pebs: Arc::new(pebs),
            leb_map: Arc::new(leb_map),
            leb_size,
            table,
            orphan_volume_ids,
        })
    }

    /// The underlying image, for recovery passes that need to read bytes
    /// from a PEB that lost its LEB-mapping conflict and so isn't
    /// reachable through any [`UbiVolume`].
    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn peb_size(&self) -> usize {
        self.peb_size
    }

    pub fn peb_count(&self) -> usize {
        self.pebs.len()
    }

    /// The LEB payload size shared by every volume in this instance.
    pub fn leb_size(&self) -> usize {
        self.leb_size
    }

    pub fn pebs(&self) -> &[Peb] {
        &self.pebs
    }

    pub fn partition_offset(&self) -> usize {
        self.partition_offset
    }

    pub fn volume_table(&self) -> &VolumeTable {
        &self.table
    }

    pub fn orphan_volume_ids(&self) -> &[u32] {
        &self.orphan_volume_ids
    }

    /// The resolved `(vol_id, lnum) -> winning PEB index` mapping, exposed
    /// so the recovery layer can identify PEBs that lost a conflict.
    pub fn leb_map(&self) -> &BTreeMap<(u32, u32), usize> {
        &self.leb_map
    }

    /// Returns the number of LEBs currently mapped for `vol_id`, used to
    /// size orphan volumes that have no volume-table record to read a
    /// declared length from.
    fn observed_leb_count(&self, vol_id: u32) -> u32 {
        self.leb_map
            .keys()
            .filter(|&&(id, _)| id == vol_id)
            .map(|&(_, lnum)| lnum + 1)
            .max()
            .unwrap_or(0)
    }

    /// Materialises a lazy accessor for `vol_id`, whether it's declared in
    /// the layout volume or only inferred from mapped PEBs (an orphan).
    pub fn volume(&self, vol_id: u32) -> Result<UbiVolume, UbiError> {
        if let Some(descriptor) = self.table.volumes.get(&vol_id) {
            return Ok(UbiVolume::new(
                self.image.clone(),
                Arc::clone(&self.pebs),
                Arc::clone(&self.leb_map),
                vol_id,
                descriptor.name.clone(),
                self.leb_size,
                descriptor.reserved_pebs.max(self.observed_leb_count(vol_id)),
                descriptor.vol_type,
                false,
            ));
        }
        if self.orphan_volume_ids.contains(&vol_id) {
            return Ok(UbiVolume::new(
                self.image.clone(),
                Arc::clone(&self.pebs),
                Arc::clone(&self.leb_map),
                vol_id,
                format!("orphan-{vol_id}"),
                self.leb_size,
                self.observed_leb_count(vol_id),
                None,
                true,
            ));
        }
        Err(UbiError::NoSuchVolume(vol_id))
    }

    pub fn volumes(&self) -> Result<Vec<UbiVolume>, UbiError> {
        let mut ids: Vec<u32> = self.table.volumes.keys().copied().collect();
        ids.extend(self.orphan_volume_ids.iter().copied());
        ids.sort_unstable();
        ids.into_iter().map(|id| self.volume(id)).collect()
    }
}

/// Picks the most common `data_offset` among enumerated PEBs to use as the
/// LEB payload size; real images use one data offset uniformly, so the mode
/// recovers it even in the presence of a few corrupt PEBs.
fn representative_leb_size(pebs: &[Peb], peb_size: usize) -> usize {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for peb in pebs {
        if matches!(peb.status, PebStatus::Data | PebStatus::EcOnly) {
            *counts.entry(peb.data_offset).or_insert(0) += 1;
        }
    }
    let data_offset = counts
        .into_iter()
        .max_by_key(|&(_, count)| count)
        .map(|(offset, _)| offset as usize)
        .unwrap_or(4096);
    peb_size.saturating_sub(data_offset)
}
