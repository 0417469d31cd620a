//! `ubils` / `ubicat` / `lebls` / `lebcat`: the L2 UBI instance and volume
//! level reads.

use crate::error::UbiftError;
use crate::model::{LebRow, VolumeRow};
use crate::UbiftImage;
use ubift_ubi::{UbiInstance, UbiVolume, VolType};

fn describe_vol_type(vol_type: Option<VolType>) -> String {
    match vol_type {
        Some(VolType::Dynamic) => "dynamic".to_string(),
        Some(VolType::Static) => "static".to_string(),
        None => "unknown".to_string(),
    }
}

impl UbiftImage {
    /// Reconstructs the UBI instance backing the partition at
    /// `partition_offset`.
    pub fn ubi_instance(
        &self,
        partition_offset: usize,
        peb_size_override: Option<usize>,
    ) -> Result<UbiInstance, UbiftError> {
        let partition = self.resolve_partition(partition_offset, peb_size_override)?;
        Ok(UbiInstance::build(&self.image, &partition)?)
    }

    /// Lists the volumes of the UBI instance at `partition_offset`.
    pub fn ubils(
        &self,
        partition_offset: usize,
        peb_size_override: Option<usize>,
    ) -> Result<Vec<VolumeRow>, UbiftError> {
        let instance = self.ubi_instance(partition_offset, peb_size_override)?;
        Ok(instance
            .volumes()?
            .into_iter()
            .map(|volume| VolumeRow {
                id: volume.vol_id,
                name: volume.name.clone(),
                size_lebs: volume.leb_count,
                vol_type: describe_vol_type(volume.vol_type),
                orphan: volume.orphan,
            })
            .collect())
    }

    /// Every LEB's data, concatenated in LEB order — the whole logical
    /// volume as one byte stream.
    pub fn ubicat(
        &self,
        partition_offset: usize,
        peb_size_override: Option<usize>,
        volume_name: &str,
    ) -> Result<Vec<u8>, UbiftError> {
        let instance = self.ubi_instance(partition_offset, peb_size_override)?;
        let volume = self.resolve_volume(&instance, volume_name)?;
        let mut out = Vec::with_capacity(volume.leb_count as usize * volume.leb_size);
        for lnum in 0..volume.leb_count {
            out.extend_from_slice(&volume.read_leb(lnum)?);
        }
        Ok(out)
    }

    /// Lists every LEB of `volume_name`: its backing PEB index (if any)
    /// and whether it's currently mapped.
    pub fn lebls(
        &self,
        partition_offset: usize,
        peb_size_override: Option<usize>,
        volume_name: &str,
    ) -> Result<Vec<LebRow>, UbiftError> {
        let instance = self.ubi_instance(partition_offset, peb_size_override)?;
        let volume = self.resolve_volume(&instance, volume_name)?;
        let leb_map = instance.leb_map();
        Ok((0..volume.leb_count)
            .map(|lnum| {
                let peb = leb_map.get(&(volume.vol_id, lnum)).copied();
                LebRow {
                    lnum,
                    peb,
                    mapped: peb.is_some(),
                }
            })
            .collect())
    }

    /// One LEB's bytes.
    pub fn lebcat(
        &self,
        partition_offset: usize,
        peb_size_override: Option<usize>,
        volume_name: &str,
        lnum: u32,
    ) -> Result<Vec<u8>, UbiftError> {
        let instance = self.ubi_instance(partition_offset, peb_size_override)?;
        let volume = self.resolve_volume(&instance, volume_name)?;
        Ok(volume.read_leb(lnum)?.to_vec())
    }

    pub(crate) fn resolve_volume(
        &self,
        instance: &UbiInstance,
        volume_name: &str,
    ) -> Result<UbiVolume, UbiftError> {
        instance
            .volumes()?
            .into_iter()
            .find(|volume| volume.name == volume_name)
            .ok_or_else(|| UbiftError::NoSuchVolumeName {
                name: volume_name.to_string(),
            })
    }
}
