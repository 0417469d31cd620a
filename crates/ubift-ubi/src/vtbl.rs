//! Parses the UBI layout volume: two redundant copies (LEBs 0 and 1 of
//! volume id [`LAYOUT_VOLUME_ID`]), one [`VtblRecordRaw`] per declared
//! volume.

use crate::headers::{VolType, VtblRecordRaw, LAYOUT_VOLUME_ID, VTBL_RECORD_SIZE};
use crate::peb::Peb;
use std::collections::BTreeMap;
use ubift_common::bytestr::display_name;
use ubift_common::crc32::checksum_with_field_zeroed;
use ubift_core::Image;

/// A single volume's declared metadata, decoded from its volume table
/// record.
#[derive(Debug, Clone)]
pub struct VolumeDescriptor {
    pub vol_id: u32,
    pub name: String,
    pub reserved_pebs: u32,
    pub alignment: u32,
    pub data_pad: u32,
    pub vol_type: Option<VolType>,
    pub flags: u8,
}

/// The decoded volume table: every non-empty record from whichever layout
/// volume copy won.
#[derive(Debug, Clone, Default)]
pub struct VolumeTable {
    pub volumes: BTreeMap<u32, VolumeDescriptor>,
}

struct CopyResult {
    peb_sqnum: u64,
    valid_count: usize,
    records: Vec<(u32, VtblRecordRaw)>,
}

fn parse_copy(image: &Image, peb: &Peb) -> Option<CopyResult> {
    let vid = peb.vid?;
    if vid.vol_id != LAYOUT_VOLUME_ID {
        return None;
    }
    let base = peb.data_offset_absolute();
    let slot_count = (peb.size.saturating_sub(peb.data_offset as usize)) / VTBL_RECORD_SIZE;

    let mut records = Vec::new();
    let mut valid_count = 0;
    for slot in 0..slot_count {
        let offset = base + slot * VTBL_RECORD_SIZE;
        let Ok(bytes) = image.slice_at(offset, VTBL_RECORD_SIZE) else {
            break;
        };
        let record: VtblRecordRaw = bytemuck::pod_read_unaligned(bytes);
        if record.is_empty_record() {
            continue;
        }
        let crc_ok =
            checksum_with_field_zeroed(bytes, VtblRecordRaw::CRC_OFFSET) == record.crc.get();
        if crc_ok {
            valid_count += 1;
            records.push((slot as u32, record));
        }
    }

    Some(CopyResult {
        peb_sqnum: vid.sqnum,
        valid_count,
        records,
    })
}

impl VolumeTable {
    /// Builds the volume table from whichever layout-volume copy (LEB 0 or
    /// LEB 1 of the layout volume) has more CRC-valid records; ties are
    /// broken by the copy's VID header sequence number.
    pub fn build(image: &Image, leb_map: &BTreeMap<(u32, u32), usize>, pebs: &[Peb]) -> Option<Self> {
        let copy0 = leb_map
            .get(&(LAYOUT_VOLUME_ID, 0))
            .and_then(|&index| parse_copy(image, &pebs[index]));
        let copy1 = leb_map
            .get(&(LAYOUT_VOLUME_ID, 1))
            .and_then(|&index| parse_copy(image, &pebs[index]));

        let chosen = match (copy0, copy1) {
            (Some(a), Some(b)) => {
                if b.valid_count > a.valid_count
                    || (b.valid_count == a.valid_count && b.peb_sqnum > a.peb_sqnum)
                {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }?;

        let mut volumes = BTreeMap::new();
        for (vol_id, record) in chosen.records {
            let name_len = record.name_len.get() as usize;
            volumes.insert(
                vol_id,
                VolumeDescriptor {
                    vol_id,
                    name: display_name(&record.name, name_len),
                    reserved_pebs: record.reserved_pebs.get(),
                    alignment: record.alignment.get(),
                    data_pad: record.data_pad.get(),
                    vol_type: VolType::from_raw(record.vol_type),
                    flags: record.flags,
                },
            );
        }
        Some(Self { volumes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::{EcHeaderRaw, VidHeaderRaw, EC_HEADER_MAGIC, UBI_VERSION, VID_HEADER_MAGIC};
    use crate::leb_map::build_leb_map;
    use ubift_common::types::{BE16, BE32, BE64};

    const PEB_SIZE: usize = 1 << 15;

    fn layout_peb(lnum: u32, sqnum: u64, entries: &[(u32, &str, u32)]) -> Vec<u8> {
        let mut peb = vec![0xFFu8; PEB_SIZE];

        let mut ec_header = EcHeaderRaw {
            magic: EC_HEADER_MAGIC,
            version: UBI_VERSION,
            padding1: [0; 3],
            ec: BE64::new(1),
            vid_hdr_offset: BE32::new(64),
            data_offset: BE32::new(4096),
            image_seq: BE32::new(1),
            padding2: [0; 32],
            hdr_crc: BE32::new(0),
        };
        let crc = checksum_with_field_zeroed(bytemuck::bytes_of(&ec_header), EcHeaderRaw::CRC_OFFSET);
        ec_header.hdr_crc = BE32::new(crc);
        peb[0..64].copy_from_slice(bytemuck::bytes_of(&ec_header));

        let mut vid_header = VidHeaderRaw {
            magic: VID_HEADER_MAGIC,
            version: UBI_VERSION,
            vol_type: 1,
            copy_flag: 0,
            compat: 5,
            vol_id: BE32::new(LAYOUT_VOLUME_ID),
            lnum: BE32::new(lnum),
            padding1: [0; 4],
            data_size: BE32::new(4096),
            used_ebs: BE32::new(2),
            data_pad: BE32::new(0),
            data_crc: BE32::new(0),
            padding2: [0; 4],
            sqnum: BE64::new(sqnum),
            padding3: [0; 12],
            hdr_crc: BE32::new(0),
        };
        let crc = checksum_with_field_zeroed(bytemuck::bytes_of(&vid_header), VidHeaderRaw::CRC_OFFSET);
        vid_header.hdr_crc = BE32::new(crc);
        peb[64..128].copy_from_slice(bytemuck::bytes_of(&vid_header));

        for &(vol_id, name, reserved_pebs) in entries {
            let mut name_buf = [0u8; 128];
            name_buf[..name.len()].copy_from_slice(name.as_bytes());
            let mut record = VtblRecordRaw {
                reserved_pebs: BE32::new(reserved_pebs),
                alignment: BE32::new(1),
                data_pad: BE32::new(0),
                vol_type: 1,
                upd_marker: 0,
                name_len: BE16::new(name.len() as u16),
                name: name_buf,
                flags: 0,
                padding: [0; 23],
                crc: BE32::new(0),
            };
            let crc = checksum_with_field_zeroed(bytemuck::bytes_of(&record), VtblRecordRaw::CRC_OFFSET);
            record.crc = BE32::new(crc);

            let offset = 4096 + vol_id as usize * VTBL_RECORD_SIZE;
            peb[offset..offset + VTBL_RECORD_SIZE].copy_from_slice(bytemuck::bytes_of(&record));
        }

        peb
    }

    #[test]
    fn builds_table_from_single_valid_copy() {
        let mut bytes = layout_peb(0, 1, &[(0, "rootfs", 100)]);
        bytes.extend(vec![0u8; PEB_SIZE]); // LEB 1 absent / blank
        let image = Image::from_bytes(bytes);

        let peb0 = Peb::parse(&image, 0, PEB_SIZE);
        let pebs = vec![peb0];
        let leb_map = build_leb_map(&pebs).unwrap();

        let table = VolumeTable::build(&image, &leb_map, &pebs).unwrap();
        let vol = table.volumes.get(&0).unwrap();
        assert_eq!(vol.name, "rootfs");
        assert_eq!(vol.reserved_pebs, 100);
    }
}
