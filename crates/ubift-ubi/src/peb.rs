use crate::headers::{EcHeaderRaw, VidHeaderRaw, VolType, VID_HEADER_MAGIC};
use ubift_common::crc32::checksum_with_field_zeroed;
use ubift_core::Image;

/// Decoded, CRC-checked VID header fields for a PEB that carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VidInfo {
    pub vol_id: u32,
    pub lnum: u32,
    pub data_size: u32,
    pub used_ebs: u32,
    pub data_pad: u32,
    pub data_crc: u32,
    pub sqnum: u64,
    pub vol_type: Option<VolType>,
    pub copy_flag: bool,
    pub compat: u8,
}

/// What an enumerated PEB turned out to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PebStatus {
    /// No EC header magic at all: erased/blank.
    Free,
    /// Valid EC header, no (or invalid) VID header: free for allocation or
    /// stale data the recovery layer may still care about.
    EcOnly,
    /// Valid EC and VID headers: live mapped data.
    Data,
    /// EC header present but its CRC does not validate.
    Corrupt,
}

/// One physical erase block as enumerated from the image.
#[derive(Debug, Clone, Copy)]
pub struct Peb {
    /// Absolute byte offset of this PEB within the image.
    pub offset: usize,
    pub size: usize,
    pub status: PebStatus,
    pub erase_counter: Option<u64>,
    pub vid_hdr_offset: u32,
    pub data_offset: u32,
    pub vid: Option<VidInfo>,
}

impl Peb {
    /// Parses the PEB at `offset` (a `size`-byte slice of `image`).
    pub fn parse(image: &Image, offset: usize, size: usize) -> Self {
        let ec_bytes = match image.slice_at(offset, core::mem::size_of::<EcHeaderRaw>()) {
            Ok(bytes) => bytes,
            Err(_) => {
                return Peb {
                    offset,
                    size,
                    status: PebStatus::Free,
                    erase_counter: None,
                    vid_hdr_offset: 64,
                    data_offset: 4096,
                    vid: None,
                }
            }
        };
        let ec_header: EcHeaderRaw = bytemuck::pod_read_unaligned(ec_bytes);

        if !ec_header.has_magic() {
            return Peb {
                offset,
                size,
                status: PebStatus::Free,
                erase_counter: None,
                vid_hdr_offset: 64,
                data_offset: 4096,
                vid: None,
            };
        }

        let ec_crc_ok = checksum_with_field_zeroed(ec_bytes, EcHeaderRaw::CRC_OFFSET)
            == ec_header.hdr_crc.get();
        if !ec_crc_ok {
            return Peb {
                offset,
                size,
                status: PebStatus::Corrupt,
                erase_counter: Some(ec_header.ec.get()),
                vid_hdr_offset: ec_header.vid_hdr_offset.get(),
                data_offset: ec_header.data_offset.get(),
                vid: None,
            };
        }

        let vid_hdr_offset = ec_header.vid_hdr_offset.get();
        let data_offset = ec_header.data_offset.get();
        let vid = parse_vid_header(image, offset + vid_hdr_offset as usize);

        Peb {
            offset,
            size,
            status: if vid.is_some() {
                PebStatus::Data
            } else {
                PebStatus::EcOnly
            },
            erase_counter: Some(ec_header.ec.get()),
            vid_hdr_offset,
            data_offset,
            vid,
        }
    }

    pub fn data_offset_absolute(&self) -> usize {
        self.offset + self.data_offset as usize
    }
}

fn parse_vid_header(image: &Image, offset: usize) -> Option<VidInfo> {
    let bytes = image
        .slice_at(offset, core::mem::size_of::<VidHeaderRaw>())
        .ok()?;
    let header: VidHeaderRaw = bytemuck::pod_read_unaligned(bytes);
    if !header.has_magic() || header.magic != VID_HEADER_MAGIC {
        return None;
    }
    let crc_ok =
        checksum_with_field_zeroed(bytes, VidHeaderRaw::CRC_OFFSET) == header.hdr_crc.get();
    if !crc_ok {
        return None;
    }
    Some(VidInfo {
        vol_id: header.vol_id.get(),
        lnum: header.lnum.get(),
        data_size: header.data_size.get(),
        used_ebs: header.used_ebs.get(),
        data_pad: header.data_pad.get(),
        data_crc: header.data_crc.get(),
        sqnum: header.sqnum.get(),
        vol_type: VolType::from_raw(header.vol_type),
        copy_flag: header.copy_flag != 0,
        compat: header.compat,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::{EC_HEADER_MAGIC, UBI_VERSION, VID_HEADER_MAGIC};
    use ubift_common::crc32::checksum_with_field_zeroed;
    use ubift_common::types::{BE32, BE64};

    fn build_peb(ec: u64, vol_id: u32, lnum: u32, sqnum: u64, peb_size: usize) -> Vec<u8> {
        let mut peb = vec![0xFFu8; peb_size];

        let mut ec_header = EcHeaderRaw {
            magic: EC_HEADER_MAGIC,
            version: UBI_VERSION,
            padding1: [0; 3],
            ec: BE64::new(ec),
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
            compat: 0,
            vol_id: BE32::new(vol_id),
            lnum: BE32::new(lnum),
            padding1: [0; 4],
            data_size: BE32::new(128),
            used_ebs: BE32::new(1),
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

        peb
    }

    #[test]
    fn parses_valid_data_peb() {
        let bytes = build_peb(5, 0, 2, 10, 1 << 15);
        let image = Image::from_bytes(bytes);
        let peb = Peb::parse(&image, 0, 1 << 15);
        assert_eq!(peb.status, PebStatus::Data);
        assert_eq!(peb.erase_counter, Some(5));
        let vid = peb.vid.unwrap();
        assert_eq!(vid.vol_id, 0);
        assert_eq!(vid.lnum, 2);
        assert_eq!(vid.sqnum, 10);
    }

    #[test]
    fn free_peb_has_no_magic() {
        let image = Image::from_bytes(vec![0xFFu8; 1 << 15]);
        let peb = Peb::parse(&image, 0, 1 << 15);
        assert_eq!(peb.status, PebStatus::Free);
    }

    #[test]
    fn corrupt_ec_crc_is_reported() {
        let mut bytes = build_peb(1, 0, 0, 1, 1 << 15);
        bytes[10] ^= 0xFF; // corrupt a byte inside the EC header, before the CRC field
        let image = Image::from_bytes(bytes);
        let peb = Peb::parse(&image, 0, 1 << 15);
        assert_eq!(peb.status, PebStatus::Corrupt);
    }
}
