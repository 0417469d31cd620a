//! Byte-level fixture builders shared by this crate's test modules: lays
//! out a complete UBI+UBIFS volume (layout volume, superblock, redundant
//! master pair, then caller-supplied LEBs) the same way `ubift`'s own
//! facade tests build one, just reusable across several files instead of
//! duplicated per file.

use ubift_common::crc32::{checksum, checksum_with_field_zeroed};
use ubift_common::types::{BE16, BE32, BE64, LE32, LE64};
use ubift_core::Image;
use ubift_fs::node::common::{CommonHeaderRaw, COMMON_HEADER_SIZE, NODE_MAGIC};
use ubift_fs::node::NodeType;
use ubift_fs::{Key, UbifsInstance};
use ubift_mtd::{MtdPartition, PartitionKind};
use ubift_ubi::{
    EcHeaderRaw, UbiInstance, UbiVolume, VidHeaderRaw, VtblRecordRaw, EC_HEADER_MAGIC,
    LAYOUT_VOLUME_ID, UBI_VERSION, VID_HEADER_MAGIC,
};

pub const PEB_SIZE: usize = 1 << 15;
pub const DATA_OFFSET: usize = 4096;

fn ec_and_vid(peb: &mut [u8], vol_id: u32, lnum: u32, sqnum: u64, data_size: u32) {
    let mut ec_header = EcHeaderRaw {
        magic: EC_HEADER_MAGIC,
        version: UBI_VERSION,
        padding1: [0; 3],
        ec: BE64::new(1),
        vid_hdr_offset: BE32::new(64),
        data_offset: BE32::new(DATA_OFFSET as u32),
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
        data_size: BE32::new(data_size),
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
}

fn layout_peb(entries: &[(u32, &str, u32)]) -> Vec<u8> {
    let mut peb = vec![0xFFu8; PEB_SIZE];
    ec_and_vid(&mut peb, LAYOUT_VOLUME_ID, 0, 1, 4096);
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
        let size = core::mem::size_of::<VtblRecordRaw>();
        let offset = 4096 + vol_id as usize * size;
        peb[offset..offset + size].copy_from_slice(bytemuck::bytes_of(&record));
    }
    peb
}

/// One PEB carrying `lnum` of volume `vol_id`, at sequence number `sqnum`.
pub fn data_peb_seq(vol_id: u32, lnum: u32, sqnum: u64, payload: &[u8]) -> Vec<u8> {
    let mut peb = vec![0xFFu8; PEB_SIZE];
    ec_and_vid(&mut peb, vol_id, lnum, sqnum, payload.len() as u32);
    peb[DATA_OFFSET..DATA_OFFSET + payload.len()].copy_from_slice(payload);
    peb
}

pub fn wrap_node(node_type: NodeType, sqnum: u64, payload: &[u8]) -> Vec<u8> {
    let len = (COMMON_HEADER_SIZE + payload.len()) as u32;
    let mut header = CommonHeaderRaw {
        magic: LE32::new(NODE_MAGIC),
        crc: LE32::new(0),
        sqnum: LE64::new(sqnum),
        len: LE32::new(len),
        node_type: node_type as u8,
        group_type: 0,
        padding: [0; 2],
    };
    let mut bytes = vec![0u8; len as usize];
    bytes[..COMMON_HEADER_SIZE].copy_from_slice(bytemuck::bytes_of(&header));
    bytes[COMMON_HEADER_SIZE..].copy_from_slice(payload);
    let crc = checksum(&bytes[8..]);
    header.crc = LE32::new(crc);
    bytes[..COMMON_HEADER_SIZE].copy_from_slice(bytemuck::bytes_of(&header));
    bytes
}

pub fn inode_payload(key: Key, size: u64, mode: u32, nlink: u32) -> Vec<u8> {
    let mut p = vec![0u8; 126];
    p[0..8].copy_from_slice(&key.to_raw());
    p[16..24].copy_from_slice(&size.to_le_bytes());
    p[60..64].copy_from_slice(&nlink.to_le_bytes());
    p[72..76].copy_from_slice(&mode.to_le_bytes());
    p
}

pub fn dentry_payload(key: Key, child_inum: u64, dirent_type: u8, name: &str) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(&key.to_raw());
    p.extend_from_slice(&child_inum.to_le_bytes());
    p.push(0);
    p.push(dirent_type);
    p.extend_from_slice(&(name.len() as u16).to_le_bytes());
    p.extend_from_slice(&[0u8; 4]);
    p.extend_from_slice(name.as_bytes());
    p
}

pub fn data_payload(key: Key, content: &[u8]) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(&key.to_raw());
    p.extend_from_slice(&(content.len() as u32).to_le_bytes());
    p.extend_from_slice(&0u16.to_le_bytes());
    p.extend_from_slice(&[0u8; 2]);
    p.extend_from_slice(content);
    p
}

pub fn index_payload(level: u16, branches: &[(Key, u32, u32, u32)]) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(&(branches.len() as u16).to_le_bytes());
    p.extend_from_slice(&level.to_le_bytes());
    for &(key, lnum, offs, len) in branches {
        p.extend_from_slice(&key.to_raw());
        p.extend_from_slice(&lnum.to_le_bytes());
        p.extend_from_slice(&offs.to_le_bytes());
        p.extend_from_slice(&len.to_le_bytes());
    }
    p
}

pub fn orphan_payload(commit_number: u64, inodes: &[u64]) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(&commit_number.to_le_bytes());
    for ino in inodes {
        p.extend_from_slice(&ino.to_le_bytes());
    }
    p
}

pub fn superblock_payload(leb_size: u32, leb_cnt: u32, log_lebs: u32, lpt_lebs: u32, orph_lebs: u32, fanout: u32) -> Vec<u8> {
    let mut p = vec![0u8; 64];
    p[8..12].copy_from_slice(&2048u32.to_le_bytes());
    p[12..16].copy_from_slice(&leb_size.to_le_bytes());
    p[16..20].copy_from_slice(&leb_cnt.to_le_bytes());
    p[20..24].copy_from_slice(&leb_cnt.to_le_bytes());
    p[32..36].copy_from_slice(&log_lebs.to_le_bytes());
    p[36..40].copy_from_slice(&lpt_lebs.to_le_bytes());
    p[40..44].copy_from_slice(&orph_lebs.to_le_bytes());
    p[48..52].copy_from_slice(&fanout.to_le_bytes());
    p[56..60].copy_from_slice(&4u32.to_le_bytes());
    p
}

pub fn master_payload(commit_number: u64, root_lnum: u32, root_offs: u32, root_len: u32) -> Vec<u8> {
    let mut p = vec![0u8; 488];
    p[8..16].copy_from_slice(&commit_number.to_le_bytes());
    p[24..28].copy_from_slice(&root_lnum.to_le_bytes());
    p[28..32].copy_from_slice(&root_offs.to_le_bytes());
    p[32..36].copy_from_slice(&root_len.to_le_bytes());
    p
}

/// Lays a "rootfs" volume out from `leb_contents` (LEB 3 onward; LEB 0 is
/// the superblock, 1/2 the redundant master pair supplied separately) and
/// opens it, returning the `UbiInstance`, the `UbiVolume`, and the parsed
/// `UbifsInstance`.
pub struct Fixture {
    pub ubi: UbiInstance,
    pub volume: UbiVolume,
    pub instance: UbifsInstance,
}

pub fn open_fixture(
    superblock_args: (u32, u32, u32, u32, u32, u32), // leb_size, leb_cnt, log_lebs, lpt_lebs, orph_lebs, fanout
    master_args: (u64, u32, u32, u32), // commit_number, root_lnum, root_offs, root_len
    leb_contents: Vec<Vec<u8>>, // LEB 3 onward, in order
) -> Fixture {
    let (leb_size, leb_cnt, log_lebs, lpt_lebs, orph_lebs, fanout) = superblock_args;
    let superblock = wrap_node(NodeType::Superblock, 0, &superblock_payload(leb_size, leb_cnt, log_lebs, lpt_lebs, orph_lebs, fanout));
    let (commit_number, root_lnum, root_offs, root_len) = master_args;
    let master = wrap_node(NodeType::Master, 1, &master_payload(commit_number, root_lnum, root_offs, root_len));

    let peb_count = 3 + leb_contents.len();
    let mut bytes = layout_peb(&[(0, "rootfs", peb_count as u32)]);
    bytes.extend(data_peb_seq(0, 0, 10, &superblock));
    bytes.extend(data_peb_seq(0, 1, 11, &master));
    bytes.extend(data_peb_seq(0, 2, 11, &master));
    for (offset, leb) in leb_contents.iter().enumerate() {
        bytes.extend(data_peb_seq(0, (offset + 3) as u32, 20 + offset as u64, leb));
    }

    let image = Image::from_bytes(bytes);
    let partition = MtdPartition {
        offset: 0,
        length: PEB_SIZE * (peb_count + 1),
        kind: PartitionKind::Ubi { peb_size: PEB_SIZE },
    };
    let ubi = UbiInstance::build(&image, &partition).unwrap();
    let volume = ubi.volumes().unwrap().into_iter().find(|v| v.name == "rootfs").unwrap();
    let instance = UbifsInstance::open(volume.clone()).unwrap();
    Fixture { ubi, volume, instance }
}
