//! `fsstat` / `fls` / `ils` / `istat` / `icat` / `ffind` / `jls`: the L3
//! UBIFS query surface, plus the deleted-mode views `--deleted` asks for
//! by correlating with the L4 recovery engine.

use crate::error::UbiftError;
use crate::model::{dirent_kind, DentryRow, FsStatRow, InodeRow, JournalRow};
use crate::UbiftImage;
use ubift_fs::{scan_leb, InodeNode, Node, UbifsInstance};
use ubift_recovery::recover;
use ubift_ubi::{UbiInstance, UbiVolume};

pub const ROOT_INODE: u64 = 1;

fn kind_from_mode(mode: u32) -> &'static str {
    const S_IFMT: u32 = 0o170000;
    match mode & S_IFMT {
        0o040000 => "dir",
        0o100000 => "file",
        0o120000 => "symlink",
        0o020000 => "chrdev",
        0o060000 => "blkdev",
        0o010000 => "fifo",
        0o140000 => "sock",
        _ => "unknown",
    }
}

fn inode_row(inode: &InodeNode, deleted: bool) -> InodeRow {
    InodeRow {
        inode: inode.key.inum as u64,
        size: inode.size,
        mode: inode.mode,
        uid: inode.uid,
        gid: inode.gid,
        nlink: inode.nlink,
        atime: inode.atime_sec,
        ctime: inode.ctime_sec,
        mtime: inode.mtime_sec,
        deleted,
    }
}

impl UbiftImage {
    /// Opens the UBI instance, volume and UBIFS instance (with journal
    /// replayed) that `volume_name` resolves to. Returns the `UbiInstance`
    /// and a clone of the `UbiVolume` alongside the parsed `UbifsInstance`
    /// because the recovery engine (deleted-mode queries) needs all three.
    pub(crate) fn open_ubifs(
        &self,
        partition_offset: usize,
        peb_size_override: Option<usize>,
        volume_name: &str,
    ) -> Result<(UbiInstance, UbiVolume, UbifsInstance), UbiftError> {
        let ubi_instance = self.ubi_instance(partition_offset, peb_size_override)?;
        let volume = self.resolve_volume(&ubi_instance, volume_name)?;
        let fs_instance = UbifsInstance::open(volume.clone())?;
        Ok((ubi_instance, volume, fs_instance))
    }

    pub fn fsstat(
        &self,
        partition_offset: usize,
        peb_size_override: Option<usize>,
        volume_name: &str,
    ) -> Result<FsStatRow, UbiftError> {
        let (_, _, instance) = self.open_ubifs(partition_offset, peb_size_override, volume_name)?;
        Ok(FsStatRow {
            min_io_size: instance.superblock.min_io_size,
            leb_size: instance.superblock.leb_size,
            leb_cnt: instance.superblock.leb_cnt,
            max_leb_cnt: instance.superblock.max_leb_cnt,
            log_lebs: instance.superblock.log_lebs,
            lpt_lebs: instance.superblock.lpt_lebs,
            orph_lebs: instance.superblock.orph_lebs,
            fanout: instance.superblock.fanout,
            fmt_version: instance.superblock.fmt_version,
            default_compr: format!("{:?}", instance.superblock.default_compr),
            commit_number: instance.master.commit_number,
            root_lnum: instance.master.root_lnum,
            root_offs: instance.master.root_offs,
            root_len: instance.master.root_len,
        })
    }

    /// Lists `(type, inode#, parent#, name)` for the directory `inode`
    /// (root by default). With `deleted`, also includes tombstoned
    /// entries correlated back to a former child inode.
    pub fn fls(
        &self,
        partition_offset: usize,
        peb_size_override: Option<usize>,
        volume_name: &str,
        inode: Option<u64>,
        deleted: bool,
    ) -> Result<Vec<DentryRow>, UbiftError> {
        let (ubi, volume, instance) = self.open_ubifs(partition_offset, peb_size_override, volume_name)?;
        let dir_ino = inode.unwrap_or(ROOT_INODE);

        let mut rows: Vec<DentryRow> = instance
            .list_dir(dir_ino, &self.cancel)?
            .into_iter()
            .map(|dentry| DentryRow {
                kind: dirent_kind(dentry.dirent_type),
                inode: dentry.child_inum,
                parent: dentry.key.inum as u64,
                name: dentry.name_lossy(),
                deleted: false,
            })
            .collect();

        if deleted {
            let outcome = recover(&ubi, &volume, &instance, &self.cancel)?;
            for object in outcome.objects {
                if object.parent != Some(dir_ino) {
                    continue;
                }
                rows.push(DentryRow {
                    kind: kind_from_mode(object.inode.mode),
                    inode: object.inode.key.inum as u64,
                    parent: dir_ino,
                    name: object.name.unwrap_or_default(),
                    deleted: true,
                });
            }
        }
        Ok(rows)
    }

    /// Lists every inode's metadata row. With `deleted`, also includes
    /// inodes recovered from the orphan area and tombstone correlation.
    pub fn ils(
        &self,
        partition_offset: usize,
        peb_size_override: Option<usize>,
        volume_name: &str,
        deleted: bool,
    ) -> Result<Vec<InodeRow>, UbiftError> {
        let (ubi, volume, instance) = self.open_ubifs(partition_offset, peb_size_override, volume_name)?;
        let mut rows: Vec<InodeRow> = instance
            .list_inodes(&self.cancel)?
            .iter()
            .map(|inode| inode_row(inode, false))
            .collect();

        if deleted {
            let outcome = recover(&ubi, &volume, &instance, &self.cancel)?;
            let live: std::collections::BTreeSet<u64> =
                rows.iter().map(|row| row.inode).collect();
            for object in outcome.objects {
                let ino = object.inode.key.inum as u64;
                if live.contains(&ino) {
                    continue;
                }
                rows.push(inode_row(&object.inode, true));
            }
        }
        Ok(rows)
    }

    pub fn istat(
        &self,
        partition_offset: usize,
        peb_size_override: Option<usize>,
        volume_name: &str,
        inode: u64,
    ) -> Result<InodeRow, UbiftError> {
        let (_, _, instance) = self.open_ubifs(partition_offset, peb_size_override, volume_name)?;
        Ok(inode_row(&instance.stat_inode(inode)?, false))
    }

    /// File contents for `inode`. With `deleted`, falls back to
    /// reassembling a recovered object's data when the inode has no live
    /// index entry.
    pub fn icat(
        &self,
        partition_offset: usize,
        peb_size_override: Option<usize>,
        volume_name: &str,
        inode: u64,
        deleted: bool,
    ) -> Result<Vec<u8>, UbiftError> {
        let (ubi, volume, instance) = self.open_ubifs(partition_offset, peb_size_override, volume_name)?;
        match instance.read_inode(inode, &self.cancel) {
            Ok(data) => Ok(data),
            Err(err) if deleted => {
                let outcome = recover(&ubi, &volume, &instance, &self.cancel)?;
                outcome
                    .objects
                    .into_iter()
                    .find(|object| object.inode.key.inum as u64 == inode)
                    .map(|object| object.data)
                    .ok_or(UbiftError::Fs(err))
            }
            Err(err) => Err(UbiftError::Fs(err)),
        }
    }

    /// Every dentry pointing at `inode`, live or (best-effort) recovered.
    pub fn ffind(
        &self,
        partition_offset: usize,
        peb_size_override: Option<usize>,
        volume_name: &str,
        inode: u64,
    ) -> Result<Vec<DentryRow>, UbiftError> {
        let (ubi, volume, instance) = self.open_ubifs(partition_offset, peb_size_override, volume_name)?;
        let mut rows: Vec<DentryRow> = instance
            .find_dentries_for(inode, &self.cancel)?
            .into_iter()
            .map(|dentry| DentryRow {
                kind: dirent_kind(dentry.dirent_type),
                inode,
                parent: dentry.key.inum as u64,
                name: dentry.name_lossy(),
                deleted: false,
            })
            .collect();

        let outcome = recover(&ubi, &volume, &instance, &self.cancel)?;
        for object in outcome.objects {
            if object.inode.key.inum as u64 != inode {
                continue;
            }
            if let (Some(parent), Some(name)) = (object.parent, object.name.clone()) {
                rows.push(DentryRow {
                    kind: kind_from_mode(object.inode.mode),
                    inode,
                    parent,
                    name,
                    deleted: true,
                });
            }
        }
        Ok(rows)
    }

    /// Every node in the journal's bud LEBs, in sequence-number order —
    /// the raw replay input, not deduplicated by key the way the overlay
    /// used for live queries is.
    pub fn jls(
        &self,
        partition_offset: usize,
        peb_size_override: Option<usize>,
        volume_name: &str,
    ) -> Result<Vec<JournalRow>, UbiftError> {
        let (_, volume, instance) = self.open_ubifs(partition_offset, peb_size_override, volume_name)?;
        let buds = ubift_fs::journal::discover_bud_lnums(&volume, instance.layout.log)?;

        let mut rows = Vec::new();
        for lnum in buds {
            if lnum >= volume.leb_count {
                continue;
            }
            let leb = volume.read_leb(lnum)?;
            for (_offset, node) in scan_leb(&leb, lnum, false) {
                let inode = ubift_fs::key_of(&node).map(|key| key.inum);
                rows.push(JournalRow {
                    sqnum: node.sqnum(),
                    lnum,
                    node_type: node_type_name(&node),
                    inode,
                });
            }
        }
        rows.sort_by_key(|row| row.sqnum);
        Ok(rows)
    }
}

fn node_type_name(node: &Node) -> String {
    match node {
        Node::Inode(_) => "inode",
        Node::Data(_) => "data",
        Node::Dentry(_) => "dentry",
        Node::XattrEntry(_) => "xattr-entry",
        Node::Truncation(_) => "truncation",
        Node::Index(_) => "index",
        Node::Reference(_) => "reference",
        Node::Orphan(_) => "orphan",
        Node::Housekeeping(node_type) => return format!("{node_type:?}").to_lowercase(),
    }
    .to_string()
}

/// Builds a minimal but fully on-disk UBIFS volume (superblock, master,
/// a one-level TNC index rooted on LEB 3) to exercise the facade's query
/// surface end to end, the way `ubift-fs`'s own fixtures build single
/// nodes to exercise one parser at a time.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::UbiftImage;
    use pretty_assertions::assert_eq;
    use ubift_common::crc32::{checksum, checksum_with_field_zeroed};
    use ubift_common::types::{BE16, BE32, BE64, LE32, LE64};
    use ubift_fs::node::common::{CommonHeaderRaw, COMMON_HEADER_SIZE, NODE_MAGIC};
    use ubift_fs::node::NodeType;
    use ubift_ubi::{EcHeaderRaw, VidHeaderRaw, VtblRecordRaw, EC_HEADER_MAGIC, LAYOUT_VOLUME_ID, UBI_VERSION, VID_HEADER_MAGIC};

    const PEB_SIZE: usize = 1 << 15;
    const DATA_OFFSET: usize = 4096;

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

    fn data_peb(vol_id: u32, lnum: u32, payload: &[u8]) -> Vec<u8> {
        let mut peb = vec![0xFFu8; PEB_SIZE];
        ec_and_vid(&mut peb, vol_id, lnum, 10 + lnum as u64, payload.len() as u32);
        peb[DATA_OFFSET..DATA_OFFSET + payload.len()].copy_from_slice(payload);
        peb
    }

    fn wrap_node(node_type: NodeType, sqnum: u64, payload: &[u8]) -> Vec<u8> {
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

    fn inode_payload(key: ubift_fs::Key, size: u64, mode: u32, nlink: u32) -> Vec<u8> {
        let mut p = vec![0u8; 126];
        p[0..8].copy_from_slice(&key.to_raw());
        p[16..24].copy_from_slice(&size.to_le_bytes());
        p[60..64].copy_from_slice(&nlink.to_le_bytes());
        p[72..76].copy_from_slice(&mode.to_le_bytes());
        p
    }

    fn dentry_payload(key: ubift_fs::Key, child_inum: u64, dirent_type: u8, name: &str) -> Vec<u8> {
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

    fn data_payload(key: ubift_fs::Key, content: &[u8]) -> Vec<u8> {
        let mut p = Vec::new();
        p.extend_from_slice(&key.to_raw());
        p.extend_from_slice(&(content.len() as u32).to_le_bytes());
        p.extend_from_slice(&0u16.to_le_bytes());
        p.extend_from_slice(&[0u8; 2]);
        p.extend_from_slice(content);
        p
    }

    fn index_payload(level: u16, branches: &[(ubift_fs::Key, u32, u32, u32)]) -> Vec<u8> {
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

    fn superblock_payload(leb_size: u32, leb_cnt: u32, log_lebs: u32, lpt_lebs: u32, orph_lebs: u32, fanout: u32) -> Vec<u8> {
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

    fn master_payload(commit_number: u64, root_lnum: u32, root_offs: u32, root_len: u32) -> Vec<u8> {
        let mut p = vec![0u8; 488];
        p[8..16].copy_from_slice(&commit_number.to_le_bytes());
        p[24..28].copy_from_slice(&root_lnum.to_le_bytes());
        p[28..32].copy_from_slice(&root_offs.to_le_bytes());
        p[32..36].copy_from_slice(&root_len.to_le_bytes());
        p
    }

    /// Lays out one UBI volume ("rootfs", 4 LEBs): superblock on LEB 0,
    /// an identical master copy on LEBs 1 and 2, and a single-level TNC
    /// index on LEB 3 holding a root directory (inode 1), one dentry
    /// ("hello.txt" -> inode 2), the file inode and its one data block.
    fn build_fixture() -> Vec<u8> {
        use ubift_fs::{Key, KeyType};

        let inode1 = wrap_node(
            NodeType::Inode,
            10,
            &inode_payload(Key::new(1, KeyType::Inode, 0), 0, 0o040_755, 2),
        );
        let dentry_off = inode1.len() as u32;
        let dentry = wrap_node(
            NodeType::Dentry,
            11,
            &dentry_payload(Key::new(1, KeyType::Dentry, 99), 2, 1, "hello.txt"),
        );
        let inode2_off = dentry_off + dentry.len() as u32;
        let inode2 = wrap_node(
            NodeType::Inode,
            12,
            &inode_payload(Key::new(2, KeyType::Inode, 0), 11, 0o100_644, 1),
        );
        let data_off = inode2_off + inode2.len() as u32;
        let data = wrap_node(NodeType::Data, 13, &data_payload(Key::new(2, KeyType::Data, 0), b"hello world"));
        let index_off = data_off + data.len() as u32;

        let branches = [
            (Key::new(1, KeyType::Inode, 0), 3u32, 0u32, inode1.len() as u32),
            (Key::new(1, KeyType::Dentry, 99), 3u32, dentry_off, dentry.len() as u32),
            (Key::new(2, KeyType::Inode, 0), 3u32, inode2_off, inode2.len() as u32),
            (Key::new(2, KeyType::Data, 0), 3u32, data_off, data.len() as u32),
        ];
        let index = wrap_node(NodeType::Index, 14, &index_payload(0, &branches));

        let mut leb3 = Vec::new();
        leb3.extend(inode1);
        leb3.extend(dentry);
        leb3.extend(inode2);
        leb3.extend(data);
        leb3.extend(&index);

        let master = wrap_node(NodeType::Master, 1, &master_payload(1, 3, index_off, index.len() as u32));
        let superblock = wrap_node(NodeType::Superblock, 0, &superblock_payload(28_672, 4, 0, 0, 0, 8));

        let mut bytes = Vec::new();
        bytes.extend(layout_peb(&[(0, "rootfs", 4)]));
        bytes.extend(data_peb(0, 0, &superblock));
        bytes.extend(data_peb(0, 1, &master));
        bytes.extend(data_peb(0, 2, &master));
        bytes.extend(data_peb(0, 3, &leb3));
        bytes
    }

    #[test]
    fn facade_queries_a_minimal_ubifs_volume_end_to_end() {
        let image = UbiftImage::from_bytes(build_fixture());

        let stat = image.fsstat(0, Some(PEB_SIZE), "rootfs").unwrap();
        assert_eq!(stat.leb_cnt, 4);
        assert_eq!(stat.fanout, 8);
        assert_eq!(stat.commit_number, 1);

        let root = image.istat(0, Some(PEB_SIZE), "rootfs", ROOT_INODE).unwrap();
        assert_eq!(root.mode & 0o170_000, 0o040_000);

        let entries = image.fls(0, Some(PEB_SIZE), "rootfs", None, false).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "hello.txt");
        assert_eq!(entries[0].inode, 2);
        assert_eq!(entries[0].kind, "file");

        let data = image.icat(0, Some(PEB_SIZE), "rootfs", 2, false).unwrap();
        assert_eq!(data, b"hello world");

        let journal = image.jls(0, Some(PEB_SIZE), "rootfs").unwrap();
        assert!(journal.is_empty());
    }

    #[test]
    fn istat_rejects_an_inode_with_no_index_entry() {
        let image = UbiftImage::from_bytes(build_fixture());
        let err = image.istat(0, Some(PEB_SIZE), "rootfs", 99).unwrap_err();
        assert!(matches!(err, UbiftError::Fs(_)));
    }

    /// A live file ("keep.txt") plus a second file ("hello.txt") that's
    /// been unlinked: its dentry is now a tombstone in the index, and its
    /// former dentry/inode/data sit unindexed in the same LEB.
    fn build_fixture_with_deleted() -> Vec<u8> {
        use ubift_fs::{Key, KeyType};

        let inode1 = wrap_node(
            NodeType::Inode,
            10,
            &inode_payload(Key::new(1, KeyType::Inode, 0), 0, 0o040_755, 2),
        );
        let dentry_keep = wrap_node(
            NodeType::Dentry,
            11,
            &dentry_payload(Key::new(1, KeyType::Dentry, 55), 3, 1, "keep.txt"),
        );
        let inode3 = wrap_node(
            NodeType::Inode,
            12,
            &inode_payload(Key::new(3, KeyType::Inode, 0), 4, 0o100_644, 1),
        );
        let data3 = wrap_node(NodeType::Data, 13, &data_payload(Key::new(3, KeyType::Data, 0), b"keep"));
        let old_dentry_hello = wrap_node(
            NodeType::Dentry,
            20,
            &dentry_payload(Key::new(1, KeyType::Dentry, 99), 2, 1, "hello.txt"),
        );
        let old_inode2 = wrap_node(
            NodeType::Inode,
            21,
            &inode_payload(Key::new(2, KeyType::Inode, 0), 11, 0o100_644, 1),
        );
        let old_data2 = wrap_node(NodeType::Data, 22, &data_payload(Key::new(2, KeyType::Data, 0), b"hello world"));
        let tombstone_hello = wrap_node(
            NodeType::Dentry,
            30,
            &dentry_payload(Key::new(1, KeyType::Dentry, 99), 0, 1, "hello.txt"),
        );

        let mut offset = 0u32;
        let mut at = |len: usize| {
            let start = offset;
            offset += len as u32;
            start
        };
        let inode1_off = at(inode1.len());
        let dentry_keep_off = at(dentry_keep.len());
        let inode3_off = at(inode3.len());
        let data3_off = at(data3.len());
        at(old_dentry_hello.len());
        at(old_inode2.len());
        at(old_data2.len());
        let tombstone_off = at(tombstone_hello.len());
        let index_off = offset;

        let branches = [
            (Key::new(1, KeyType::Inode, 0), 3u32, inode1_off, inode1.len() as u32),
            (Key::new(1, KeyType::Dentry, 55), 3u32, dentry_keep_off, dentry_keep.len() as u32),
            (Key::new(3, KeyType::Inode, 0), 3u32, inode3_off, inode3.len() as u32),
            (Key::new(3, KeyType::Data, 0), 3u32, data3_off, data3.len() as u32),
            (Key::new(1, KeyType::Dentry, 99), 3u32, tombstone_off, tombstone_hello.len() as u32),
        ];
        let index = wrap_node(NodeType::Index, 31, &index_payload(0, &branches));

        let mut leb3 = Vec::new();
        leb3.extend(inode1);
        leb3.extend(dentry_keep);
        leb3.extend(inode3);
        leb3.extend(data3);
        leb3.extend(old_dentry_hello);
        leb3.extend(old_inode2);
        leb3.extend(old_data2);
        leb3.extend(tombstone_hello);
        leb3.extend(&index);

        let master = wrap_node(NodeType::Master, 1, &master_payload(1, 3, index_off, index.len() as u32));
        let superblock = wrap_node(NodeType::Superblock, 0, &superblock_payload(28_672, 4, 0, 0, 0, 8));

        let mut bytes = Vec::new();
        bytes.extend(layout_peb(&[(0, "rootfs", 4)]));
        bytes.extend(data_peb(0, 0, &superblock));
        bytes.extend(data_peb(0, 1, &master));
        bytes.extend(data_peb(0, 2, &master));
        bytes.extend(data_peb(0, 3, &leb3));
        bytes
    }

    #[test]
    fn fls_with_deleted_is_a_superset_of_fls_without() {
        let image = UbiftImage::from_bytes(build_fixture_with_deleted());

        let live = image.fls(0, Some(PEB_SIZE), "rootfs", None, false).unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].name, "keep.txt");

        let with_deleted = image.fls(0, Some(PEB_SIZE), "rootfs", None, true).unwrap();
        assert_eq!(with_deleted.len(), 2);
        assert!(with_deleted.iter().any(|row| row.name == "hello.txt" && row.deleted));

        assert!(live
            .iter()
            .all(|row| with_deleted.iter().any(|d| d.inode == row.inode && d.name == row.name)));
    }

    #[test]
    fn icat_deleted_mode_returns_data_of_declared_inode_size() {
        let image = UbiftImage::from_bytes(build_fixture_with_deleted());
        let data = image.icat(0, Some(PEB_SIZE), "rootfs", 2, true).unwrap();
        assert_eq!(data.len(), 11);
        assert_eq!(data, b"hello world");
    }

    /// `mkfs.ubifs` keeps two master copies precisely so one can be
    /// corrupt; a crash mid-write to LEB 1 shouldn't stop the volume from
    /// opening off LEB 2's copy.
    #[test]
    fn opens_with_one_corrupt_master_copy() {
        use ubift_fs::{Key, KeyType};

        let inode1 = wrap_node(
            NodeType::Inode,
            10,
            &inode_payload(Key::new(1, KeyType::Inode, 0), 0, 0o040_755, 2),
        );
        let index = wrap_node(
            NodeType::Index,
            11,
            &index_payload(0, &[(Key::new(1, KeyType::Inode, 0), 3u32, 0u32, inode1.len() as u32)]),
        );
        let mut leb3 = Vec::new();
        leb3.extend(&inode1);
        leb3.extend(&index);

        let good_master = wrap_node(NodeType::Master, 1, &master_payload(1, 3, inode1.len() as u32, index.len() as u32));
        let mut bad_master = good_master.clone();
        let last = bad_master.len() - 1;
        bad_master[last] ^= 0xFF; // corrupt the payload after its CRC was computed
        let superblock = wrap_node(NodeType::Superblock, 0, &superblock_payload(28_672, 4, 0, 0, 0, 8));

        let mut bytes = Vec::new();
        bytes.extend(layout_peb(&[(0, "rootfs", 4)]));
        bytes.extend(data_peb(0, 0, &superblock));
        bytes.extend(data_peb(0, 1, &bad_master));
        bytes.extend(data_peb(0, 2, &good_master));
        bytes.extend(data_peb(0, 3, &leb3));

        let image = UbiftImage::from_bytes(bytes);
        let stat = image.fsstat(0, Some(PEB_SIZE), "rootfs").unwrap();
        assert_eq!(stat.commit_number, 1);
        let root = image.istat(0, Some(PEB_SIZE), "rootfs", ROOT_INODE).unwrap();
        assert_eq!(root.mode & 0o170_000, 0o040_000);
    }
}
