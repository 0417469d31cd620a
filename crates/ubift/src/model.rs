//! Plain, serde-friendly row types returned by the query surface — these,
//! not the lower layers' node structs, are what `ubift-cli` renders as a
//! table or dumps as `--json`.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PartitionRow {
    pub index: usize,
    pub offset: usize,
    pub length: usize,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeRow {
    pub id: u32,
    pub name: String,
    pub size_lebs: u32,
    pub vol_type: String,
    pub orphan: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LebRow {
    pub lnum: u32,
    pub peb: Option<usize>,
    pub mapped: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FsStatRow {
    pub min_io_size: u32,
    pub leb_size: u32,
    pub leb_cnt: u32,
    pub max_leb_cnt: u32,
    pub log_lebs: u32,
    pub lpt_lebs: u32,
    pub orph_lebs: u32,
    pub fanout: u32,
    pub fmt_version: u32,
    pub default_compr: String,
    pub commit_number: u64,
    pub root_lnum: u32,
    pub root_offs: u32,
    pub root_len: u32,
}

/// One `fls`/`ffind` row: a directory entry, live or recovered.
#[derive(Debug, Clone, Serialize)]
pub struct DentryRow {
    pub kind: &'static str,
    pub inode: u64,
    pub parent: u64,
    pub name: String,
    pub deleted: bool,
}

/// One `ils`/`istat` row: an inode's metadata, live or recovered.
#[derive(Debug, Clone, Serialize)]
pub struct InodeRow {
    pub inode: u64,
    pub size: u64,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub nlink: u32,
    pub atime: u64,
    pub ctime: u64,
    pub mtime: u64,
    pub deleted: bool,
}

/// One `jls` row: a bud-LEB node in sequence-number order.
#[derive(Debug, Clone, Serialize)]
pub struct JournalRow {
    pub sqnum: u64,
    pub lnum: u32,
    pub node_type: String,
    pub inode: Option<u32>,
}

/// `ubift_info`'s aggregate recoverability statistics.
#[derive(Debug, Clone, Serialize)]
pub struct InfoRow {
    pub quality: String,
    pub stale_pebs_found: usize,
    pub orphan_inodes_recovered: usize,
    pub tombstones_correlated: usize,
    pub loose_nodes_salvaged: usize,
    pub crc_failures_suppressed: usize,
    pub lebs_scanned: usize,
    pub lebs_with_valid_header: usize,
}

pub(crate) fn dirent_kind(tag: u8) -> &'static str {
    match tag {
        1 => "file",
        2 => "dir",
        3 => "chrdev",
        4 => "blkdev",
        5 => "fifo",
        6 => "sock",
        7 => "symlink",
        _ => "unknown",
    }
}
