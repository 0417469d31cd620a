/// Magic bytes at the start of every UBI EC header, little-endian on flash.
pub const EC_HEADER_MAGIC: [u8; 4] = *b"UBI#";

/// Plausible PEB sizes, smallest to largest (32 KiB..=1 MiB), matching the
/// geometries real NAND/NOR devices use.
pub const CANDIDATE_PEB_SIZES: [usize; 6] = [
    1 << 15,
    1 << 16,
    1 << 17,
    1 << 18,
    1 << 19,
    1 << 20,
];

pub fn is_plausible_peb_size(size: usize) -> bool {
    CANDIDATE_PEB_SIZES.contains(&size)
}

/// What a contiguous region of the image appears to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    /// The region's PEB boundaries carry valid EC header magic at the given
    /// PEB size; a `ubift-ubi` instance can plausibly be reconstructed here.
    Ubi { peb_size: usize },
    /// No UBI signature was found; raw-PEB commands may still be useful.
    Unknown,
}

/// A contiguous slice of an [`ubift_core::Image`], with a tentative
/// description of what it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MtdPartition {
    pub offset: usize,
    pub length: usize,
    pub kind: PartitionKind,
}

impl MtdPartition {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn is_ubi(&self) -> bool {
        matches!(self.kind, PartitionKind::Ubi { .. })
    }
}
