/// Errors raised while reconstructing a UBI instance from an MTD partition.
#[derive(Debug, thiserror::Error)]
pub enum UbiError {
    /// The supplied partition was not detected/declared as a UBI partition.
    #[error("partition at {offset:#x} is not a UBI partition")]
    NotUbiPartition { offset: usize },

    #[error(transparent)]
    Core(#[from] ubift_core::CoreError),

    /// No valid copy of the layout volume (volume id 0x7FFFEFFF) could be
    /// found; volumes cannot be enumerated, though raw PEB/LEB access still
    /// works.
    #[error("no valid layout volume found in this UBI instance")]
    NoLayoutVolume,

    /// Two live PEBs claim the same (volume id, LEB number) with equal
    /// sequence number and equal erase counter: the conflict-resolution
    /// rule in §4.2 cannot break the tie. This should not occur on a
    /// well-formed image and aborts the enclosing command.
    #[error(
        "unresolvable LEB mapping conflict for volume {vol_id} leb {lnum}: \
         PEBs at {first_peb:#x} and {second_peb:#x} tie on sequence number and erase counter"
    )]
    UnresolvableConflict {
        vol_id: u32,
        lnum: u32,
        first_peb: usize,
        second_peb: usize,
    },

    /// A volume id was requested that is not present in this instance.
    #[error("no such volume id {0}")]
    NoSuchVolume(u32),

    /// A LEB index beyond the volume's declared length was requested.
    #[error("leb {lnum} is out of range for volume {vol_id} ({leb_count} LEBs)")]
    LebOutOfRange {
        vol_id: u32,
        lnum: u32,
        leb_count: u32,
    },
}
