/// The facade's error type: every layer's error wrapped by `#[from]`, plus
/// the handful of "no such X" lookups that only make sense once several
/// layers are in play together.
#[derive(Debug, thiserror::Error)]
pub enum UbiftError {
    #[error(transparent)]
    Core(#[from] ubift_core::CoreError),

    #[error(transparent)]
    Mtd(#[from] ubift_mtd::MtdError),

    #[error(transparent)]
    Ubi(#[from] ubift_ubi::UbiError),

    #[error(transparent)]
    Fs(#[from] ubift_fs::FsError),

    #[error(transparent)]
    Recovery(#[from] ubift_recovery::RecoveryError),

    #[error("no partition found at offset {offset:#x}")]
    NoSuchPartition { offset: usize },

    #[error("partition index {index} is out of range ({count} partitions)")]
    NoSuchPartitionIndex { index: usize, count: usize },

    #[error("PEB index {index} is out of range ({count} PEBs in partition)")]
    NoSuchPeb { index: usize, count: usize },

    #[error("no volume named {name:?} in this UBI instance")]
    NoSuchVolumeName { name: String },

    #[error("failed to write recovered tree to {path}: {source}")]
    RecoveryWrite {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
