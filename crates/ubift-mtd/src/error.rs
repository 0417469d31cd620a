/// Errors raised while locating MTD partitions within an image.
#[derive(Debug, thiserror::Error)]
pub enum MtdError {
    /// A caller-supplied offset for the bypass path (`scan_with_geometry`)
    /// falls outside the image.
    #[error("partition offset {offset:#x} is outside the {image_len}-byte image")]
    OffsetOutOfBounds { offset: usize, image_len: usize },

    /// A caller-supplied PEB size is not a power of two in the plausible
    /// range this toolkit understands (2^15..=2^20).
    #[error("PEB size {0:#x} is not a supported power of two (32 KiB..=1 MiB)")]
    ImplausiblePebSize(usize),
}
