//! The `InputError` / `GeometryError` portion of the error taxonomy (§7).
//! Higher layers (`ubift-ubi`, `ubift-fs`, `ubift-recovery`) define their own
//! `IntegrityError` / `DecodingError` / `UnrecoverableError` enums and wrap
//! `CoreError` through `#[from]` where an image-level failure is the root
//! cause.

/// Errors that originate at the image/partition level, before any UBI or
/// UBIFS structure has been parsed.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The input file could not be opened or read.
    #[error("cannot read input image at {path}: {source}")]
    UnreadableInput {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A caller-supplied offset or length does not fit within the image.
    #[error("offset {offset:#x} with length {len} is out of bounds (image is {image_len} bytes)")]
    OutOfBounds {
        offset: usize,
        len: usize,
        image_len: usize,
    },

    /// Neither an explicit geometry nor a detectable UBI signature was
    /// found, and the requested operation cannot proceed without one.
    #[error("cannot determine flash geometry (PEB size): no UBI signature found and none was supplied")]
    UndeterminedGeometry,
}

impl From<ubift_io::Error> for CoreError {
    fn from(value: ubift_io::Error) -> Self {
        CoreError::OutOfBounds {
            offset: value.offset,
            len: value.len,
            // The image length isn't known to ubift-io; callers that care
            // about the exact figure should consult `Image::len` directly.
            image_len: 0,
        }
    }
}
