//! The facade: [`UbiftImage`] ties the MTD scanner, UBI reconstructor,
//! UBIFS parser and recovery engine into the single entry point the CLI
//! (and any other embedder) drives.

mod error;
mod fs;
mod mtd;
mod recover;
mod ubi;

pub mod model;

pub use error::UbiftError;
pub use model::{
    DentryRow, FsStatRow, InodeRow, InfoRow, JournalRow, LebRow, PartitionRow, VolumeRow,
};
pub use recover::VolumeRecoveryOutcome;

use std::path::Path;
use ubift_core::{Cancellation, Image};

/// The sole physical input, held once and re-read lazily by every query.
pub struct UbiftImage {
    image: Image,
    cancel: Cancellation,
}

impl UbiftImage {
    /// Memory-maps `path` as the input image.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, UbiftError> {
        Ok(Self {
            image: Image::open(path)?,
            cancel: Cancellation::new(),
        })
    }

    /// Wraps an in-memory buffer, for fixtures and tests.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            image: Image::from_bytes(bytes),
            cancel: Cancellation::new(),
        }
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    /// A cloneable handle an embedder can call `.cancel()` on, from another
    /// thread, to stop an in-flight scan (partition detection, TNC walk, or
    /// recovery pass) started by this image's query methods.
    pub fn cancel_handle(&self) -> Cancellation {
        self.cancel.clone()
    }
}
