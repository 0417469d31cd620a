//! The read-only byte array that is the sole physical input to the whole
//! stack (§3 "Image").

use crate::error::CoreError;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use ubift_io::ByteSource;

enum Backing {
    Mapped(memmap2::Mmap),
    Owned(Vec<u8>),
}

impl AsRef<[u8]> for Backing {
    fn as_ref(&self) -> &[u8] {
        match self {
            Backing::Mapped(mmap) => mmap.as_ref(),
            Backing::Owned(bytes) => bytes.as_slice(),
        }
    }
}

/// A raw NAND/NOR dump, addressed by absolute byte offset.
///
/// `Image` is cheap to clone (an `Arc` around the backing storage) because
/// every layer above it constructs its own lightweight view rather than
/// copying bytes eagerly; see §9 "Global state avoided".
#[derive(Clone)]
pub struct Image {
    backing: Arc<Backing>,
}

impl Image {
    /// Memory-maps `path` and treats it as the sole input image.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CoreError::UnreadableInput {
            path: path.to_path_buf(),
            source,
        })?;
        // SAFETY: the image file is treated as immutable input for the
        // lifetime of the process; concurrent external modification would
        // be a user error, not a memory-safety hazard we can prevent.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|source| {
            CoreError::UnreadableInput {
                path: path.to_path_buf(),
                source,
            }
        })?;
        tracing::debug!(path = %path.display(), len = mmap.len(), "mapped image");
        Ok(Self {
            backing: Arc::new(Backing::Mapped(mmap)),
        })
    }

    /// Wraps an in-memory buffer as an `Image`, for fixtures and tests.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            backing: Arc::new(Backing::Owned(bytes)),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        self.backing.as_ref().as_ref()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read_at(&self, offset: usize, buffer: &mut [u8]) -> Result<(), CoreError> {
        ByteSource::read_at(self.as_slice(), offset, buffer).map_err(|_| CoreError::OutOfBounds {
            offset,
            len: buffer.len(),
            image_len: self.len(),
        })
    }

    pub fn slice_at(&self, offset: usize, len: usize) -> Result<&[u8], CoreError> {
        ByteSource::slice_at(self.as_slice(), offset, len).map_err(|_| CoreError::OutOfBounds {
            offset,
            len,
            image_len: self.len(),
        })
    }
}
