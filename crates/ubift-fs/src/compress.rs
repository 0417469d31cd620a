//! Decompression of UBIFS data node payloads.

use crate::error::FsError;
use std::io::Read;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None = 0,
    Lzo = 1,
    Zlib = 2,
    Zstd = 3,
}

impl Compression {
    pub fn from_raw(raw: u16) -> Option<Self> {
        Some(match raw {
            0 => Self::None,
            1 => Self::Lzo,
            2 => Self::Zlib,
            3 => Self::Zstd,
            _ => return None,
        })
    }
}

/// Decompresses `data` according to `compr`, checking the result against
/// `expected_len` (the authoritative uncompressed size stored in the node).
pub fn decompress(
    compr: Compression,
    data: &[u8],
    expected_len: u32,
    lnum: u32,
    offset: u32,
) -> Result<Vec<u8>, FsError> {
    let out = match compr {
        Compression::None => data.to_vec(),
        Compression::Zlib => {
            let mut decoder = flate2::read::ZlibDecoder::new(data);
            let mut out = Vec::with_capacity(expected_len as usize);
            decoder
                .read_to_end(&mut out)
                .map_err(|source| FsError::Decompression { lnum, offset, source })?;
            out
        }
        Compression::Zstd => zstd::stream::decode_all(data).map_err(|source| FsError::Decompression {
            lnum,
            offset,
            source,
        })?,
        Compression::Lzo => decompress_lzo(data, expected_len, lnum, offset)?,
    };

    if out.len() as u32 != expected_len {
        return Err(FsError::DecompressedLengthMismatch {
            expected: expected_len,
            actual: out.len() as u32,
        });
    }
    Ok(out)
}

#[cfg(feature = "lzo")]
fn decompress_lzo(data: &[u8], expected_len: u32, lnum: u32, offset: u32) -> Result<Vec<u8>, FsError> {
    minilzo_rs::LZO::init()
        .and_then(|lzo| lzo.decompress(data, expected_len as usize))
        .map_err(|err| FsError::Decompression {
            lnum,
            offset,
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string()),
        })
}

#[cfg(not(feature = "lzo"))]
fn decompress_lzo(_data: &[u8], _expected_len: u32, lnum: u32, offset: u32) -> Result<Vec<u8>, FsError> {
    Err(FsError::Decompression {
        lnum,
        offset,
        source: std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "LZO support was not compiled in (enable the `lzo` feature)",
        ),
    })
}
