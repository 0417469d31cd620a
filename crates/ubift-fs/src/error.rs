/// Errors raised while parsing a UBIFS instance out of a UBI volume.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error(transparent)]
    Ubi(#[from] ubift_ubi::UbiError),

    #[error("superblock node at leb 0 failed validation: {0}")]
    InvalidSuperblock(&'static str),

    #[error("neither master node copy (leb 1, leb 2) validated")]
    NoValidMaster,

    #[error("node at leb {lnum} offset {offset} failed CRC validation")]
    NodeCrcMismatch { lnum: u32, offset: u32 },

    #[error("node at leb {lnum} offset {offset} has bad magic {magic:#x}")]
    BadNodeMagic { lnum: u32, offset: u32, magic: u32 },

    #[error("unknown node type tag {0}")]
    UnknownNodeType(u8),

    #[error("unknown compression type tag {0}")]
    UnknownCompression(u8),

    #[error("decompression failed for node at leb {lnum} offset {offset}: {source}")]
    Decompression {
        lnum: u32,
        offset: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("decompressed length {actual} does not match declared length {expected}")]
    DecompressedLengthMismatch { expected: u32, actual: u32 },

    #[error("no such inode {0}")]
    NoSuchInode(u64),

    #[error("scan cancelled")]
    Cancelled,
}
