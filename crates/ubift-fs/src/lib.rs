//! Parses a UBIFS filesystem (superblock, master node, on-disk TNC index
//! and journal) out of a resolved [`ubift_ubi::UbiVolume`].

pub mod compress;
pub mod error;
pub mod instance;
pub mod journal;
pub mod key;
pub mod layout;
pub mod node;
pub mod overlay;
pub mod scan;
pub mod tnc;

pub use compress::Compression;
pub use error::FsError;
pub use instance::{reassemble_data, UbifsInstance};
pub use key::{Key, KeyType};
pub use layout::VolumeLayout;
pub use node::{key_of, DataNode, DentryNode, InodeNode, MasterNode, Node, Superblock};
pub use overlay::Overlay;
pub use scan::scan_leb;
