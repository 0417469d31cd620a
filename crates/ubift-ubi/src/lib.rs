//! L2: reconstructs a UBI instance (PEBs, LEB map, volume table) from a
//! UBI-bearing MTD partition.

mod error;
mod headers;
mod instance;
mod leb_map;
mod peb;
mod volume;
mod vtbl;

pub use error::UbiError;
pub use headers::{
    EcHeaderRaw, VidHeaderRaw, VolType, VtblRecordRaw, EC_HEADER_MAGIC, LAYOUT_VOLUME_ID,
    UBI_VERSION, VID_HEADER_MAGIC,
};
pub use instance::UbiInstance;
pub use peb::{Peb, PebStatus, VidInfo};
pub use volume::UbiVolume;
pub use vtbl::{VolumeDescriptor, VolumeTable};
