use crate::error::UbiError;
use crate::headers::VolType;
use crate::peb::Peb;
use std::collections::BTreeMap;
use std::sync::Arc;
use ubift_core::Image;

/// A logically contiguous sequence of LEBs backed, lazily, by whichever PEB
/// the LEB map resolved for each `(vol_id, lnum)` pair. Unmapped LEBs read
/// as an all-`0xFF` buffer, matching a blank NAND page.
#[derive(Clone)]
pub struct UbiVolume {
    image: Image,
    pebs: Arc<Vec<Peb>>,
    leb_map: Arc<BTreeMap<(u32, u32), usize>>,
    pub vol_id: u32,
    pub name: String,
    pub leb_size: usize,
    pub leb_count: u32,
    pub vol_type: Option<VolType>,
    /// True when this volume's PEBs were mapped but it has no corresponding
    /// entry in the layout volume.
    pub orphan: bool,
}

impl UbiVolume {
    pub(crate) fn new(
        image: Image,
        pebs: Arc<Vec<Peb>>,
        leb_map: Arc<BTreeMap<(u32, u32), usize>>,
        vol_id: u32,
        name: String,
        leb_size: usize,
        leb_count: u32,
        vol_type: Option<VolType>,
        orphan: bool,
    ) -> Self {
        Self {
            image,
            pebs,
            leb_map,
            vol_id,
            name,
            leb_size,
            leb_count,
            vol_type,
            orphan,
        }
    }

    /// Reads LEB `lnum`, returning its `leb_size` bytes of data (backed by
    /// the winning PEB, or all-`0xFF` if the LEB is unmapped).
    pub fn read_leb(&self, lnum: u32) -> Result<std::borrow::Cow<'_, [u8]>, UbiError> {
        if lnum >= self.leb_count {
            return Err(UbiError::LebOutOfRange {
                vol_id: self.vol_id,
                lnum,
                leb_count: self.leb_count,
            });
        }
        match self.leb_map.get(&(self.vol_id, lnum)) {
            Some(&index) => {
                let peb = &self.pebs[index];
                let bytes = self
                    .image
                    .slice_at(peb.data_offset_absolute(), self.leb_size)?;
                Ok(std::borrow::Cow::Borrowed(bytes))
            }
            None => Ok(std::borrow::Cow::Owned(vec![0xFFu8; self.leb_size])),
        }
    }

    pub fn is_leb_mapped(&self, lnum: u32) -> bool {
        self.leb_map.contains_key(&(self.vol_id, lnum))
    }
}

impl std::fmt::Debug for UbiVolume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UbiVolume")
            .field("vol_id", &self.vol_id)
            .field("name", &self.name)
            .field("leb_count", &self.leb_count)
            .field("orphan", &self.orphan)
            .finish()
    }
}
