//! Stale PEBs: blocks carrying a valid VID header for a `(vol_id, lnum)`
//! pair that a newer PEB has since won. They're invisible to any
//! [`ubift_ubi::UbiVolume`], but the kernel hasn't erased them yet, so
//! their payload is still fair game for recovery.

use crate::error::RecoveryError;
use ubift_fs::{scan_leb, Node};
use ubift_ubi::{Peb, PebStatus, UbiInstance};

/// Every PEB that isn't the live winner for its `(vol_id, lnum)` slot: a
/// CRC-valid loser of the sqnum/ec tie-break, or a PEB whose VID header (or
/// whole EC header) never validated at all. A corrupt VID header
/// disqualifies a PEB from live mapping, but the PEB itself is still an
/// erased-block candidate the recovery layer can loose-scan.
pub fn find_stale_pebs(ubi: &UbiInstance) -> Vec<&Peb> {
    let leb_map = ubi.leb_map();
    ubi.pebs()
        .iter()
        .enumerate()
        .filter_map(|(index, peb)| match peb.status {
            PebStatus::Data => {
                let vid = peb.vid?;
                match leb_map.get(&(vid.vol_id, vid.lnum)) {
                    Some(&winner) if winner != index => Some(peb),
                    _ => None,
                }
            }
            PebStatus::EcOnly | PebStatus::Corrupt => Some(peb),
            PebStatus::Free => None,
        })
        .collect()
}

/// Loose-scans a stale PEB's data area for whatever UBIFS nodes still
/// decode, resyncing past any corrupt or unrelated byte ranges.
pub fn scan_stale_peb(peb: &Peb, ubi: &UbiInstance) -> Result<Vec<Node>, RecoveryError> {
    let leb_size = ubi.leb_size();
    let bytes = ubi
        .image()
        .slice_at(peb.data_offset_absolute(), leb_size)
        .map_err(ubift_ubi::UbiError::from)?;
    let lnum = peb.vid.map(|v| v.lnum).unwrap_or(0);
    Ok(scan_leb(bytes, lnum, true)
        .into_iter()
        .map(|(_offset, node)| node)
        .collect())
}
