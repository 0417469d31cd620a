use crate::error::UbiError;
use crate::peb::{Peb, PebStatus};
use std::collections::BTreeMap;

/// Maps `(volume_id, leb_num)` to the index of the winning PEB in the
/// enumerated PEB list, applying the conflict-resolution order from §4.2:
/// higher sequence number wins; ties broken by higher erase counter.
pub fn build_leb_map(pebs: &[Peb]) -> Result<BTreeMap<(u32, u32), usize>, UbiError> {
    let mut map: BTreeMap<(u32, u32), usize> = BTreeMap::new();

    for (index, peb) in pebs.iter().enumerate() {
        if peb.status != PebStatus::Data {
            continue;
        }
        let vid = peb.vid.expect("Data status implies a parsed VID header");
        let key = (vid.vol_id, vid.lnum);

        match map.get(&key) {
            None => {
                map.insert(key, index);
            }
            Some(&existing_index) => {
                let existing = &pebs[existing_index];
                let existing_vid = existing.vid.expect("mapped PEB always carries a VID header");

                let replace = match vid.sqnum.cmp(&existing_vid.sqnum) {
                    std::cmp::Ordering::Greater => true,
                    std::cmp::Ordering::Less => false,
                    std::cmp::Ordering::Equal => {
                        match (peb.erase_counter, existing.erase_counter) {
                            (Some(ec), Some(existing_ec)) if ec > existing_ec => true,
                            (Some(ec), Some(existing_ec)) if ec == existing_ec => {
                                return Err(UbiError::UnresolvableConflict {
                                    vol_id: vid.vol_id,
                                    lnum: vid.lnum,
                                    first_peb: existing.offset,
                                    second_peb: peb.offset,
                                });
                            }
                            _ => false,
                        }
                    }
                };

                if replace {
                    tracing::debug!(
                        vol_id = vid.vol_id,
                        lnum = vid.lnum,
                        winner = peb.offset,
                        loser = existing.offset,
                        "LEB mapping conflict resolved"
                    );
                    map.insert(key, index);
                }
            }
        }
    }

    Ok(map)
}
