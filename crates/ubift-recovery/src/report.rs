/// A coarse rating of how much trust to place in a recovery pass, derived
/// from the ratio of healthy to scanned material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryQuality {
    /// No stale, orphaned, or tombstoned material was found: the live view
    /// was already everything there was to see.
    Complete,
    /// Deleted material was found and fully reassembled.
    Recovered,
    /// Some recovered objects are truncated or failed a CRC/decompression
    /// check partway through.
    Partial,
    /// Fewer than half of the scanned LEBs yielded a valid node header;
    /// treat anything recovered here with real suspicion.
    Unreliable,
}

/// Aggregate counts from one recovery pass, surfaced by `ubift_info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveryReport {
    pub stale_pebs_found: usize,
    pub orphan_inodes_recovered: usize,
    pub tombstones_correlated: usize,
    pub loose_nodes_salvaged: usize,
    pub crc_failures_suppressed: usize,
    pub lebs_scanned: usize,
    pub lebs_with_valid_header: usize,
}

impl RecoveryReport {
    pub fn quality(&self) -> RecoveryQuality {
        if self.lebs_scanned > 0 && self.lebs_with_valid_header * 2 < self.lebs_scanned {
            return RecoveryQuality::Unreliable;
        }
        let recovered_anything = self.stale_pebs_found > 0
            || self.orphan_inodes_recovered > 0
            || self.tombstones_correlated > 0
            || self.loose_nodes_salvaged > 0;
        if !recovered_anything {
            return RecoveryQuality::Complete;
        }
        if self.crc_failures_suppressed > 0 {
            RecoveryQuality::Partial
        } else {
            RecoveryQuality::Recovered
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_findings_is_complete() {
        let report = RecoveryReport {
            lebs_scanned: 10,
            lebs_with_valid_header: 10,
            ..Default::default()
        };
        assert_eq!(report.quality(), RecoveryQuality::Complete);
    }

    #[test]
    fn findings_without_crc_failures_is_recovered() {
        let report = RecoveryReport {
            stale_pebs_found: 2,
            lebs_scanned: 10,
            lebs_with_valid_header: 10,
            ..Default::default()
        };
        assert_eq!(report.quality(), RecoveryQuality::Recovered);
    }

    #[test]
    fn crc_failures_downgrade_to_partial() {
        let report = RecoveryReport {
            orphan_inodes_recovered: 1,
            crc_failures_suppressed: 3,
            lebs_scanned: 10,
            lebs_with_valid_header: 10,
            ..Default::default()
        };
        assert_eq!(report.quality(), RecoveryQuality::Partial);
    }

    #[test]
    fn mostly_unreadable_lebs_is_unreliable() {
        let report = RecoveryReport {
            stale_pebs_found: 1,
            lebs_scanned: 10,
            lebs_with_valid_header: 3,
            ..Default::default()
        };
        assert_eq!(report.quality(), RecoveryQuality::Unreliable);
    }
}
