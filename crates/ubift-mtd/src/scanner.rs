use crate::error::MtdError;
use crate::partition::{is_plausible_peb_size, MtdPartition, PartitionKind, CANDIDATE_PEB_SIZES, EC_HEADER_MAGIC};
use ubift_core::{Cancellation, Image};

/// Locates MTD partitions within a raw flash image by probing for UBI EC
/// header magic at successive PEB-size boundaries.
pub struct MtdScanner;

impl MtdScanner {
    /// Detects partition boundaries and kinds automatically. `cancel` is
    /// checked once per PEB-size boundary during clustering; a cancelled
    /// scan returns whatever partitions were clustered before the request
    /// was observed rather than an error, since partial partition listing
    /// is still useful to a caller.
    ///
    /// An empty image yields a single zero-length unknown partition. An
    /// image with no UBI signature at any candidate PEB size yields a
    /// single unknown partition spanning the whole image.
    pub fn scan(image: &Image, cancel: &Cancellation) -> Vec<MtdPartition> {
        if image.is_empty() {
            return vec![MtdPartition {
                offset: 0,
                length: 0,
                kind: PartitionKind::Unknown,
            }];
        }

        let best_peb_size = CANDIDATE_PEB_SIZES
            .iter()
            .copied()
            .filter(|&peb_size| peb_size <= image.len())
            .map(|peb_size| (peb_size, count_boundary_matches(image, peb_size)))
            .filter(|&(_, count)| count > 0)
            .max_by_key(|&(_, count)| count)
            .map(|(peb_size, _)| peb_size);

        let Some(peb_size) = best_peb_size else {
            tracing::debug!(len = image.len(), "no UBI signature found at any candidate PEB size");
            return vec![MtdPartition {
                offset: 0,
                length: image.len(),
                kind: PartitionKind::Unknown,
            }];
        };

        tracing::debug!(peb_size, "selected PEB size for partition clustering");
        cluster(image, peb_size, cancel)
    }

    /// Trusts caller-supplied geometry, bypassing magic-byte detection
    /// entirely (per the "explicit offset and PEB size" bypass path).
    pub fn scan_with_geometry(
        image: &Image,
        offset: usize,
        peb_size: usize,
    ) -> Result<MtdPartition, MtdError> {
        if offset > image.len() {
            return Err(MtdError::OffsetOutOfBounds {
                offset,
                image_len: image.len(),
            });
        }
        if !is_plausible_peb_size(peb_size) {
            return Err(MtdError::ImplausiblePebSize(peb_size));
        }
        Ok(MtdPartition {
            offset,
            length: image.len() - offset,
            kind: PartitionKind::Ubi { peb_size },
        })
    }
}

fn boundary_has_magic(image: &Image, offset: usize) -> bool {
    image
        .slice_at(offset, EC_HEADER_MAGIC.len())
        .map(|bytes| bytes == EC_HEADER_MAGIC)
        .unwrap_or(false)
}

fn count_boundary_matches(image: &Image, peb_size: usize) -> usize {
    let mut offset = 0;
    let mut count = 0;
    while offset < image.len() {
        if boundary_has_magic(image, offset) {
            count += 1;
        }
        offset += peb_size;
    }
    count
}

fn cluster(image: &Image, peb_size: usize, cancel: &Cancellation) -> Vec<MtdPartition> {
    let len = image.len();
    let mut partitions = Vec::new();
    let mut offset = 0;
    let mut pending_unknown_start: Option<usize> = None;

    while offset < len {
        if cancel.is_cancelled() {
            tracing::debug!(offset, "partition scan cancelled, returning partial clustering");
            break;
        }
        if boundary_has_magic(image, offset) {
            if let Some(start) = pending_unknown_start.take() {
                partitions.push(MtdPartition {
                    offset: start,
                    length: offset - start,
                    kind: PartitionKind::Unknown,
                });
            }
            let run_start = offset;
            while offset < len && boundary_has_magic(image, offset) {
                offset += peb_size;
            }
            let run_end = offset.min(len);
            partitions.push(MtdPartition {
                offset: run_start,
                length: run_end - run_start,
                kind: PartitionKind::Ubi { peb_size },
            });
        } else {
            pending_unknown_start.get_or_insert(offset);
            offset += peb_size;
        }
    }

    if let Some(start) = pending_unknown_start {
        partitions.push(MtdPartition {
            offset: start,
            length: len - start,
            kind: PartitionKind::Unknown,
        });
    }

    partitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PEB: usize = 1 << 15;

    fn ubi_peb(ec: u64) -> Vec<u8> {
        let mut peb = vec![0xFFu8; PEB];
        peb[0..4].copy_from_slice(&EC_HEADER_MAGIC);
        peb[4] = 1; // version
        peb[8..16].copy_from_slice(&ec.to_be_bytes());
        peb
    }

    #[test]
    fn empty_image_yields_zero_length_unknown_partition() {
        let image = Image::from_bytes(Vec::new());
        let partitions = MtdScanner::scan(&image, &Cancellation::never());
        assert_eq!(
            partitions,
            vec![MtdPartition {
                offset: 0,
                length: 0,
                kind: PartitionKind::Unknown
            }]
        );
    }

    #[test]
    fn image_without_signature_is_one_unknown_partition() {
        let image = Image::from_bytes(vec![0x00u8; PEB * 3]);
        let partitions = MtdScanner::scan(&image, &Cancellation::never());
        assert_eq!(
            partitions,
            vec![MtdPartition {
                offset: 0,
                length: PEB * 3,
                kind: PartitionKind::Unknown
            }]
        );
    }

    #[test]
    fn clusters_contiguous_ubi_pebs_and_trailing_gap() {
        let mut bytes = Vec::new();
        bytes.extend(ubi_peb(1));
        bytes.extend(ubi_peb(2));
        bytes.extend(vec![0u8; PEB]); // unknown gap
        let image = Image::from_bytes(bytes);

        let partitions = MtdScanner::scan(&image, &Cancellation::never());
        assert_eq!(
            partitions,
            vec![
                MtdPartition {
                    offset: 0,
                    length: PEB * 2,
                    kind: PartitionKind::Ubi { peb_size: PEB }
                },
                MtdPartition {
                    offset: PEB * 2,
                    length: PEB,
                    kind: PartitionKind::Unknown
                }
            ]
        );
    }

    #[test]
    fn cancelled_scan_returns_without_clustering_past_the_request() {
        let mut bytes = Vec::new();
        bytes.extend(ubi_peb(1));
        bytes.extend(ubi_peb(2));
        let image = Image::from_bytes(bytes);

        let cancel = Cancellation::new();
        cancel.cancel();
        let partitions = MtdScanner::scan(&image, &cancel);
        assert!(partitions.is_empty());
    }

    #[test]
    fn bypass_path_trusts_supplied_geometry() {
        let image = Image::from_bytes(vec![0u8; PEB * 2]);
        let partition = MtdScanner::scan_with_geometry(&image, PEB, PEB).unwrap();
        assert_eq!(partition.kind, PartitionKind::Ubi { peb_size: PEB });
        assert_eq!(partition.offset, PEB);
        assert_eq!(partition.length, PEB);
    }

    #[test]
    fn bypass_path_rejects_offset_past_end() {
        let image = Image::from_bytes(vec![0u8; PEB]);
        let err = MtdScanner::scan_with_geometry(&image, PEB + 1, PEB).unwrap_err();
        assert!(matches!(err, MtdError::OffsetOutOfBounds { .. }));
    }

    #[test]
    fn bypass_path_rejects_implausible_peb_size() {
        let image = Image::from_bytes(vec![0u8; PEB]);
        let err = MtdScanner::scan_with_geometry(&image, 0, 100).unwrap_err();
        assert!(matches!(err, MtdError::ImplausiblePebSize(100)));
    }
}
