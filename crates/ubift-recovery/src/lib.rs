//! L4: recovers deleted filesystem objects — stale PEBs, the orphan
//! area, tombstoned dentries, and loose unreachable nodes — on top of a
//! parsed [`ubift_fs::UbifsInstance`].

pub mod correlate;
pub mod engine;
pub mod error;
pub mod loose;
pub mod model;
pub mod orphan;
pub mod report;
pub mod stale;
#[cfg(test)]
mod test_support;

pub use engine::{recover, RecoveryOutcome};
pub use error::RecoveryError;
pub use model::RecoveredObject;
pub use report::{RecoveryQuality, RecoveryReport};
