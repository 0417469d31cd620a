//! Shared foundations for the ubift forensic toolkit: the immutable [`Image`]
//! every layer reads from, the top-level error taxonomy (§7 of the
//! specification this crate implements), and a cooperative [`Cancellation`]
//! token for long-running scans.

pub mod cancel;
pub mod error;
pub mod image;

pub use cancel::Cancellation;
pub use error::CoreError;
pub use image::Image;
