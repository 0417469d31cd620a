//! Helpers for decoding fixed-width, not-necessarily-UTF-8 name fields found
//! in UBI volume table records and UBIFS directory-entry nodes.

#[cfg(feature = "alloc")]
use alloc::string::String;

/// Renders `raw[..len]` as a displayable name.
///
/// On-flash names are whatever bytes the original writer put there; this
/// toolkit never assumes a particular encoding. Valid UTF-8 is returned as
/// a borrowed `&str`; anything else is lossily converted (replacement
/// characters) so browsing commands always have something to print.
#[cfg(feature = "alloc")]
pub fn display_name(raw: &[u8], len: usize) -> String {
    let bytes = &raw[..len.min(raw.len())];
    String::from_utf8_lossy(bytes).into_owned()
}

/// Returns the length of the NUL-terminated prefix of `raw`, or `raw.len()`
/// if no NUL byte is present.
pub fn nul_terminated_len(raw: &[u8]) -> usize {
    raw.iter().position(|&b| b == 0).unwrap_or(raw.len())
}
