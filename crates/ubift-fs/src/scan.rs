//! A loose, best-effort walk over a LEB's raw bytes looking for
//! well-formed nodes, shared by journal replay (which only ever needs the
//! unbroken prefix of a bud LEB) and the recovery engine (which also wants
//! to find nodes stranded after a corrupt or unrelated byte range).

use crate::node::{parse_node, peek_len, Node};

/// Parses successive nodes starting at byte 0. When `resync_on_gap` is
/// `false`, stops at the first offset that doesn't decode (the normal
/// case: a LEB is either an unbroken run of nodes followed by blank
/// erased space, or truncated by corruption and nothing past that point
/// is trustworthy). When `true`, advances one byte at a time through a
/// gap looking for the next node that does decode, at the cost of a
/// slower scan; the recovery engine's loose-node pass uses this to find
/// salvageable material after a corrupt or unrecognised byte range.
pub fn scan_leb(bytes: &[u8], lnum: u32, resync_on_gap: bool) -> Vec<(u32, Node)> {
    let mut out = Vec::new();
    let mut offset = 0u32;
    while (offset as usize) < bytes.len() {
        let slice = &bytes[offset as usize..];
        match parse_node(slice, lnum, offset) {
            Ok(node) => {
                let len = peek_len(slice).unwrap_or(0);
                if len == 0 {
                    break;
                }
                out.push((offset, node));
                offset += len;
            }
            Err(_) => {
                if !resync_on_gap {
                    break;
                }
                offset += 1;
            }
        }
    }
    out
}
