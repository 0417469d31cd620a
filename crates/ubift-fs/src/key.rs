//! The UBIFS node key: an 8-byte on-flash value packing an inode number and
//! a 3-bit type tag plus a 29-bit payload (an offset for data keys, a name
//! hash for dentry/xattr keys, unused for truncation keys) into its second
//! word.

/// The kind of node a [`Key`] addresses.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyType {
    Inode = 0,
    Data = 1,
    Dentry = 2,
    XattrEntry = 3,
    Truncation = 4,
}

impl KeyType {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Inode),
            1 => Some(Self::Data),
            2 => Some(Self::Dentry),
            3 => Some(Self::XattrEntry),
            4 => Some(Self::Truncation),
            _ => None,
        }
    }
}

const TYPE_SHIFT: u32 = 29;
const PAYLOAD_MASK: u32 = (1 << TYPE_SHIFT) - 1;

/// A node's position in the index: `(inode number, type, offset-or-hash)`,
/// ordered lexicographically on that triple so index traversal and the
/// journal-replay / recovery overlay both get correct ordering from
/// `#[derive(Ord)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    pub inum: u32,
    pub key_type: KeyType,
    pub payload: u32,
}

impl Key {
    pub fn new(inum: u32, key_type: KeyType, payload: u32) -> Self {
        Self {
            inum,
            key_type,
            payload: payload & PAYLOAD_MASK,
        }
    }

    /// The smallest possible key for `(inum, key_type)`, for range-scan
    /// lower bounds.
    pub fn range_start(inum: u32, key_type: KeyType) -> Self {
        Self::new(inum, key_type, 0)
    }

    /// The largest possible key for `(inum, key_type)`, for range-scan
    /// upper bounds.
    pub fn range_end(inum: u32, key_type: KeyType) -> Self {
        Self::new(inum, key_type, PAYLOAD_MASK)
    }

    /// Decodes a raw 8-byte on-flash key.
    pub fn from_raw(bytes: [u8; 8]) -> Option<Self> {
        let inum = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let word1 = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        let key_type = KeyType::from_raw((word1 >> TYPE_SHIFT) as u8)?;
        let payload = word1 & PAYLOAD_MASK;
        Some(Self {
            inum,
            key_type,
            payload,
        })
    }

    pub fn to_raw(self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[0..4].copy_from_slice(&self.inum.to_le_bytes());
        let word1 = ((self.key_type as u32) << TYPE_SHIFT) | (self.payload & PAYLOAD_MASK);
        bytes[4..8].copy_from_slice(&word1.to_le_bytes());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_raw_bytes() {
        let key = Key::new(42, KeyType::Data, 7);
        let raw = key.to_raw();
        assert_eq!(Key::from_raw(raw).unwrap(), key);
    }

    #[test]
    fn orders_by_inum_then_type_then_payload() {
        let a = Key::new(1, KeyType::Inode, 0);
        let b = Key::new(1, KeyType::Data, 0);
        let c = Key::new(2, KeyType::Inode, 0);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn range_bounds_cover_a_full_dentry_scan() {
        let start = Key::range_start(5, KeyType::Dentry);
        let end = Key::range_end(5, KeyType::Dentry);
        let middle = Key::new(5, KeyType::Dentry, 123);
        assert!(start <= middle && middle <= end);
    }

    #[test]
    fn rejects_unknown_type_tag() {
        let mut bytes = [0u8; 8];
        bytes[7] = 0xFF; // top 3 bits decode to type 7, unassigned
        assert!(Key::from_raw(bytes).is_none());
    }
}
