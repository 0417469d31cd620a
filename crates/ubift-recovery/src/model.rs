use ubift_fs::InodeNode;

/// One recovered filesystem object: an inode plus whatever of its data
/// content could be reassembled, with a name if one could be correlated.
#[derive(Debug, Clone)]
pub struct RecoveredObject {
    pub inode: InodeNode,
    pub data: Vec<u8>,
    pub name: Option<String>,
    /// The parent directory's inode number, if a correlated dentry named
    /// one. `None` means this object is attached under the synthetic
    /// "orphan" parent instead.
    pub parent: Option<u64>,
}
