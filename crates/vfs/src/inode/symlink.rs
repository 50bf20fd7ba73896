//! Symlink inode implementation.

use super::types::{byte_range, INodeType, NodeMeta};

/// Symlink permissions (always 0o777 - target determines access).
pub const SYMLINK_PERMS: u32 = 0o777;

/// Symlink inode representing a symbolic link.
///
/// The target is fixed at construction; there is no window in which the
/// link exists without one.
#[derive(Debug, Clone)]
pub struct INodeSymlink {
    /// Shared metadata.
    meta: NodeMeta,
    /// Target path, stored verbatim.
    target: String,
}

impl INodeSymlink {
    /// Create a new symlink inode.
    ///
    /// # Arguments
    /// * `target` - Target path, not validated or resolved
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            meta: NodeMeta::new(INodeType::Symlink, SYMLINK_PERMS, 1),
            target: target.into(),
        }
    }

    /// Set the owner of the new symlink.
    pub fn with_owner(mut self, uid: u32, gid: u32) -> Self {
        self.meta = self.meta.with_owner(uid, gid);
        self
    }

    /// Get the metadata.
    pub fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    /// Get the metadata for mutation.
    pub fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    /// Get the symlink target path.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Read a range of the target's bytes, clamped like a file read.
    pub fn read(&self, offset: u64, size: usize) -> &[u8] {
        byte_range(self.target.as_bytes(), offset, size)
    }

    /// Size in bytes (length of the target).
    pub fn size(&self) -> u64 {
        self.target.len() as u64
    }
}
