//! File inode implementation.

use super::types::{byte_range, INodeType, NodeMeta};

/// Default file permissions (rw-r--r--).
pub const DEFAULT_FILE_PERMS: u32 = 0o644;

/// File inode owning its byte content.
#[derive(Debug, Clone)]
pub struct INodeFile {
    /// Shared metadata.
    meta: NodeMeta,
    /// File content; the size is always its length.
    content: Vec<u8>,
}

impl INodeFile {
    /// Create a new, empty file inode.
    ///
    /// # Arguments
    /// * `perms` - Permission bits
    pub fn new(perms: u32) -> Self {
        Self {
            meta: NodeMeta::new(INodeType::File, perms, 1),
            content: Vec::new(),
        }
    }

    /// Set the owner of the new file.
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

    /// Get the whole content.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Read a range of the content.
    ///
    /// # Arguments
    /// * `offset` - Byte offset to start at
    /// * `size` - Maximum number of bytes
    ///
    /// # Returns
    /// The bytes in range; short or empty when the range runs past the end.
    pub fn read(&self, offset: u64, size: usize) -> &[u8] {
        byte_range(&self.content, offset, size)
    }

    /// Write data at an offset.
    ///
    /// The content becomes everything before `offset` followed by `data`; any
    /// bytes past `offset + data.len()` are dropped, and an offset beyond the
    /// end appends without padding.
    ///
    /// # Arguments
    /// * `offset` - Byte offset to write at
    /// * `data` - Bytes to write
    ///
    /// # Returns
    /// Number of bytes written.
    pub fn write(&mut self, offset: u64, data: &[u8]) -> usize {
        self.truncate(offset);
        self.content.extend_from_slice(data);
        data.len()
    }

    /// Shrink the content to at most `length` bytes. Never extends.
    pub fn truncate(&mut self, length: u64) {
        if let Ok(length) = usize::try_from(length) {
            self.content.truncate(length);
        }
    }
}
