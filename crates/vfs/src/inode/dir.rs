//! Directory inode implementation.

use indexmap::IndexMap;

use super::types::{INodeType, NodeMeta};
use super::INode;

/// Default directory permissions (rwxr-xr-x).
pub const DEFAULT_DIR_PERMS: u32 = 0o755;

/// Link count of an empty directory (its own `.` plus the entry in its parent).
pub const EMPTY_DIR_NLINK: u32 = 2;

/// Directory inode owning its children.
///
/// Children are kept in insertion order so listings come back in the order
/// entries were created. Link counts are not touched by `insert_child` or
/// `remove_child`; callers adjust them with [`INodeDir::link_subdir`] and
/// [`INodeDir::unlink_subdir`].
#[derive(Debug, Clone)]
pub struct INodeDir {
    /// Shared metadata.
    meta: NodeMeta,
    /// Child entries: name → owned node.
    children: IndexMap<String, INode>,
}

impl INodeDir {
    /// Create a new, empty directory inode.
    ///
    /// # Arguments
    /// * `perms` - Permission bits
    pub fn new(perms: u32) -> Self {
        Self {
            meta: NodeMeta::new(INodeType::Directory, perms, EMPTY_DIR_NLINK),
            children: IndexMap::new(),
        }
    }

    /// Set the owner of the new directory.
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

    /// Insert a child, replacing any entry with the same name.
    ///
    /// A replaced entry keeps its position in the listing.
    ///
    /// # Arguments
    /// * `name` - Child entry name
    /// * `node` - Child node, ownership moves into the directory
    ///
    /// # Returns
    /// The replaced node, if there was one.
    pub fn insert_child(&mut self, name: String, node: INode) -> Option<INode> {
        self.children.insert(name, node)
    }

    /// Get a child by name.
    pub fn get_child(&self, name: &str) -> Option<&INode> {
        self.children.get(name)
    }

    /// Get a child by name for mutation.
    pub fn get_child_mut(&mut self, name: &str) -> Option<&mut INode> {
        self.children.get_mut(name)
    }

    /// Remove a child entry, preserving the order of the remaining entries.
    ///
    /// # Arguments
    /// * `name` - Child entry name to remove
    ///
    /// # Returns
    /// The removed node, or None if not found.
    pub fn remove_child(&mut self, name: &str) -> Option<INode> {
        self.children.shift_remove(name)
    }

    /// Iterate over children as (name, node) pairs.
    pub fn children(&self) -> impl Iterator<Item = (&str, &INode)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Get the number of children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Check whether the directory has no entries.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Account for a new subdirectory entry.
    pub fn link_subdir(&mut self) {
        self.meta.nlink += 1;
    }

    /// Account for a removed subdirectory entry.
    ///
    /// The count drops by exactly one, stopping at zero.
    pub fn unlink_subdir(&mut self) {
        self.meta.nlink = self.meta.nlink.saturating_sub(1);
    }
}
