//! INode primitives for the virtual filesystem.
//!
//! This module provides the core data structures for representing files,
//! directories, and symlinks, and the [`INodeTree`] that owns them and
//! resolves paths.

mod dir;
mod file;
mod symlink;
mod tree;
mod types;

pub use dir::{INodeDir, DEFAULT_DIR_PERMS, EMPTY_DIR_NLINK};
pub use file::{INodeFile, DEFAULT_FILE_PERMS};
pub use symlink::{INodeSymlink, SYMLINK_PERMS};
pub use tree::{components, split_path, INodeTree};
pub use types::{
    FileAttributes, INodeType, NodeMeta, StatFs, PERMISSION_MASK, S_IFDIR, S_IFLNK, S_IFMT,
    S_IFREG,
};

/// A node in the tree.
#[derive(Debug, Clone)]
pub enum INode {
    /// Directory owning its children.
    Directory(INodeDir),
    /// Regular file owning its content.
    File(INodeFile),
    /// Symbolic link holding its target.
    Symlink(INodeSymlink),
}

impl INode {
    /// Get the inode type.
    pub fn inode_type(&self) -> INodeType {
        match self {
            INode::Directory(_) => INodeType::Directory,
            INode::File(_) => INodeType::File,
            INode::Symlink(_) => INodeType::Symlink,
        }
    }

    /// Check whether this node is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, INode::Directory(_))
    }

    /// Get the shared metadata.
    pub fn meta(&self) -> &NodeMeta {
        match self {
            INode::Directory(d) => d.meta(),
            INode::File(f) => f.meta(),
            INode::Symlink(s) => s.meta(),
        }
    }

    /// Get the shared metadata for mutation.
    pub fn meta_mut(&mut self) -> &mut NodeMeta {
        match self {
            INode::Directory(d) => d.meta_mut(),
            INode::File(f) => f.meta_mut(),
            INode::Symlink(s) => s.meta_mut(),
        }
    }

    /// Get the size in bytes. Directories report 0.
    pub fn size(&self) -> u64 {
        match self {
            INode::Directory(_) => 0,
            INode::File(f) => f.size(),
            INode::Symlink(s) => s.size(),
        }
    }

    /// Build the attribute record for this node.
    pub fn attributes(&self) -> FileAttributes {
        let meta: &NodeMeta = self.meta();
        FileAttributes {
            mode: meta.mode(),
            ctime: meta.ctime,
            mtime: meta.mtime,
            atime: meta.atime,
            nlink: meta.nlink,
            uid: meta.uid,
            gid: meta.gid,
            size: self.size(),
        }
    }

    /// Get as a directory, if this is one.
    pub fn as_dir(&self) -> Option<&INodeDir> {
        match self {
            INode::Directory(d) => Some(d),
            _ => None,
        }
    }

    /// Get as a mutable directory, if this is one.
    pub fn as_dir_mut(&mut self) -> Option<&mut INodeDir> {
        match self {
            INode::Directory(d) => Some(d),
            _ => None,
        }
    }

    /// Get as a symlink, if this is one.
    pub fn as_symlink(&self) -> Option<&INodeSymlink> {
        match self {
            INode::Symlink(s) => Some(s),
            _ => None,
        }
    }
}
