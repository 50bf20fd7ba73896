//! Path-based filesystem operations over the in-memory tree.
//!
//! [`MemoryFs`] is the boundary a driver calls into: every verb takes a path
//! string and returns a plain value or a [`VfsError`]. The tree lives behind a
//! single reader-writer lock; lookups take it shared, mutations exclusive.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use parking_lot::RwLock;

use crate::inode::{
    components, split_path, FileAttributes, INode, INodeDir, INodeFile, INodeSymlink,
    INodeTree, INodeType, StatFs,
};
use crate::options::{MemFsOptions, RmdirPolicy};
use crate::VfsError;

/// One directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name.
    pub name: String,
    /// Entry type.
    pub kind: INodeType,
}

/// Snapshot of what the tree currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemFsStats {
    /// Number of directories, root included.
    pub directories: usize,
    /// Number of regular files.
    pub files: usize,
    /// Number of symlinks.
    pub symlinks: usize,
    /// Sum of file and symlink sizes.
    pub total_bytes: u64,
    /// Handles handed out by `open` and `create` so far.
    pub handles_issued: u64,
}

/// In-memory filesystem.
///
/// Constructed at mount time and dropped at unmount; nothing outlives it.
pub struct MemoryFs {
    /// The node tree.
    tree: RwLock<INodeTree>,
    /// Next handle number.
    next_handle: AtomicU64,
    /// Configuration.
    options: MemFsOptions,
}

impl MemoryFs {
    /// Create an empty filesystem with default options.
    pub fn new() -> Self {
        Self::with_options(MemFsOptions::default())
    }

    /// Create an empty filesystem.
    ///
    /// # Arguments
    /// * `options` - Filesystem configuration
    pub fn with_options(options: MemFsOptions) -> Self {
        let root: INodeDir = INodeDir::new(options.root_mode).with_owner(options.uid, options.gid);
        Self {
            tree: RwLock::new(INodeTree::new(root)),
            next_handle: AtomicU64::new(1),
            options,
        }
    }

    /// Get the configuration.
    pub fn options(&self) -> &MemFsOptions {
        &self.options
    }

    /// Allocate the next handle number.
    fn allocate_handle(&self) -> u64 {
        self.next_handle.fetch_add(1, Ordering::SeqCst)
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Get the attribute record of a node.
    pub fn getattr(&self, path: &str) -> Result<FileAttributes, VfsError> {
        tracing::trace!("getattr {}", path);
        let tree = self.tree.read();
        Ok(tree.lookup(path)?.attributes())
    }

    /// List a directory: `.` and `..` followed by entries in insertion order.
    pub fn readdir(&self, path: &str) -> Result<Vec<String>, VfsError> {
        tracing::debug!("readdir {}", path);
        let mut names: Vec<String> = vec![".".to_string(), "..".to_string()];
        names.extend(self.list_entries(path)?.into_iter().map(|e| e.name));
        Ok(names)
    }

    /// List a directory's entries with their types, without `.` and `..`.
    pub fn list_entries(&self, path: &str) -> Result<Vec<DirEntry>, VfsError> {
        let tree = self.tree.read();
        let dir: &INodeDir = tree
            .lookup(path)?
            .as_dir()
            .ok_or_else(|| VfsError::NotADirectory(path.to_string()))?;
        Ok(dir
            .children()
            .map(|(name, node)| DirEntry {
                name: name.to_string(),
                kind: node.inode_type(),
            })
            .collect())
    }

    /// Read up to `size` bytes starting at `offset`.
    ///
    /// Reading past the end returns fewer bytes, possibly none.
    pub fn read(&self, path: &str, size: usize, offset: u64) -> Result<Vec<u8>, VfsError> {
        tracing::debug!("read {} ({} bytes at {})", path, size, offset);
        let tree = self.tree.read();
        match tree.lookup(path)? {
            INode::File(file) => Ok(file.read(offset, size).to_vec()),
            INode::Symlink(link) => Ok(link.read(offset, size).to_vec()),
            INode::Directory(_) => Err(VfsError::IsADirectory(path.to_string())),
        }
    }

    /// Get the target of a symlink.
    pub fn readlink(&self, path: &str) -> Result<String, VfsError> {
        tracing::debug!("readlink {}", path);
        let tree = self.tree.read();
        tree.resolve(path)
            .and_then(INode::as_symlink)
            .map(|link| link.target().to_string())
            .ok_or_else(|| VfsError::NoSuchEntry(path.to_string()))
    }

    /// Return filesystem statistics. The figures are fixed by configuration.
    pub fn statfs(&self, path: &str) -> StatFs {
        tracing::trace!("statfs {}", path);
        self.options.statfs
    }

    /// Open a path and return a handle number.
    ///
    /// Handles are a monotonic counter; they are not tied to the node and are
    /// not checked on later calls.
    pub fn open(&self, path: &str, flags: i32) -> u64 {
        let fh: u64 = self.allocate_handle();
        tracing::debug!("open {} (flags {:#o}) -> fh {}", path, flags, fh);
        fh
    }

    /// Collect a snapshot of the tree's contents.
    pub fn stats(&self) -> MemFsStats {
        let mut stats: MemFsStats = MemFsStats {
            handles_issued: self.next_handle.load(Ordering::SeqCst) - 1,
            ..MemFsStats::default()
        };
        self.tree.read().walk(|node| match node {
            INode::Directory(_) => stats.directories += 1,
            INode::File(f) => {
                stats.files += 1;
                stats.total_bytes += f.size();
            }
            INode::Symlink(s) => {
                stats.symlinks += 1;
                stats.total_bytes += s.size();
            }
        });
        stats
    }

    // ------------------------------------------------------------------
    // Entry creation and removal
    // ------------------------------------------------------------------

    /// Create an empty file, replacing any existing entry with that name.
    ///
    /// # Arguments
    /// * `path` - Path of the new file
    /// * `mode` - Requested mode; only the permission bits are used
    ///
    /// # Returns
    /// A new handle number.
    pub fn create(&self, path: &str, mode: u32) -> Result<u64, VfsError> {
        tracing::debug!("create {} (mode {:o})", path, mode);
        let file: INodeFile = INodeFile::new(mode).with_owner(self.options.uid, self.options.gid);
        {
            let mut tree = self.tree.write();
            let (parent, name) = tree.parent_dir_mut(path)?;
            if let Some(replaced) = parent.insert_child(name.to_string(), INode::File(file)) {
                if replaced.is_dir() {
                    parent.unlink_subdir();
                }
            }
        }
        Ok(self.allocate_handle())
    }

    /// Create an empty directory and count it in the parent's link count.
    pub fn mkdir(&self, path: &str, mode: u32) -> Result<(), VfsError> {
        tracing::debug!("mkdir {} (mode {:o})", path, mode);
        let dir: INodeDir = INodeDir::new(mode).with_owner(self.options.uid, self.options.gid);
        let mut tree = self.tree.write();
        let (parent, name) = tree.parent_dir_mut(path)?;
        if let Some(replaced) = parent.insert_child(name.to_string(), INode::Directory(dir)) {
            if replaced.is_dir() {
                parent.unlink_subdir();
            }
        }
        parent.link_subdir();
        Ok(())
    }

    /// Create a symlink whose target is set from the start.
    ///
    /// # Arguments
    /// * `link_path` - Path of the new link
    /// * `target` - Link target, stored verbatim
    pub fn symlink(&self, link_path: &str, target: &str) -> Result<(), VfsError> {
        tracing::debug!("symlink {} -> {}", link_path, target);
        let link: INodeSymlink =
            INodeSymlink::new(target).with_owner(self.options.uid, self.options.gid);
        let mut tree = self.tree.write();
        let (parent, name) = tree.parent_dir_mut(link_path)?;
        if let Some(replaced) = parent.insert_child(name.to_string(), INode::Symlink(link)) {
            if replaced.is_dir() {
                parent.unlink_subdir();
            }
        }
        Ok(())
    }

    /// Remove a file or symlink.
    pub fn unlink(&self, path: &str) -> Result<(), VfsError> {
        tracing::debug!("unlink {}", path);
        let mut tree = self.tree.write();
        let (parent, name) = tree.parent_dir_mut(path)?;
        match parent.get_child(name) {
            None => return Err(VfsError::NoSuchEntry(path.to_string())),
            Some(node) if node.is_dir() => return Err(VfsError::IsADirectory(path.to_string())),
            Some(_) => {}
        }
        parent.remove_child(name);
        Ok(())
    }

    /// Remove a directory and drop it from the parent's link count.
    ///
    /// Whether a non-empty directory may be removed depends on
    /// [`MemFsOptions::rmdir`].
    pub fn rmdir(&self, path: &str) -> Result<(), VfsError> {
        tracing::debug!("rmdir {}", path);
        let mut tree = self.tree.write();
        let (parent, name) = tree.parent_dir_mut(path)?;
        match parent.get_child(name) {
            None => return Err(VfsError::NoSuchEntry(path.to_string())),
            Some(INode::Directory(dir)) => {
                if self.options.rmdir == RmdirPolicy::RequireEmpty && !dir.is_empty() {
                    return Err(VfsError::NotEmpty(path.to_string()));
                }
            }
            Some(_) => return Err(VfsError::NotADirectory(path.to_string())),
        }
        parent.remove_child(name);
        parent.unlink_subdir();
        Ok(())
    }

    /// Move a node to a new path, replacing whatever is there.
    ///
    /// The node itself moves; its content and subtree are not copied.
    /// Parent link counts follow [`MemFsOptions::rename_links`].
    pub fn rename(&self, old_path: &str, new_path: &str) -> Result<(), VfsError> {
        tracing::debug!("rename {} -> {}", old_path, new_path);
        let mut tree = self.tree.write();

        let moved_is_dir: bool = tree.lookup(old_path)?.is_dir();
        let (old_parent, _) = split_path(old_path)
            .ok_or_else(|| VfsError::InvalidPath(old_path.to_string()))?;
        let (new_parent, _) = split_path(new_path)
            .ok_or_else(|| VfsError::InvalidPath(new_path.to_string()))?;

        if components(old_path).eq(components(new_path)) {
            return Ok(());
        }
        if (moved_is_dir && is_descendant(new_path, old_path)) || is_descendant(old_path, new_path) {
            return Err(VfsError::InvalidRename {
                from: old_path.to_string(),
                to: new_path.to_string(),
            });
        }
        // Fail before detaching anything if the destination has no parent.
        tree.parent_dir(new_path)?;

        let moved: INode = tree.take(old_path)?;
        let (dir, name) = tree.parent_dir_mut(new_path)?;
        let replaced_is_dir: bool = dir
            .insert_child(name.to_string(), moved)
            .is_some_and(|replaced| replaced.is_dir());

        let same_parent: bool = components(old_parent).eq(components(new_parent));
        let (old_delta, new_delta) =
            self.options
                .rename_links
                .deltas(moved_is_dir, same_parent, replaced_is_dir);
        if old_delta != 0 {
            apply_link_delta(tree.parent_dir_mut(old_path)?.0, old_delta);
        }
        if new_delta != 0 {
            apply_link_delta(tree.parent_dir_mut(new_path)?.0, new_delta);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Write `data` at `offset`, dropping anything after the written range.
    ///
    /// # Returns
    /// Number of bytes written.
    pub fn write(&self, path: &str, data: &[u8], offset: u64) -> Result<usize, VfsError> {
        tracing::debug!("write {} ({} bytes at {})", path, data.len(), offset);
        let mut tree = self.tree.write();
        match tree.lookup_mut(path)? {
            INode::File(file) => Ok(file.write(offset, data)),
            INode::Directory(_) => Err(VfsError::IsADirectory(path.to_string())),
            INode::Symlink(_) => Err(VfsError::InvalidPath(path.to_string())),
        }
    }

    /// Shrink a file to at most `length` bytes. Never extends.
    pub fn truncate(&self, path: &str, length: u64) -> Result<(), VfsError> {
        tracing::debug!("truncate {} to {}", path, length);
        let mut tree = self.tree.write();
        match tree.lookup_mut(path)? {
            INode::File(file) => {
                file.truncate(length);
                Ok(())
            }
            INode::Directory(_) => Err(VfsError::IsADirectory(path.to_string())),
            INode::Symlink(_) => Err(VfsError::InvalidPath(path.to_string())),
        }
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    /// Replace the permission bits, keeping the file type.
    pub fn chmod(&self, path: &str, mode: u32) -> Result<(), VfsError> {
        tracing::debug!("chmod {} {:o}", path, mode);
        let mut tree = self.tree.write();
        tree.lookup_mut(path)?.meta_mut().set_permissions(mode);
        Ok(())
    }

    /// Set the owner. No permission check is made.
    pub fn chown(&self, path: &str, uid: u32, gid: u32) -> Result<(), VfsError> {
        tracing::debug!("chown {} {}:{}", path, uid, gid);
        let mut tree = self.tree.write();
        let meta = tree.lookup_mut(path)?.meta_mut();
        meta.uid = uid;
        meta.gid = gid;
        Ok(())
    }

    /// Set access and modification times; `None` sets both to now.
    ///
    /// # Arguments
    /// * `path` - Node to update
    /// * `times` - (atime, mtime)
    pub fn utimens(
        &self,
        path: &str,
        times: Option<(SystemTime, SystemTime)>,
    ) -> Result<(), VfsError> {
        tracing::debug!("utimens {} {:?}", path, times);
        let (atime, mtime) = times.unwrap_or_else(|| {
            let now: SystemTime = SystemTime::now();
            (now, now)
        });
        let mut tree = self.tree.write();
        let meta = tree.lookup_mut(path)?.meta_mut();
        meta.atime = atime;
        meta.mtime = mtime;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Extended attributes
    // ------------------------------------------------------------------

    /// Get an extended attribute value.
    pub fn getxattr(&self, path: &str, name: &str) -> Result<Vec<u8>, VfsError> {
        tracing::debug!("getxattr {} {}", path, name);
        let tree = self.tree.read();
        tree.lookup(path)?
            .meta()
            .xattrs
            .get(name)
            .cloned()
            .ok_or_else(|| VfsError::AttributeNotFound {
                path: path.to_string(),
                name: name.to_string(),
            })
    }

    /// Set an extended attribute, replacing any previous value.
    pub fn setxattr(&self, path: &str, name: &str, value: &[u8]) -> Result<(), VfsError> {
        tracing::debug!("setxattr {} {} ({} bytes)", path, name, value.len());
        let mut tree = self.tree.write();
        tree.lookup_mut(path)?
            .meta_mut()
            .xattrs
            .insert(name.to_string(), value.to_vec());
        Ok(())
    }

    /// List extended attribute names in the order they were first set.
    pub fn listxattr(&self, path: &str) -> Result<Vec<String>, VfsError> {
        tracing::debug!("listxattr {}", path);
        let tree = self.tree.read();
        Ok(tree.lookup(path)?.meta().xattrs.keys().cloned().collect())
    }

    /// Remove an extended attribute. Removing an absent name is not an error.
    pub fn removexattr(&self, path: &str, name: &str) -> Result<(), VfsError> {
        tracing::debug!("removexattr {} {}", path, name);
        let mut tree = self.tree.write();
        tree.lookup_mut(path)?.meta_mut().xattrs.shift_remove(name);
        Ok(())
    }
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

/// Check whether `path` lies strictly below `ancestor`.
fn is_descendant(path: &str, ancestor: &str) -> bool {
    let mut path_parts = components(path);
    for part in components(ancestor) {
        if path_parts.next() != Some(part) {
            return false;
        }
    }
    path_parts.next().is_some()
}

/// Apply a link-count delta to a directory.
fn apply_link_delta(dir: &mut INodeDir, delta: i32) {
    for _ in 0..delta.max(0) {
        dir.link_subdir();
    }
    for _ in 0..(-delta).max(0) {
        dir.unlink_subdir();
    }
}
