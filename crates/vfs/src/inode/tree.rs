//! The node tree and its path resolver.

use crate::VfsError;

use super::dir::INodeDir;
use super::INode;

/// Owns the whole hierarchy through a single root directory.
///
/// Every node is reachable from the root and has exactly one owning parent.
/// Paths are the only way to address a node; a lookup that fails yields
/// `None` (or [`VfsError::NoSuchEntry`]) rather than a placeholder node.
#[derive(Debug, Clone)]
pub struct INodeTree {
    /// Root node, always a directory.
    root: INode,
}

impl INodeTree {
    /// Create a tree around a root directory.
    ///
    /// # Arguments
    /// * `root` - Root directory, addressed as `/`
    pub fn new(root: INodeDir) -> Self {
        Self {
            root: INode::Directory(root),
        }
    }

    /// Resolve a path to a node.
    ///
    /// Empty segments are skipped, so `/`, `""` and `//` all name the root.
    /// Descending requires the current node to be a directory; a path that
    /// walks through a file or symlink does not resolve.
    ///
    /// # Arguments
    /// * `path` - Absolute path
    ///
    /// # Returns
    /// The node if every segment exists.
    pub fn resolve(&self, path: &str) -> Option<&INode> {
        let mut node: &INode = &self.root;
        for name in components(path) {
            node = node.as_dir()?.get_child(name)?;
        }
        Some(node)
    }

    /// Resolve a path to a node for mutation. See [`INodeTree::resolve`].
    pub fn resolve_mut(&mut self, path: &str) -> Option<&mut INode> {
        let mut node: &mut INode = &mut self.root;
        for name in components(path) {
            node = node.as_dir_mut()?.get_child_mut(name)?;
        }
        Some(node)
    }

    /// Resolve a path, failing with `NoSuchEntry` if it does not exist.
    pub fn lookup(&self, path: &str) -> Result<&INode, VfsError> {
        self.resolve(path)
            .ok_or_else(|| VfsError::NoSuchEntry(path.to_string()))
    }

    /// Resolve a path for mutation, failing with `NoSuchEntry` if it does not exist.
    pub fn lookup_mut(&mut self, path: &str) -> Result<&mut INode, VfsError> {
        self.resolve_mut(path)
            .ok_or_else(|| VfsError::NoSuchEntry(path.to_string()))
    }

    /// Resolve the directory that holds (or would hold) `path`.
    ///
    /// # Arguments
    /// * `path` - Path whose parent to resolve
    ///
    /// # Returns
    /// The parent directory and the leaf name.
    pub fn parent_dir<'p>(&self, path: &'p str) -> Result<(&INodeDir, &'p str), VfsError> {
        let (parent, name) = split_path(path).ok_or_else(|| VfsError::InvalidPath(path.to_string()))?;
        match self.resolve(parent) {
            Some(INode::Directory(dir)) => Ok((dir, name)),
            Some(_) => Err(VfsError::NotADirectory(parent.to_string())),
            None => Err(VfsError::NoSuchEntry(parent.to_string())),
        }
    }

    /// Mutable variant of [`INodeTree::parent_dir`].
    pub fn parent_dir_mut<'p>(
        &mut self,
        path: &'p str,
    ) -> Result<(&mut INodeDir, &'p str), VfsError> {
        let (parent, name) = split_path(path).ok_or_else(|| VfsError::InvalidPath(path.to_string()))?;
        match self.resolve_mut(parent) {
            Some(INode::Directory(dir)) => Ok((dir, name)),
            Some(_) => Err(VfsError::NotADirectory(parent.to_string())),
            None => Err(VfsError::NoSuchEntry(parent.to_string())),
        }
    }

    /// Detach the node at `path` from its parent and hand over ownership.
    ///
    /// Link counts are left untouched.
    pub fn take(&mut self, path: &str) -> Result<INode, VfsError> {
        let (dir, name) = self.parent_dir_mut(path)?;
        dir.remove_child(name)
            .ok_or_else(|| VfsError::NoSuchEntry(path.to_string()))
    }

    /// Visit every node, root included, depth first.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&INode),
    {
        let mut stack: Vec<&INode> = vec![&self.root];
        while let Some(node) = stack.pop() {
            visit(node);
            if let Some(dir) = node.as_dir() {
                stack.extend(dir.children().map(|(_, child)| child));
            }
        }
    }
}

/// Iterate over the non-empty segments of a path.
pub fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Split a path into parent directory and name.
///
/// Trailing separators are ignored.
///
/// # Arguments
/// * `path` - Path to split
///
/// # Returns
/// (parent_path, name) tuple, or None if the path has no leaf name.
pub fn split_path(path: &str) -> Option<(&str, &str)> {
    let trimmed: &str = path.trim_end_matches('/');
    let (parent, name) = match trimmed.rfind('/') {
        Some(pos) => (&trimmed[..pos], &trimmed[pos + 1..]),
        None => ("", trimmed),
    };
    if name.is_empty() {
        None
    } else {
        Some((parent, name))
    }
}
