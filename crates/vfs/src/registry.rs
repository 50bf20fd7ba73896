//! Bidirectional path↔inode registry.
//!
//! The kernel side of the driver protocol addresses nodes by inode number
//! while [`crate::MemoryFs`] addresses them by path. The registry hands out
//! inode numbers for paths as the kernel discovers them and keeps both
//! directions in sync across renames and removals.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

/// Root directory inode number (always 1 per FUSE convention).
pub const ROOT_INODE: u64 = 1;

/// Bidirectional path↔inode registry.
///
/// Paths are stored in canonical form: `/` for the root, otherwise a leading
/// `/` and no trailing or doubled separators.
pub struct PathRegistry {
    /// Path → inode mapping.
    path_to_inode: DashMap<String, u64>,
    /// Inode → path mapping.
    inode_to_path: DashMap<u64, String>,
    /// Next inode number to allocate.
    next_inode: AtomicU64,
}

impl PathRegistry {
    /// Create a registry holding only the root.
    pub fn new() -> Self {
        let registry: PathRegistry = Self {
            path_to_inode: DashMap::new(),
            inode_to_path: DashMap::new(),
            next_inode: AtomicU64::new(ROOT_INODE + 1),
        };
        registry.path_to_inode.insert("/".to_string(), ROOT_INODE);
        registry.inode_to_path.insert(ROOT_INODE, "/".to_string());
        registry
    }

    /// Normalize a path to canonical form.
    ///
    /// # Arguments
    /// * `path` - Path to normalize
    ///
    /// # Returns
    /// Path with a single leading `/` and no empty segments.
    pub fn normalize(path: &str) -> String {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        format!("/{}", parts.join("/"))
    }

    /// Join a directory path and an entry name.
    ///
    /// # Arguments
    /// * `parent` - Canonical parent path
    /// * `name` - Entry name
    pub fn join(parent: &str, name: &str) -> String {
        if parent == "/" {
            format!("/{}", name)
        } else {
            format!("{}/{}", parent, name)
        }
    }

    /// Get or create inode for path.
    ///
    /// # Arguments
    /// * `path` - Path to register
    ///
    /// # Returns
    /// Inode number for the path (existing or newly allocated).
    pub fn get_or_create(&self, path: &str) -> u64 {
        let normalized: String = Self::normalize(path);

        // Fast path: already exists
        if let Some(id) = self.path_to_inode.get(&normalized) {
            return *id;
        }

        let id: u64 = *self
            .path_to_inode
            .entry(normalized.clone())
            .or_insert_with(|| self.next_inode.fetch_add(1, Ordering::SeqCst));
        self.inode_to_path.insert(id, normalized);
        id
    }

    /// Get inode for path if registered.
    pub fn get(&self, path: &str) -> Option<u64> {
        let normalized: String = Self::normalize(path);
        self.path_to_inode.get(&normalized).map(|r| *r)
    }

    /// Get path for inode.
    pub fn get_path(&self, inode: u64) -> Option<String> {
        self.inode_to_path.get(&inode).map(|r| r.clone())
    }

    /// Resolve the path of a child entry of a registered directory.
    ///
    /// # Arguments
    /// * `parent` - Parent inode number
    /// * `name` - Entry name
    ///
    /// # Returns
    /// The child's path, or None if the parent is unknown.
    pub fn child_path(&self, parent: u64, name: &str) -> Option<String> {
        self.get_path(parent).map(|p| Self::join(&p, name))
    }

    /// Remove a path and every path below it.
    ///
    /// # Arguments
    /// * `path` - Path to remove
    ///
    /// # Returns
    /// Inode number that was mapped to `path`, if any.
    pub fn remove(&self, path: &str) -> Option<u64> {
        let normalized: String = Self::normalize(path);
        for descendant in self.descendants(&normalized) {
            if let Some((_, id)) = self.path_to_inode.remove(&descendant) {
                self.inode_to_path.remove(&id);
            }
        }
        let (_, id) = self.path_to_inode.remove(&normalized)?;
        self.inode_to_path.remove(&id);
        Some(id)
    }

    /// Rename a path, moving every path below it along.
    ///
    /// Anything previously registered at `new_path` is dropped first.
    ///
    /// # Arguments
    /// * `old_path` - Original path
    /// * `new_path` - New path
    ///
    /// # Returns
    /// true if `old_path` was registered.
    pub fn rename(&self, old_path: &str, new_path: &str) -> bool {
        let old_normalized: String = Self::normalize(old_path);
        let new_normalized: String = Self::normalize(new_path);
        if old_normalized == new_normalized {
            return self.path_to_inode.contains_key(&old_normalized);
        }

        self.remove(&new_normalized);

        let mut moves: Vec<(String, String)> = self
            .descendants(&old_normalized)
            .into_iter()
            .map(|p| {
                let suffix: String = p[old_normalized.len()..].to_string();
                (p, format!("{}{}", new_normalized, suffix))
            })
            .collect();
        moves.push((old_normalized, new_normalized));

        let mut found: bool = false;
        for (from, to) in moves {
            if let Some((_, id)) = self.path_to_inode.remove(&from) {
                self.path_to_inode.insert(to.clone(), id);
                self.inode_to_path.insert(id, to);
                found = true;
            }
        }
        found
    }

    /// Forget an inode the kernel no longer references.
    pub fn forget(&self, inode: u64) {
        if inode == ROOT_INODE {
            return;
        }
        if let Some((_, path)) = self.inode_to_path.remove(&inode) {
            self.path_to_inode.remove_if(&path, |_, id| *id == inode);
        }
    }

    /// Number of registered paths, root included.
    pub fn len(&self) -> usize {
        self.path_to_inode.len()
    }

    /// Check whether only the root is registered.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Collect registered paths strictly below `path`.
    fn descendants(&self, path: &str) -> Vec<String> {
        let prefix: String = if path == "/" {
            "/".to_string()
        } else {
            format!("{}/", path)
        };
        self.path_to_inode
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|p| p != path && p.starts_with(&prefix))
            .collect()
    }
}

impl Default for PathRegistry {
    fn default() -> Self {
        Self::new()
    }
}
