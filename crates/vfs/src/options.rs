//! Configuration options for the in-memory filesystem.

use crate::inode::{StatFs, DEFAULT_DIR_PERMS};

/// How `rmdir` treats directories that still have entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RmdirPolicy {
    /// Remove the directory and everything below it.
    #[default]
    Unchecked,
    /// Refuse with `NotEmpty` unless the directory has no entries.
    RequireEmpty,
}

/// How `rename` maintains directory link counts when a directory moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenameLinkPolicy {
    /// Leave both parents' link counts as they were.
    #[default]
    Preserve,
    /// Move the subdirectory link from the old parent to the new one, and
    /// drop the link of a directory replaced at the destination.
    Adjust,
}

impl RenameLinkPolicy {
    /// Compute the link-count deltas for a rename.
    ///
    /// # Arguments
    /// * `moved_is_dir` - Whether the moved node is a directory
    /// * `same_parent` - Whether source and destination share a parent
    /// * `replaced_is_dir` - Whether a directory was overwritten at the destination
    ///
    /// # Returns
    /// (old_parent_delta, new_parent_delta).
    pub fn deltas(self, moved_is_dir: bool, same_parent: bool, replaced_is_dir: bool) -> (i32, i32) {
        match self {
            RenameLinkPolicy::Preserve => (0, 0),
            RenameLinkPolicy::Adjust => {
                let mut old_delta: i32 = 0;
                let mut new_delta: i32 = 0;
                if moved_is_dir && !same_parent {
                    old_delta -= 1;
                    new_delta += 1;
                }
                if replaced_is_dir {
                    new_delta -= 1;
                }
                (old_delta, new_delta)
            }
        }
    }
}

/// Configuration for [`crate::MemoryFs`].
#[derive(Debug, Clone)]
pub struct MemFsOptions {
    /// Permission bits of the root directory.
    pub root_mode: u32,
    /// Owner assigned to new nodes.
    pub uid: u32,
    /// Group assigned to new nodes.
    pub gid: u32,
    /// Figures reported by `statfs`.
    pub statfs: StatFs,
    /// Directory removal policy.
    pub rmdir: RmdirPolicy,
    /// Link-count policy applied on rename.
    pub rename_links: RenameLinkPolicy,
    /// How long the kernel may cache attributes and entries, in seconds.
    pub attr_timeout_secs: u64,
}

impl Default for MemFsOptions {
    fn default() -> Self {
        Self {
            root_mode: DEFAULT_DIR_PERMS,
            uid: 0,
            gid: 0,
            statfs: StatFs::default(),
            rmdir: RmdirPolicy::default(),
            rename_links: RenameLinkPolicy::default(),
            attr_timeout_secs: 1,
        }
    }
}

impl MemFsOptions {
    /// Set the root directory permissions.
    ///
    /// # Arguments
    /// * `mode` - Permission bits
    pub fn with_root_mode(mut self, mode: u32) -> Self {
        self.root_mode = mode;
        self
    }

    /// Set the owner of new nodes.
    ///
    /// # Arguments
    /// * `uid` - User id
    /// * `gid` - Group id
    pub fn with_owner(mut self, uid: u32, gid: u32) -> Self {
        self.uid = uid;
        self.gid = gid;
        self
    }

    /// Set the directory removal policy.
    pub fn with_rmdir_policy(mut self, policy: RmdirPolicy) -> Self {
        self.rmdir = policy;
        self
    }

    /// Set the rename link-count policy.
    pub fn with_rename_link_policy(mut self, policy: RenameLinkPolicy) -> Self {
        self.rename_links = policy;
        self
    }

    /// Set the kernel attribute cache timeout.
    ///
    /// # Arguments
    /// * `secs` - Timeout in seconds
    pub fn with_attr_timeout_secs(mut self, secs: u64) -> Self {
        self.attr_timeout_secs = secs;
        self
    }
}
