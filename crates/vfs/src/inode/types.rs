//! Core INode types shared by every node kind.

use std::time::SystemTime;

use indexmap::IndexMap;

/// Mask selecting the file-type bits of a mode.
pub const S_IFMT: u32 = 0o170_000;

/// Directory file-type bits.
pub const S_IFDIR: u32 = 0o040_000;

/// Regular file file-type bits.
pub const S_IFREG: u32 = 0o100_000;

/// Symbolic link file-type bits.
pub const S_IFLNK: u32 = 0o120_000;

/// Mask selecting the permission bits (including setuid/setgid/sticky).
pub const PERMISSION_MASK: u32 = 0o7777;

/// Type of inode entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum INodeType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

impl INodeType {
    /// File-type bits stored in the mode of this kind of node.
    pub fn type_bits(self) -> u32 {
        match self {
            INodeType::File => S_IFREG,
            INodeType::Directory => S_IFDIR,
            INodeType::Symlink => S_IFLNK,
        }
    }

    /// Decode the file-type bits of a mode.
    ///
    /// # Arguments
    /// * `mode` - Full mode value
    ///
    /// # Returns
    /// The node type, or None if the type bits are not one we model.
    pub fn from_mode(mode: u32) -> Option<Self> {
        match mode & S_IFMT {
            S_IFREG => Some(INodeType::File),
            S_IFDIR => Some(INodeType::Directory),
            S_IFLNK => Some(INodeType::Symlink),
            _ => None,
        }
    }
}

/// Metadata carried by every node.
///
/// The file-type bits of `mode` are fixed at construction; only the
/// permission bits can change afterwards (see [`NodeMeta::set_permissions`]).
#[derive(Debug, Clone)]
pub struct NodeMeta {
    mode: u32,
    /// Creation (status change) time.
    pub ctime: SystemTime,
    /// Modification time.
    pub mtime: SystemTime,
    /// Access time.
    pub atime: SystemTime,
    /// Link count.
    pub nlink: u32,
    /// Owning user id.
    pub uid: u32,
    /// Owning group id.
    pub gid: u32,
    /// Extended attributes, in insertion order.
    pub xattrs: IndexMap<String, Vec<u8>>,
}

impl NodeMeta {
    /// Create metadata for a new node.
    ///
    /// # Arguments
    /// * `kind` - Node type, determines the file-type bits
    /// * `perms` - Requested mode; anything outside the permission bits is dropped
    /// * `nlink` - Initial link count
    pub fn new(kind: INodeType, perms: u32, nlink: u32) -> Self {
        let now: SystemTime = SystemTime::now();
        Self {
            mode: kind.type_bits() | (perms & PERMISSION_MASK),
            ctime: now,
            mtime: now,
            atime: now,
            nlink,
            uid: 0,
            gid: 0,
            xattrs: IndexMap::new(),
        }
    }

    /// Set the owner at construction time.
    pub fn with_owner(mut self, uid: u32, gid: u32) -> Self {
        self.uid = uid;
        self.gid = gid;
        self
    }

    /// Full mode (type and permission bits).
    pub fn mode(&self) -> u32 {
        self.mode
    }

    /// Permission bits only.
    pub fn permissions(&self) -> u32 {
        self.mode & PERMISSION_MASK
    }

    /// Replace the permission bits, keeping the file-type bits.
    ///
    /// # Arguments
    /// * `mode` - New mode; any file-type bits in it are ignored
    pub fn set_permissions(&mut self, mode: u32) {
        self.mode = (self.mode & S_IFMT) | (mode & PERMISSION_MASK);
    }
}

/// Fixed attribute record returned by `getattr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttributes {
    /// File type and permission bits.
    pub mode: u32,
    /// Creation time.
    pub ctime: SystemTime,
    /// Modification time.
    pub mtime: SystemTime,
    /// Access time.
    pub atime: SystemTime,
    /// Link count.
    pub nlink: u32,
    /// Owning user id.
    pub uid: u32,
    /// Owning group id.
    pub gid: u32,
    /// Size in bytes (0 for directories).
    pub size: u64,
}

impl FileAttributes {
    /// Node type decoded from the mode.
    pub fn kind(&self) -> INodeType {
        // Modes are always built from an INodeType, so decoding cannot miss.
        INodeType::from_mode(self.mode).unwrap_or(INodeType::File)
    }

    /// Permission bits only.
    pub fn permissions(&self) -> u32 {
        self.mode & PERMISSION_MASK
    }
}

/// Filesystem statistics returned by `statfs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatFs {
    /// Block size in bytes.
    pub bsize: u32,
    /// Total number of blocks.
    pub blocks: u64,
    /// Blocks available to unprivileged users.
    pub bavail: u64,
}

impl Default for StatFs {
    fn default() -> Self {
        Self {
            bsize: 512,
            blocks: 4096,
            bavail: 2048,
        }
    }
}

/// Slice `size` bytes of `bytes` starting at `offset`.
///
/// The range is clamped to the end of `bytes`, so it may come back short or
/// empty.
pub(crate) fn byte_range(bytes: &[u8], offset: u64, size: usize) -> &[u8] {
    let len: usize = bytes.len();
    let start: usize = usize::try_from(offset).map_or(len, |o| o.min(len));
    let end: usize = start.saturating_add(size).min(len);
    &bytes[start..end]
}
