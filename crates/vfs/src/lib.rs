//! In-memory virtual filesystem with an optional FUSE mount adapter.
//!
//! The filesystem is a tree of directories, files and symlinks held entirely
//! in memory. Every operation is addressed by path, so the core can be driven
//! by tests directly or mounted through FUSE with the `fuse` feature.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: FUSE Interface (fuser::Filesystem impl, inode ↔ path registry)
//! Layer 2: VFS Operations (MemoryFs: getattr, read, write, rename, xattrs, ...)
//! Layer 1: Primitives (INodeTree, INodeDir, INodeFile, INodeSymlink)
//! ```
//!
//! # Example
//!
//! ```
//! use memfs_vfs::MemoryFs;
//!
//! let fs = MemoryFs::new();
//! fs.mkdir("/d", 0o755)?;
//! fs.create("/d/f", 0o644)?;
//! fs.write("/d/f", b"hello", 0)?;
//! assert_eq!(fs.read("/d/f", 5, 0)?, b"hello");
//! # Ok::<(), memfs_vfs::VfsError>(())
//! ```

pub mod error;
pub mod inode;
pub mod memfs;
pub mod options;
pub mod registry;

#[cfg(feature = "fuse")]
pub mod fuse;

pub use error::VfsError;
pub use inode::{FileAttributes, INode, INodeTree, INodeType, StatFs};
pub use memfs::{DirEntry, MemFsStats, MemoryFs};
pub use options::{MemFsOptions, RenameLinkPolicy, RmdirPolicy};
pub use registry::{PathRegistry, ROOT_INODE};

#[cfg(feature = "fuse")]
pub use fuse::{mount, spawn_mount, MemFsFuse};
