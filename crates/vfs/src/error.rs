//! Error types for the VFS crate.

use thiserror::Error;

/// errno reported for a missing extended attribute.
#[cfg(any(target_os = "macos", target_os = "freebsd"))]
const ENOATTR: i32 = libc::ENOATTR;

/// errno reported for a missing extended attribute.
#[cfg(not(any(target_os = "macos", target_os = "freebsd")))]
const ENOATTR: i32 = libc::ENODATA;

/// Errors that can occur during VFS operations.
#[derive(Debug, Error)]
pub enum VfsError {
    /// Path does not resolve to a node.
    #[error("No such entry: {0}")]
    NoSuchEntry(String),

    /// Extended attribute is not set on the node.
    #[error("Attribute {name} not found on {path}")]
    AttributeNotFound {
        /// Path of the node.
        path: String,
        /// Attribute name that was requested.
        name: String,
    },

    /// Not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// Operation requires a file but found a directory.
    #[error("Is a directory: {0}")]
    IsADirectory(String),

    /// Directory still has entries.
    #[error("Directory not empty: {0}")]
    NotEmpty(String),

    /// Path has no leaf name (e.g. the root).
    #[error("Invalid path: {0:?}")]
    InvalidPath(String),

    /// Rename between a path and one of its own ancestors or descendants.
    #[error("Cannot rename {from} to {to}: one path contains the other")]
    InvalidRename {
        /// Source path.
        from: String,
        /// Destination path.
        to: String,
    },

    /// Destination exists and the caller asked not to replace it.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Request carried flags this filesystem does not support.
    #[error("Unsupported flags: {0:#x}")]
    UnsupportedFlags(u32),

    /// Mount operation failed.
    #[error("Mount failed: {0}")]
    MountFailed(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VfsError {
    /// Map the error to the errno the driver protocol expects.
    pub fn errno(&self) -> i32 {
        match self {
            VfsError::NoSuchEntry(_) => libc::ENOENT,
            VfsError::AttributeNotFound { .. } => ENOATTR,
            VfsError::NotADirectory(_) => libc::ENOTDIR,
            VfsError::IsADirectory(_) => libc::EISDIR,
            VfsError::NotEmpty(_) => libc::ENOTEMPTY,
            VfsError::AlreadyExists(_) => libc::EEXIST,
            VfsError::InvalidPath(_)
            | VfsError::InvalidRename { .. }
            | VfsError::UnsupportedFlags(_) => libc::EINVAL,
            VfsError::MountFailed(_) => libc::EIO,
            VfsError::Io(e) => e.raw_os_error().unwrap_or(libc::EIO),
        }
    }
}
