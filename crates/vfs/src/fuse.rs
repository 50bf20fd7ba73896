//! FUSE filesystem implementation.
//!
//! Translates the kernel's inode-addressed requests into the path-addressed
//! verbs of [`MemoryFs`], using a [`PathRegistry`] to map between the two.

use std::ffi::OsStr;
use std::path::Path;
use std::time::{Duration, SystemTime};

use fuser::{
    FileAttr, FileType, Filesystem, MountOption, ReplyAttr, ReplyCreate, ReplyData,
    ReplyDirectory, ReplyEmpty, ReplyEntry, ReplyOpen, ReplyStatfs, ReplyWrite, ReplyXattr,
    Request, TimeOrNow,
};

use crate::inode::{split_path, FileAttributes, INodeType, StatFs, PERMISSION_MASK};
use crate::memfs::{DirEntry, MemFsStats, MemoryFs};
use crate::registry::PathRegistry;
use crate::VfsError;

/// Maximum entry name length reported by `statfs`.
const MAX_NAME_LEN: u32 = 255;

/// `rename` flag: fail if the destination exists.
#[cfg(target_os = "linux")]
const RENAME_NOREPLACE: u32 = libc::RENAME_NOREPLACE;

/// `rename` flag: fail if the destination exists.
#[cfg(target_os = "macos")]
const RENAME_NOREPLACE: u32 = libc::RENAME_EXCL;

/// `rename` flag: fail if the destination exists.
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
const RENAME_NOREPLACE: u32 = 1;

/// Mounts a [`MemoryFs`] through FUSE.
pub struct MemFsFuse {
    /// The filesystem being served.
    fs: MemoryFs,
    /// Inode numbers handed to the kernel.
    registry: PathRegistry,
    /// Attribute and entry cache timeout.
    ttl: Duration,
}

impl MemFsFuse {
    /// Wrap a filesystem for mounting.
    ///
    /// # Arguments
    /// * `fs` - Filesystem to serve
    pub fn new(fs: MemoryFs) -> Self {
        let ttl: Duration = Duration::from_secs(fs.options().attr_timeout_secs);
        Self {
            fs,
            registry: PathRegistry::new(),
            ttl,
        }
    }

    /// Get the served filesystem.
    pub fn fs(&self) -> &MemoryFs {
        &self.fs
    }

    /// Get the path registered for an inode.
    fn path_of(&self, ino: u64) -> Result<String, VfsError> {
        self.registry
            .get_path(ino)
            .ok_or_else(|| VfsError::NoSuchEntry(format!("inode {}", ino)))
    }

    /// Get the path of a child entry.
    fn child_path(&self, parent: u64, name: &OsStr) -> Result<String, VfsError> {
        let name: &str = name
            .to_str()
            .ok_or_else(|| VfsError::InvalidPath(name.to_string_lossy().into_owned()))?;
        self.registry
            .child_path(parent, name)
            .ok_or_else(|| VfsError::NoSuchEntry(format!("inode {}", parent)))
    }

    /// Look up a path, register it and build its kernel attributes.
    fn entry_attr(&self, path: &str) -> Result<FileAttr, VfsError> {
        let attrs: FileAttributes = self.fs.getattr(path)?;
        let ino: u64 = self.registry.get_or_create(path);
        Ok(self.to_file_attr(ino, &attrs))
    }

    /// Convert an attribute record to FUSE file attributes.
    fn to_file_attr(&self, ino: u64, attrs: &FileAttributes) -> FileAttr {
        let statfs: StatFs = self.fs.options().statfs;
        FileAttr {
            ino,
            size: attrs.size,
            blocks: attrs.size.div_ceil(u64::from(statfs.bsize.max(1))),
            atime: attrs.atime,
            mtime: attrs.mtime,
            ctime: attrs.ctime,
            crtime: attrs.ctime,
            kind: file_type(attrs.kind()),
            perm: (attrs.permissions() & PERMISSION_MASK) as u16,
            nlink: attrs.nlink,
            uid: attrs.uid,
            gid: attrs.gid,
            rdev: 0,
            blksize: statfs.bsize,
            flags: 0,
        }
    }

    /// Run an entry-creating operation and register the new node.
    ///
    /// Whatever was registered at or below `path` belonged to the entry that
    /// was just replaced, so it is dropped before the new node is registered.
    ///
    /// # Arguments
    /// * `path` - Path of the new entry
    /// * `make` - Operation creating the entry
    ///
    /// # Returns
    /// The new entry's attributes and the operation's result.
    fn make_entry<T>(
        &self,
        path: &str,
        make: impl FnOnce(&MemoryFs, &str) -> Result<T, VfsError>,
    ) -> Result<(FileAttr, T), VfsError> {
        let made: T = make(&self.fs, path)?;
        self.registry.remove(path);
        Ok((self.entry_attr(path)?, made))
    }

    /// Rename an entry and move its registered inode numbers along.
    ///
    /// Only the no-replace flag is supported; exchange and whiteout requests
    /// are refused.
    ///
    /// # Arguments
    /// * `old_path` - Current path
    /// * `new_path` - Destination path
    /// * `flags` - `renameat2` flags from the kernel
    fn rename_entry(&self, old_path: &str, new_path: &str, flags: u32) -> Result<(), VfsError> {
        if flags & !RENAME_NOREPLACE != 0 {
            return Err(VfsError::UnsupportedFlags(flags));
        }
        if flags & RENAME_NOREPLACE != 0 && self.fs.getattr(new_path).is_ok() {
            return Err(VfsError::AlreadyExists(new_path.to_string()));
        }
        self.fs.rename(old_path, new_path)?;
        self.registry.rename(old_path, new_path);
        Ok(())
    }

    /// Apply a `setattr` request and return the resulting attributes.
    #[allow(clippy::too_many_arguments)]
    fn apply_setattr(
        &self,
        ino: u64,
        mode: Option<u32>,
        uid: Option<u32>,
        gid: Option<u32>,
        size: Option<u64>,
        atime: Option<TimeOrNow>,
        mtime: Option<TimeOrNow>,
    ) -> Result<FileAttr, VfsError> {
        let path: String = self.path_of(ino)?;

        if let Some(mode) = mode {
            self.fs.chmod(&path, mode)?;
        }
        if uid.is_some() || gid.is_some() {
            let current: FileAttributes = self.fs.getattr(&path)?;
            self.fs
                .chown(&path, uid.unwrap_or(current.uid), gid.unwrap_or(current.gid))?;
        }
        if let Some(size) = size {
            self.fs.truncate(&path, size)?;
        }
        match (atime, mtime) {
            (None, None) => {}
            (Some(TimeOrNow::Now), Some(TimeOrNow::Now)) => self.fs.utimens(&path, None)?,
            (atime, mtime) => {
                let current: FileAttributes = self.fs.getattr(&path)?;
                let times: (SystemTime, SystemTime) = (
                    resolve_time(atime, current.atime),
                    resolve_time(mtime, current.mtime),
                );
                self.fs.utimens(&path, Some(times))?;
            }
        }

        let attrs: FileAttributes = self.fs.getattr(&path)?;
        Ok(self.to_file_attr(ino, &attrs))
    }

    /// Build the listing for `readdir`, `.` and `..` first.
    fn dir_listing(&self, ino: u64) -> Result<Vec<(u64, FileType, String)>, VfsError> {
        let path: String = self.path_of(ino)?;
        let children: Vec<DirEntry> = self.fs.list_entries(&path)?;

        let parent_ino: u64 = match split_path(&path) {
            Some((parent, _)) => self.registry.get_or_create(parent),
            None => ino,
        };
        let mut entries: Vec<(u64, FileType, String)> = vec![
            (ino, FileType::Directory, ".".to_string()),
            (parent_ino, FileType::Directory, "..".to_string()),
        ];
        for child in children {
            let child_path: String = PathRegistry::join(&path, &child.name);
            let child_ino: u64 = self.registry.get_or_create(&child_path);
            entries.push((child_ino, file_type(child.kind), child.name));
        }
        Ok(entries)
    }
}

/// Map a node type to the FUSE file type.
fn file_type(kind: INodeType) -> FileType {
    match kind {
        INodeType::File => FileType::RegularFile,
        INodeType::Directory => FileType::Directory,
        INodeType::Symlink => FileType::Symlink,
    }
}

/// Resolve a requested timestamp, keeping `current` when none was given.
fn resolve_time(requested: Option<TimeOrNow>, current: SystemTime) -> SystemTime {
    match requested {
        Some(TimeOrNow::SpecificTime(t)) => t,
        Some(TimeOrNow::Now) => SystemTime::now(),
        None => current,
    }
}

/// Log a failed request and return its errno.
fn errno(op: &str, err: &VfsError) -> i32 {
    match err {
        VfsError::NoSuchEntry(_) | VfsError::AttributeNotFound { .. } => {
            tracing::trace!("{} failed: {}", op, err)
        }
        _ => tracing::warn!("{} failed: {}", op, err),
    }
    err.errno()
}

/// Encode xattr names as the NUL-terminated list the kernel expects.
fn encode_xattr_names(names: &[String]) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();
    for name in names {
        buf.extend_from_slice(name.as_bytes());
        buf.push(0);
    }
    buf
}

/// Reply to an xattr request honouring the kernel's size probe.
fn reply_xattr(reply: ReplyXattr, data: &[u8], size: u32) {
    if size == 0 {
        reply.size(data.len() as u32);
    } else if data.len() > size as usize {
        reply.error(libc::ERANGE);
    } else {
        reply.data(data);
    }
}

impl Filesystem for MemFsFuse {
    fn lookup(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEntry) {
        match self
            .child_path(parent, name)
            .and_then(|path| self.entry_attr(&path))
        {
            Ok(attr) => reply.entry(&self.ttl, &attr, 0),
            Err(e) => reply.error(errno("lookup", &e)),
        }
    }

    fn forget(&mut self, _req: &Request, ino: u64, _nlookup: u64) {
        self.registry.forget(ino);
    }

    fn getattr(&mut self, _req: &Request, ino: u64, reply: ReplyAttr) {
        match self.path_of(ino).and_then(|path| self.fs.getattr(&path)) {
            Ok(attrs) => reply.attr(&self.ttl, &self.to_file_attr(ino, &attrs)),
            Err(e) => reply.error(errno("getattr", &e)),
        }
    }

    fn setattr(
        &mut self,
        _req: &Request,
        ino: u64,
        mode: Option<u32>,
        uid: Option<u32>,
        gid: Option<u32>,
        size: Option<u64>,
        atime: Option<TimeOrNow>,
        mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        match self.apply_setattr(ino, mode, uid, gid, size, atime, mtime) {
            Ok(attr) => reply.attr(&self.ttl, &attr),
            Err(e) => reply.error(errno("setattr", &e)),
        }
    }

    fn readlink(&mut self, _req: &Request, ino: u64, reply: ReplyData) {
        match self.path_of(ino).and_then(|path| self.fs.readlink(&path)) {
            Ok(target) => reply.data(target.as_bytes()),
            Err(e) => reply.error(errno("readlink", &e)),
        }
    }

    fn mkdir(
        &mut self,
        _req: &Request,
        parent: u64,
        name: &OsStr,
        mode: u32,
        umask: u32,
        reply: ReplyEntry,
    ) {
        let result: Result<(FileAttr, ()), VfsError> =
            self.child_path(parent, name).and_then(|path| {
                self.make_entry(&path, |fs, path| fs.mkdir(path, mode & !umask))
            });
        match result {
            Ok((attr, ())) => reply.entry(&self.ttl, &attr, 0),
            Err(e) => reply.error(errno("mkdir", &e)),
        }
    }

    fn unlink(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        let result: Result<(), VfsError> = self.child_path(parent, name).and_then(|path| {
            self.fs.unlink(&path)?;
            self.registry.remove(&path);
            Ok(())
        });
        match result {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(errno("unlink", &e)),
        }
    }

    fn rmdir(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        let result: Result<(), VfsError> = self.child_path(parent, name).and_then(|path| {
            self.fs.rmdir(&path)?;
            self.registry.remove(&path);
            Ok(())
        });
        match result {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(errno("rmdir", &e)),
        }
    }

    fn symlink(
        &mut self,
        _req: &Request,
        parent: u64,
        link_name: &OsStr,
        target: &Path,
        reply: ReplyEntry,
    ) {
        let result: Result<(FileAttr, ()), VfsError> =
            self.child_path(parent, link_name).and_then(|path| {
                let target: &str = target
                    .to_str()
                    .ok_or_else(|| VfsError::InvalidPath(target.display().to_string()))?;
                self.make_entry(&path, |fs, path| fs.symlink(path, target))
            });
        match result {
            Ok((attr, ())) => reply.entry(&self.ttl, &attr, 0),
            Err(e) => reply.error(errno("symlink", &e)),
        }
    }

    fn rename(
        &mut self,
        _req: &Request,
        parent: u64,
        name: &OsStr,
        newparent: u64,
        newname: &OsStr,
        flags: u32,
        reply: ReplyEmpty,
    ) {
        let result: Result<(), VfsError> = self.child_path(parent, name).and_then(|old_path| {
            let new_path: String = self.child_path(newparent, newname)?;
            self.rename_entry(&old_path, &new_path, flags)
        });
        match result {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(errno("rename", &e)),
        }
    }

    fn open(&mut self, _req: &Request, ino: u64, flags: i32, reply: ReplyOpen) {
        match self.path_of(ino) {
            Ok(path) => reply.opened(self.fs.open(&path, flags), 0),
            Err(e) => reply.error(errno("open", &e)),
        }
    }

    fn read(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let offset: u64 = offset.max(0) as u64;
        match self
            .path_of(ino)
            .and_then(|path| self.fs.read(&path, size as usize, offset))
        {
            Ok(data) => reply.data(&data),
            Err(e) => reply.error(errno("read", &e)),
        }
    }

    fn write(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        offset: i64,
        data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        let offset: u64 = offset.max(0) as u64;
        match self
            .path_of(ino)
            .and_then(|path| self.fs.write(&path, data, offset))
        {
            Ok(written) => reply.written(written as u32),
            Err(e) => reply.error(errno("write", &e)),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let entries: Vec<(u64, FileType, String)> = match self.dir_listing(ino) {
            Ok(entries) => entries,
            Err(e) => {
                reply.error(errno("readdir", &e));
                return;
            }
        };

        for (i, (e_ino, kind, name)) in entries.iter().enumerate().skip(offset.max(0) as usize) {
            if reply.add(*e_ino, (i + 1) as i64, *kind, name) {
                break;
            }
        }
        reply.ok();
    }

    fn statfs(&mut self, _req: &Request, ino: u64, reply: ReplyStatfs) {
        let path: String = self.path_of(ino).unwrap_or_else(|_| "/".to_string());
        let statfs: StatFs = self.fs.statfs(&path);
        let stats: MemFsStats = self.fs.stats();
        let files: u64 = (stats.directories + stats.files + stats.symlinks) as u64;
        reply.statfs(
            statfs.blocks,
            statfs.bavail,
            statfs.bavail,
            files,
            u64::from(u32::MAX),
            statfs.bsize,
            MAX_NAME_LEN,
            statfs.bsize,
        );
    }

    fn setxattr(
        &mut self,
        _req: &Request,
        ino: u64,
        name: &OsStr,
        value: &[u8],
        _flags: i32,
        _position: u32,
        reply: ReplyEmpty,
    ) {
        let result: Result<(), VfsError> = self.path_of(ino).and_then(|path| {
            self.fs.setxattr(&path, &name.to_string_lossy(), value)
        });
        match result {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(errno("setxattr", &e)),
        }
    }

    fn getxattr(&mut self, _req: &Request, ino: u64, name: &OsStr, size: u32, reply: ReplyXattr) {
        match self
            .path_of(ino)
            .and_then(|path| self.fs.getxattr(&path, &name.to_string_lossy()))
        {
            Ok(value) => reply_xattr(reply, &value, size),
            Err(e) => reply.error(errno("getxattr", &e)),
        }
    }

    fn listxattr(&mut self, _req: &Request, ino: u64, size: u32, reply: ReplyXattr) {
        match self.path_of(ino).and_then(|path| self.fs.listxattr(&path)) {
            Ok(names) => reply_xattr(reply, &encode_xattr_names(&names), size),
            Err(e) => reply.error(errno("listxattr", &e)),
        }
    }

    fn removexattr(&mut self, _req: &Request, ino: u64, name: &OsStr, reply: ReplyEmpty) {
        match self
            .path_of(ino)
            .and_then(|path| self.fs.removexattr(&path, &name.to_string_lossy()))
        {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(errno("removexattr", &e)),
        }
    }

    fn create(
        &mut self,
        _req: &Request,
        parent: u64,
        name: &OsStr,
        mode: u32,
        umask: u32,
        _flags: i32,
        reply: ReplyCreate,
    ) {
        let result: Result<(FileAttr, u64), VfsError> =
            self.child_path(parent, name).and_then(|path| {
                self.make_entry(&path, |fs, path| fs.create(path, mode & !umask))
            });
        match result {
            Ok((attr, fh)) => reply.created(&self.ttl, &attr, 0, fh, 0),
            Err(e) => reply.error(errno("create", &e)),
        }
    }
}

/// Mount options shared by [`mount`] and [`spawn_mount`].
fn mount_options() -> Vec<MountOption> {
    vec![
        MountOption::RW,
        MountOption::FSName("memfs".into()),
        MountOption::AutoUnmount,
    ]
}

/// Mount the filesystem and serve requests until it is unmounted.
///
/// # Arguments
/// * `fs` - Filesystem to mount
/// * `mountpoint` - Path to mount at
pub fn mount(fs: MemoryFs, mountpoint: &Path) -> Result<(), VfsError> {
    tracing::info!("mounting memfs at {}", mountpoint.display());
    fuser::mount2(MemFsFuse::new(fs), mountpoint, &mount_options())
        .map_err(|e| VfsError::MountFailed(e.to_string()))
}

/// Mount the filesystem on a background thread.
///
/// # Arguments
/// * `fs` - Filesystem to mount
/// * `mountpoint` - Path to mount at
///
/// # Returns
/// Background session handle; dropping it unmounts.
pub fn spawn_mount(fs: MemoryFs, mountpoint: &Path) -> Result<fuser::BackgroundSession, VfsError> {
    tracing::info!("mounting memfs at {} (background)", mountpoint.display());
    fuser::spawn_mount2(MemFsFuse::new(fs), mountpoint, &mount_options())
        .map_err(|e| VfsError::MountFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_xattr_names() {
        let names: Vec<String> = vec!["user.a".to_string(), "user.bb".to_string()];
        assert_eq!(encode_xattr_names(&names), b"user.a\0user.bb\0".to_vec());
        assert!(encode_xattr_names(&[]).is_empty());
    }

    #[test]
    fn test_file_attr_conversion() {
        let fs: MemoryFs = MemoryFs::new();
        fs.create("/f", 0o640).unwrap();
        fs.write("/f", &[0u8; 513], 0).unwrap();

        let adapter: MemFsFuse = MemFsFuse::new(fs);
        let attr: FileAttr = adapter.entry_attr("/f").unwrap();
        assert_eq!(attr.kind, FileType::RegularFile);
        assert_eq!(attr.perm, 0o640);
        assert_eq!(attr.size, 513);
        assert_eq!(attr.blocks, 2);
        assert_eq!(attr.nlink, 1);
        assert_eq!(adapter.registry.get("/f"), Some(attr.ino));
    }

    #[test]
    fn test_dir_listing_registers_children() {
        let fs: MemoryFs = MemoryFs::new();
        fs.mkdir("/d", 0o755).unwrap();
        fs.create("/d/f", 0o644).unwrap();

        let adapter: MemFsFuse = MemFsFuse::new(fs);
        let d_ino: u64 = adapter.registry.get_or_create("/d");
        let listing: Vec<(u64, FileType, String)> = adapter.dir_listing(d_ino).unwrap();

        let names: Vec<&str> = listing.iter().map(|(_, _, n)| n.as_str()).collect();
        assert_eq!(names, vec![".", "..", "f"]);
        assert_eq!(listing[1].0, crate::registry::ROOT_INODE);
        assert_eq!(adapter.registry.get("/d/f"), Some(listing[2].0));
    }

    #[test]
    fn test_setattr_applies_each_field() {
        let fs: MemoryFs = MemoryFs::new();
        fs.create("/f", 0o644).unwrap();
        fs.write("/f", b"0123456789", 0).unwrap();

        let adapter: MemFsFuse = MemFsFuse::new(fs);
        let ino: u64 = adapter.registry.get_or_create("/f");
        let when: SystemTime = SystemTime::UNIX_EPOCH + Duration::from_secs(42);

        let attr: FileAttr = adapter
            .apply_setattr(
                ino,
                Some(0o600),
                Some(7),
                None,
                Some(4),
                Some(TimeOrNow::SpecificTime(when)),
                None,
            )
            .unwrap();
        assert_eq!(attr.perm, 0o600);
        assert_eq!((attr.uid, attr.gid), (7, 0));
        assert_eq!(attr.size, 4);
        assert_eq!(attr.atime, when);
    }

    #[test]
    fn test_rename_no_replace_keeps_destination() {
        let fs: MemoryFs = MemoryFs::new();
        fs.create("/src", 0o644).unwrap();
        fs.write("/src", b"new", 0).unwrap();
        fs.create("/dst", 0o644).unwrap();
        fs.write("/dst", b"old", 0).unwrap();

        let adapter: MemFsFuse = MemFsFuse::new(fs);
        let err: VfsError = adapter
            .rename_entry("/src", "/dst", RENAME_NOREPLACE)
            .unwrap_err();
        assert_eq!(err.errno(), libc::EEXIST);
        assert_eq!(adapter.fs().read("/dst", 10, 0).unwrap(), b"old");
        assert!(adapter.fs().getattr("/src").is_ok());

        // No-replace onto a free name is a plain move
        let src_ino: u64 = adapter.registry.get_or_create("/src");
        adapter.rename_entry("/src", "/free", RENAME_NOREPLACE).unwrap();
        assert_eq!(adapter.fs().read("/free", 10, 0).unwrap(), b"new");
        assert_eq!(adapter.registry.get("/free"), Some(src_ino));
    }

    #[test]
    fn test_rename_refuses_other_flags() {
        let fs: MemoryFs = MemoryFs::new();
        fs.create("/a", 0o644).unwrap();
        fs.create("/b", 0o644).unwrap();

        let adapter: MemFsFuse = MemFsFuse::new(fs);
        let exchange: u32 = RENAME_NOREPLACE << 1;
        let err: VfsError = adapter.rename_entry("/a", "/b", exchange).unwrap_err();
        assert_eq!(err.errno(), libc::EINVAL);
        assert!(adapter.fs().getattr("/a").is_ok());

        // Without flags the destination is replaced
        adapter.rename_entry("/a", "/b", 0).unwrap();
        assert!(adapter.fs().getattr("/a").is_err());
    }

    #[test]
    fn test_make_entry_drops_replaced_subtree() {
        let fs: MemoryFs = MemoryFs::new();
        fs.mkdir("/d", 0o755).unwrap();
        fs.create("/d/f", 0o644).unwrap();

        let adapter: MemFsFuse = MemFsFuse::new(fs);
        let old_dir: u64 = adapter.registry.get_or_create("/d");
        let old_child: u64 = adapter.registry.get_or_create("/d/f");

        let (attr, _fh) = adapter
            .make_entry("/d", |fs, path| fs.create(path, 0o644))
            .unwrap();
        assert_eq!(attr.kind, FileType::RegularFile);
        assert_ne!(attr.ino, old_dir);
        assert!(adapter.registry.get_path(old_child).is_none());
        assert!(adapter.registry.get("/d/f").is_none());
    }

    #[test]
    fn test_unknown_inode() {
        let adapter: MemFsFuse = MemFsFuse::new(MemoryFs::new());
        let err: VfsError = adapter.path_of(999).unwrap_err();
        assert_eq!(err.errno(), libc::ENOENT);
    }
}
