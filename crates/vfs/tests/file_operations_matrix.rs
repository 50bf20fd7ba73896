//! Integration tests for the path-based operation set.
//!
//! Operations tested:
//! - getattr: resolution of present, absent and root paths
//! - create / mkdir / symlink: entry creation and overwrite
//! - read / write / truncate: content semantics
//! - unlink / rmdir: removal and link counts
//! - rename: moves of files and directories
//! - chmod / chown / utimens: metadata updates
//! - xattrs: get / set / list / remove
//! - readdir / statfs

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use memfs_vfs::inode::{S_IFDIR, S_IFLNK, S_IFREG};
use memfs_vfs::{
    FileAttributes, INodeType, MemFsOptions, MemoryFs, RenameLinkPolicy, StatFs, VfsError,
};

/// Create a filesystem holding `/d/f` with the given content.
fn fs_with_file(content: &[u8]) -> MemoryFs {
    let fs: MemoryFs = MemoryFs::new();
    fs.mkdir("/d", 0o755).unwrap();
    fs.create("/d/f", 0o644).unwrap();
    fs.write("/d/f", content, 0).unwrap();
    fs
}

// =============================================================================
// GETATTR TESTS
// =============================================================================

mod getattr {
    use super::*;

    #[test]
    fn test_absent_paths_are_no_such_entry() {
        let fs: MemoryFs = fs_with_file(b"x");
        for path in ["/missing", "/d/missing", "/missing/f", "/d/f/below-a-file"] {
            let err: VfsError = fs.getattr(path).unwrap_err();
            assert!(
                matches!(err, VfsError::NoSuchEntry(_)),
                "{} gave {:?}",
                path,
                err
            );
        }
    }

    #[test]
    fn test_root_is_a_directory() {
        let fs: MemoryFs = MemoryFs::new();
        let attrs: FileAttributes = fs.getattr("/").unwrap();
        assert_eq!(attrs.mode & S_IFDIR, S_IFDIR);
        assert_eq!(attrs.kind(), INodeType::Directory);
    }

    #[test]
    fn test_record_fields() {
        let fs: MemoryFs = fs_with_file(b"hello");
        let attrs: FileAttributes = fs.getattr("/d/f").unwrap();

        assert_eq!(attrs.mode, S_IFREG | 0o644);
        assert_eq!(attrs.nlink, 1);
        assert_eq!((attrs.uid, attrs.gid), (0, 0));
        assert_eq!(attrs.size, 5);
        assert!(attrs.ctime <= SystemTime::now());
    }

    #[test]
    fn test_doubled_separators_resolve() {
        let fs: MemoryFs = fs_with_file(b"x");
        assert!(fs.getattr("//d///f").is_ok());
        assert!(fs.getattr("/d/").is_ok());
    }
}

// =============================================================================
// CONTENT TESTS
// =============================================================================

mod content {
    use super::*;

    #[test]
    fn test_write_then_read_round_trip() {
        let fs: MemoryFs = MemoryFs::new();
        fs.create("/f", 0o644).unwrap();

        let data: &[u8] = b"some bytes \x00\xff";
        assert_eq!(fs.write("/f", data, 0).unwrap(), data.len());
        assert_eq!(fs.read("/f", data.len(), 0).unwrap(), data);
    }

    #[test]
    fn test_read_past_end_is_short() {
        let fs: MemoryFs = fs_with_file(b"hello");
        assert_eq!(fs.read("/d/f", 100, 3).unwrap(), b"lo");
        assert!(fs.read("/d/f", 10, 5).unwrap().is_empty());
        assert!(fs.read("/d/f", 10, 1_000).unwrap().is_empty());
    }

    #[test]
    fn test_write_replaces_tail() {
        let fs: MemoryFs = fs_with_file(b"hello world");
        assert_eq!(fs.write("/d/f", b"p!", 3).unwrap(), 2);
        assert_eq!(fs.read("/d/f", 100, 0).unwrap(), b"help!");
        assert_eq!(fs.getattr("/d/f").unwrap().size, 5);
    }

    #[test]
    fn test_write_appends() {
        let fs: MemoryFs = fs_with_file(b"abc");
        fs.write("/d/f", b"def", 3).unwrap();
        assert_eq!(fs.read("/d/f", 100, 0).unwrap(), b"abcdef");
    }

    #[test]
    fn test_truncate_never_extends() {
        let fs: MemoryFs = fs_with_file(b"0123456789");
        fs.truncate("/d/f", 20).unwrap();
        assert!(fs.getattr("/d/f").unwrap().size <= 10);

        fs.truncate("/d/f", 3).unwrap();
        assert_eq!(fs.read("/d/f", 100, 0).unwrap(), b"012");
    }

    #[test]
    fn test_content_ops_on_missing_and_directories() {
        let fs: MemoryFs = fs_with_file(b"x");
        assert!(matches!(fs.read("/nope", 1, 0), Err(VfsError::NoSuchEntry(_))));
        assert!(matches!(fs.write("/nope", b"x", 0), Err(VfsError::NoSuchEntry(_))));
        assert!(matches!(fs.truncate("/nope", 0), Err(VfsError::NoSuchEntry(_))));
        assert!(matches!(fs.truncate("/d", 0), Err(VfsError::IsADirectory(_))));
    }
}

// =============================================================================
// DIRECTORY TESTS
// =============================================================================

mod directories {
    use super::*;

    #[test]
    fn test_mkdir_increments_parent_nlink() {
        let fs: MemoryFs = MemoryFs::new();
        let before: u32 = fs.getattr("/").unwrap().nlink;
        fs.mkdir("/d", 0o755).unwrap();
        assert_eq!(fs.getattr("/").unwrap().nlink, before + 1);
        assert_eq!(fs.getattr("/d").unwrap().nlink, 2);
    }

    #[test]
    fn test_rmdir_decrements_parent_nlink_regardless_of_contents() {
        let fs: MemoryFs = MemoryFs::new();
        fs.mkdir("/d", 0o755).unwrap();
        fs.mkdir("/d/sub", 0o755).unwrap();
        fs.create("/d/sub/f", 0o644).unwrap();
        let before: u32 = fs.getattr("/").unwrap().nlink;

        fs.rmdir("/d").unwrap();
        assert_eq!(fs.getattr("/").unwrap().nlink, before - 1);
        assert!(matches!(fs.getattr("/d/sub/f"), Err(VfsError::NoSuchEntry(_))));
    }

    #[test]
    fn test_rmdir_after_rename_decrements_exactly_once() {
        let fs: MemoryFs = MemoryFs::new();
        fs.mkdir("/a", 0o755).unwrap();
        fs.mkdir("/a/sub", 0o755).unwrap();
        fs.mkdir("/b", 0o755).unwrap();
        fs.rename("/a/sub", "/b/sub").unwrap();

        let a_before: u32 = fs.getattr("/a").unwrap().nlink;
        let b_before: u32 = fs.getattr("/b").unwrap().nlink;
        fs.rmdir("/b/sub").unwrap();

        assert_eq!(fs.getattr("/b").unwrap().nlink, b_before - 1);
        assert_eq!(fs.getattr("/a").unwrap().nlink, a_before);
    }

    #[test]
    fn test_rmdir_after_adjusted_rename_restores_counts() {
        let fs: MemoryFs = MemoryFs::with_options(
            MemFsOptions::default().with_rename_link_policy(RenameLinkPolicy::Adjust),
        );
        fs.mkdir("/a", 0o755).unwrap();
        fs.mkdir("/a/sub", 0o755).unwrap();
        fs.mkdir("/b", 0o755).unwrap();
        fs.rename("/a/sub", "/b/sub").unwrap();
        fs.rmdir("/b/sub").unwrap();

        assert_eq!(fs.getattr("/a").unwrap().nlink, 2);
        assert_eq!(fs.getattr("/b").unwrap().nlink, 2);
    }

    #[test]
    fn test_rmdir_missing() {
        let fs: MemoryFs = MemoryFs::new();
        assert!(matches!(fs.rmdir("/d"), Err(VfsError::NoSuchEntry(_))));
        assert_eq!(fs.getattr("/").unwrap().nlink, 2);
    }

    #[test]
    fn test_files_do_not_count_toward_nlink() {
        let fs: MemoryFs = fs_with_file(b"hello");
        assert_eq!(fs.getattr("/d").unwrap().nlink, 2);
        fs.symlink("/d/l", "f").unwrap();
        assert_eq!(fs.getattr("/d").unwrap().nlink, 2);
    }

    #[test]
    fn test_readdir_insertion_order() {
        let fs: MemoryFs = MemoryFs::new();
        fs.create("/a", 0o644).unwrap();
        fs.mkdir("/b", 0o755).unwrap();
        fs.symlink("/c", "a").unwrap();

        assert_eq!(fs.readdir("/").unwrap(), vec![".", "..", "a", "b", "c"]);
    }

    #[test]
    fn test_readdir_after_removal_keeps_order() {
        let fs: MemoryFs = MemoryFs::new();
        for name in ["/c", "/a", "/b"] {
            fs.create(name, 0o644).unwrap();
        }
        fs.unlink("/a").unwrap();
        assert_eq!(fs.readdir("/").unwrap(), vec![".", "..", "c", "b"]);
    }

    #[test]
    fn test_readdir_errors() {
        let fs: MemoryFs = fs_with_file(b"x");
        assert!(matches!(fs.readdir("/nope"), Err(VfsError::NoSuchEntry(_))));
        assert!(matches!(fs.readdir("/d/f"), Err(VfsError::NotADirectory(_))));
    }

    #[test]
    fn test_deep_nesting() {
        let fs: MemoryFs = MemoryFs::new();
        let mut path: String = String::new();
        for depth in 0..32 {
            path.push_str(&format!("/level{}", depth));
            fs.mkdir(&path, 0o755).unwrap();
        }
        path.push_str("/leaf");
        fs.create(&path, 0o644).unwrap();
        fs.write(&path, b"deep", 0).unwrap();
        assert_eq!(fs.read(&path, 4, 0).unwrap(), b"deep");
    }
}

// =============================================================================
// UNLINK TESTS
// =============================================================================

mod unlink {
    use super::*;

    #[test]
    fn test_unlink_file_and_symlink() {
        let fs: MemoryFs = fs_with_file(b"x");
        fs.symlink("/d/l", "f").unwrap();

        fs.unlink("/d/f").unwrap();
        fs.unlink("/d/l").unwrap();
        assert_eq!(fs.readdir("/d").unwrap(), vec![".", ".."]);
    }

    #[test]
    fn test_unlink_missing() {
        let fs: MemoryFs = MemoryFs::new();
        assert!(matches!(fs.unlink("/f"), Err(VfsError::NoSuchEntry(_))));
        assert!(matches!(fs.unlink("/x/f"), Err(VfsError::NoSuchEntry(_))));
    }
}

// =============================================================================
// RENAME TESTS
// =============================================================================

mod rename {
    use super::*;

    #[test]
    fn test_rename_preserves_content() {
        let fs: MemoryFs = fs_with_file(b"content C");
        fs.rename("/d/f", "/g").unwrap();

        assert_eq!(fs.read("/g", 100, 0).unwrap(), b"content C");
        assert!(matches!(fs.getattr("/d/f"), Err(VfsError::NoSuchEntry(_))));
    }

    #[test]
    fn test_rename_keeps_metadata() {
        let fs: MemoryFs = fs_with_file(b"x");
        fs.setxattr("/d/f", "user.tag", b"v").unwrap();
        fs.chmod("/d/f", 0o600).unwrap();

        fs.rename("/d/f", "/d/g").unwrap();
        assert_eq!(fs.getxattr("/d/g", "user.tag").unwrap(), b"v");
        assert_eq!(fs.getattr("/d/g").unwrap().mode, S_IFREG | 0o600);
    }

    #[test]
    fn test_rename_directory_moves_subtree() {
        let fs: MemoryFs = fs_with_file(b"inner");
        fs.mkdir("/e", 0o755).unwrap();

        fs.rename("/d", "/e/d2").unwrap();
        assert_eq!(fs.read("/e/d2/f", 100, 0).unwrap(), b"inner");
        assert!(fs.getattr("/d").is_err());
    }

    #[test]
    fn test_rename_overwrites_destination() {
        let fs: MemoryFs = fs_with_file(b"new");
        fs.create("/old", 0o644).unwrap();
        fs.write("/old", b"old", 0).unwrap();

        fs.rename("/d/f", "/old").unwrap();
        assert_eq!(fs.read("/old", 100, 0).unwrap(), b"new");
    }

    #[test]
    fn test_rename_missing_source() {
        let fs: MemoryFs = MemoryFs::new();
        assert!(matches!(fs.rename("/a", "/b"), Err(VfsError::NoSuchEntry(_))));
    }

    #[test]
    fn test_rename_directory_leaves_link_counts() {
        let fs: MemoryFs = MemoryFs::new();
        fs.mkdir("/a", 0o755).unwrap();
        fs.mkdir("/a/sub", 0o755).unwrap();
        fs.mkdir("/b", 0o755).unwrap();

        fs.rename("/a/sub", "/b/sub").unwrap();
        assert_eq!(fs.getattr("/a").unwrap().nlink, 3);
        assert_eq!(fs.getattr("/b").unwrap().nlink, 2);
    }
}

// =============================================================================
// SYMLINK TESTS
// =============================================================================

mod symlink {
    use super::*;

    #[test]
    fn test_symlink_round_trip() {
        let fs: MemoryFs = MemoryFs::new();
        fs.symlink("/link", "../some/where").unwrap();

        assert_eq!(fs.readlink("/link").unwrap(), "../some/where");
        let attrs: FileAttributes = fs.getattr("/link").unwrap();
        assert_eq!(attrs.mode, S_IFLNK | 0o777);
        assert_eq!(attrs.size, "../some/where".len() as u64);
    }

    #[test]
    fn test_readlink_errors() {
        let fs: MemoryFs = fs_with_file(b"x");
        assert!(matches!(fs.readlink("/missing"), Err(VfsError::NoSuchEntry(_))));
        assert!(matches!(fs.readlink("/d"), Err(VfsError::NoSuchEntry(_))));
    }
}

// =============================================================================
// METADATA TESTS
// =============================================================================

mod metadata {
    use super::*;

    #[test]
    fn test_chmod_keeps_file_type() {
        let fs: MemoryFs = fs_with_file(b"x");
        fs.chmod("/d", 0o700).unwrap();
        fs.chmod("/d/f", S_IFDIR | 0o4755).unwrap();

        assert_eq!(fs.getattr("/d").unwrap().mode, S_IFDIR | 0o700);
        assert_eq!(fs.getattr("/d/f").unwrap().mode, S_IFREG | 0o4755);
    }

    #[test]
    fn test_chown() {
        let fs: MemoryFs = fs_with_file(b"x");
        fs.chown("/d/f", 1000, 100).unwrap();
        let attrs: FileAttributes = fs.getattr("/d/f").unwrap();
        assert_eq!((attrs.uid, attrs.gid), (1000, 100));
    }

    #[test]
    fn test_utimens_explicit() {
        let fs: MemoryFs = fs_with_file(b"x");
        let atime: SystemTime = UNIX_EPOCH + Duration::from_secs(1_000);
        let mtime: SystemTime = UNIX_EPOCH + Duration::from_secs(2_000);

        fs.utimens("/d/f", Some((atime, mtime))).unwrap();
        let attrs: FileAttributes = fs.getattr("/d/f").unwrap();
        assert_eq!(attrs.atime, atime);
        assert_eq!(attrs.mtime, mtime);
    }

    #[test]
    fn test_utimens_defaults_to_now() {
        let fs: MemoryFs = fs_with_file(b"x");
        let old: SystemTime = UNIX_EPOCH + Duration::from_secs(1);
        fs.utimens("/d/f", Some((old, old))).unwrap();

        let before: SystemTime = SystemTime::now();
        fs.utimens("/d/f", None).unwrap();
        let attrs: FileAttributes = fs.getattr("/d/f").unwrap();
        assert!(attrs.atime >= before);
        assert_eq!(attrs.atime, attrs.mtime);
    }

    #[test]
    fn test_metadata_on_missing() {
        let fs: MemoryFs = MemoryFs::new();
        assert!(matches!(fs.chmod("/x", 0o600), Err(VfsError::NoSuchEntry(_))));
        assert!(matches!(fs.chown("/x", 1, 1), Err(VfsError::NoSuchEntry(_))));
        assert!(matches!(fs.utimens("/x", None), Err(VfsError::NoSuchEntry(_))));
    }
}

// =============================================================================
// XATTR TESTS
// =============================================================================

mod xattr {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let fs: MemoryFs = fs_with_file(b"x");
        fs.setxattr("/d/f", "k", b"v\x00binary").unwrap();
        assert_eq!(fs.getxattr("/d/f", "k").unwrap(), b"v\x00binary");

        fs.setxattr("/d/f", "k", b"replaced").unwrap();
        assert_eq!(fs.getxattr("/d/f", "k").unwrap(), b"replaced");
    }

    #[test]
    fn test_get_missing_attribute() {
        let fs: MemoryFs = fs_with_file(b"x");
        let err: VfsError = fs.getxattr("/d/f", "missing").unwrap_err();
        assert!(matches!(err, VfsError::AttributeNotFound { ref name, .. } if name == "missing"));
    }

    #[test]
    fn test_remove_missing_is_silent() {
        let fs: MemoryFs = fs_with_file(b"x");
        fs.removexattr("/d/f", "missing").unwrap();
    }

    #[test]
    fn test_list_and_remove() {
        let fs: MemoryFs = MemoryFs::new();
        fs.setxattr("/", "user.b", b"1").unwrap();
        fs.setxattr("/", "user.a", b"2").unwrap();
        assert_eq!(fs.listxattr("/").unwrap(), vec!["user.b", "user.a"]);

        fs.removexattr("/", "user.b").unwrap();
        assert_eq!(fs.listxattr("/").unwrap(), vec!["user.a"]);
        assert!(fs.getxattr("/", "user.b").is_err());
    }

    #[test]
    fn test_xattrs_on_missing_node() {
        let fs: MemoryFs = MemoryFs::new();
        assert!(matches!(fs.getxattr("/x", "k"), Err(VfsError::NoSuchEntry(_))));
        assert!(matches!(fs.setxattr("/x", "k", b""), Err(VfsError::NoSuchEntry(_))));
        assert!(matches!(fs.listxattr("/x"), Err(VfsError::NoSuchEntry(_))));
    }
}

// =============================================================================
// STATFS / OPEN TESTS
// =============================================================================

mod misc {
    use super::*;

    #[test]
    fn test_statfs_placeholders() {
        let fs: MemoryFs = MemoryFs::new();
        let stat: StatFs = fs.statfs("/anything");
        assert_eq!(stat.bsize, 512);
        assert_eq!(stat.blocks, 4096);
        assert_eq!(stat.bavail, 2048);
    }

    #[test]
    fn test_open_and_create_handles_increase() {
        let fs: MemoryFs = MemoryFs::new();
        let first: u64 = fs.create("/f", 0o644).unwrap();
        let second: u64 = fs.open("/f", 0);
        let third: u64 = fs.create("/g", 0o644).unwrap();
        assert!(first < second && second < third);
    }
}

// =============================================================================
// END-TO-END SCENARIO
// =============================================================================

#[test]
fn test_create_write_read_scenario() {
    let fs: MemoryFs = MemoryFs::new();
    fs.mkdir("/d", 0o755).unwrap();
    fs.create("/d/f", 0o644).unwrap();
    fs.write("/d/f", b"hello", 0).unwrap();

    assert_eq!(fs.read("/d/f", 5, 0).unwrap(), b"hello");
    assert_eq!(fs.getattr("/d/f").unwrap().size, 5);
    assert_eq!(fs.getattr("/d").unwrap().nlink, 2);
}
