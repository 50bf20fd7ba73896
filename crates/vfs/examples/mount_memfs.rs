//! Example: Mount an empty in-memory filesystem.
//!
//! Usage:
//!   cargo run -p memfs-vfs --features fuse --example mount_memfs -- <mountpoint> [options]
//!
//! The filesystem runs in the foreground until it is unmounted
//! (e.g. `fusermount -u <mountpoint>`). Set `RUST_LOG=memfs_vfs=debug` to see
//! every operation.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use memfs_vfs::{mount, MemFsOptions, MemoryFs, RenameLinkPolicy, RmdirPolicy};
use tracing_subscriber::EnvFilter;

/// CLI arguments for the mount_memfs example.
#[derive(Debug, Parser)]
#[command(about = "Mount an in-memory filesystem")]
struct CliArgs {
    /// Directory to mount on.
    mountpoint: PathBuf,

    /// Refuse to remove directories that still have entries.
    #[arg(long)]
    require_empty_rmdir: bool,

    /// Move subdirectory link counts between parents on rename.
    #[arg(long)]
    adjust_rename_links: bool,
}

impl CliArgs {
    /// Build filesystem options from the arguments.
    fn options(&self) -> MemFsOptions {
        // SAFETY: getuid/getgid have no preconditions and cannot fail.
        let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
        let mut options: MemFsOptions = MemFsOptions::default().with_owner(uid, gid);
        if self.require_empty_rmdir {
            options = options.with_rmdir_policy(RmdirPolicy::RequireEmpty);
        }
        if self.adjust_rename_links {
            options = options.with_rename_link_policy(RenameLinkPolicy::Adjust);
        }
        options
    }
}

fn main() -> ExitCode {
    let args: CliArgs = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let fs: MemoryFs = MemoryFs::with_options(args.options());
    match mount(fs, &args.mountpoint) {
        Ok(()) => {
            tracing::info!("unmounted {}", args.mountpoint.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
