//! Filesystem verb adapter for the memfs in-memory volume.
//!
//! This crate sits between a platform front end (a Dokan-style dispatcher)
//! and the [`memfs_core::Store`]. It turns create/open requests, handle
//! based I/O and volume queries into store operations and maps every
//! failure to a platform status.
//!
//! # Components
//!
//! - [`MemoryFs`] - the verbs: create, read, write, enumerate, move, delete
//! - [`HandleTable`] / [`OpenContext`] - per-handle state keyed by id
//! - [`normalize_path`] - platform path spelling to store path
//! - [`NtStatus`] / [`ToNtStatus`] - error to status mapping
//! - [`MountConfig`] - volume label, capacity and front-end options
//!
//! # Handles
//!
//! A handle remembers the path it was opened on, never the node. Every verb
//! resolves the path again, so a handle whose node was removed or replaced
//! sees the current state of the store. Renames issued through any handle
//! carry every open handle on the moved subtree along.
//!
//! # Example
//!
//! ```
//! use memfs_mount::{CreateDisposition, CreateRequest, MemoryFs, MountConfig, WriteMode};
//!
//! let fs = MemoryFs::new(MountConfig::default());
//! let out = fs
//!     .create_file(r"\notes.txt", &CreateRequest::file(CreateDisposition::CreateNew))
//!     .unwrap();
//! fs.write_file(out.handle, 0, b"hello", WriteMode::NORMAL).unwrap();
//! assert_eq!(fs.read_file(out.handle, 0, 16).unwrap(), b"hello");
//! fs.cleanup(out.handle).unwrap();
//! fs.close_file(out.handle).unwrap();
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod filesystem;
pub mod handles;
pub mod path;
pub mod request;
pub mod status;

pub use config::{ConfigError, MountConfig};
pub use filesystem::MemoryFs;
pub use handles::{HandleTable, OpenContext, OpenTable};
pub use path::normalize_path;
pub use request::{
    CreateDisposition, CreateOutcome, CreateRequest, DiskFreeSpace, FileInformation, FindData,
    VolumeInformation, WriteMode,
};
pub use status::{NtStatus, ToNtStatus, fs_error_to_io};
