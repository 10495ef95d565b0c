//! A mounted in-memory volume plus RAII handles over its verbs.

use std::io;

use anyhow::{Context, Result};
use tracing::debug;

use memfs_core::path;
use memfs_mount::{
    CreateDisposition, CreateOutcome, CreateRequest, MemoryFs, MountConfig, fs_error_to_io,
    normalize_path,
};

/// One volume for the lifetime of a `run` or `shell` invocation.
pub struct Session {
    fs: MemoryFs,
}

impl Session {
    pub fn new(config: MountConfig) -> Result<Self> {
        let fs = MemoryFs::new(config);
        fs.mounted().context("Failed to mount volume")?;
        Ok(Self { fs })
    }

    pub fn fs(&self) -> &MemoryFs {
        &self.fs
    }

    /// Opens `path` and returns a handle that is cleaned up and closed on drop.
    pub fn open(&self, path: &str, request: &CreateRequest) -> Result<OpenFile<'_>> {
        let outcome = self
            .fs
            .create_file(path, request)
            .with_context(|| format!("Cannot open {path}"))?;
        Ok(OpenFile {
            fs: &self.fs,
            outcome,
            position: 0,
        })
    }

    /// Opens an existing file or directory.
    pub fn open_existing(&self, path: &str) -> Result<OpenFile<'_>> {
        self.open(path, &CreateRequest::file(CreateDisposition::OpenExisting))
    }

    /// Opens an existing directory, failing on files.
    pub fn open_directory(&self, path: &str) -> Result<OpenFile<'_>> {
        self.open(path, &CreateRequest::directory(CreateDisposition::OpenExisting))
    }

    /// Store path of a child entry.
    pub fn child_path(dir: &str, name: &str) -> String {
        path::join(&normalize_path(dir), name)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.fs.unmounted() {
            debug!(error = %e, "Unmount failed");
        }
    }
}

/// An open handle. Runs cleanup and close when dropped.
///
/// Reads through [`io::Read`] advance a cursor starting at offset 0.
pub struct OpenFile<'a> {
    fs: &'a MemoryFs,
    outcome: CreateOutcome,
    position: u64,
}

impl OpenFile<'_> {
    pub fn handle(&self) -> u64 {
        self.outcome.handle
    }

    pub fn is_directory(&self) -> bool {
        self.outcome.is_directory
    }

    pub fn existed(&self) -> bool {
        self.outcome.existed
    }
}

impl io::Read for OpenFile<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self
            .fs
            .read_file(self.outcome.handle, self.position, buf.len())
            .map_err(fs_error_to_io)?;
        buf[..data.len()].copy_from_slice(&data);
        self.position += data.len() as u64;
        Ok(data.len())
    }
}

impl Drop for OpenFile<'_> {
    fn drop(&mut self) {
        let handle = self.outcome.handle;
        if let Err(e) = self.fs.cleanup(handle) {
            debug!(handle, error = %e, "Cleanup failed");
        }
        if let Err(e) = self.fs.close_file(handle) {
            debug!(handle, error = %e, "Close failed");
        }
    }
}
