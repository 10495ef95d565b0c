//! Test harness for adapter integration tests.
//!
//! Provides `TestVolume`, a `MemoryFs` wrapper with shortcuts for the
//! create/write/read/close sequences most tests need.

// Not all tests use every helper
#![allow(dead_code)]

use memfs_core::{FsError, FsResult};
use memfs_mount::{
    CreateDisposition, CreateOutcome, CreateRequest, MemoryFs, MountConfig, WriteMode,
};

/// A fresh in-memory volume.
pub struct TestVolume {
    pub fs: MemoryFs,
}

impl TestVolume {
    pub fn new() -> Self {
        Self::with_config(MountConfig::default())
    }

    pub fn with_config(config: MountConfig) -> Self {
        Self {
            fs: MemoryFs::new(config),
        }
    }

    pub fn open(&self, path: &str, request: &CreateRequest) -> FsResult<CreateOutcome> {
        self.fs.create_file(path, request)
    }

    /// Opens, runs cleanup and closes, returning the outcome.
    pub fn touch(&self, path: &str, request: &CreateRequest) -> FsResult<CreateOutcome> {
        let out = self.fs.create_file(path, request)?;
        self.release(out.handle);
        Ok(out)
    }

    pub fn mkdir(&self, path: &str) {
        self.touch(path, &CreateRequest::directory(CreateDisposition::CreateNew))
            .unwrap_or_else(|e| panic!("mkdir {path}: {e}"));
    }

    pub fn write(&self, path: &str, data: &[u8]) {
        let out = self
            .open(path, &CreateRequest::file(CreateDisposition::CreateAlways))
            .unwrap_or_else(|e| panic!("create {path}: {e}"));
        let written = self
            .fs
            .write_file(out.handle, 0, data, WriteMode::NORMAL)
            .unwrap_or_else(|e| panic!("write {path}: {e}"));
        assert_eq!(written, data.len());
        self.release(out.handle);
    }

    pub fn read(&self, path: &str) -> FsResult<Vec<u8>> {
        let out = self.open(path, &CreateRequest::file(CreateDisposition::OpenExisting))?;
        let size = self.fs.get_file_information(out.handle)?.size;
        let len = usize::try_from(size).expect("size fits usize");
        let data = self.fs.read_file(out.handle, 0, len);
        self.release(out.handle);
        data
    }

    /// Marks `path` for deletion and releases the handle.
    pub fn delete(&self, path: &str) -> FsResult<()> {
        let out = self.open(path, &CreateRequest::file(CreateDisposition::OpenExisting))?;
        let marked = if out.is_directory {
            self.fs.delete_directory(out.handle)
        } else {
            self.fs.delete_file(out.handle)
        };
        self.release(out.handle);
        marked
    }

    pub fn names(&self, dir: &str) -> Vec<String> {
        let out = self
            .open(dir, &CreateRequest::directory(CreateDisposition::OpenExisting))
            .unwrap_or_else(|e| panic!("open {dir}: {e}"));
        let mut names: Vec<String> = self
            .fs
            .find_files(out.handle)
            .unwrap_or_else(|e| panic!("list {dir}: {e}"))
            .into_iter()
            .map(|entry| entry.file_name)
            .collect();
        self.release(out.handle);
        names.sort();
        names
    }

    pub fn exists(&self, path: &str) -> bool {
        self.fs.store().contains(path)
    }

    pub fn release(&self, handle: u64) {
        self.fs.cleanup(handle).expect("cleanup");
        self.fs.close_file(handle).expect("close");
    }

    pub fn assert_consistent(&self) {
        self.fs
            .store()
            .check_consistency()
            .unwrap_or_else(|e| panic!("store inconsistent: {e}"));
    }
}

/// Asserts that `result` failed with the variant selected by `matcher`.
#[track_caller]
pub fn assert_err<T: std::fmt::Debug>(result: FsResult<T>, matcher: fn(&FsError) -> bool) {
    match result {
        Err(ref e) if matcher(e) => {}
        other => panic!("unexpected result: {other:?}"),
    }
}
