//! Filesystem verbs over a [`Store`].
//!
//! [`MemoryFs`] is what a platform front end calls into. Each verb takes a
//! handle returned by [`MemoryFs::create_file`], resolves the handle's path
//! in the store and performs the operation on the node it finds there.
//!
//! # Directory promotion
//!
//! Opening an existing directory without asking for one turns the handle
//! into a directory handle. The node itself is never converted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use memfs_core::{
    FileAttributes, FileNode, FileTimes, FsError, FsResult, NodeKind, SecurityDescriptor, Store,
    path,
};
use tracing::{debug, info, instrument, trace};

use crate::config::MountConfig;
use crate::handles::{OpenContext, OpenTable};
use crate::path::normalize_path;
use crate::request::{
    CreateDisposition, CreateOutcome, CreateRequest, DiskFreeSpace, FILE_CASE_PRESERVED_NAMES,
    FILE_PERSISTENT_ACLS, FILE_READ_ONLY_VOLUME, FILE_UNICODE_ON_DISK, FileInformation, FindData,
    MAX_PATH, VolumeInformation, WriteMode,
};
use crate::status::NtStatus;

fn log_failure(verb: &'static str, e: &FsError) {
    debug!(verb, status = %NtStatus::from(e), error = %e, "Operation failed");
}

/// An in-memory volume exposed through filesystem verbs.
#[derive(Debug)]
pub struct MemoryFs {
    store: Arc<Store>,
    handles: OpenTable,
    config: MountConfig,
    mounted: AtomicBool,
}

impl MemoryFs {
    /// Creates an empty volume.
    pub fn new(config: MountConfig) -> Self {
        Self::with_store(Arc::new(Store::new()), config)
    }

    /// Wraps an existing store.
    pub fn with_store(store: Arc<Store>, config: MountConfig) -> Self {
        Self {
            store,
            handles: OpenTable::new(),
            config,
            mounted: AtomicBool::new(false),
        }
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// The volume configuration.
    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    /// Number of handles not yet closed.
    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    /// Returns a copy of the context behind `handle`.
    pub fn context(&self, handle: u64) -> FsResult<OpenContext> {
        self.handles
            .get(handle)
            .map(|ctx| ctx.value().clone())
            .ok_or(FsError::InvalidHandle(handle))
    }

    fn resolve(&self, handle: u64) -> FsResult<(OpenContext, Arc<FileNode>)> {
        let ctx = self.context(handle)?;
        match self.store.find(&ctx.path) {
            Some(node) => Ok((ctx, node)),
            None => Err(FsError::NotFound(ctx.path)),
        }
    }

    fn ensure_writable(&self, path: &str) -> FsResult<()> {
        if self.config.read_only {
            return Err(FsError::AccessDenied(path.to_string()));
        }
        Ok(())
    }

    /// Descriptor for a new node: the requested one, else the parent's.
    fn security_for_new(&self, path: &str, requested: Option<&SecurityDescriptor>) -> Option<SecurityDescriptor> {
        if let Some(sd) = requested {
            return Some(sd.clone());
        }
        path::parent(path)
            .and_then(|parent| self.store.find(parent))
            .and_then(|parent| parent.security())
    }

    // ------------------------------------------------------------------
    // Create / cleanup / close
    // ------------------------------------------------------------------

    /// Opens or creates `raw_path` according to `request`.
    #[instrument(level = "debug", name = "CreateFile", skip(self, request), fields(disposition = ?request.disposition, directory = request.directory))]
    pub fn create_file(&self, raw_path: &str, request: &CreateRequest) -> FsResult<CreateOutcome> {
        let path = normalize_path(raw_path);
        let result = {
            let _structure = self.store.lock();
            self.open_or_create(&path, request)
        };
        let (is_directory, existed) = result.inspect_err(|e| log_failure("CreateFile", e))?;

        let handle = self.handles.insert(OpenContext::new(
            path.clone(),
            is_directory,
            request.delete_on_close,
        ));
        debug!(path = %path, handle, is_directory, existed, "Opened");
        Ok(CreateOutcome {
            handle,
            is_directory,
            existed,
            disposition: request.disposition,
        })
    }

    /// Returns `(is_directory, existed)`. Runs under the structural lock.
    fn open_or_create(&self, path: &str, request: &CreateRequest) -> FsResult<(bool, bool)> {
        if request.delete_on_close {
            self.ensure_writable(path)?;
        }
        let existing = self.store.find(path);
        let disposition = request.disposition;

        let mut is_directory = request.directory;
        if let Some(node) = &existing
            && node.is_directory()
        {
            if request.non_directory {
                return Err(FsError::IsADirectory(path.to_string()));
            }
            is_directory = true;
        }

        if is_directory {
            return match (&existing, disposition) {
                (Some(_), CreateDisposition::CreateNew) => Err(FsError::NameCollision(path.to_string())),
                (Some(node), _) if !node.is_directory() => {
                    Err(FsError::NotADirectory(path.to_string()))
                }
                (Some(_), _) => Ok((true, true)),
                (None, CreateDisposition::CreateNew | CreateDisposition::OpenAlways) => {
                    self.ensure_writable(path)?;
                    let node = FileNode::new(
                        path,
                        NodeKind::Directory,
                        request.attributes.normalized(),
                        self.security_for_new(path, request.security.as_ref()),
                    );
                    self.store.add(Arc::new(node))?;
                    Ok((true, false))
                }
                (None, _) => Err(FsError::NotFound(path.to_string())),
            };
        }

        if let Some(node) = &existing {
            let current = node.attributes();
            let hides = (current.is_hidden() && !request.attributes.is_hidden())
                || (current.is_system() && !request.attributes.is_system());
            if hides && disposition.overwrites() {
                return Err(FsError::AccessDenied(path.to_string()));
            }
        }

        let read_only = existing
            .as_ref()
            .is_some_and(|node| node.attributes().is_read_only())
            || request.attributes.is_read_only();
        if read_only && request.delete_on_close {
            return Err(FsError::CannotDelete(path.to_string()));
        }

        let create_new = || -> FsResult<()> {
            self.ensure_writable(path)?;
            let node = FileNode::new(
                path,
                NodeKind::File,
                request.attributes.for_new_file(),
                self.security_for_new(path, request.security.as_ref()),
            );
            self.store.add(Arc::new(node))
        };

        let existed = existing.is_some();
        match disposition {
            CreateDisposition::CreateAlways => create_new()?,
            CreateDisposition::CreateNew => {
                if existed {
                    return Err(FsError::NameCollision(path.to_string()));
                }
                create_new()?;
            }
            CreateDisposition::OpenAlways => {
                if !existed {
                    create_new()?;
                }
            }
            CreateDisposition::OpenExisting => {
                if !existed {
                    return Err(FsError::NotFound(path.to_string()));
                }
            }
            CreateDisposition::TruncateExisting => {
                let Some(node) = &existing else {
                    return Err(FsError::NotFound(path.to_string()));
                };
                self.ensure_writable(path)?;
                node.set_end_of_file(0)?;
                node.touch_write();
            }
        }
        Ok((false, existed))
    }

    /// Last call for a handle before close. Deletes the node if the handle
    /// was marked delete-on-close.
    #[instrument(level = "trace", name = "Cleanup", skip(self))]
    pub fn cleanup(&self, handle: u64) -> FsResult<()> {
        let ctx = self
            .context(handle)
            .inspect_err(|e| log_failure("Cleanup", e))?;
        if ctx.delete_on_close {
            self.ensure_writable(&ctx.path)
                .inspect_err(|e| log_failure("Cleanup", e))?;
            let removed = self.store.remove(&ctx.path);
            debug!(path = %ctx.path, removed, "Deleted on close");
        }
        Ok(())
    }

    /// Releases a handle.
    #[instrument(level = "trace", name = "CloseFile", skip(self))]
    pub fn close_file(&self, handle: u64) -> FsResult<()> {
        match self.handles.remove(handle) {
            Some(ctx) => {
                trace!(path = %ctx.path, "Closed");
                Ok(())
            }
            None => {
                let e = FsError::InvalidHandle(handle);
                log_failure("CloseFile", &e);
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Reads up to `len` bytes at `offset`.
    #[instrument(level = "trace", name = "ReadFile", skip(self))]
    pub fn read_file(&self, handle: u64, offset: u64, len: usize) -> FsResult<Vec<u8>> {
        let (ctx, node) = self.resolve(handle).inspect_err(|e| log_failure("ReadFile", e))?;
        if node.is_directory() {
            let e = FsError::IsADirectory(ctx.path);
            log_failure("ReadFile", &e);
            return Err(e);
        }
        let data = node.read(offset, len);
        node.touch_access();
        Ok(data)
    }

    /// Writes `data` at `offset` (or at the end, for appends).
    #[instrument(level = "trace", name = "WriteFile", skip(self, data), fields(len = data.len()))]
    pub fn write_file(&self, handle: u64, offset: u64, data: &[u8], mode: WriteMode) -> FsResult<usize> {
        self.write_inner(handle, offset, data, mode)
            .inspect_err(|e| log_failure("WriteFile", e))
    }

    fn write_inner(&self, handle: u64, offset: u64, data: &[u8], mode: WriteMode) -> FsResult<usize> {
        let (ctx, node) = self.resolve(handle)?;
        self.ensure_writable(&ctx.path)?;
        let written = if mode.write_to_eof {
            // Paging I/O can never extend the file, so an append writes nothing.
            if mode.paging_io {
                0
            } else {
                node.append(data)?;
                data.len()
            }
        } else {
            node.write(offset, data, mode.paging_io)?
        };
        node.touch_write();
        Ok(written)
    }

    /// Nothing to flush for an in-memory volume; only validates the handle.
    pub fn flush_file_buffers(&self, handle: u64) -> FsResult<()> {
        self.resolve(handle)
            .map(|_| ())
            .inspect_err(|e| log_failure("FlushFileBuffers", e))
    }

    /// Resizes the file to exactly `len` bytes.
    #[instrument(level = "trace", name = "SetEndOfFile", skip(self))]
    pub fn set_end_of_file(&self, handle: u64, len: u64) -> FsResult<()> {
        self.resize(handle, len)
            .inspect_err(|e| log_failure("SetEndOfFile", e))
    }

    /// Allocation requests resize the content the same way as end-of-file.
    #[instrument(level = "trace", name = "SetAllocationSize", skip(self))]
    pub fn set_allocation_size(&self, handle: u64, len: u64) -> FsResult<()> {
        self.resize(handle, len)
            .inspect_err(|e| log_failure("SetAllocationSize", e))
    }

    fn resize(&self, handle: u64, len: u64) -> FsResult<()> {
        let (ctx, node) = self.resolve(handle)?;
        self.ensure_writable(&ctx.path)?;
        node.set_end_of_file(len)?;
        node.touch_write();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    /// Attributes, times, size and identity of the handle's node.
    pub fn get_file_information(&self, handle: u64) -> FsResult<FileInformation> {
        let (_, node) = self
            .resolve(handle)
            .inspect_err(|e| log_failure("GetFileInformation", e))?;
        Ok(FileInformation {
            attributes: node.attributes(),
            times: node.times(),
            size: node.size(),
            file_index: node.identity(),
            number_of_links: 1,
            volume_serial_number: self.config.serial_number,
        })
    }

    /// Replaces the attribute bits. Zero leaves them unchanged.
    #[instrument(level = "trace", name = "SetFileAttributes", skip(self))]
    pub fn set_file_attributes(&self, handle: u64, attributes: FileAttributes) -> FsResult<()> {
        let (ctx, node) = self
            .resolve(handle)
            .inspect_err(|e| log_failure("SetFileAttributes", e))?;
        self.ensure_writable(&ctx.path)?;
        if attributes.is_empty() {
            return Ok(());
        }
        node.set_attributes(attributes);
        Ok(())
    }

    /// Applies every non-empty timestamp in `times`.
    pub fn set_file_time(&self, handle: u64, times: FileTimes) -> FsResult<()> {
        let (ctx, node) = self
            .resolve(handle)
            .inspect_err(|e| log_failure("SetFileTime", e))?;
        self.ensure_writable(&ctx.path)?;
        node.set_times(times);
        Ok(())
    }

    /// Returns the node's security descriptor.
    pub fn get_file_security(&self, handle: u64) -> FsResult<SecurityDescriptor> {
        let (_, node) = self
            .resolve(handle)
            .inspect_err(|e| log_failure("GetFileSecurity", e))?;
        node.security()
            .ok_or(FsError::Unsupported("node has no security descriptor"))
    }

    /// Replaces the node's security descriptor.
    pub fn set_file_security(&self, handle: u64, security: SecurityDescriptor) -> FsResult<()> {
        let (ctx, node) = self
            .resolve(handle)
            .inspect_err(|e| log_failure("SetFileSecurity", e))?;
        self.ensure_writable(&ctx.path)?;
        node.set_security(Some(security));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Enumeration
    // ------------------------------------------------------------------

    /// Lists the children of a directory handle.
    ///
    /// Entries come back in store order; names longer than [`MAX_PATH`]
    /// are skipped.
    #[instrument(level = "trace", name = "FindFiles", skip(self))]
    pub fn find_files(&self, handle: u64) -> FsResult<Vec<FindData>> {
        let (ctx, node) = self
            .resolve(handle)
            .inspect_err(|e| log_failure("FindFiles", e))?;
        if !node.is_directory() {
            let e = FsError::NotADirectory(ctx.path);
            log_failure("FindFiles", &e);
            return Err(e);
        }
        let entries = self
            .store
            .list_folder(&ctx.path)
            .iter()
            .map(|child| FindData::from_node(child))
            .filter(|entry| {
                let keep = entry.file_name.chars().count() <= MAX_PATH;
                if !keep {
                    trace!(name = %entry.file_name, "Skipping over-long name");
                }
                keep
            })
            .collect();
        node.touch_access();
        Ok(entries)
    }

    /// Pattern matching is left to the front end, which falls back to
    /// [`find_files`](Self::find_files).
    pub fn find_files_with_pattern(&self, _handle: u64, _pattern: &str) -> FsResult<Vec<FindData>> {
        Err(FsError::Unsupported("find_files_with_pattern"))
    }

    /// Alternate data streams are not supported.
    pub fn find_streams(&self, _handle: u64) -> FsResult<Vec<FindData>> {
        Err(FsError::Unsupported("find_streams"))
    }

    // ------------------------------------------------------------------
    // Delete / move
    // ------------------------------------------------------------------

    /// Checks that a file may be deleted and marks the handle
    /// delete-on-close. The node goes away at cleanup.
    #[instrument(level = "debug", name = "DeleteFile", skip(self))]
    pub fn delete_file(&self, handle: u64) -> FsResult<()> {
        self.delete_file_inner(handle)
            .inspect_err(|e| log_failure("DeleteFile", e))
    }

    fn delete_file_inner(&self, handle: u64) -> FsResult<()> {
        let (ctx, node) = self.resolve(handle)?;
        self.ensure_writable(&ctx.path)?;
        if node.is_directory() {
            return Err(FsError::AccessDenied(ctx.path));
        }
        if node.attributes().is_read_only() {
            return Err(FsError::CannotDelete(ctx.path));
        }
        self.mark_delete_on_close(handle);
        Ok(())
    }

    /// Checks that a directory is empty and marks the handle
    /// delete-on-close.
    #[instrument(level = "debug", name = "DeleteDirectory", skip(self))]
    pub fn delete_directory(&self, handle: u64) -> FsResult<()> {
        self.delete_directory_inner(handle)
            .inspect_err(|e| log_failure("DeleteDirectory", e))
    }

    fn delete_directory_inner(&self, handle: u64) -> FsResult<()> {
        let (ctx, node) = self.resolve(handle)?;
        self.ensure_writable(&ctx.path)?;
        if !node.is_directory() {
            return Err(FsError::NotADirectory(ctx.path));
        }
        if path::is_root(&ctx.path) {
            return Err(FsError::AccessDenied(ctx.path));
        }
        if !self.store.list_folder(&ctx.path).is_empty() {
            return Err(FsError::DirectoryNotEmpty(ctx.path));
        }
        self.mark_delete_on_close(handle);
        Ok(())
    }

    fn mark_delete_on_close(&self, handle: u64) {
        if let Some(mut ctx) = self.handles.get_mut(handle) {
            ctx.delete_on_close = true;
        }
    }

    /// Renames the handle's node to `new_raw_path`.
    ///
    /// Open handles on the moved node or anything below it follow it to
    /// the new location.
    #[instrument(level = "debug", name = "MoveFile", skip(self))]
    pub fn move_file(&self, handle: u64, new_raw_path: &str, replace_existing: bool) -> FsResult<()> {
        self.move_inner(handle, new_raw_path, replace_existing)
            .inspect_err(|e| log_failure("MoveFile", e))
    }

    fn move_inner(&self, handle: u64, new_raw_path: &str, replace_existing: bool) -> FsResult<()> {
        let new_path = normalize_path(new_raw_path);
        // Held until every handle points at the new location.
        let _structure = self.store.lock();
        let ctx = self.context(handle)?;
        self.ensure_writable(&ctx.path)?;
        self.store
            .move_node(&ctx.path, &new_path, replace_existing)?;

        let old_path = ctx.path;
        self.handles.for_each_mut(|_, open| {
            if open.path == old_path {
                open.path.clone_from(&new_path);
            } else if path::is_descendant(&open.path, &old_path) {
                open.path = format!("{new_path}{}", &open.path[old_path.len()..]);
            }
        });
        debug!(from = %old_path, to = %new_path, "Moved");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Locking
    // ------------------------------------------------------------------

    /// Byte-range locks are not supported.
    pub fn lock_file(&self, _handle: u64, _offset: u64, _len: u64) -> FsResult<()> {
        Err(FsError::Unsupported("lock_file"))
    }

    /// Byte-range locks are not supported.
    pub fn unlock_file(&self, _handle: u64, _offset: u64, _len: u64) -> FsResult<()> {
        Err(FsError::Unsupported("unlock_file"))
    }

    // ------------------------------------------------------------------
    // Volume
    // ------------------------------------------------------------------

    /// Capacity figures: configured total minus bytes held by files.
    pub fn get_disk_free_space(&self) -> DiskFreeSpace {
        let used = self.store.stats().bytes;
        let free = self.config.total_bytes.saturating_sub(used);
        DiskFreeSpace {
            free_bytes_available: free,
            total_bytes: self.config.total_bytes,
            total_free_bytes: free,
        }
    }

    /// Volume label, serial, limits and capability flags.
    pub fn get_volume_information(&self) -> VolumeInformation {
        let mut flags = FILE_CASE_PRESERVED_NAMES | FILE_UNICODE_ON_DISK | FILE_PERSISTENT_ACLS;
        if self.config.read_only {
            flags |= FILE_READ_ONLY_VOLUME;
        }
        VolumeInformation {
            volume_name: self.config.volume_name.clone(),
            serial_number: self.config.serial_number,
            max_component_length: self.config.max_component_length,
            file_system_flags: flags,
            file_system_name: self.config.file_system_name.clone(),
        }
    }

    /// Called by the front end once the volume is visible.
    pub fn mounted(&self) -> FsResult<()> {
        self.mounted.store(true, Ordering::Release);
        info!(
            volume = %self.config.volume_name,
            mount_point = %self.config.mount_point,
            "Mounted"
        );
        Ok(())
    }

    /// Called by the front end after the volume is gone. Drops every
    /// remaining handle.
    pub fn unmounted(&self) -> FsResult<()> {
        self.mounted.store(false, Ordering::Release);
        let dropped = self.handles.len();
        self.handles.clear();
        info!(volume = %self.config.volume_name, dropped_handles = dropped, "Unmounted");
        Ok(())
    }

    /// Returns true between `mounted` and `unmounted`.
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }
}
