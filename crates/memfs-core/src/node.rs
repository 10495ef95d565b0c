//! A single file or directory held by the store.
//!
//! Every mutable field has its own synchronisation so that content I/O on
//! one node never contends with renames, metadata updates or structural
//! changes elsewhere:
//!
//! | field       | guard                          |
//! |-------------|--------------------------------|
//! | name        | name mutex                     |
//! | content     | content mutex                  |
//! | security    | security mutex                 |
//! | attributes  | `AtomicU32`                    |
//! | times       | one `AtomicU64` per timestamp  |
//! | identity    | `AtomicU64`, written once      |

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::attributes::FileAttributes;
use crate::content::FileContent;
use crate::error::{FsError, FsResult};
use crate::security::SecurityDescriptor;
use crate::times::{FileTime, FileTimes};

/// Identity value meaning "not yet assigned by the store".
pub const UNASSIGNED_ID: u64 = 0;

/// Whether a node is a file or a directory. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Directory,
}

impl NodeKind {
    #[inline]
    pub fn is_directory(self) -> bool {
        matches!(self, NodeKind::Directory)
    }
}

/// A file or directory node.
pub struct FileNode {
    name: Mutex<String>,
    kind: NodeKind,
    attributes: AtomicU32,
    creation: AtomicU64,
    last_access: AtomicU64,
    last_write: AtomicU64,
    content: Mutex<FileContent>,
    security: Mutex<Option<SecurityDescriptor>>,
    identity: AtomicU64,
}

impl FileNode {
    /// Creates a detached node with all timestamps set to now.
    ///
    /// The DIRECTORY attribute bit is forced to agree with `kind`.
    pub fn new(
        name: impl Into<String>,
        kind: NodeKind,
        attributes: FileAttributes,
        security: Option<SecurityDescriptor>,
    ) -> Self {
        let now = FileTime::now().ticks();
        Self {
            name: Mutex::new(name.into()),
            kind,
            attributes: AtomicU32::new(Self::coerce_attributes(kind, attributes).bits()),
            creation: AtomicU64::new(now),
            last_access: AtomicU64::new(now),
            last_write: AtomicU64::new(now),
            content: Mutex::new(FileContent::new()),
            security: Mutex::new(security),
            identity: AtomicU64::new(UNASSIGNED_ID),
        }
    }

    /// A file node with ARCHIVE attributes and no security descriptor.
    pub fn new_file(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::File, FileAttributes::ARCHIVE, None)
    }

    /// A directory node with no security descriptor.
    pub fn new_directory(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Directory, FileAttributes::DIRECTORY, None)
    }

    fn coerce_attributes(kind: NodeKind, attributes: FileAttributes) -> FileAttributes {
        let attributes = match kind {
            NodeKind::Directory => attributes | FileAttributes::DIRECTORY,
            NodeKind::File => attributes - FileAttributes::DIRECTORY,
        };
        attributes.normalized()
    }

    // ------------------------------------------------------------------
    // Identity, kind and name
    // ------------------------------------------------------------------

    /// The node's identity, or [`UNASSIGNED_ID`] before first insertion.
    #[inline]
    pub fn identity(&self) -> u64 {
        self.identity.load(Ordering::Acquire)
    }

    /// Sets the identity if it is still unassigned. Returns the final value.
    pub(crate) fn assign_identity(&self, id: u64) -> u64 {
        match self
            .identity
            .compare_exchange(UNASSIGNED_ID, id, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => id,
            Err(existing) => existing,
        }
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    pub fn is_directory(&self) -> bool {
        self.kind.is_directory()
    }

    /// Snapshot of the full path.
    pub fn name(&self) -> String {
        self.name.lock().clone()
    }

    /// Replaces the full path. Only the store calls this, under its
    /// structural lock, so the indices and the name never disagree.
    pub(crate) fn rename(&self, new_name: impl Into<String>) {
        *self.name.lock() = new_name.into();
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Reads up to `len` bytes at `offset`. Empty past the end.
    pub fn read(&self, offset: u64, len: usize) -> Vec<u8> {
        self.content.lock().read(offset, len).to_vec()
    }

    /// Writes `data` at `offset`.
    ///
    /// With `paging_io` the file size never changes; otherwise the file
    /// grows to cover the write. Returns the number of bytes written.
    pub fn write(&self, offset: u64, data: &[u8], paging_io: bool) -> FsResult<usize> {
        if self.is_directory() {
            return Err(FsError::IsADirectory(self.name()));
        }
        let mut content = self.content.lock();
        if paging_io {
            Ok(content.write_paging(offset, data))
        } else {
            content.write(offset, data)
        }
    }

    /// Appends `data` at the current end, atomically with respect to other
    /// writers. Returns the offset the data landed at.
    pub fn append(&self, data: &[u8]) -> FsResult<u64> {
        if self.is_directory() {
            return Err(FsError::IsADirectory(self.name()));
        }
        let mut content = self.content.lock();
        let offset = content.len();
        content.write(offset, data)?;
        Ok(offset)
    }

    /// Resizes the content to exactly `len` bytes, zero-padding on growth.
    pub fn set_end_of_file(&self, len: u64) -> FsResult<()> {
        if self.is_directory() {
            return Err(FsError::IsADirectory(self.name()));
        }
        self.content.lock().set_len(len)
    }

    /// Current content length.
    pub fn size(&self) -> u64 {
        self.content.lock().len()
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    pub fn attributes(&self) -> FileAttributes {
        FileAttributes::from_raw(self.attributes.load(Ordering::Acquire))
    }

    /// Stores `attributes` after applying the NORMAL rule. The DIRECTORY bit
    /// always follows the node kind.
    pub fn set_attributes(&self, attributes: FileAttributes) {
        let attributes = Self::coerce_attributes(self.kind, attributes);
        self.attributes.store(attributes.bits(), Ordering::Release);
    }

    pub fn times(&self) -> FileTimes {
        FileTimes {
            creation: FileTime::from_ticks(self.creation.load(Ordering::Acquire)),
            last_access: FileTime::from_ticks(self.last_access.load(Ordering::Acquire)),
            last_write: FileTime::from_ticks(self.last_write.load(Ordering::Acquire)),
        }
    }

    /// Applies each non-empty timestamp in `times`; empty ones are ignored.
    pub fn set_times(&self, times: FileTimes) {
        store_if_set(&self.creation, times.creation);
        store_if_set(&self.last_access, times.last_access);
        store_if_set(&self.last_write, times.last_write);
    }

    /// Sets last-access to now.
    pub fn touch_access(&self) {
        self.last_access
            .store(FileTime::now().ticks(), Ordering::Release);
    }

    /// Sets last-write (and last-access) to now.
    pub fn touch_write(&self) {
        let now = FileTime::now().ticks();
        self.last_write.store(now, Ordering::Release);
        self.last_access.store(now, Ordering::Release);
    }

    pub fn security(&self) -> Option<SecurityDescriptor> {
        self.security.lock().clone()
    }

    pub fn set_security(&self, security: Option<SecurityDescriptor>) {
        *self.security.lock() = security;
    }
}

fn store_if_set(slot: &AtomicU64, time: FileTime) {
    if !time.is_empty() {
        slot.store(time.ticks(), Ordering::Release);
    }
}

impl fmt::Debug for FileNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileNode")
            .field("name", &self.name())
            .field("kind", &self.kind)
            .field("identity", &self.identity())
            .field("attributes", &self.attributes())
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_file_defaults() {
        let node = FileNode::new_file("/a.txt");
        assert_eq!(node.name(), "/a.txt");
        assert_eq!(node.kind(), NodeKind::File);
        assert_eq!(node.attributes(), FileAttributes::ARCHIVE);
        assert_eq!(node.identity(), UNASSIGNED_ID);
        assert_eq!(node.size(), 0);
        assert!(node.security().is_none());
        let times = node.times();
        assert!(!times.creation.is_empty());
        assert_eq!(times.creation, times.last_write);
    }

    #[test]
    fn test_directory_bit_follows_kind() {
        let dir = FileNode::new("/d", NodeKind::Directory, FileAttributes::HIDDEN, None);
        assert!(dir.attributes().is_directory());
        assert!(dir.attributes().is_hidden());

        let file = FileNode::new("/f", NodeKind::File, FileAttributes::DIRECTORY, None);
        assert!(!file.attributes().is_directory());

        dir.set_attributes(FileAttributes::READONLY);
        assert_eq!(
            dir.attributes(),
            FileAttributes::READONLY | FileAttributes::DIRECTORY
        );
    }

    #[test]
    fn test_set_attributes_applies_normal_rule() {
        let node = FileNode::new_file("/f");
        node.set_attributes(FileAttributes::NORMAL | FileAttributes::READONLY);
        assert_eq!(node.attributes(), FileAttributes::READONLY);
        node.set_attributes(FileAttributes::NORMAL);
        assert_eq!(node.attributes(), FileAttributes::NORMAL);
    }

    #[test]
    fn test_identity_assigned_once() {
        let node = FileNode::new_file("/f");
        assert_eq!(node.assign_identity(5), 5);
        assert_eq!(node.assign_identity(9), 5);
        assert_eq!(node.identity(), 5);
    }

    #[test]
    fn test_write_read_round_trip() {
        let node = FileNode::new_file("/f");
        assert_eq!(node.write(0, b"hello", false).unwrap(), 5);
        assert_eq!(node.read(0, 5), b"hello");
        assert_eq!(node.read(5, 10), Vec::<u8>::new());
    }

    #[test]
    fn test_paging_write_does_not_extend() {
        let node = FileNode::new_file("/f");
        node.write(0, &[0u8; 10], false).unwrap();
        assert_eq!(node.write(8, b"abcd", true).unwrap(), 2);
        assert_eq!(node.size(), 10);
        assert_eq!(node.write(8, b"abcd", false).unwrap(), 4);
        assert_eq!(node.size(), 12);
    }

    #[test]
    fn test_append() {
        let node = FileNode::new_file("/f");
        assert_eq!(node.append(b"ab").unwrap(), 0);
        assert_eq!(node.append(b"cd").unwrap(), 2);
        assert_eq!(node.read(0, 10), b"abcd");
    }

    #[test]
    fn test_set_end_of_file() {
        let node = FileNode::new_file("/f");
        node.write(0, b"hello world", false).unwrap();
        node.set_end_of_file(5).unwrap();
        assert_eq!(node.read(0, 100), b"hello");
        node.set_end_of_file(7).unwrap();
        assert_eq!(node.read(0, 100), b"hello\0\0");
    }

    #[test]
    fn test_directory_content_is_always_empty() {
        let dir = FileNode::new_directory("/d");
        assert!(matches!(dir.write(0, b"x", false), Err(FsError::IsADirectory(_))));
        assert!(matches!(dir.append(b"x"), Err(FsError::IsADirectory(_))));
        assert!(matches!(dir.set_end_of_file(3), Err(FsError::IsADirectory(_))));
        assert_eq!(dir.size(), 0);
        assert!(dir.read(0, 10).is_empty());
    }

    #[test]
    fn test_set_times_skips_empty_fields() {
        let node = FileNode::new_file("/f");
        let before = node.times();
        node.set_times(FileTimes {
            creation: FileTime::EMPTY,
            last_access: FileTime::from_ticks(42),
            last_write: FileTime::EMPTY,
        });
        let after = node.times();
        assert_eq!(after.creation, before.creation);
        assert_eq!(after.last_access, FileTime::from_ticks(42));
        assert_eq!(after.last_write, before.last_write);
    }

    #[test]
    fn test_touch_write_updates_access_too() {
        let node = FileNode::new_file("/f");
        node.set_times(FileTimes::uniform(FileTime::from_ticks(1)));
        node.touch_write();
        let times = node.times();
        assert!(times.last_write.ticks() > 1);
        assert_eq!(times.last_write, times.last_access);
        assert_eq!(times.creation, FileTime::from_ticks(1));
    }

    #[test]
    fn test_security_round_trip() {
        let node = FileNode::new_file("/f");
        let sd = SecurityDescriptor::from_bytes(vec![9, 8, 7]);
        node.set_security(Some(sd.clone()));
        assert_eq!(node.security(), Some(sd));
        node.set_security(None);
        assert!(node.security().is_none());
    }

    #[test]
    fn test_rename_changes_name_only() {
        let node = FileNode::new_file("/old");
        node.write(0, b"data", false).unwrap();
        node.rename("/new");
        assert_eq!(node.name(), "/new");
        assert_eq!(node.read(0, 4), b"data");
    }
}
