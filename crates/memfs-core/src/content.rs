//! Growable byte buffer backing a file node.
//!
//! [`FileContent`] is the authoritative store of a file's bytes: its length
//! is the file size. Callers hold the node's content lock while touching it.
//!
//! Two write flavours exist:
//! 1. Regular writes grow the buffer to cover `offset + len`, zero-filling
//!    any gap between the old end and `offset`.
//! 2. Paging writes never change the size; anything past the current end is
//!    dropped.

use crate::error::{FsError, FsResult};

/// Byte buffer with zero-filling growth and size-preserving paging writes.
///
/// # Example
///
/// ```
/// use memfs_core::FileContent;
///
/// let mut buf = FileContent::new();
/// buf.write(0, b"Hello, World!").unwrap();
/// assert_eq!(buf.len(), 13);
/// assert_eq!(buf.read(0, 5), b"Hello");
///
/// // Paging I/O cannot extend the file.
/// assert_eq!(buf.write_paging(10, b"abcdef"), 3);
/// assert_eq!(buf.read(7, 100), b"Worabc");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileContent {
    data: Vec<u8>,
}

impl FileContent {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Wraps existing bytes.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Write data at `offset`, growing the buffer as needed.
    ///
    /// Uses 1.5x geometric growth when expanding so that sequential appends
    /// cost O(n) total allocation.
    ///
    /// # Errors
    ///
    /// `InsufficientResources` if the end offset is not addressable or the
    /// allocation fails.
    ///
    /// # Returns
    ///
    /// The number of bytes written (always equals `data.len()`).
    pub fn write(&mut self, offset: u64, data: &[u8]) -> FsResult<usize> {
        let offset = to_index(offset)?;
        let end = offset
            .checked_add(data.len())
            .ok_or_else(|| too_large(offset as u64))?;

        if end > self.data.len() {
            let wanted = std::cmp::max(end, (self.data.capacity() * 3) / 2);
            if wanted > self.data.capacity() {
                self.data
                    .try_reserve(wanted - self.data.len())
                    .or_else(|_| self.data.try_reserve_exact(end - self.data.len()))
                    .map_err(|_| too_large(end as u64))?;
            }
            self.data.resize(end, 0);
        }

        self.data[offset..end].copy_from_slice(data);
        Ok(data.len())
    }

    /// Write data at `offset` without changing the buffer size.
    ///
    /// Bytes that would land at or beyond the current end are discarded.
    ///
    /// # Returns
    ///
    /// The number of bytes actually written.
    pub fn write_paging(&mut self, offset: u64, data: &[u8]) -> usize {
        let len = self.data.len();
        let Ok(offset) = usize::try_from(offset) else {
            return 0;
        };
        if offset >= len {
            return 0;
        }
        let n = data.len().min(len - offset);
        self.data[offset..offset + n].copy_from_slice(&data[..n]);
        n
    }

    /// Read up to `size` bytes starting at `offset`.
    ///
    /// Returns an empty slice if `offset` is at or past the end.
    pub fn read(&self, offset: u64, size: usize) -> &[u8] {
        let Ok(offset) = usize::try_from(offset) else {
            return &[];
        };
        if offset >= self.data.len() {
            return &[];
        }
        let end = offset.saturating_add(size).min(self.data.len());
        &self.data[offset..end]
    }

    /// Resize to exactly `size` bytes, zero-padding on growth.
    pub fn set_len(&mut self, size: u64) -> FsResult<()> {
        let size = to_index(size)?;
        if size > self.data.len() {
            self.data
                .try_reserve_exact(size - self.data.len())
                .map_err(|_| too_large(size as u64))?;
        }
        self.data.resize(size, 0);
        Ok(())
    }

    /// Drop all content.
    pub fn clear(&mut self) {
        self.data.clear();
        self.data.shrink_to_fit();
    }

    /// Current size in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

fn to_index(value: u64) -> FsResult<usize> {
    usize::try_from(value).map_err(|_| too_large(value))
}

fn too_large(bytes: u64) -> FsError {
    FsError::InsufficientResources(format!("cannot hold {bytes} bytes"))
}
