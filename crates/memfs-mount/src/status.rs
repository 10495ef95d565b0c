//! Mapping from store errors to platform status codes.
//!
//! The adapter reports failures as NTSTATUS values, the way a Dokan-style
//! front end expects them. [`NtStatus`] covers every status the adapter can
//! produce and [`ToNtStatus`] lets any error in the stack be mapped in one
//! call.

use std::fmt;
use std::io;

use memfs_core::FsError;

/// NTSTATUS values produced by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum NtStatus {
    /// The operation succeeded.
    Success = 0x0000_0000,
    /// The requested operation is not implemented.
    NotImplemented = 0xC000_0002,
    /// The handle is not valid.
    InvalidHandle = 0xC000_0008,
    /// Access to the object is denied.
    AccessDenied = 0xC000_0022,
    /// The object name was not found.
    ObjectNameNotFound = 0xC000_0034,
    /// The object name already exists.
    ObjectNameCollision = 0xC000_0035,
    /// A component of the object path was not found.
    ObjectPathNotFound = 0xC000_003A,
    /// Not enough resources to complete the request.
    InsufficientResources = 0xC000_009A,
    /// The file is a directory.
    FileIsADirectory = 0xC000_00BA,
    /// The directory is not empty.
    DirectoryNotEmpty = 0xC000_0101,
    /// The object is not a directory.
    NotADirectory = 0xC000_0103,
    /// The object cannot be deleted.
    CannotDelete = 0xC000_0121,
}

impl NtStatus {
    /// Returns the raw 32-bit status value.
    #[inline]
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Returns the value as the signed integer Windows headers use.
    #[inline]
    pub fn as_i32(self) -> i32 {
        self.code().cast_signed()
    }

    /// Returns true for success codes.
    #[inline]
    pub fn is_success(self) -> bool {
        self == NtStatus::Success
    }

    /// Returns the symbolic `STATUS_*` name.
    pub fn name(self) -> &'static str {
        match self {
            NtStatus::Success => "STATUS_SUCCESS",
            NtStatus::NotImplemented => "STATUS_NOT_IMPLEMENTED",
            NtStatus::InvalidHandle => "STATUS_INVALID_HANDLE",
            NtStatus::AccessDenied => "STATUS_ACCESS_DENIED",
            NtStatus::ObjectNameNotFound => "STATUS_OBJECT_NAME_NOT_FOUND",
            NtStatus::ObjectNameCollision => "STATUS_OBJECT_NAME_COLLISION",
            NtStatus::ObjectPathNotFound => "STATUS_OBJECT_PATH_NOT_FOUND",
            NtStatus::InsufficientResources => "STATUS_INSUFFICIENT_RESOURCES",
            NtStatus::FileIsADirectory => "STATUS_FILE_IS_A_DIRECTORY",
            NtStatus::DirectoryNotEmpty => "STATUS_DIRECTORY_NOT_EMPTY",
            NtStatus::NotADirectory => "STATUS_NOT_A_DIRECTORY",
            NtStatus::CannotDelete => "STATUS_CANNOT_DELETE",
        }
    }
}

impl fmt::Display for NtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:08X})", self.name(), self.code())
    }
}

impl From<&FsError> for NtStatus {
    fn from(e: &FsError) -> Self {
        match e {
            FsError::NotFound(_) => NtStatus::ObjectNameNotFound,
            FsError::ParentPathNotFound(_) => NtStatus::ObjectPathNotFound,
            FsError::NameCollision(_) => NtStatus::ObjectNameCollision,
            FsError::AccessDenied(_) => NtStatus::AccessDenied,
            FsError::NotADirectory(_) => NtStatus::NotADirectory,
            FsError::IsADirectory(_) => NtStatus::FileIsADirectory,
            FsError::DirectoryNotEmpty(_) => NtStatus::DirectoryNotEmpty,
            FsError::CannotDelete(_) => NtStatus::CannotDelete,
            FsError::InvalidHandle(_) => NtStatus::InvalidHandle,
            FsError::Unsupported(_) => NtStatus::NotImplemented,
            FsError::InsufficientResources(_) => NtStatus::InsufficientResources,
        }
    }
}

impl From<FsError> for NtStatus {
    fn from(e: FsError) -> Self {
        NtStatus::from(&e)
    }
}

/// Extension trait to convert errors to an NTSTATUS.
pub trait ToNtStatus {
    /// Converts this error to a platform status.
    fn to_nt_status(&self) -> NtStatus;
}

impl ToNtStatus for FsError {
    fn to_nt_status(&self) -> NtStatus {
        NtStatus::from(self)
    }
}

impl<T> ToNtStatus for Result<T, FsError> {
    fn to_nt_status(&self) -> NtStatus {
        match self {
            Ok(_) => NtStatus::Success,
            Err(e) => e.to_nt_status(),
        }
    }
}

/// Converts a store error into an `io::Error` for `std::io`-based callers.
pub fn fs_error_to_io(e: FsError) -> io::Error {
    let kind = match &e {
        FsError::NotFound(_) | FsError::ParentPathNotFound(_) => io::ErrorKind::NotFound,
        FsError::NameCollision(_) => io::ErrorKind::AlreadyExists,
        FsError::AccessDenied(_) | FsError::CannotDelete(_) => io::ErrorKind::PermissionDenied,
        FsError::NotADirectory(_) => io::ErrorKind::NotADirectory,
        FsError::IsADirectory(_) => io::ErrorKind::IsADirectory,
        FsError::DirectoryNotEmpty(_) => io::ErrorKind::DirectoryNotEmpty,
        FsError::InvalidHandle(_) => io::ErrorKind::InvalidInput,
        FsError::Unsupported(_) => io::ErrorKind::Unsupported,
        FsError::InsufficientResources(_) => io::ErrorKind::OutOfMemory,
    };
    io::Error::new(kind, e)
}
