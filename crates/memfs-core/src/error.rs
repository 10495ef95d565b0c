//! Error types for store and node operations.
//!
//! Every failure is a business outcome reported to the caller; nothing in
//! the store retries. Each variant carries the path it concerns so that the
//! verb adapter can log it and map it to a platform status.

use thiserror::Error;

/// Errors produced by the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    /// The addressed path does not exist.
    #[error("Path not found: {0}")]
    NotFound(String),

    /// The parent of the addressed path is not a known directory.
    #[error("Parent path not found: {0}")]
    ParentPathNotFound(String),

    /// The destination already exists and replacement was not requested.
    #[error("Name collision: {0}")]
    NameCollision(String),

    /// The operation is not permitted on this node.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// A directory operation was issued against a file.
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// A file operation was issued against a directory.
    #[error("Is a directory: {0}")]
    IsADirectory(String),

    /// The directory still has children.
    #[error("Directory not empty: {0}")]
    DirectoryNotEmpty(String),

    /// A read-only node was opened for deletion.
    #[error("Cannot delete read-only node: {0}")]
    CannotDelete(String),

    /// The open context id is unknown.
    #[error("Invalid handle: {0}")]
    InvalidHandle(u64),

    /// The operation is not supported by an in-memory volume.
    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),

    /// The request could not be satisfied with the available memory.
    #[error("Insufficient resources: {0}")]
    InsufficientResources(String),
}

impl FsError {
    /// Returns the path this error refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            FsError::NotFound(p)
            | FsError::ParentPathNotFound(p)
            | FsError::NameCollision(p)
            | FsError::AccessDenied(p)
            | FsError::NotADirectory(p)
            | FsError::IsADirectory(p)
            | FsError::DirectoryNotEmpty(p)
            | FsError::CannotDelete(p)
            | FsError::InsufficientResources(p) => Some(p),
            FsError::InvalidHandle(_) | FsError::Unsupported(_) => None,
        }
    }

    /// Returns true for errors that mean "nothing lives at that path".
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound(_) | FsError::ParentPathNotFound(_))
    }
}

/// Result type for store operations.
pub type FsResult<T> = Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_path() {
        let err = FsError::NameCollision("/a/b".to_string());
        assert_eq!(err.to_string(), "Name collision: /a/b");
    }

    #[test]
    fn test_error_path_accessor() {
        assert_eq!(FsError::NotFound("/x".into()).path(), Some("/x"));
        assert_eq!(FsError::InvalidHandle(7).path(), None);
        assert_eq!(FsError::Unsupported("lock").path(), None);
    }

    #[test]
    fn test_is_not_found() {
        assert!(FsError::NotFound("/x".into()).is_not_found());
        assert!(FsError::ParentPathNotFound("/x".into()).is_not_found());
        assert!(!FsError::AccessDenied("/x".into()).is_not_found());
    }
}
