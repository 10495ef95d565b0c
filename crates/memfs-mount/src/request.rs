//! Request and reply types exchanged with the front end.

use memfs_core::{FileAttributes, FileNode, FileTimes, SecurityDescriptor, path};

/// What `create_file` does when the target does or does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateDisposition {
    /// Create a new node; fail if it exists.
    CreateNew,
    /// Create a new node, replacing any existing file.
    CreateAlways,
    /// Open an existing node; fail if it is missing.
    OpenExisting,
    /// Open the node, creating it if missing.
    OpenAlways,
    /// Open an existing file and truncate it to zero bytes.
    TruncateExisting,
}

impl CreateDisposition {
    /// Returns true if the disposition may create a node.
    pub fn may_create(self) -> bool {
        matches!(
            self,
            CreateDisposition::CreateNew | CreateDisposition::CreateAlways | CreateDisposition::OpenAlways
        )
    }

    /// Returns true if the disposition discards existing content.
    pub fn overwrites(self) -> bool {
        matches!(
            self,
            CreateDisposition::CreateAlways | CreateDisposition::TruncateExisting
        )
    }
}

/// A decoded create/open request.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    /// What to do about existing or missing targets.
    pub disposition: CreateDisposition,
    /// Attributes requested for a newly created file.
    pub attributes: FileAttributes,
    /// The caller asked for a directory.
    pub directory: bool,
    /// The caller requires a non-directory.
    pub non_directory: bool,
    /// Remove the node when the handle is cleaned up.
    pub delete_on_close: bool,
    /// Security descriptor for a newly created node.
    pub security: Option<SecurityDescriptor>,
}

impl CreateRequest {
    /// A plain file request with NORMAL attributes.
    pub fn file(disposition: CreateDisposition) -> Self {
        Self {
            disposition,
            attributes: FileAttributes::NORMAL,
            directory: false,
            non_directory: false,
            delete_on_close: false,
            security: None,
        }
    }

    /// A directory request.
    pub fn directory(disposition: CreateDisposition) -> Self {
        Self {
            directory: true,
            attributes: FileAttributes::DIRECTORY,
            ..Self::file(disposition)
        }
    }

    /// Sets the requested attributes.
    #[must_use]
    pub fn attributes(mut self, attributes: FileAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Requires the target to be a non-directory.
    #[must_use]
    pub fn non_directory(mut self) -> Self {
        self.non_directory = true;
        self
    }

    /// Marks the handle delete-on-close.
    #[must_use]
    pub fn delete_on_close(mut self) -> Self {
        self.delete_on_close = true;
        self
    }

    /// Attaches a security descriptor for new nodes.
    #[must_use]
    pub fn security(mut self, security: SecurityDescriptor) -> Self {
        self.security = Some(security);
        self
    }
}

/// Result of a successful `create_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateOutcome {
    /// Handle id for subsequent calls.
    pub handle: u64,
    /// The handle refers to a directory.
    pub is_directory: bool,
    /// A node already lived at the path.
    pub existed: bool,
    /// Disposition the handle was opened with.
    pub disposition: CreateDisposition,
}

impl CreateOutcome {
    /// Returns true if the call opened a pre-existing node with a
    /// disposition that could have created one. Front ends report this as
    /// an informational name collision.
    pub fn opened_existing(&self) -> bool {
        self.existed
            && matches!(
                self.disposition,
                CreateDisposition::OpenAlways | CreateDisposition::CreateAlways
            )
    }
}

/// How a write positions and bounds its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteMode {
    /// Ignore the offset and append at the current end.
    pub write_to_eof: bool,
    /// Paging I/O: never extend the file.
    pub paging_io: bool,
}

impl WriteMode {
    /// A regular positioned write.
    pub const NORMAL: WriteMode = WriteMode {
        write_to_eof: false,
        paging_io: false,
    };

    /// An append.
    pub const APPEND: WriteMode = WriteMode {
        write_to_eof: true,
        paging_io: false,
    };

    /// A paging write.
    pub const PAGING: WriteMode = WriteMode {
        write_to_eof: false,
        paging_io: true,
    };
}

/// Per-handle file information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInformation {
    /// Attribute bits.
    pub attributes: FileAttributes,
    /// Creation, access and write times.
    pub times: FileTimes,
    /// Content length in bytes.
    pub size: u64,
    /// Node identity.
    pub file_index: u64,
    /// Hard link count. Always 1.
    pub number_of_links: u32,
    /// Serial number of the volume holding the node.
    pub volume_serial_number: u32,
}

/// One directory enumeration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindData {
    /// Last path component.
    pub file_name: String,
    /// Attribute bits.
    pub attributes: FileAttributes,
    /// Creation, access and write times.
    pub times: FileTimes,
    /// Content length in bytes.
    pub size: u64,
}

impl FindData {
    /// Builds an entry from a node snapshot.
    pub fn from_node(node: &FileNode) -> Self {
        Self {
            file_name: path::file_name(&node.name()).to_string(),
            attributes: node.attributes(),
            times: node.times(),
            size: node.size(),
        }
    }
}

/// Capacity figures reported by `get_disk_free_space`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskFreeSpace {
    /// Free bytes available to the caller.
    pub free_bytes_available: u64,
    /// Total capacity.
    pub total_bytes: u64,
    /// Free bytes on the volume.
    pub total_free_bytes: u64,
}

/// Volume properties reported by `get_volume_information`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInformation {
    /// Volume label.
    pub volume_name: String,
    /// Volume serial number.
    pub serial_number: u32,
    /// Longest accepted name component.
    pub max_component_length: u32,
    /// `FILE_*` capability flags.
    pub file_system_flags: u32,
    /// Reported filesystem name.
    pub file_system_name: String,
}

/// `FILE_CASE_PRESERVED_NAMES`
pub const FILE_CASE_PRESERVED_NAMES: u32 = 0x0000_0002;
/// `FILE_UNICODE_ON_DISK`
pub const FILE_UNICODE_ON_DISK: u32 = 0x0000_0004;
/// `FILE_PERSISTENT_ACLS`
pub const FILE_PERSISTENT_ACLS: u32 = 0x0000_0008;
/// `FILE_READ_ONLY_VOLUME`
pub const FILE_READ_ONLY_VOLUME: u32 = 0x0008_0000;

/// Names longer than this are left out of enumerations.
pub const MAX_PATH: usize = 260;
