//! Volume configuration.
//!
//! A [`MountConfig`] describes how the in-memory volume presents itself:
//! its label, the filesystem name it reports, capacity figures for
//! free-space queries and a few front-end options. Values can be built in
//! code or loaded from TOML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default volume label.
pub const DEFAULT_VOLUME_NAME: &str = "MemoryFS";

/// Filesystem name reported to the platform.
pub const DEFAULT_FILE_SYSTEM_NAME: &str = "NTFS";

/// Default volume serial number.
pub const DEFAULT_SERIAL_NUMBER: u32 = 0x1983_1116;

/// Longest file name component the volume accepts.
pub const DEFAULT_MAX_COMPONENT_LENGTH: u32 = 255;

/// Capacity reported by free-space queries (512 MiB).
pub const DEFAULT_TOTAL_BYTES: u64 = 512 * 1024 * 1024;

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that failed to load.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`MountConfig`].
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid config value for {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Configuration for an in-memory volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MountConfig {
    /// Volume label.
    pub volume_name: String,

    /// Filesystem name reported by volume queries. Default: `NTFS`.
    pub file_system_name: String,

    /// Volume serial number, also reported per file.
    pub serial_number: u32,

    /// Maximum file name component length.
    pub max_component_length: u32,

    /// Total capacity reported by free-space queries, in bytes.
    pub total_bytes: u64,

    /// Number of worker threads the front end dispatches on. Default: 1.
    pub thread_count: u16,

    /// Mount point (drive letter or directory) handed to the front end.
    pub mount_point: String,

    /// Reject every operation that would modify the volume.
    pub read_only: bool,

    /// Ask the front end for verbose driver diagnostics.
    pub debug: bool,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            volume_name: DEFAULT_VOLUME_NAME.to_string(),
            file_system_name: DEFAULT_FILE_SYSTEM_NAME.to_string(),
            serial_number: DEFAULT_SERIAL_NUMBER,
            max_component_length: DEFAULT_MAX_COMPONENT_LENGTH,
            total_bytes: DEFAULT_TOTAL_BYTES,
            thread_count: 1,
            mount_point: "M".to_string(),
            read_only: false,
            debug: false,
        }
    }
}

impl MountConfig {
    /// Parses a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.volume_name.is_empty() {
            return Err(ConfigError::Invalid {
                field: "volume_name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.thread_count == 0 {
            return Err(ConfigError::Invalid {
                field: "thread_count",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_component_length == 0 {
            return Err(ConfigError::Invalid {
                field: "max_component_length",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Sets the volume label.
    #[must_use]
    pub fn volume_name(mut self, name: impl Into<String>) -> Self {
        self.volume_name = name.into();
        self
    }

    /// Sets the reported capacity.
    #[must_use]
    pub fn total_bytes(mut self, bytes: u64) -> Self {
        self.total_bytes = bytes;
        self
    }

    /// Sets the volume serial number.
    #[must_use]
    pub fn serial_number(mut self, serial: u32) -> Self {
        self.serial_number = serial;
        self
    }

    /// Sets the worker thread count.
    #[must_use]
    pub fn thread_count(mut self, count: u16) -> Self {
        self.thread_count = count;
        self
    }

    /// Sets the mount point.
    #[must_use]
    pub fn mount_point(mut self, mount_point: impl Into<String>) -> Self {
        self.mount_point = mount_point.into();
        self
    }

    /// Makes the volume read-only.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Enables front-end debug output.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
