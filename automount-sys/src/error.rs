// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;
use thiserror::Error;

/// Error types for mount table configuration
#[derive(Error, Debug)]
pub enum SysError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Device {0} is no longer available")]
    DeviceUnavailable(String),

    #[error("Mountpoint {} is already in use", .0.display())]
    MountpointInUse(PathBuf),

    #[error("Could not resolve user: {0}")]
    UserResolution(String),

    #[error("Could not determine UUID or filesystem type for /dev/{device}{}", hint_suffix(.hint))]
    IdentityUnavailable {
        device: String,
        hint: Option<String>,
    },

    #[error("The mount table already contains an entry for {0}")]
    DuplicateEntry(String),

    #[error("No mount table entry found for {identifier} at {mountpoint}")]
    EntryNotFound {
        identifier: String,
        mountpoint: String,
    },

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Mountpoint {} is protected and cannot be unmounted", .0.display())]
    ProtectedMountpoint(PathBuf),

    #[error("NTFS is not supported by the running kernel: {0}")]
    NtfsUnsupported(String),

    #[error("Command failed: {command}: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Could not run {command}: {source}")]
    CommandUnavailable {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Restoring the mount table from {} failed ({restore}) after: {original}; check the table by hand",
        .backup.display()
    )]
    RestoreFailed {
        backup: PathBuf,
        original: Box<SysError>,
        #[source]
        restore: std::io::Error,
    },

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_deref()
        .map(|hint| format!(". {hint}"))
        .unwrap_or_default()
}

impl SysError {
    /// Whether the mount table is known to be in its pre-operation state
    /// after this error.
    pub fn table_restored(&self) -> bool {
        !matches!(self, SysError::RestoreFailed { .. })
    }
}

/// Result type alias for mount table operations
pub type Result<T> = std::result::Result<T, SysError>;
