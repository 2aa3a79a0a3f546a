// SPDX-License-Identifier: GPL-3.0-only

//! Mount table (fstab) line model

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of the identifier key written for every entry
pub const IDENTIFIER_PREFIX: &str = "UUID=";

/// Mount options synthesized for one filesystem family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountOptions {
    /// Comma-joined option string for the fourth fstab field
    pub options: String,

    /// Whether the filesystem stores Unix ownership natively
    /// (uid/gid/umask options are then unnecessary)
    pub posix_ownership: bool,
}

/// A single six-field line of the mount table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FstabEntry {
    /// Stable device reference (e.g., "UUID=1234-ABCD")
    pub identifier_key: String,

    /// Mountpoint as written to the table (octal-escaped)
    pub mountpoint: String,

    pub filesystem_type: String,

    pub options: String,

    pub dump_freq: u32,

    pub pass_no: u32,
}

impl FstabEntry {
    /// Build a `UUID=` keyed entry; dump frequency and pass number are always 0
    pub fn for_uuid(
        uuid: &str,
        mountpoint: &Path,
        filesystem_type: &str,
        options: &MountOptions,
    ) -> Self {
        Self {
            identifier_key: identifier_key(uuid),
            mountpoint: escape_fstab_field(&mountpoint.to_string_lossy()),
            filesystem_type: filesystem_type.to_string(),
            options: options.options.clone(),
            dump_freq: 0,
            pass_no: 0,
        }
    }
}

impl std::fmt::Display for FstabEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.identifier_key,
            self.mountpoint,
            self.filesystem_type,
            self.options,
            self.dump_freq,
            self.pass_no
        )
    }
}

/// Identifier key for a filesystem UUID
pub fn identifier_key(uuid: &str) -> String {
    format!("{IDENTIFIER_PREFIX}{uuid}")
}

/// Escape whitespace and backslashes the way fstab(5) expects (`\040` for space)
pub fn escape_fstab_field(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            ' ' => escaped.push_str("\\040"),
            '\t' => escaped.push_str("\\011"),
            '\n' => escaped.push_str("\\012"),
            '\\' => escaped.push_str("\\134"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_six_fields() {
        let options = MountOptions {
            options: "defaults,auto,user,rw,exec".to_string(),
            posix_ownership: true,
        };
        let entry = FstabEntry::for_uuid("0f3c-77aa", Path::new("/mnt/data"), "ext4", &options);
        assert_eq!(
            entry.to_string(),
            "UUID=0f3c-77aa /mnt/data ext4 defaults,auto,user,rw,exec 0 0"
        );
        assert_eq!(entry.to_string().split_whitespace().count(), 6);
    }

    #[test]
    fn escapes_whitespace_in_mountpoint() {
        assert_eq!(escape_fstab_field("/mnt/My Disk"), "/mnt/My\\040Disk");
        assert_eq!(escape_fstab_field("/mnt/a\tb"), "/mnt/a\\011b");
        assert_eq!(escape_fstab_field("/mnt/plain"), "/mnt/plain");
    }
}
