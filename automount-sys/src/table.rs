// SPDX-License-Identifier: GPL-3.0-only

//! Mount table file editing with timestamped backups
//!
//! The table is treated as opaque lines: comments and blank lines are
//! preserved verbatim and in order, only data lines are ever inspected.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::error::{Result, SysError};

pub const DEFAULT_FSTAB_PATH: &str = "/etc/fstab";

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Handle on one mount table file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FstabTable {
    path: PathBuf,
}

impl Default for FstabTable {
    fn default() -> Self {
        Self::new(DEFAULT_FSTAB_PATH)
    }
}

impl FstabTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this is the table `mount` reads when given only a target
    pub fn is_system_table(&self) -> bool {
        self.path == Path::new(DEFAULT_FSTAB_PATH)
    }

    /// Whether the table mentions `identifier_key` anywhere (substring match)
    pub fn contains_identifier(&self, identifier_key: &str) -> Result<bool> {
        let content = fs::read_to_string(&self.path)?;
        Ok(content.contains(identifier_key))
    }

    /// Append one entry line terminated by a newline.
    ///
    /// Callers must have checked for duplicates first.
    pub fn append(&self, entry_line: &str) -> Result<()> {
        let needs_separator = fs::read(&self.path)?
            .last()
            .is_some_and(|&byte| byte != b'\n');

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        if needs_separator {
            file.write_all(b"\n")?;
        }
        file.write_all(entry_line.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;

        debug!("Appended entry to {:?}: {}", self.path, entry_line);
        Ok(())
    }

    /// Drop every data line whose first two fields are exactly
    /// (`identifier_key`, `mountpoint`).
    ///
    /// Nothing is written back when no line matched.
    pub fn remove_entry(&self, identifier_key: &str, mountpoint: &str) -> Result<()> {
        let content = fs::read_to_string(&self.path)?;
        let (kept, removed) = filter_entries(&content, identifier_key, mountpoint);

        if removed == 0 {
            return Err(SysError::EntryNotFound {
                identifier: identifier_key.to_string(),
                mountpoint: mountpoint.to_string(),
            });
        }

        fs::write(&self.path, kept)?;
        info!(
            "Removed {} entr{} for {} at {} from {:?}",
            removed,
            if removed == 1 { "y" } else { "ies" },
            identifier_key,
            mountpoint,
            self.path
        );
        Ok(())
    }

    /// Sibling backup path for a given instant (`<table>.backup-YYYYMMDDHHMMSS`)
    pub fn backup_path_at(&self, now: DateTime<Local>) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "fstab".to_string());
        self.path.with_file_name(format!(
            "{}.backup-{}",
            file_name,
            now.format(BACKUP_TIMESTAMP_FORMAT)
        ))
    }

    /// Copy the live table to a timestamped sibling and return its path.
    ///
    /// Backups are never deleted automatically.
    pub fn backup(&self) -> Result<PathBuf> {
        let backup_path = self.backup_path_at(Local::now());
        fs::copy(&self.path, &backup_path)?;
        info!("Backed up {:?} to {:?}", self.path, backup_path);
        Ok(backup_path)
    }

    /// Copy `backup_path` back over the live table
    pub fn restore(&self, backup_path: &Path) -> Result<()> {
        self.restore_raw(backup_path)?;
        Ok(())
    }

    pub(crate) fn restore_raw(&self, backup_path: &Path) -> std::io::Result<()> {
        fs::copy(backup_path, &self.path)?;
        info!("Restored {:?} from {:?}", self.path, backup_path);
        Ok(())
    }
}

/// Split `content` into the text to keep and the number of dropped entries
fn filter_entries(content: &str, identifier_key: &str, mountpoint: &str) -> (String, usize) {
    let mut kept = String::with_capacity(content.len());
    let mut removed = 0;

    for line in content.split_inclusive('\n') {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            kept.push_str(line);
            continue;
        }

        let mut fields = stripped.split_whitespace();
        if fields.next() == Some(identifier_key) && fields.next() == Some(mountpoint) {
            removed += 1;
            continue;
        }

        kept.push_str(line);
    }

    (kept, removed)
}
