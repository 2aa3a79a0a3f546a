// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use automount_sys::{DEFAULT_FSTAB_PATH, DEFAULT_UMASK};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_PATH: &str = "/etc/automount/config.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LoggingLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mount table edited by configure/unmount
    pub fstab_path: PathBuf,
    /// Umask used for non-POSIX filesystems when none is given
    pub default_umask: String,
    pub log_level: LoggingLevel,
    pub log_to_disk: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fstab_path: PathBuf::from(DEFAULT_FSTAB_PATH),
            default_umask: DEFAULT_UMASK.to_string(),
            log_level: LoggingLevel::Info,
            log_to_disk: true,
        }
    }
}

impl Config {
    /// `$AUTOMOUNT_CONFIG`, or the system-wide default location
    pub fn config_path() -> PathBuf {
        std::env::var_os("AUTOMOUNT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Missing file yields defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("read configuration {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parse configuration {}", path.display()))
    }
}
