// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_PREFIX: &str = "automount.log";
const MAX_LOG_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Install the global subscriber.
///
/// The terminal only shows warnings and errors unless `verbose` is set;
/// progress is printed by the prompt instead.
pub(crate) fn init(config: &Config, verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_directive()));

    let console_level = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::WARN
    };
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_level);

    let file_layer = if config.log_to_disk {
        match file_writer() {
            Ok((writer, guard)) => {
                // Keep the background logging worker alive for the duration of the process.
                let _ = LOG_GUARD.set(guard);
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_target(true)
                        .with_ansi(false),
                )
            }
            Err(e) => {
                eprintln!("automount: failed to initialize file logging: {e:#}");
                None
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

fn file_writer() -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let dir = log_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("create log directory {}", dir.display()))?;

    prune_logs(&dir, SystemTime::now());

    let appender = tracing_appender::rolling::daily(&dir, LOG_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}

/// `$AUTOMOUNT_LOG_DIR`, else `/var/log/automount` for root, else the XDG state dir
fn log_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("AUTOMOUNT_LOG_DIR") {
        return PathBuf::from(dir);
    }
    if nix::unistd::geteuid().is_root() {
        return PathBuf::from("/var/log/automount");
    }

    std::env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/state")))
        .unwrap_or_else(std::env::temp_dir)
        .join("automount")
        .join("logs")
}

/// Remove rolled log files last written more than [`MAX_LOG_AGE`] before `now`.
fn prune_logs(dir: &Path, now: SystemTime) -> usize {
    let Some(cutoff) = now.checked_sub(MAX_LOG_AGE) else {
        return 0;
    };
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };

    entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|file_type| file_type.is_file()))
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(LOG_PREFIX))
        .filter(|entry| {
            entry
                .metadata()
                .and_then(|metadata| metadata.modified())
                .is_ok_and(|modified| modified < cutoff)
        })
        .filter(|entry| fs::remove_file(entry.path()).is_ok())
        .count()
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use super::*;

    #[test]
    fn prunes_only_stale_rolled_logs() {
        let dir = std::env::temp_dir().join(format!("automount-logs-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("create log dir");

        let stale = dir.join("automount.log.2020-01-01");
        let fresh = dir.join("automount.log.2099-01-01");
        let foreign = dir.join("other.log");
        for path in [&stale, &fresh, &foreign] {
            fs::write(path, b"line\n").expect("write log");
        }
        let old = SystemTime::now() - Duration::from_secs(30 * 24 * 60 * 60);
        for path in [&stale, &foreign] {
            File::options()
                .write(true)
                .open(path)
                .and_then(|file| file.set_modified(old))
                .expect("age log file");
        }

        assert_eq!(prune_logs(&dir, SystemTime::now()), 1);

        assert!(!stale.exists());
        assert!(fresh.exists());
        assert!(foreign.exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
