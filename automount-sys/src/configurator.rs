// SPDX-License-Identifier: GPL-3.0-only

//! Persistent mount configuration
//!
//! [`MountConfigurator`] registers a partition in the mount table and mounts
//! it, or unmounts it and removes its entry. Every mutation is preceded by a
//! timestamped backup of the table; any failure after that point restores the
//! backup before the error is returned.
//!
//! Callers must serialize configure/unmount calls: there is no locking
//! against a second process editing the table at the same time.

use std::fs;
use std::path::{Path, PathBuf};

use automount_types::{DeviceInfo, FstabEntry, MountOptions, escape_fstab_field};
use tracing::{error, info, warn};

use crate::command::{CommandRunner, SystemCommandRunner};
use crate::devices::{is_active_mountpoint, live_device_names};
use crate::error::{Result, SysError};
use crate::identity::resolve_identity;
use crate::options::{mount_options, sanitize_umask};
use crate::protected::{is_protected_mountpoint, normalize_mountpoint};
use crate::table::FstabTable;
use crate::user::{ActingUser, Host, SystemHost};

const NTFS_UNKNOWN_FS: &str = "unknown filesystem type 'ntfs'";

/// Shown to the user when the kernel lacks NTFS support
pub const NTFS_GUIDANCE: &str = "The system reports 'unknown filesystem type ntfs'. \
     Install ntfs-3g (e.g. `sudo apt-get install ntfs-3g`) for read/write NTFS support and retry.";

/// Caller-side hooks: confirmations and a sink for progress messages
pub trait Prompt {
    /// Approve the rendered mount table line before anything is written
    fn confirm_entry(&mut self, entry_line: &str) -> bool;

    /// Approve unmounting `device_name` from `mountpoint`
    fn confirm_unmount(&mut self, device_name: &str, mountpoint: &str) -> bool;

    /// Human-readable progress message
    fn progress(&mut self, _message: &str) {}
}

/// How a configure/unmount call ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Performed,
    /// The user declined the confirmation; nothing was changed
    Declined,
}

pub struct MountConfigurator<R, H> {
    runner: R,
    host: H,
    table: FstabTable,
}

impl MountConfigurator<SystemCommandRunner, SystemHost> {
    /// Configurator acting on the real host tooling
    pub fn system(table: FstabTable) -> Self {
        Self::new(SystemCommandRunner, SystemHost, table)
    }
}

impl<R: CommandRunner, H: Host> MountConfigurator<R, H> {
    pub fn new(runner: R, host: H, table: FstabTable) -> Self {
        Self {
            runner,
            host,
            table,
        }
    }

    pub fn table(&self) -> &FstabTable {
        &self.table
    }

    /// Add a `UUID=` entry for `device` at `mountpoint` and mount it.
    pub fn configure(
        &self,
        device: &DeviceInfo,
        mountpoint: &Path,
        umask: &str,
        prompt: &mut dyn Prompt,
    ) -> Result<Outcome> {
        self.ensure_device_available(&device.name)?;

        let mount_path = normalize_mountpoint(mountpoint);
        if !mount_path.is_absolute() {
            return Err(SysError::InvalidTarget(format!(
                "mountpoint {} is not an absolute path",
                mountpoint.display()
            )));
        }
        report(
            prompt,
            format!("Selected mountpoint: {}", mount_path.display()),
        );
        self.prepare_mount_directory(&mount_path, prompt)?;

        let umask = sanitize_umask(umask);

        let user = self.host.acting_user()?;
        info!(
            "Acting user {} (uid {}, gid {})",
            user.name, user.uid, user.gid
        );

        let identity = resolve_identity(&self.runner, device)?;
        let identifier_key = identity.identifier_key();
        if self.table.contains_identifier(&identifier_key)? {
            return Err(SysError::DuplicateEntry(identifier_key));
        }

        let options = mount_options(&identity.filesystem_type, user.uid, user.gid, &umask);
        let entry = FstabEntry::for_uuid(
            &identity.uuid,
            &mount_path,
            &identity.filesystem_type,
            &options,
        );
        let entry_line = entry.to_string();

        if !prompt.confirm_entry(&entry_line) {
            report(prompt, "Operation cancelled by the user.");
            return Ok(Outcome::Declined);
        }

        let backup = self.table.backup()?;
        report(
            prompt,
            format!(
                "Backup of {} created at {}",
                self.table.path().display(),
                backup.display()
            ),
        );

        match self.append_and_mount(&entry_line, &mount_path, &options, &user, prompt) {
            Ok(()) => {
                report(
                    prompt,
                    format!("The drive was mounted at {}.", mount_path.display()),
                );
                Ok(Outcome::Performed)
            }
            Err(err) => Err(self.roll_back(&backup, translate_mount_error(err), prompt)),
        }
    }

    /// Unmount `device` and remove its entry from the mount table.
    pub fn unmount(&self, device: &DeviceInfo, prompt: &mut dyn Prompt) -> Result<Outcome> {
        let mountpoint = device
            .mountpoint
            .as_deref()
            .filter(|mountpoint| mountpoint.starts_with('/'))
            .ok_or_else(|| {
                SysError::InvalidTarget(format!(
                    "{} has no valid mountpoint to unmount",
                    device.name
                ))
            })?;

        let mount_path = normalize_mountpoint(Path::new(mountpoint));
        if is_protected_mountpoint(&mount_path) {
            return Err(SysError::ProtectedMountpoint(mount_path));
        }

        let identity = resolve_identity(&self.runner, device)?;

        if !prompt.confirm_unmount(&device.name, mountpoint) {
            report(prompt, "Operation cancelled by the user.");
            return Ok(Outcome::Declined);
        }

        let backup = self.table.backup()?;
        report(
            prompt,
            format!(
                "Backup of {} created at {}",
                self.table.path().display(),
                backup.display()
            ),
        );

        let table_mountpoint = escape_fstab_field(&mount_path.to_string_lossy());
        match self.unmount_and_remove(
            &device.name,
            &mount_path,
            &identity.identifier_key(),
            &table_mountpoint,
            prompt,
        ) {
            Ok(()) => Ok(Outcome::Performed),
            Err(err) => Err(self.roll_back(&backup, err, prompt)),
        }
    }

    fn ensure_device_available(&self, device_name: &str) -> Result<()> {
        let names = live_device_names(&self.runner)?;
        if names.iter().any(|name| name == device_name) {
            Ok(())
        } else {
            Err(SysError::DeviceUnavailable(device_name.to_string()))
        }
    }

    fn prepare_mount_directory(&self, mount_path: &Path, prompt: &mut dyn Prompt) -> Result<()> {
        if is_active_mountpoint(&self.runner, mount_path)? {
            return Err(SysError::MountpointInUse(mount_path.to_path_buf()));
        }

        if !mount_path.exists() {
            report(
                prompt,
                format!("Creating directory {}", mount_path.display()),
            );
            fs::create_dir_all(mount_path)?;
        }
        Ok(())
    }

    fn append_and_mount(
        &self,
        entry_line: &str,
        mount_path: &Path,
        options: &MountOptions,
        user: &ActingUser,
        prompt: &mut dyn Prompt,
    ) -> Result<()> {
        self.table.append(entry_line)?;
        report(prompt, "Entry added to the mount table.");

        report(prompt, "Mounting the drive to validate the entry...");
        let path = mount_path.to_string_lossy();
        let table_path = self.table.path().to_string_lossy();
        let mut args: Vec<&str> = Vec::with_capacity(3);
        if !self.table.is_system_table() {
            args.extend(["--fstab", table_path.as_ref()]);
        }
        args.push(&path);
        self.runner.run("mount", &args)?;

        if options.posix_ownership {
            self.host.set_owner(mount_path, user.uid, user.gid)?;
        }
        Ok(())
    }

    fn unmount_and_remove(
        &self,
        device_name: &str,
        mount_path: &Path,
        identifier_key: &str,
        table_mountpoint: &str,
        prompt: &mut dyn Prompt,
    ) -> Result<()> {
        report(
            prompt,
            format!("Unmounting {} from {}...", device_name, mount_path.display()),
        );
        let path = mount_path.to_string_lossy();
        self.runner.run("umount", &[&path])?;
        report(prompt, "Drive unmounted.");

        self.table.remove_entry(identifier_key, table_mountpoint)?;
        report(prompt, "The matching entry was removed from the mount table.");
        Ok(())
    }

    fn roll_back(&self, backup: &Path, err: SysError, prompt: &mut dyn Prompt) -> SysError {
        warn!("Operation failed: {}", err);
        report(
            prompt,
            format!(
                "An error occurred. Restoring {} from the backup.",
                self.table.path().display()
            ),
        );

        if let Err(restore) = self.table.restore_raw(backup) {
            error!(
                "Failed to restore {:?} from {:?}: {}",
                self.table.path(),
                backup,
                restore
            );
            return SysError::RestoreFailed {
                backup: PathBuf::from(backup),
                original: Box::new(err),
                restore,
            };
        }

        if matches!(err, SysError::NtfsUnsupported(_)) {
            report(prompt, NTFS_GUIDANCE);
        }
        err
    }
}

/// Map a mount failure caused by missing NTFS support to its own error
fn translate_mount_error(err: SysError) -> SysError {
    match err {
        SysError::CommandFailed { stderr, .. }
            if stderr.to_lowercase().contains(NTFS_UNKNOWN_FS) =>
        {
            SysError::NtfsUnsupported(stderr)
        }
        other => other,
    }
}

fn report(prompt: &mut dyn Prompt, message: impl AsRef<str>) {
    let message = message.as_ref();
    info!("{}", message);
    prompt.progress(message);
}
