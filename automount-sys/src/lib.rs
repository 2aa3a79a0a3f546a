// SPDX-License-Identifier: GPL-3.0-only

//! Low-level system operations for persistent mounts
//!
//! This crate edits the mount table and drives the host tooling:
//! - Device identity lookup (blkid) and live device queries (lsblk)
//! - Mount option synthesis per filesystem family
//! - Table editing with timestamped backup and restore
//! - The configure/unmount state machine with rollback
//!
//! These operations require elevated privileges and should only be called
//! from a process running as root.

pub mod command;
pub mod configurator;
pub mod devices;
pub mod error;
pub mod identity;
pub mod options;
pub mod protected;
pub mod table;
pub mod user;

pub use command::{CommandRunner, SystemCommandRunner};
pub use configurator::{MountConfigurator, NTFS_GUIDANCE, Outcome, Prompt};
pub use devices::{find_device, is_active_mountpoint, list_block_devices, live_device_names};
pub use error::{Result, SysError};
pub use identity::{DeviceIdentity, resolve_identity};
pub use options::{DEFAULT_UMASK, mount_options, sanitize_umask};
pub use protected::{PROTECTED_MOUNTPOINTS, is_protected_mountpoint};
pub use table::{DEFAULT_FSTAB_PATH, FstabTable};
pub use user::{ActingUser, Host, SystemHost};
