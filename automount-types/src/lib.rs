// SPDX-License-Identifier: GPL-3.0-only

//! Canonical domain models for automount
//!
//! These models are shared by the system layer (`automount-sys`) and the
//! command line front end:
//!
//! - `DeviceInfo` → read-only snapshot of one block device, decoded from lsblk
//! - `FstabEntry` → one six-field line of the mount table
//! - `MountOptions` → option string synthesized for a filesystem family

pub mod device;
pub mod fstab;

pub use device::{DeviceInfo, DeviceType, parse_lsblk_json, partition_entries};
pub use fstab::{FstabEntry, IDENTIFIER_PREFIX, MountOptions, escape_fstab_field, identifier_key};
