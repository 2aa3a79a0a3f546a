// SPDX-License-Identifier: GPL-3.0-only

//! Live block device queries through lsblk and mountpoint

use std::path::Path;

use automount_types::{DeviceInfo, parse_lsblk_json};
use tracing::debug;

use crate::command::CommandRunner;
use crate::error::{Result, SysError};

pub const LSBLK_COLUMNS: &str = "NAME,SIZE,TYPE,FSTYPE,MOUNTPOINT";

/// Characters lsblk uses to draw its device tree
const TREE_CHARS: &[char] = &['├', '└', '│', '─', '`', '|', '-', ' '];

/// Enumerate disks and partitions, flattened parent-first
pub fn list_block_devices(runner: &dyn CommandRunner) -> Result<Vec<DeviceInfo>> {
    let json = runner.run("lsblk", &["-J", "-o", LSBLK_COLUMNS])?;
    let devices = parse_lsblk_json(&json)
        .map_err(|e| SysError::OperationFailed(format!("Failed to parse lsblk output: {}", e)))?;
    debug!("Found {} block devices", devices.len());
    Ok(devices)
}

/// Look up one device by kernel name in the live listing
pub fn find_device(runner: &dyn CommandRunner, name: &str) -> Result<DeviceInfo> {
    list_block_devices(runner)?
        .into_iter()
        .find(|device| device.name == name)
        .ok_or_else(|| SysError::DeviceUnavailable(name.to_string()))
}

/// Flat list of the kernel device names currently present
pub fn live_device_names(runner: &dyn CommandRunner) -> Result<Vec<String>> {
    let output = runner.run("lsblk", &["-ln", "-o", "NAME"])?;
    Ok(parse_device_names(&output))
}

fn parse_device_names(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.trim_start_matches(TREE_CHARS).trim_end())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `path` is an active mountpoint (`mountpoint -q`)
pub fn is_active_mountpoint(runner: &dyn CommandRunner, path: &Path) -> Result<bool> {
    let path = path.to_string_lossy();
    runner.succeeds("mountpoint", &["-q", &path])
}
