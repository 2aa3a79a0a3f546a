// SPDX-License-Identifier: GPL-3.0-only

//! Block device snapshots as reported by `lsblk -J`

use serde::{Deserialize, Serialize};

/// Kind of block device the configurator is asked to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Disk,
    #[serde(rename = "part")]
    Partition,
    /// Loop devices, optical drives, device-mapper nodes and anything else
    #[serde(other)]
    Other,
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DeviceType::Disk => "disk",
            DeviceType::Partition => "part",
            DeviceType::Other => "other",
        };
        f.pad(label)
    }
}

/// Read-only snapshot describing one block device or partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Kernel device name (e.g., "sda1")
    pub name: String,

    /// Human readable size as printed by lsblk (e.g., "931.5G")
    #[serde(default)]
    pub size: Option<String>,

    #[serde(rename = "type")]
    pub device_type: DeviceType,

    /// Filesystem type string, `None` when unknown or unformatted
    #[serde(rename = "fstype", default)]
    pub filesystem_type: Option<String>,

    /// Active mountpoint, `None` when unmounted
    #[serde(default)]
    pub mountpoint: Option<String>,
}

impl DeviceInfo {
    pub fn new(name: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            name: name.into(),
            size: None,
            device_type,
            filesystem_type: None,
            mountpoint: None,
        }
    }

    /// Device node path (e.g., "/dev/sda1")
    pub fn device_path(&self) -> String {
        format!("/dev/{}", self.name)
    }

    pub fn is_mounted(&self) -> bool {
        self.mountpoint.as_deref().is_some_and(|mp| !mp.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct LsblkOutput {
    #[serde(default)]
    blockdevices: Vec<LsblkNode>,
}

#[derive(Debug, Deserialize)]
struct LsblkNode {
    #[serde(flatten)]
    info: DeviceInfo,
    #[serde(default)]
    children: Vec<LsblkNode>,
}

/// Decode `lsblk -J -o NAME,SIZE,TYPE,FSTYPE,MOUNTPOINT` output into a flat
/// device list (disks and partitions only, parents before children).
pub fn parse_lsblk_json(json: &str) -> serde_json::Result<Vec<DeviceInfo>> {
    let output: LsblkOutput = serde_json::from_str(json)?;
    Ok(flatten_devices(output.blockdevices))
}

fn flatten_devices(nodes: Vec<LsblkNode>) -> Vec<DeviceInfo> {
    let mut flat = Vec::new();
    for node in nodes {
        if matches!(
            node.info.device_type,
            DeviceType::Disk | DeviceType::Partition
        ) {
            flat.push(node.info);
        }
        flat.extend(flatten_devices(node.children));
    }
    flat
}

/// Keep only partition entries from a flattened listing
pub fn partition_entries(devices: &[DeviceInfo]) -> Vec<DeviceInfo> {
    devices
        .iter()
        .filter(|device| device.device_type == DeviceType::Partition)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
       "blockdevices": [
          {"name":"sda", "size":"931.5G", "type":"disk", "fstype":null, "mountpoint":null,
             "children": [
                {"name":"sda1", "size":"512M", "type":"part", "fstype":"vfat", "mountpoint":"/boot/efi"},
                {"name":"sda2", "size":"931G", "type":"part", "fstype":"ext4", "mountpoint":null}
             ]
          },
          {"name":"sr0", "size":"1024M", "type":"rom", "fstype":null, "mountpoint":null},
          {"name":"nvme0n1", "size":"476.9G", "type":"disk", "fstype":null, "mountpoint":null,
             "children": [
                {"name":"nvme0n1p1", "size":"476.9G", "type":"part", "fstype":"crypto_LUKS", "mountpoint":null,
                   "children": [
                      {"name":"luks-root", "size":"476.9G", "type":"crypt", "fstype":"btrfs", "mountpoint":"/"}
                   ]
                }
             ]
          }
       ]
    }"#;

    #[test]
    fn flattens_tree_and_skips_non_partition_nodes() {
        let devices = parse_lsblk_json(SAMPLE).expect("lsblk json should parse");
        let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["sda", "sda1", "sda2", "nvme0n1", "nvme0n1p1"]);

        let efi = &devices[1];
        assert_eq!(efi.device_type, DeviceType::Partition);
        assert_eq!(efi.filesystem_type.as_deref(), Some("vfat"));
        assert!(efi.is_mounted());
        assert!(!devices[2].is_mounted());
    }

    #[test]
    fn partition_filter_drops_whole_disks() {
        let devices = parse_lsblk_json(SAMPLE).expect("lsblk json should parse");
        let partitions = partition_entries(&devices);
        assert_eq!(partitions.len(), 3);
        assert!(
            partitions
                .iter()
                .all(|d| d.device_type == DeviceType::Partition)
        );
    }

    #[test]
    fn device_path_prefixes_dev() {
        let device = DeviceInfo::new("sdb1", DeviceType::Partition);
        assert_eq!(device.device_path(), "/dev/sdb1");
    }
}
