// SPDX-License-Identifier: GPL-3.0-only

//! Device identity resolution through blkid

use automount_types::{DeviceInfo, DeviceType, identifier_key};
use tracing::debug;

use crate::command::CommandRunner;
use crate::error::{Result, SysError};

const WHOLE_DISK_HINT: &str = "Select a partition (type 'part') instead of the whole disk, \
     or create a partition and format the drive first.";

/// Stable identity of a formatted partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub uuid: String,
    pub filesystem_type: String,
}

impl DeviceIdentity {
    /// Identifier key used in mount table entries (`UUID=<uuid>`)
    pub fn identifier_key(&self) -> String {
        identifier_key(&self.uuid)
    }
}

/// Resolve the UUID and filesystem type of `device`.
///
/// blkid exits non-zero when a tag is absent; that is treated the same as an
/// empty answer so the caller gets [`SysError::IdentityUnavailable`]. A blkid
/// that cannot be started is returned as is.
pub fn resolve_identity(runner: &dyn CommandRunner, device: &DeviceInfo) -> Result<DeviceIdentity> {
    let path = device.device_path();
    let uuid = lookup_tag(runner, "UUID", &path)?;
    let filesystem_type = lookup_tag(runner, "TYPE", &path)?;

    if uuid.is_empty() || filesystem_type.is_empty() {
        let hint = (device.device_type == DeviceType::Disk).then(|| WHOLE_DISK_HINT.to_string());
        return Err(SysError::IdentityUnavailable {
            device: device.name.clone(),
            hint,
        });
    }

    Ok(DeviceIdentity {
        uuid,
        filesystem_type,
    })
}

fn lookup_tag(runner: &dyn CommandRunner, tag: &str, path: &str) -> Result<String> {
    match runner.run("blkid", &["-s", tag, "-o", "value", path]) {
        Ok(value) => Ok(value),
        Err(SysError::CommandFailed { stderr, .. }) => {
            debug!("blkid found no {} for {}: {}", tag, path, stderr);
            Ok(String::new())
        }
        Err(e) => Err(e),
    }
}
