// SPDX-License-Identifier: GPL-3.0-only

//! Mount option policy per filesystem family

use automount_types::MountOptions;
use tracing::warn;

pub const DEFAULT_UMASK: &str = "000";

/// Whether `umask` is exactly three octal digits
pub fn is_valid_umask(umask: &str) -> bool {
    umask.len() == 3 && umask.chars().all(|c| ('0'..='7').contains(&c))
}

/// Return `umask` if it is three octal digits, otherwise [`DEFAULT_UMASK`]
pub fn sanitize_umask(umask: &str) -> String {
    let umask = umask.trim();
    if is_valid_umask(umask) {
        return umask.to_string();
    }
    warn!("Invalid umask '{}', using {} instead", umask, DEFAULT_UMASK);
    DEFAULT_UMASK.to_string()
}

/// Mount options for `filesystem_type`.
///
/// Filesystems without native Unix ownership get `uid`/`gid`/`umask` so the
/// acting user can write to them; unknown types are treated the same way.
pub fn mount_options(filesystem_type: &str, uid: u32, gid: u32, umask: &str) -> MountOptions {
    match filesystem_type {
        "ext4" | "ext3" | "ext2" => MountOptions {
            options: "defaults,auto,user,rw,exec".to_string(),
            posix_ownership: true,
        },
        "btrfs" | "xfs" => MountOptions {
            options: "defaults,auto,users,rw,exec".to_string(),
            posix_ownership: true,
        },
        _ => MountOptions {
            options: format!("defaults,auto,users,rw,exec,uid={uid},gid={gid},umask={umask}"),
            posix_ownership: false,
        },
    }
}
