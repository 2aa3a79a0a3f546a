// SPDX-License-Identifier: GPL-3.0-only

//! Protected mountpoints for unmount safety
//!
//! Unmounting any of these would destabilize the running system, so the
//! configurator refuses them regardless of what the mount table says.

use std::path::{Path, PathBuf};

/// Mountpoints that may never be unmounted from here
pub const PROTECTED_MOUNTPOINTS: &[&str] = &[
    "/",         // Root filesystem
    "/boot",     // Bootloader and kernels
    "/boot/efi", // EFI system partition
    "/efi",      // Alternative EFI mount point
];

/// Lexically normalize a path: drops trailing slashes, `.` components and
/// duplicate separators without touching the filesystem.
pub fn normalize_mountpoint(path: &Path) -> PathBuf {
    path.components().collect()
}

/// Whether `mountpoint` is one of [`PROTECTED_MOUNTPOINTS`]
pub fn is_protected_mountpoint(mountpoint: &Path) -> bool {
    let normalized = normalize_mountpoint(mountpoint);
    let protected = PROTECTED_MOUNTPOINTS
        .iter()
        .any(|candidate| normalized == Path::new(candidate));
    if protected {
        tracing::info!("Mountpoint {:?} is protected", mountpoint);
    }
    protected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_mountpoints_are_protected() {
        for path in ["/", "/boot", "/boot/efi", "/efi", "/boot/", "//boot//efi/"] {
            assert!(is_protected_mountpoint(Path::new(path)), "{path}");
        }
    }

    #[test]
    fn data_mountpoints_are_not_protected() {
        for path in ["/mnt/data", "/boot2", "/media/usb", "/home/user/boot"] {
            assert!(!is_protected_mountpoint(Path::new(path)), "{path}");
        }
    }

    #[test]
    fn normalization_is_lexical() {
        assert_eq!(
            normalize_mountpoint(Path::new("/mnt/./data/")),
            PathBuf::from("/mnt/data")
        );
    }
}
