// SPDX-License-Identifier: GPL-3.0-only

//! Acting user resolution and mountpoint ownership

use std::path::Path;

use nix::unistd::{Gid, Uid, User, chown, geteuid};
use tracing::debug;

use crate::error::{Result, SysError};

/// Real (non-elevated) user the operation is performed for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
}

/// Where the original user identity comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginalUser {
    /// `SUDO_USER`
    Name(String),
    /// `PKEXEC_UID`
    Uid(u32),
    /// No elevation signal; use the effective uid of this process
    Effective,
}

/// Pick the original user from the elevation signals, sudo first.
pub fn original_user(sudo_user: Option<&str>, pkexec_uid: Option<&str>) -> OriginalUser {
    if let Some(name) = sudo_user.map(str::trim).filter(|name| !name.is_empty()) {
        return OriginalUser::Name(name.to_string());
    }
    if let Some(uid) = pkexec_uid.and_then(|uid| uid.trim().parse().ok()) {
        return OriginalUser::Uid(uid);
    }
    OriginalUser::Effective
}

/// Resolve an [`OriginalUser`] through the passwd database
pub fn resolve_user(original: &OriginalUser) -> Result<ActingUser> {
    let lookup = match original {
        OriginalUser::Name(name) => User::from_name(name),
        OriginalUser::Uid(uid) => User::from_uid(Uid::from_raw(*uid)),
        OriginalUser::Effective => User::from_uid(geteuid()),
    };

    let user = lookup
        .map_err(|e| SysError::UserResolution(format!("{original:?}: {e}")))?
        .ok_or_else(|| SysError::UserResolution(format!("{original:?}: no passwd entry")))?;

    Ok(ActingUser {
        name: user.name,
        uid: user.uid.as_raw(),
        gid: user.gid.as_raw(),
    })
}

/// Host identity and ownership operations used by the configurator
pub trait Host {
    /// The real user on whose behalf the process runs
    fn acting_user(&self) -> Result<ActingUser>;

    /// Change owner and group of `path`
    fn set_owner(&self, path: &Path, uid: u32, gid: u32) -> Result<()>;
}

impl<H: Host + ?Sized> Host for &H {
    fn acting_user(&self) -> Result<ActingUser> {
        (**self).acting_user()
    }

    fn set_owner(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        (**self).set_owner(path, uid, gid)
    }
}

/// [`Host`] backed by the environment, passwd database and chown(2)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl Host for SystemHost {
    fn acting_user(&self) -> Result<ActingUser> {
        let sudo_user = std::env::var("SUDO_USER").ok();
        let pkexec_uid = std::env::var("PKEXEC_UID").ok();
        let original = original_user(sudo_user.as_deref(), pkexec_uid.as_deref());
        debug!("Resolving acting user from {:?}", original);
        resolve_user(&original)
    }

    fn set_owner(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        chown(path, Some(Uid::from_raw(uid)), Some(Gid::from_raw(gid))).map_err(|e| {
            SysError::OperationFailed(format!("Failed to chown {}: {}", path.display(), e))
        })
    }
}
