// SPDX-License-Identifier: GPL-3.0-only

//! External command execution
//!
//! Everything the configurator asks of the host tooling (blkid, lsblk,
//! mountpoint, mount, umount) goes through [`CommandRunner`], so tests can
//! script every failure mode without real devices.

use std::process::Command;

use tracing::debug;

use crate::error::{Result, SysError};

/// Narrow capability for running host commands synchronously
pub trait CommandRunner {
    /// Run `program` with `args`, returning trimmed stdout.
    ///
    /// A non-zero exit yields [`SysError::CommandFailed`] carrying stderr;
    /// a program that cannot be started yields [`SysError::CommandUnavailable`].
    fn run(&self, program: &str, args: &[&str]) -> Result<String>;

    /// Run `program` with `args` and report only whether it exited with 0.
    fn succeeds(&self, program: &str, args: &[&str]) -> Result<bool>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        (**self).run(program, args)
    }

    fn succeeds(&self, program: &str, args: &[&str]) -> Result<bool> {
        (**self).succeeds(program, args)
    }
}

/// Render a command line for logs and error messages
pub fn render(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// [`CommandRunner`] backed by `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let rendered = render(program, args);
        debug!("Running {}", rendered);

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| SysError::CommandUnavailable {
                command: rendered.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stderr = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            debug!("{} failed: {}", rendered, stderr);
            return Err(SysError::CommandFailed {
                command: rendered,
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn succeeds(&self, program: &str, args: &[&str]) -> Result<bool> {
        let rendered = render(program, args);
        debug!("Checking exit status of {}", rendered);

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| SysError::CommandUnavailable {
                command: rendered,
                source,
            })?;

        Ok(output.status.success())
    }
}
