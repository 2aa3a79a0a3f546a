// SPDX-License-Identifier: GPL-3.0-only

//! Register partitions in the mount table and mount them

mod config;
mod logging;
mod prompt;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, bail};
use automount_sys::{
    FstabTable, MountConfigurator, NTFS_GUIDANCE, Outcome, SysError, SystemCommandRunner,
    find_device, list_block_devices,
};
use automount_types::{DeviceInfo, partition_entries};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use crate::config::{Config, LoggingLevel};
use crate::prompt::TerminalPrompt;

/// Persistent mount configuration for block device partitions
#[derive(Parser)]
#[command(name = "automount", version)]
#[command(about = "Add or remove mount table entries for partitions", long_about = None)]
struct Cli {
    /// Mount table to edit (overrides the configuration file)
    #[arg(long, global = true)]
    fstab: Option<PathBuf>,

    /// Log level (overrides the configuration file)
    #[arg(long, global = true, value_enum)]
    log_level: Option<LoggingLevel>,

    /// Also print log events on the terminal
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List partitions, split into unmounted and mounted
    List {
        /// Print the device list as JSON
        #[arg(long)]
        json: bool,
        /// Include whole disks
        #[arg(long)]
        all: bool,
    },
    /// Add a mount table entry for a partition and mount it
    Configure {
        /// Kernel device name (e.g. sdb1)
        device: String,
        /// Directory to mount the partition on
        mountpoint: PathBuf,
        /// Three-digit octal umask for filesystems without Unix ownership
        #[arg(long)]
        umask: Option<String>,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Unmount a partition and remove its mount table entry
    Unmount {
        /// Kernel device name (e.g. sdb1)
        device: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("automount: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(fstab) = &cli.fstab {
        config.fstab_path = fstab.clone();
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    logging::init(&config, cli.verbose);

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            if let Some(SysError::NtfsUnsupported(_)) = e.downcast_ref::<SysError>() {
                eprintln!("{NTFS_GUIDANCE}");
                eprintln!(
                    "The entry was not kept: {} has been restored.",
                    config.fstab_path.display()
                );
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: &Config) -> Result<()> {
    if which::which("lsblk").is_err() {
        bail!("lsblk is required to run automount");
    }

    let runner = SystemCommandRunner;
    match command {
        Commands::List { json, all } => {
            let devices = list_block_devices(&runner)?;
            let devices = if all {
                devices
            } else {
                partition_entries(&devices)
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&devices)?);
            } else {
                print_devices(&devices);
            }
        }
        Commands::Configure {
            device,
            mountpoint,
            umask,
            yes,
        } => {
            require_root()?;
            let device = find_device(&runner, &device)?;
            let umask = umask.unwrap_or_else(|| config.default_umask.clone());
            let configurator = MountConfigurator::system(FstabTable::new(&config.fstab_path));
            let mut prompt = TerminalPrompt::new(yes, config.fstab_path.display().to_string());

            info!("Configuring {} at {}", device.name, mountpoint.display());
            match configurator.configure(&device, &mountpoint, &umask, &mut prompt)? {
                Outcome::Performed => println!("Mount configured at {}.", mountpoint.display()),
                Outcome::Declined => println!("Operation cancelled."),
            }
        }
        Commands::Unmount { device, yes } => {
            require_root()?;
            let device = find_device(&runner, &device)?;
            let configurator = MountConfigurator::system(FstabTable::new(&config.fstab_path));
            let mut prompt = TerminalPrompt::new(yes, config.fstab_path.display().to_string());

            info!("Unmounting {}", device.name);
            match configurator.unmount(&device, &mut prompt)? {
                Outcome::Performed => println!("{} unmounted.", device.name),
                Outcome::Declined => println!("Operation cancelled."),
            }
        }
    }

    Ok(())
}

fn require_root() -> Result<()> {
    if !nix::unistd::geteuid().is_root() {
        bail!("this command must be run with administrator privileges (sudo)");
    }
    Ok(())
}

fn print_devices(devices: &[DeviceInfo]) {
    let (mounted, unmounted): (Vec<&DeviceInfo>, Vec<&DeviceInfo>) =
        devices.iter().partition(|device| device.is_mounted());

    println!("Unmounted:");
    print_rows(&unmounted);
    println!();
    println!("Mounted:");
    print_rows(&mounted);
}

fn print_rows(devices: &[&DeviceInfo]) {
    if devices.is_empty() {
        println!("  (none)");
        return;
    }

    println!(
        "  {:<16} {:>8} {:<5} {:<12} MOUNTPOINT",
        "NAME", "SIZE", "TYPE", "FSTYPE"
    );
    for device in devices {
        println!(
            "  {:<16} {:>8} {:<5} {:<12} {}",
            device.name,
            device.size.as_deref().unwrap_or(""),
            device.device_type,
            device.filesystem_type.as_deref().unwrap_or(""),
            device.mountpoint.as_deref().unwrap_or("")
        );
    }
}
