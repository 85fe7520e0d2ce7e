use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::context::HostOption;
use crate::output::Format;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "host-inventory")]
#[command(about = "Report the hardware of a host")]
pub struct Cli {
    /// Inspect a captured root filesystem instead of this machine
    #[arg(long, global = true, env = "HOST_INVENTORY_CHROOT")]
    pub chroot: Option<PathBuf>,

    /// Do not log warnings about missing or partial information
    #[arg(long, global = true, env = "HOST_INVENTORY_DISABLE_WARNINGS")]
    pub disable_warnings: bool,

    /// Do not run external tools (ip, ethtool, smartctl, NVML)
    #[arg(long, global = true, env = "HOST_INVENTORY_DISABLE_TOOLS")]
    pub disable_tools: bool,

    /// Hide serial numbers, asset tags, UUIDs and MAC addresses in YAML/JSON
    #[arg(long, global = true)]
    pub redact: bool,

    /// Path to a pci.ids database
    #[arg(long, global = true)]
    pub pci_ids: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Global flags as inventory options, in a fixed order.
    pub fn host_options(&self) -> Vec<HostOption> {
        let mut opts = Vec::new();
        if let Some(root) = &self.chroot {
            opts.push(HostOption::Chroot(root.clone()));
        }
        if self.disable_warnings {
            opts.push(HostOption::DisableWarnings);
        }
        if self.disable_tools {
            opts.push(HostOption::DisableTools);
        }
        if self.redact {
            opts.push(HostOption::RedactSensitive);
        }
        if let Some(path) = &self.pci_ids {
            opts.push(HostOption::PciIds(path.clone()));
        }
        opts
    }
}

#[derive(Args, Clone, Copy)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: Format,

    /// Single-line JSON instead of indented
    #[arg(long)]
    pub compact: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Full inventory of every subsystem
    Host(OutputArgs),
    /// Physical and usable memory, memory modules
    Memory(OutputArgs),
    /// Disks and partitions
    Block(OutputArgs),
    /// Processor packages, cores and threads
    Cpu(OutputArgs),
    /// NUMA nodes
    Topology(OutputArgs),
    /// Network interfaces and routes
    Network(OutputArgs),
    /// Graphics cards
    Gpu(OutputArgs),
    /// Processing accelerators and co-processors
    Accelerator(OutputArgs),
    /// Chassis identity
    Chassis(OutputArgs),
    /// BIOS vendor, version and date
    Bios(OutputArgs),
    /// Baseboard (motherboard) identity
    Baseboard(OutputArgs),
    /// System product identity
    Product(OutputArgs),
    /// PCI devices
    Pci(OutputArgs),
}
