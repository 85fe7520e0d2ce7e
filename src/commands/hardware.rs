use std::fmt::Display;

use serde::Serialize;

use crate::cli::{Commands, OutputArgs};
use crate::context::{Context, HostOption};
use crate::error::Result;
use crate::hardware;
use crate::host::{HostInfo, Subsystem};
use crate::output::{render, Format};

/// Run one command and return what should be printed, newline terminated.
pub fn handle_hardware_command(cmd: &Commands, opts: &[HostOption]) -> Result<String> {
    let rendered = match cmd {
        Commands::Host(args) => {
            let host = HostInfo::build(opts)?;
            match args.format {
                Format::Text => host.text(),
                Format::Yaml => host.to_yaml()?,
                Format::Json => host.to_json(!args.compact)?,
            }
        }
        Commands::Memory(args) => {
            single(opts, Subsystem::Memory, args, hardware::collect_memory_info)?
        }
        Commands::Block(args) => single(opts, Subsystem::Block, args, hardware::collect_block_info)?,
        Commands::Cpu(args) => single(opts, Subsystem::Cpu, args, hardware::collect_cpu_info)?,
        Commands::Topology(args) => {
            single(opts, Subsystem::Topology, args, hardware::collect_topology_info)?
        }
        Commands::Network(args) => {
            single(opts, Subsystem::Network, args, hardware::collect_network_info)?
        }
        Commands::Gpu(args) => single(opts, Subsystem::Gpu, args, hardware::collect_gpus)?,
        Commands::Accelerator(args) => {
            single(opts, Subsystem::Accelerator, args, hardware::collect_accelerators)?
        }
        Commands::Chassis(args) => {
            single(opts, Subsystem::Chassis, args, hardware::collect_chassis_info)?
        }
        Commands::Bios(args) => single(opts, Subsystem::Bios, args, hardware::collect_bios_info)?,
        Commands::Baseboard(args) => {
            single(opts, Subsystem::Baseboard, args, hardware::collect_baseboard_info)?
        }
        Commands::Product(args) => {
            single(opts, Subsystem::Product, args, hardware::collect_product_info)?
        }
        Commands::Pci(args) => single(opts, Subsystem::Pci, args, hardware::collect_pci_info)?,
    };

    Ok(terminated(rendered))
}

/// Probe one subsystem and render it under its own key.
fn single<T, F>(
    opts: &[HostOption],
    subsystem: Subsystem,
    args: &OutputArgs,
    probe: F,
) -> Result<String>
where
    T: Serialize + Display,
    F: Fn(&Context) -> Result<T>,
{
    let ctx = Context::new(opts);
    let info = probe(&ctx)?;
    render(&ctx, subsystem.key(), &info, args.format, !args.compact)
}

fn terminated(mut s: String) -> String {
    if !s.ends_with('\n') {
        s.push('\n');
    }
    s
}
