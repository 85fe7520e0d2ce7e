//! The host inventory: one snapshot combining every subsystem probe.
//!
//! [`HostInfo::build`] runs the probes one after another in [`PROBE_ORDER`]
//! and stops at the first failure, returning that probe's error untouched.
//! A `HostInfo` therefore only ever exists with all twelve subsystems filled.

use std::fmt;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::context::{Context, HostOption};
use crate::error::{Error, Result};
use crate::hardware;
use crate::hardware::types::{
    AcceleratorInfo, BaseboardInfo, BiosInfo, BlockInfo, ChassisInfo, CpuInfo, GpuInfo,
    MemoryInfo, NetworkInfo, PciInfo, ProductInfo, TopologyInfo,
};
use crate::output;

/// Top-level key of the structured renderings.
pub const HOST_KEY: &str = "host";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    Memory,
    Block,
    Cpu,
    Topology,
    Network,
    Gpu,
    Accelerator,
    Chassis,
    Bios,
    Baseboard,
    Product,
    Pci,
}

impl Subsystem {
    /// Stable key used in YAML/JSON output and log fields.
    pub fn key(self) -> &'static str {
        match self {
            Subsystem::Memory => "memory",
            Subsystem::Block => "block",
            Subsystem::Cpu => "cpu",
            Subsystem::Topology => "topology",
            Subsystem::Network => "network",
            Subsystem::Gpu => "gpu",
            Subsystem::Accelerator => "accelerator",
            Subsystem::Chassis => "chassis",
            Subsystem::Bios => "bios",
            Subsystem::Baseboard => "baseboard",
            Subsystem::Product => "product",
            Subsystem::Pci => "pci",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Order in which probes run. Kept stable so probe side effects such as log
/// lines always come out in the same sequence.
pub const PROBE_ORDER: [Subsystem; 12] = [
    Subsystem::Memory,
    Subsystem::Block,
    Subsystem::Cpu,
    Subsystem::Topology,
    Subsystem::Network,
    Subsystem::Gpu,
    Subsystem::Accelerator,
    Subsystem::Chassis,
    Subsystem::Bios,
    Subsystem::Baseboard,
    Subsystem::Product,
    Subsystem::Pci,
];

/// Order of the sections in the text rendering.
pub const PRESENTATION_ORDER: [Subsystem; 12] = [
    Subsystem::Block,
    Subsystem::Cpu,
    Subsystem::Gpu,
    Subsystem::Accelerator,
    Subsystem::Memory,
    Subsystem::Network,
    Subsystem::Topology,
    Subsystem::Chassis,
    Subsystem::Bios,
    Subsystem::Baseboard,
    Subsystem::Product,
    Subsystem::Pci,
];

/// Something that can inspect one subsystem.
///
/// Any `Fn(&Context) -> Result<T>` is a probe, so plain collector functions
/// and closures both fit.
pub trait Probe<T> {
    fn probe(&self, ctx: &Context) -> Result<T>;
}

impl<T, F> Probe<T> for F
where
    F: Fn(&Context) -> Result<T>,
{
    fn probe(&self, ctx: &Context) -> Result<T> {
        self(ctx)
    }
}

/// One probe per subsystem.
pub struct Probes {
    pub memory: Box<dyn Probe<MemoryInfo>>,
    pub block: Box<dyn Probe<BlockInfo>>,
    pub cpu: Box<dyn Probe<CpuInfo>>,
    pub topology: Box<dyn Probe<TopologyInfo>>,
    pub network: Box<dyn Probe<NetworkInfo>>,
    pub gpu: Box<dyn Probe<GpuInfo>>,
    pub accelerator: Box<dyn Probe<AcceleratorInfo>>,
    pub chassis: Box<dyn Probe<ChassisInfo>>,
    pub bios: Box<dyn Probe<BiosInfo>>,
    pub baseboard: Box<dyn Probe<BaseboardInfo>>,
    pub product: Box<dyn Probe<ProductInfo>>,
    pub pci: Box<dyn Probe<PciInfo>>,
}

impl Probes {
    /// The collectors that read this machine (or the chroot).
    pub fn system() -> Self {
        Probes {
            memory: Box::new(hardware::collect_memory_info),
            block: Box::new(hardware::collect_block_info),
            cpu: Box::new(hardware::collect_cpu_info),
            topology: Box::new(hardware::collect_topology_info),
            network: Box::new(hardware::collect_network_info),
            gpu: Box::new(hardware::collect_gpus),
            accelerator: Box::new(hardware::collect_accelerators),
            chassis: Box::new(hardware::collect_chassis_info),
            bios: Box::new(hardware::collect_bios_info),
            baseboard: Box::new(hardware::collect_baseboard_info),
            product: Box::new(hardware::collect_product_info),
            pci: Box::new(hardware::collect_pci_info),
        }
    }
}

impl Default for Probes {
    fn default() -> Self {
        Self::system()
    }
}

/// Hardware snapshot of one host. Field order here is the key order of the
/// structured renderings.
#[derive(Debug, Serialize)]
pub struct HostInfo {
    #[serde(skip)]
    ctx: Context,
    memory: MemoryInfo,
    block: BlockInfo,
    cpu: CpuInfo,
    topology: TopologyInfo,
    network: NetworkInfo,
    gpu: GpuInfo,
    accelerator: AcceleratorInfo,
    chassis: ChassisInfo,
    bios: BiosInfo,
    baseboard: BaseboardInfo,
    product: ProductInfo,
    pci: PciInfo,
}

impl HostInfo {
    /// Inventory this machine with the built-in probes.
    pub fn build(opts: &[HostOption]) -> Result<HostInfo> {
        Self::build_with(&Probes::system(), opts)
    }

    #[instrument(name = "build_host", skip_all)]
    pub fn build_with(probes: &Probes, opts: &[HostOption]) -> Result<HostInfo> {
        let ctx = Context::new(opts);
        let mut parts = Parts::default();

        for subsystem in PROBE_ORDER {
            debug!(%subsystem, "probing");
            match subsystem {
                Subsystem::Memory => parts.memory = Some(probes.memory.probe(&ctx)?),
                Subsystem::Block => parts.block = Some(probes.block.probe(&ctx)?),
                Subsystem::Cpu => parts.cpu = Some(probes.cpu.probe(&ctx)?),
                Subsystem::Topology => parts.topology = Some(probes.topology.probe(&ctx)?),
                Subsystem::Network => parts.network = Some(probes.network.probe(&ctx)?),
                Subsystem::Gpu => parts.gpu = Some(probes.gpu.probe(&ctx)?),
                Subsystem::Accelerator => {
                    parts.accelerator = Some(probes.accelerator.probe(&ctx)?)
                }
                Subsystem::Chassis => parts.chassis = Some(probes.chassis.probe(&ctx)?),
                Subsystem::Bios => parts.bios = Some(probes.bios.probe(&ctx)?),
                Subsystem::Baseboard => parts.baseboard = Some(probes.baseboard.probe(&ctx)?),
                Subsystem::Product => parts.product = Some(probes.product.probe(&ctx)?),
                Subsystem::Pci => parts.pci = Some(probes.pci.probe(&ctx)?),
            }
        }

        parts.finish(ctx)
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn memory(&self) -> &MemoryInfo {
        &self.memory
    }

    pub fn block(&self) -> &BlockInfo {
        &self.block
    }

    pub fn cpu(&self) -> &CpuInfo {
        &self.cpu
    }

    pub fn topology(&self) -> &TopologyInfo {
        &self.topology
    }

    pub fn network(&self) -> &NetworkInfo {
        &self.network
    }

    pub fn gpu(&self) -> &GpuInfo {
        &self.gpu
    }

    pub fn accelerator(&self) -> &AcceleratorInfo {
        &self.accelerator
    }

    pub fn chassis(&self) -> &ChassisInfo {
        &self.chassis
    }

    pub fn bios(&self) -> &BiosInfo {
        &self.bios
    }

    pub fn baseboard(&self) -> &BaseboardInfo {
        &self.baseboard
    }

    pub fn product(&self) -> &ProductInfo {
        &self.product
    }

    pub fn pci(&self) -> &PciInfo {
        &self.pci
    }

    /// The text form of a single subsystem.
    pub fn section(&self, subsystem: Subsystem) -> &dyn fmt::Display {
        match subsystem {
            Subsystem::Memory => &self.memory,
            Subsystem::Block => &self.block,
            Subsystem::Cpu => &self.cpu,
            Subsystem::Topology => &self.topology,
            Subsystem::Network => &self.network,
            Subsystem::Gpu => &self.gpu,
            Subsystem::Accelerator => &self.accelerator,
            Subsystem::Chassis => &self.chassis,
            Subsystem::Bios => &self.bios,
            Subsystem::Baseboard => &self.baseboard,
            Subsystem::Product => &self.product,
            Subsystem::Pci => &self.pci,
        }
    }

    /// One line per subsystem in [`PRESENTATION_ORDER`], newline terminated.
    pub fn text(&self) -> String {
        self.to_string()
    }

    /// YAML under a top-level `host:` key.
    pub fn to_yaml(&self) -> Result<String> {
        output::to_yaml(&self.ctx, HOST_KEY, self)
    }

    /// JSON under a top-level `"host"` key.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        output::to_json(&self.ctx, HOST_KEY, self, pretty)
    }
}

impl fmt::Display for HostInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for subsystem in PRESENTATION_ORDER {
            writeln!(f, "{}", self.section(subsystem))?;
        }
        Ok(())
    }
}

/// Results gathered so far during one build.
#[derive(Default)]
struct Parts {
    memory: Option<MemoryInfo>,
    block: Option<BlockInfo>,
    cpu: Option<CpuInfo>,
    topology: Option<TopologyInfo>,
    network: Option<NetworkInfo>,
    gpu: Option<GpuInfo>,
    accelerator: Option<AcceleratorInfo>,
    chassis: Option<ChassisInfo>,
    bios: Option<BiosInfo>,
    baseboard: Option<BaseboardInfo>,
    product: Option<ProductInfo>,
    pci: Option<PciInfo>,
}

fn take<T>(value: Option<T>, subsystem: Subsystem) -> Result<T> {
    value.ok_or(Error::Incomplete { subsystem })
}

impl Parts {
    fn finish(self, ctx: Context) -> Result<HostInfo> {
        Ok(HostInfo {
            ctx,
            memory: take(self.memory, Subsystem::Memory)?,
            block: take(self.block, Subsystem::Block)?,
            cpu: take(self.cpu, Subsystem::Cpu)?,
            topology: take(self.topology, Subsystem::Topology)?,
            network: take(self.network, Subsystem::Network)?,
            gpu: take(self.gpu, Subsystem::Gpu)?,
            accelerator: take(self.accelerator, Subsystem::Accelerator)?,
            chassis: take(self.chassis, Subsystem::Chassis)?,
            bios: take(self.bios, Subsystem::Bios)?,
            baseboard: take(self.baseboard, Subsystem::Baseboard)?,
            product: take(self.product, Subsystem::Product)?,
            pci: take(self.pci, Subsystem::Pci)?,
        })
    }
}
