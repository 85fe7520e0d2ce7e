use std::fmt;

use serde::Serialize;

pub const UNKNOWN: &str = "unknown";

/// Render a byte count the way `free -h` would, e.g. `15.6GiB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{}{}", bytes, UNITS[0])
    } else {
        format!("{:.1}{}", value, UNITS[unit])
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{} {}", n, one)
    } else {
        format!("{} {}", n, many)
    }
}

//
// Memory
//

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemoryInfo {
    pub total_physical_bytes: u64,
    pub total_usable_bytes: u64,
    pub supported_page_sizes: Vec<u64>,
    pub modules: Vec<MemoryModule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemoryModule {
    pub slot: Option<String>,
    pub size_bytes: Option<u64>,
    pub mem_type: Option<String>,
    pub speed_mt_s: Option<u32>,
    pub manufacturer: Option<String>,
    pub serial_number: Option<String>,
    pub part_number: Option<String>,
}

impl fmt::Display for MemoryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "memory ({} physical, {} usable)",
            format_bytes(self.total_physical_bytes),
            format_bytes(self.total_usable_bytes)
        )
    }
}

//
// Block storage
//

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlockInfo {
    pub total_size_bytes: u64,
    pub disks: Vec<Disk>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Disk {
    pub name: String,
    pub dev_path: String,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub size_bytes: Option<u64>,
    pub rotational: Option<bool>,
    pub bus_type: Option<String>, // "nvme", "scsi", "virtio", etc.
    pub firmware_version: Option<String>,
    pub partitions: Vec<Partition>,
    pub smart_health: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Partition {
    pub name: String,
    pub size_bytes: Option<u64>,
}

impl fmt::Display for BlockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "block storage ({}, {} physical storage)",
            plural(self.disks.len(), "disk", "disks"),
            format_bytes(self.total_size_bytes)
        )
    }
}

//
// CPU
//

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuInfo {
    pub total_cores: u32,
    pub total_threads: u32,
    pub processors: Vec<Processor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Processor {
    pub id: u32,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub num_cores: u32,
    pub num_threads: u32,
    pub capabilities: Vec<String>,
    pub slot: Option<String>,
    pub capacity_mhz: Option<u32>,
    pub l1_cache_kb: Option<u32>,
    pub l2_cache_kb: Option<u32>,
    pub l3_cache_kb: Option<u32>,
}

impl fmt::Display for CpuInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cpu ({}, {} cores, {} hardware threads)",
            plural(self.processors.len(), "physical package", "physical packages"),
            self.total_cores,
            self.total_threads
        )
    }
}

//
// Topology
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    #[default]
    Smp,
    Numa,
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::Smp => f.write_str("SMP"),
            Architecture::Numa => f.write_str("NUMA"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopologyInfo {
    pub architecture: Architecture,
    pub nodes: Vec<TopologyNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopologyNode {
    pub id: u32,
    pub cpus: Vec<u32>,
    pub memory_bytes: Option<u64>,
    pub distances: Vec<u32>,
}

impl fmt::Display for TopologyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "topology {} ({})",
            self.architecture,
            plural(self.nodes.len(), "node", "nodes")
        )
    }
}

//
// Network
//

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkInfo {
    pub nics: Vec<Nic>,
    pub routes: Vec<RouteInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Nic {
    pub name: String,
    pub mac_address: Option<String>,
    pub is_virtual: bool,
    pub mtu: Option<u32>,
    pub speed_mbps: Option<u32>,
    pub driver: Option<String>,
    pub firmware_version: Option<String>,
    pub vendor_name: Option<String>,
    pub device_name: Option<String>,
    pub pci_address: Option<String>,
    pub addresses: Vec<IpAddress>,

    // Bond/Team configuration
    pub bond_master: Option<String>,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct IpAddress {
    pub family: String, // "inet" or "inet6"
    pub address: String,
    pub prefix: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteInfo {
    pub dst: String,     // CIDR
    pub gateway: String, // IP
    pub iface: String,
}

impl fmt::Display for NetworkInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "net ({})", plural(self.nics.len(), "NIC", "NICs"))
    }
}

//
// PCI
//

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PciInfo {
    pub devices: Vec<PciDevice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PciDevice {
    pub address: String,
    pub vendor_id: String,
    pub product_id: String,
    pub vendor_name: Option<String>,
    pub product_name: Option<String>,
    /// Six hex digits: class, subclass, programming interface.
    pub class_code: String,
    pub revision: Option<String>,
    pub driver: Option<String>,
}

impl PciDevice {
    pub fn class_prefix(&self) -> &str {
        self.class_code.get(..2).unwrap_or("")
    }

    pub fn subclass_prefix(&self) -> &str {
        self.class_code.get(..4).unwrap_or("")
    }
}

impl fmt::Display for PciInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PCI ({})", plural(self.devices.len(), "device", "devices"))
    }
}

//
// GPU
//

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GpuInfo {
    pub cards: Vec<GraphicsCard>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphicsCard {
    pub index: Option<u32>,
    pub pci_address: String,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub driver: Option<String>,
    pub vram_bytes: Option<u64>,
    pub driver_version: Option<String>,
    pub uuid: Option<String>,
}

impl fmt::Display for GpuInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gpu ({})",
            plural(self.cards.len(), "graphics card", "graphics cards")
        )
    }
}

//
// Accelerators
//

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AcceleratorInfo {
    pub devices: Vec<AcceleratorDevice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AcceleratorDevice {
    pub pci_address: String,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub class_code: String,
    pub driver: Option<String>,
}

impl fmt::Display for AcceleratorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processing accelerators ({})",
            plural(self.devices.len(), "device", "devices")
        )
    }
}

//
// DMI: chassis, BIOS, baseboard, product
//

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChassisInfo {
    pub asset_tag: String,
    pub serial_number: String,
    pub chassis_type: String,
    pub type_description: String,
    pub vendor: String,
    pub version: String,
}

impl Default for ChassisInfo {
    fn default() -> Self {
        ChassisInfo {
            asset_tag: UNKNOWN.to_string(),
            serial_number: UNKNOWN.to_string(),
            chassis_type: UNKNOWN.to_string(),
            type_description: UNKNOWN.to_string(),
            vendor: UNKNOWN.to_string(),
            version: UNKNOWN.to_string(),
        }
    }
}

impl fmt::Display for ChassisInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "chassis type={} vendor={} version={}",
            self.type_description, self.vendor, self.version
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiosInfo {
    pub vendor: String,
    pub version: String,
    pub date: String,
}

impl Default for BiosInfo {
    fn default() -> Self {
        BiosInfo {
            vendor: UNKNOWN.to_string(),
            version: UNKNOWN.to_string(),
            date: UNKNOWN.to_string(),
        }
    }
}

impl fmt::Display for BiosInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bios vendor={} version={} date={}",
            self.vendor, self.version, self.date
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseboardInfo {
    pub asset_tag: String,
    pub serial_number: String,
    pub vendor: String,
    pub version: String,
    pub product: String,
}

impl Default for BaseboardInfo {
    fn default() -> Self {
        BaseboardInfo {
            asset_tag: UNKNOWN.to_string(),
            serial_number: UNKNOWN.to_string(),
            vendor: UNKNOWN.to_string(),
            version: UNKNOWN.to_string(),
            product: UNKNOWN.to_string(),
        }
    }
}

impl fmt::Display for BaseboardInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "baseboard vendor={} product={} version={} serial={}",
            self.vendor, self.product, self.version, self.serial_number
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductInfo {
    pub family: String,
    pub name: String,
    pub vendor: String,
    pub serial_number: String,
    pub uuid: String,
    pub sku: String,
    pub version: String,
}

impl Default for ProductInfo {
    fn default() -> Self {
        ProductInfo {
            family: UNKNOWN.to_string(),
            name: UNKNOWN.to_string(),
            vendor: UNKNOWN.to_string(),
            serial_number: UNKNOWN.to_string(),
            uuid: UNKNOWN.to_string(),
            sku: UNKNOWN.to_string(),
            version: UNKNOWN.to_string(),
        }
    }
}

impl fmt::Display for ProductInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "product family={} name={} vendor={} sku={} version={}",
            self.family, self.name, self.vendor, self.sku, self.version
        )
    }
}
