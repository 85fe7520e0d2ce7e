// Hardware inventory collection modules
pub mod types;
pub mod collect_memory;
pub mod collect_block;
pub mod collect_cpu;
pub mod collect_topology;
pub mod collect_network;
pub mod collect_gpus;
pub mod collect_accelerators;
pub mod collect_dmi;
pub mod collect_pci;
mod pci_ids;
mod smbios;
mod sysfs;

// Re-export the probe entry points
pub use collect_memory::collect_memory_info;
pub use collect_block::collect_block_info;
pub use collect_cpu::collect_cpu_info;
pub use collect_topology::collect_topology_info;
pub use collect_network::collect_network_info;
pub use collect_gpus::collect_gpus;
pub use collect_accelerators::collect_accelerators;
pub use collect_dmi::{
    collect_baseboard_info, collect_bios_info, collect_chassis_info, collect_product_info,
};
pub use collect_pci::collect_pci_info;
