use procfs::{FromRead, Meminfo};
use smbioslib::{DefinedStruct, MemorySize, MemorySizeExtended, MemorySpeed, SMBiosMemoryDevice};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::hardware::smbios;
use crate::hardware::sysfs;
use crate::hardware::types::{MemoryInfo, MemoryModule};
use crate::host::Subsystem;

const BASE_PAGE_SIZE: u64 = 4096;

pub fn collect_memory_info(ctx: &Context) -> Result<MemoryInfo> {
    let meminfo_path = ctx.path("/proc/meminfo");
    let meminfo = Meminfo::from_file(&meminfo_path).map_err(|source| Error::Proc {
        path: meminfo_path.clone(),
        source,
    })?;
    let total_usable_bytes = meminfo.mem_total;

    let modules = collect_modules(ctx);
    let module_total = modules
        .iter()
        .filter_map(|m| m.size_bytes)
        .fold(0u64, u64::saturating_add);
    let total_physical_bytes = if module_total > 0 {
        module_total
    } else {
        total_usable_bytes
    };

    Ok(MemoryInfo {
        total_physical_bytes,
        total_usable_bytes,
        supported_page_sizes: supported_page_sizes(ctx),
        modules,
    })
}

/// Base page plus every huge page size the kernel exposes.
fn supported_page_sizes(ctx: &Context) -> Vec<u64> {
    let mut sizes = vec![BASE_PAGE_SIZE];
    if let Ok(entries) = sysfs::list_dir(ctx.path("/sys/kernel/mm/hugepages")) {
        for name in entries {
            // hugepages-2048kB
            let kb = name
                .strip_prefix("hugepages-")
                .and_then(|rest| rest.strip_suffix("kB"))
                .and_then(|n| n.parse::<u64>().ok());
            if let Some(kb) = kb {
                sizes.push(kb.saturating_mul(1024));
            }
        }
    }
    sizes.sort_unstable();
    sizes.dedup();
    sizes
}

fn collect_modules(ctx: &Context) -> Vec<MemoryModule> {
    let Some(smbios_data) = smbios::load(ctx) else {
        ctx.warn(Subsystem::Memory, "SMBIOS table unavailable; memory modules not listed");
        return Vec::new();
    };

    let mut modules = Vec::new();
    for structure in smbios_data.iter() {
        if let DefinedStruct::MemoryDevice(device) = structure.defined_struct() {
            // Empty slots report no size
            if let Some(size_bytes) = module_size(&device) {
                modules.push(MemoryModule {
                    slot: smbios::text(device.device_locator()),
                    size_bytes: Some(size_bytes),
                    mem_type: module_type(&device),
                    speed_mt_s: module_speed(&device),
                    manufacturer: smbios::text(device.manufacturer()),
                    serial_number: smbios::text(device.serial_number()),
                    part_number: smbios::text(device.part_number()),
                });
            }
        }
    }
    modules
}

fn module_size(device: &SMBiosMemoryDevice) -> Option<u64> {
    let extended = || match device.extended_size() {
        Some(MemorySizeExtended::Megabytes(mb)) if mb > 0 => Some(mib(u64::from(mb))),
        _ => None,
    };

    match device.size()? {
        MemorySize::Kilobytes(kb) if kb > 0 => Some(u64::from(kb).saturating_mul(1024)),
        // 0x7FFF means the real size lives in the extended field
        MemorySize::Megabytes(mb) if mb == 0x7FFF => extended(),
        MemorySize::Megabytes(mb) if mb > 0 => Some(mib(u64::from(mb))),
        MemorySize::SeeExtendedSize => extended(),
        _ => None,
    }
}

fn mib(mb: u64) -> u64 {
    mb.saturating_mul(1024 * 1024)
}

fn module_type(device: &SMBiosMemoryDevice) -> Option<String> {
    let mem_type = device.memory_type()?;
    let type_str = format!("{:?}", mem_type.value).to_uppercase();
    if type_str == "UNKNOWN" || type_str == "OTHER" {
        None
    } else {
        Some(type_str)
    }
}

/// Configured speed when known, else the rated maximum.
fn module_speed(device: &SMBiosMemoryDevice) -> Option<u32> {
    let configured = match device.configured_memory_speed() {
        Some(MemorySpeed::MTs(mts)) if mts > 0 => Some(mts as u32),
        _ => None,
    };
    configured.or_else(|| match device.speed() {
        Some(MemorySpeed::MTs(mts)) if mts > 0 => Some(mts as u32),
        _ => None,
    })
}
