use std::collections::HashMap;

use nvml_wrapper::Nvml;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::hardware::collect_pci::{self, PCI_DEVICES};
use crate::hardware::pci_ids;
use crate::hardware::sysfs;
use crate::hardware::types::{GpuInfo, GraphicsCard, PciDevice};
use crate::host::Subsystem;

/// PCI base class 0x03: VGA (0300), XGA (0301), 3D (0302) and other display (0380).
const DISPLAY_CLASS: &str = "03";
const NVIDIA_VENDOR_ID: &str = "10de";

pub fn collect_gpus(ctx: &Context) -> Result<GpuInfo> {
    let db = pci_ids::load(ctx, Subsystem::Gpu);
    let devices = match collect_pci::scan_devices(ctx, db) {
        Ok(devices) => devices,
        Err(Error::Io { .. }) => {
            ctx.warn(
                Subsystem::Gpu,
                format!("{} not readable; no graphics cards listed", PCI_DEVICES),
            );
            return Ok(GpuInfo::default());
        }
        Err(e) => return Err(e),
    };

    let displays: Vec<PciDevice> = devices
        .into_iter()
        .filter(|d| d.class_prefix() == DISPLAY_CLASS)
        .collect();
    let has_nvidia = displays.iter().any(|d| d.vendor_id == NVIDIA_VENDOR_ID);

    let drm_cards = drm_card_indexes(ctx);
    let mut cards: Vec<GraphicsCard> = displays
        .into_iter()
        .map(|d| graphics_card(d, &drm_cards))
        .collect();

    if has_nvidia {
        enhance_nvidia_cards(ctx, &mut cards);
    }

    Ok(GpuInfo { cards })
}

fn graphics_card(device: PciDevice, drm_cards: &HashMap<String, u32>) -> GraphicsCard {
    GraphicsCard {
        index: drm_cards.get(&device.address).copied(),
        pci_address: device.address,
        vendor: device.vendor_name,
        model: device.product_name,
        driver: device.driver,
        vram_bytes: None,
        driver_version: None,
        uuid: None,
    }
}

/// `/sys/class/drm/card<N>/device` points at the card's PCI device.
fn drm_card_indexes(ctx: &Context) -> HashMap<String, u32> {
    let drm_root = ctx.path("/sys/class/drm");
    let Ok(entries) = sysfs::list_dir(&drm_root) else {
        return HashMap::new();
    };

    entries
        .into_iter()
        .filter_map(|name| {
            // card0, but not card0-DP-1 connectors
            let index = name.strip_prefix("card")?.parse::<u32>().ok()?;
            let address = sysfs::read_link_name(drm_root.join(&name).join("device"))?;
            Some((address, index))
        })
        .collect()
}

/// Fill VRAM, UUID and driver version from NVML when the library is present.
fn enhance_nvidia_cards(ctx: &Context, cards: &mut [GraphicsCard]) {
    if !ctx.tools_enabled() || ctx.is_chrooted() {
        return;
    }
    let nvml = match Nvml::init() {
        Ok(nvml) => nvml,
        Err(e) => {
            tracing::debug!(error = %e, "NVML unavailable");
            return;
        }
    };

    let driver_version = nvml.sys_driver_version().ok();
    let Ok(count) = nvml.device_count() else {
        return;
    };

    for i in 0..count {
        let Ok(device) = nvml.device_by_index(i) else {
            continue;
        };
        let Ok(pci) = device.pci_info() else {
            continue;
        };
        let Some(card) = cards
            .iter_mut()
            .find(|c| same_pci_address(&pci.bus_id, &c.pci_address))
        else {
            continue;
        };

        card.vram_bytes = device.memory_info().ok().map(|m| m.total);
        card.uuid = device.uuid().ok();
        card.driver_version = driver_version.clone();
    }
}

/// NVML reports `00000000:3B:00.0`, sysfs `0000:3b:00.0`.
fn same_pci_address(nvml_bus_id: &str, sysfs_address: &str) -> bool {
    let ours = nvml_bus_id.to_lowercase();
    let theirs = sysfs_address.to_lowercase();
    match (ours.split_once(':'), theirs.split_once(':')) {
        (Some((_, a)), Some((_, b))) => a == b,
        _ => ours == theirs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_pci_address() {
        assert!(same_pci_address("00000000:3B:00.0", "0000:3b:00.0"));
        assert!(!same_pci_address("00000000:3B:00.0", "0000:3c:00.0"));
    }
}
