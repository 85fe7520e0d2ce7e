use std::path::Path;

use pciid_parser::Database;

use crate::context::Context;
use crate::error::Result;
use crate::hardware::pci_ids;
use crate::hardware::sysfs::{self, read_to_string_trim};
use crate::hardware::types::{PciDevice, PciInfo};
use crate::host::Subsystem;

pub const PCI_DEVICES: &str = "/sys/bus/pci/devices";

pub fn collect_pci_info(ctx: &Context) -> Result<PciInfo> {
    let db = pci_ids::load(ctx, Subsystem::Pci);
    let devices = scan_devices(ctx, db)?;
    Ok(PciInfo { devices })
}

/// Every device under the PCI bus, sorted by address.
pub(crate) fn scan_devices(ctx: &Context, db: Option<&Database>) -> Result<Vec<PciDevice>> {
    let root = ctx.path(PCI_DEVICES);
    let devices = sysfs::list_dir(&root)?
        .into_iter()
        .map(|address| read_device(db, &root.join(&address), address))
        .collect();
    Ok(devices)
}

fn read_device(db: Option<&Database>, device_path: &Path, address: String) -> PciDevice {
    let vendor_id = read_hex_id(device_path, "vendor");
    let product_id = read_hex_id(device_path, "device");
    let (vendor_name, product_name) = pci_ids::lookup(db, &vendor_id, &product_id);

    PciDevice {
        address,
        vendor_name,
        product_name,
        class_code: read_hex_id(device_path, "class"),
        revision: read_to_string_trim(device_path.join("revision"))
            .map(|r| strip_hex_prefix(&r).to_string()),
        driver: sysfs::read_link_name(device_path.join("driver")),
        vendor_id,
        product_id,
    }
}

/// sysfs IDs without the `0x`, lowercase; empty when the file is missing.
fn read_hex_id(device_path: &Path, file: &str) -> String {
    read_to_string_trim(device_path.join(file))
        .map(|v| strip_hex_prefix(&v).to_lowercase())
        .unwrap_or_default()
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}
