use crate::context::Context;
use crate::error::{Error, Result};
use crate::hardware::collect_pci::{self, PCI_DEVICES};
use crate::hardware::pci_ids;
use crate::hardware::types::{AcceleratorDevice, AcceleratorInfo, PciDevice};
use crate::host::Subsystem;

/// Processing accelerators (base class 0x12), e.g. NPUs and inference cards.
const PROCESSING_ACCELERATOR_CLASS: &str = "12";
/// Co-processors (class 0x0b, subclass 0x40).
const COPROCESSOR_SUBCLASS: &str = "0b40";

pub fn collect_accelerators(ctx: &Context) -> Result<AcceleratorInfo> {
    let db = pci_ids::load(ctx, Subsystem::Accelerator);
    let devices = match collect_pci::scan_devices(ctx, db) {
        Ok(devices) => devices,
        Err(Error::Io { .. }) => {
            ctx.warn(
                Subsystem::Accelerator,
                format!("{} not readable; no accelerators listed", PCI_DEVICES),
            );
            return Ok(AcceleratorInfo::default());
        }
        Err(e) => return Err(e),
    };

    let devices = devices
        .into_iter()
        .filter(is_accelerator)
        .map(|d| AcceleratorDevice {
            pci_address: d.address,
            vendor: d.vendor_name,
            model: d.product_name,
            class_code: d.class_code,
            driver: d.driver,
        })
        .collect();

    Ok(AcceleratorInfo { devices })
}

fn is_accelerator(device: &PciDevice) -> bool {
    device.class_prefix() == PROCESSING_ACCELERATOR_CLASS
        || device.subclass_prefix() == COPROCESSOR_SUBCLASS
}
