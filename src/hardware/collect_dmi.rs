use std::cell::OnceCell;

use smbioslib::{DefinedStruct, SystemUuidData};

use crate::context::Context;
use crate::error::Result;
use crate::hardware::smbios;
use crate::hardware::sysfs::read_to_string_trim;
use crate::hardware::types::{BaseboardInfo, BiosInfo, ChassisInfo, ProductInfo, UNKNOWN};
use crate::host::Subsystem;

const DMI_ID: &str = "/sys/class/dmi/id";

pub fn collect_chassis_info(ctx: &Context) -> Result<ChassisInfo> {
    let dmi = DmiSource::new(ctx, Subsystem::Chassis);
    let chassis_type = dmi.value("chassis_type", |t| t.chassis_type.clone());
    let type_description = chassis_type
        .parse::<u8>()
        .ok()
        .and_then(chassis_type_description)
        .unwrap_or(UNKNOWN)
        .to_string();

    Ok(ChassisInfo {
        asset_tag: dmi.value("chassis_asset_tag", |t| t.chassis_asset_tag.clone()),
        serial_number: dmi.value("chassis_serial", |t| t.chassis_serial.clone()),
        chassis_type,
        type_description,
        vendor: dmi.value("chassis_vendor", |t| t.chassis_vendor.clone()),
        version: dmi.value("chassis_version", |t| t.chassis_version.clone()),
    })
}

pub fn collect_bios_info(ctx: &Context) -> Result<BiosInfo> {
    let dmi = DmiSource::new(ctx, Subsystem::Bios);
    Ok(BiosInfo {
        vendor: dmi.value("bios_vendor", |t| t.bios_vendor.clone()),
        version: dmi.value("bios_version", |t| t.bios_version.clone()),
        date: dmi.value("bios_date", |t| t.bios_date.clone()),
    })
}

pub fn collect_baseboard_info(ctx: &Context) -> Result<BaseboardInfo> {
    let dmi = DmiSource::new(ctx, Subsystem::Baseboard);
    Ok(BaseboardInfo {
        asset_tag: dmi.value("board_asset_tag", |t| t.board_asset_tag.clone()),
        serial_number: dmi.value("board_serial", |t| t.board_serial.clone()),
        vendor: dmi.value("board_vendor", |t| t.board_vendor.clone()),
        version: dmi.value("board_version", |t| t.board_version.clone()),
        product: dmi.value("board_name", |t| t.board_name.clone()),
    })
}

pub fn collect_product_info(ctx: &Context) -> Result<ProductInfo> {
    let dmi = DmiSource::new(ctx, Subsystem::Product);
    Ok(ProductInfo {
        family: dmi.value("product_family", |t| t.product_family.clone()),
        name: dmi.value("product_name", |t| t.product_name.clone()),
        vendor: dmi.value("sys_vendor", |t| t.sys_vendor.clone()),
        serial_number: dmi.value("product_serial", |t| t.product_serial.clone()),
        uuid: dmi.value("product_uuid", |t| t.product_uuid.clone()),
        sku: dmi.value("product_sku", |t| t.product_sku.clone()),
        version: dmi.value("product_version", |t| t.product_version.clone()),
    })
}

/// sysfs DMI attributes first, the raw SMBIOS table only when sysfs lacks a
/// value. The table is parsed at most once per probe.
struct DmiSource<'a> {
    ctx: &'a Context,
    subsystem: Subsystem,
    table: OnceCell<Option<SmbiosStrings>>,
}

impl<'a> DmiSource<'a> {
    fn new(ctx: &'a Context, subsystem: Subsystem) -> Self {
        DmiSource {
            ctx,
            subsystem,
            table: OnceCell::new(),
        }
    }

    fn value(
        &self,
        attribute: &str,
        from_table: impl FnOnce(&SmbiosStrings) -> Option<String>,
    ) -> String {
        read_to_string_trim(self.ctx.path(DMI_ID).join(attribute))
            .filter(|v| !smbios::is_placeholder(v))
            .or_else(|| self.table().and_then(from_table))
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    fn table(&self) -> Option<&SmbiosStrings> {
        self.table
            .get_or_init(|| {
                let strings = SmbiosStrings::load(self.ctx);
                if strings.is_none() && !self.ctx.path(DMI_ID).exists() {
                    self.ctx.warn(self.subsystem, "no DMI information available");
                }
                strings
            })
            .as_ref()
    }
}

#[derive(Default)]
struct SmbiosStrings {
    chassis_asset_tag: Option<String>,
    chassis_type: Option<String>,
    chassis_serial: Option<String>,
    chassis_vendor: Option<String>,
    chassis_version: Option<String>,
    bios_vendor: Option<String>,
    bios_version: Option<String>,
    bios_date: Option<String>,
    board_asset_tag: Option<String>,
    board_serial: Option<String>,
    board_vendor: Option<String>,
    board_version: Option<String>,
    board_name: Option<String>,
    product_family: Option<String>,
    product_name: Option<String>,
    sys_vendor: Option<String>,
    product_serial: Option<String>,
    product_uuid: Option<String>,
    product_sku: Option<String>,
    product_version: Option<String>,
}

impl SmbiosStrings {
    fn load(ctx: &Context) -> Option<Self> {
        let smbios_data = smbios::load(ctx)?;
        let mut strings = SmbiosStrings::default();

        for structure in smbios_data.iter() {
            match structure.defined_struct() {
                DefinedStruct::SystemInformation(system) => {
                    strings.product_family = smbios::text(system.family());
                    strings.product_name = smbios::text(system.product_name());
                    strings.sys_vendor = smbios::text(system.manufacturer());
                    strings.product_serial = smbios::text(system.serial_number());
                    strings.product_uuid = match system.uuid() {
                        Some(SystemUuidData::Uuid(uuid)) => Some(uuid.to_string()),
                        _ => None,
                    };
                    strings.product_sku = smbios::text(system.sku_number());
                    strings.product_version = smbios::text(system.version());
                }
                DefinedStruct::SystemChassisInformation(chassis) => {
                    strings.chassis_asset_tag = smbios::text(chassis.asset_tag_number());
                    // Bit 7 is the lock flag
                    strings.chassis_type = chassis
                        .chassis_type()
                        .map(|t| (t.raw & 0x7F).to_string());
                    strings.chassis_serial = smbios::text(chassis.serial_number());
                    strings.chassis_vendor = smbios::text(chassis.manufacturer());
                    strings.chassis_version = smbios::text(chassis.version());
                }
                DefinedStruct::BaseBoardInformation(board) => {
                    strings.board_asset_tag = smbios::text(board.asset_tag());
                    strings.board_serial = smbios::text(board.serial_number());
                    strings.board_vendor = smbios::text(board.manufacturer());
                    strings.board_version = smbios::text(board.version());
                    strings.board_name = smbios::text(board.product());
                }
                DefinedStruct::Information(bios) => {
                    strings.bios_vendor = smbios::text(bios.vendor());
                    strings.bios_version = smbios::text(bios.version());
                    strings.bios_date = smbios::text(bios.release_date());
                }
                _ => continue,
            }
        }

        Some(strings)
    }
}

/// SMBIOS 3.x, section 7.4.1.
fn chassis_type_description(code: u8) -> Option<&'static str> {
    let description = match code {
        1 => "Other",
        2 => "Unknown",
        3 => "Desktop",
        4 => "Low profile desktop",
        5 => "Pizza box",
        6 => "Mini tower",
        7 => "Tower",
        8 => "Portable",
        9 => "Laptop",
        10 => "Notebook",
        11 => "Hand held",
        12 => "Docking station",
        13 => "All in one",
        14 => "Sub notebook",
        15 => "Space-saving",
        16 => "Lunch box",
        17 => "Main server chassis",
        18 => "Expansion chassis",
        19 => "SubChassis",
        20 => "Bus expansion chassis",
        21 => "Peripheral chassis",
        22 => "RAID chassis",
        23 => "Rack mount chassis",
        24 => "Sealed-case PC",
        25 => "Multi-system chassis",
        26 => "Compact PCI",
        27 => "Advanced TCA",
        28 => "Blade",
        29 => "Blade enclosure",
        30 => "Tablet",
        31 => "Convertible",
        32 => "Detachable",
        33 => "IoT gateway",
        34 => "Embedded PC",
        35 => "Mini PC",
        36 => "Stick PC",
        _ => return None,
    };
    Some(description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chassis_type_description() {
        assert_eq!(chassis_type_description(23), Some("Rack mount chassis"));
        assert_eq!(chassis_type_description(10), Some("Notebook"));
        assert_eq!(chassis_type_description(0), None);
        assert_eq!(chassis_type_description(200), None);
    }
}
