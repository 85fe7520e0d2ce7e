use pciid_parser::Database;

use crate::context::Context;
use crate::host::Subsystem;

/// Where distributions install `pci.ids`.
const CANDIDATES: [&str; 4] = [
    "/usr/share/hwdata/pci.ids",
    "/usr/share/misc/pci.ids",
    "/usr/share/pci.ids",
    "/var/lib/pciutils/pci.ids",
];

/// The PCI ID database for this run, read at most once per context.
pub fn load(ctx: &Context, subsystem: Subsystem) -> Option<&Database> {
    ctx.pci_db_cell().get_or_init(|| read(ctx, subsystem)).as_ref()
}

/// An explicit override wins; inside a chroot only the tree itself is
/// searched so results do not leak from the host.
fn read(ctx: &Context, subsystem: Subsystem) -> Option<Database> {
    if let Some(path) = ctx.pci_ids() {
        match Database::read_from_file(path) {
            Ok(db) => return Some(db),
            Err(e) => ctx.warn(
                subsystem,
                format!("cannot read PCI IDs from {}: {:?}", path.display(), e),
            ),
        }
    }

    for candidate in CANDIDATES {
        let path = ctx.path(candidate);
        if path.exists() {
            if let Ok(db) = Database::read_from_file(&path) {
                return Some(db);
            }
        }
    }

    if !ctx.is_chrooted() {
        if let Ok(db) = Database::read() {
            return Some(db);
        }
    }

    ctx.warn(subsystem, "PCI ID database not found; names left unresolved");
    None
}

/// Vendor and product names for a vendor/device ID pair given as sysfs hex.
pub fn lookup(
    db: Option<&Database>,
    vendor_hex: &str,
    device_hex: &str,
) -> (Option<String>, Option<String>) {
    let Some(db) = db else {
        return (None, None);
    };
    let (Some(vendor_id), Some(device_id)) = (parse_hex_u16(vendor_hex), parse_hex_u16(device_hex))
    else {
        return (None, None);
    };

    match db.vendors.get(&vendor_id) {
        Some(vendor) => {
            // Fall back to "Unknown Device" when the vendor is known but the device isn't
            let device_name = vendor
                .devices
                .get(&device_id)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| format!("Unknown Device [{:04x}]", device_id));
            (Some(vendor.name.clone()), Some(device_name))
        }
        None => (None, None),
    }
}

pub fn parse_hex_u16(s: &str) -> Option<u16> {
    let s = s.trim();
    u16::from_str_radix(s.strip_prefix("0x").unwrap_or(s), 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_u16() {
        assert_eq!(parse_hex_u16("0x10de\n"), Some(0x10de));
        assert_eq!(parse_hex_u16("8086"), Some(0x8086));
        assert_eq!(parse_hex_u16("zz"), None);
    }

    #[test]
    fn test_lookup_without_database() {
        assert_eq!(lookup(None, "0x10de", "0x2204"), (None, None));
    }
}
