use std::collections::HashMap;
use std::fs;
use std::path::Path;

use pciid_parser::Database;
use serde_json::Value;

use crate::context::Context;
use crate::error::Result;
use crate::hardware::pci_ids;
use crate::hardware::sysfs::{self, read_to_string_trim, read_to_u32};
use crate::hardware::types::{IpAddress, Nic, NetworkInfo, RouteInfo};
use crate::host::Subsystem;

/// Entry point: collect full network info (interfaces + routes).
pub fn collect_network_info(ctx: &Context) -> Result<NetworkInfo> {
    let sys_class_net = ctx.path("/sys/class/net");
    let names = sysfs::list_dir(&sys_class_net)?;

    let db = pci_ids::load(ctx, Subsystem::Network);
    let iface_addrs = collect_ip_addrs(ctx);

    let nics = names
        .into_iter()
        .map(|name| {
            let iface_sys_path = sys_class_net.join(&name);
            collect_nic(ctx, db, &iface_addrs, name, &iface_sys_path)
        })
        .collect();

    Ok(NetworkInfo {
        nics,
        routes: collect_routes(ctx),
    })
}

fn collect_nic(
    ctx: &Context,
    db: Option<&Database>,
    iface_addrs: &HashMap<String, Vec<IpAddress>>,
    name: String,
    iface_sys_path: &Path,
) -> Nic {
    let device_path = iface_sys_path.join("device");

    // Speed reads -1 or fails while the link is down
    let speed_mbps = read_to_u32(iface_sys_path.join("speed")).or_else(|| ethtool_speed(ctx, &name));

    let (vendor_name, device_name) = if device_path.exists() {
        let vendor = read_to_string_trim(device_path.join("vendor")).unwrap_or_default();
        let device = read_to_string_trim(device_path.join("device")).unwrap_or_default();
        pci_ids::lookup(db, &vendor, &device)
    } else {
        (None, None)
    };

    Nic {
        mac_address: read_to_string_trim(iface_sys_path.join("address")),
        is_virtual: is_virtual_interface(&name, iface_sys_path),
        mtu: read_to_u32(iface_sys_path.join("mtu")),
        speed_mbps,
        driver: sysfs::read_link_name(device_path.join("driver")),
        firmware_version: ethtool_firmware(ctx, &name),
        vendor_name,
        device_name,
        pci_address: read_pci_address(&device_path),
        addresses: iface_addrs.get(&name).cloned().unwrap_or_default(),
        bond_master: sysfs::read_link_name(iface_sys_path.join("master")),
        name,
    }
}

/// Read PCI address from /sys/class/net/<iface>/device symlink
fn read_pci_address(device_path: &Path) -> Option<String> {
    let link_target = fs::read_link(device_path).ok()?;

    // Look through the path components for a PCI address
    link_target
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .filter(|name| is_pci_address(name))
        .last()
        .map(|s| s.to_string())
}

pub(crate) fn is_pci_address(s: &str) -> bool {
    // PCI address format: 0000:3b:00.0 (domain:bus:device.function)
    s.len() >= 12 && s.matches(':').count() == 2 && s.contains('.')
}

/// Check if a network interface is virtual (not a physical NIC)
fn is_virtual_interface(name: &str, iface_sys_path: &Path) -> bool {
    if name == "lo"
        || name.starts_with("veth")     // virtual ethernet (Docker, etc.)
        || name.starts_with("docker")   // Docker bridge
        || name.starts_with("br-")      // bridge interfaces
        || name.starts_with("virbr")    // libvirt bridge
        || name.starts_with("cni")      // Container Network Interface
        || name.starts_with("flannel")  // Kubernetes flannel
        || name.starts_with("tun")      // tunnel interfaces
        || name.starts_with("tap")      // tap interfaces
        || name.starts_with("vmnet")    // VMware interfaces
    {
        return true;
    }

    // Physical interfaces have a backing device
    !iface_sys_path.join("device").exists()
}

//
// ethtool fallbacks
//

fn ethtool_speed(ctx: &Context, iface: &str) -> Option<u32> {
    let output = ctx.command("ethtool")?.arg(iface).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let text = String::from_utf8_lossy(&output.stdout);
    text.lines().find_map(|line| {
        // Example: "Speed: 25000Mb/s"
        let rest = line.trim().strip_prefix("Speed:")?;
        let digits: String = rest.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse::<u32>().ok()
    })
}

fn ethtool_firmware(ctx: &Context, iface: &str) -> Option<String> {
    let output = ctx.command("ethtool")?.args(["-i", iface]).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let text = String::from_utf8_lossy(&output.stdout);
    text.lines().find_map(|line| {
        let version = line.trim().strip_prefix("firmware-version:")?.trim();
        if version.is_empty() || version.eq_ignore_ascii_case("n/a") {
            None
        } else {
            Some(version.to_string())
        }
    })
}

//
// Addresses and routes via `ip -j`
//

fn ip_json(ctx: &Context, args: &[&str]) -> Option<Vec<Value>> {
    let output = ctx.command("ip")?.arg("-j").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    match serde_json::from_slice::<Value>(&output.stdout).ok()? {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

fn collect_ip_addrs(ctx: &Context) -> HashMap<String, Vec<IpAddress>> {
    let Some(ifaces) = ip_json(ctx, &["addr"]) else {
        return HashMap::new();
    };
    parse_ip_addrs(&ifaces)
}

fn parse_ip_addrs(ifaces: &[Value]) -> HashMap<String, Vec<IpAddress>> {
    let mut map = HashMap::new();

    for iface in ifaces {
        let Some(ifname) = iface.get("ifname").and_then(|v| v.as_str()) else {
            continue;
        };

        let addrs = iface
            .get("addr_info")
            .and_then(|v| v.as_array())
            .map(|addr_info| {
                addr_info
                    .iter()
                    .filter_map(|addr| {
                        let local = addr.get("local").and_then(|v| v.as_str())?;
                        Some(IpAddress {
                            family: addr
                                .get("family")
                                .and_then(|v| v.as_str())
                                .unwrap_or("")
                                .to_string(),
                            address: local.to_string(),
                            prefix: addr.get("prefixlen").and_then(|v| v.as_u64()).unwrap_or(0)
                                as u8,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        map.insert(ifname.to_string(), addrs);
    }

    map
}

fn collect_routes(ctx: &Context) -> Vec<RouteInfo> {
    let Some(routes) = ip_json(ctx, &["route"]) else {
        return Vec::new();
    };

    routes
        .iter()
        .map(|r| {
            let field = |key: &str, default: &str| {
                r.get(key)
                    .and_then(|v| v.as_str())
                    .unwrap_or(default)
                    .to_string()
            };
            RouteInfo {
                dst: field("dst", "default"),
                gateway: field("gateway", ""),
                iface: field("dev", ""),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pci_address() {
        assert!(is_pci_address("0000:3b:00.0"));
        assert!(!is_pci_address("virtio0"));
    }

    #[test]
    fn test_parse_ip_addrs() {
        let json: Value = serde_json::from_str(
            r#"[
                {"ifname": "eth0", "addr_info": [
                    {"family": "inet", "local": "10.0.0.5", "prefixlen": 24},
                    {"family": "inet6", "local": "fe80::1", "prefixlen": 64}
                ]},
                {"ifname": "eth1", "addr_info": []}
            ]"#,
        )
        .unwrap();
        let map = parse_ip_addrs(json.as_array().unwrap());
        assert_eq!(map["eth0"].len(), 2);
        assert_eq!(map["eth0"][0].address, "10.0.0.5");
        assert_eq!(map["eth0"][0].prefix, 24);
        assert!(map["eth1"].is_empty());
    }
}
