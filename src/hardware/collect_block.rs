use std::path::Path;

use crate::context::Context;
use crate::error::Result;
use crate::hardware::sysfs::{self, read_to_string_trim, read_to_u64};
use crate::hardware::types::{BlockInfo, Disk, Partition};

const SECTOR_SIZE: u64 = 512;

/// Entry point: collect all disks on this machine.
pub fn collect_block_info(ctx: &Context) -> Result<BlockInfo> {
    let mut disks = Vec::new();

    for name in sysfs::list_dir(ctx.path("/sys/block"))? {
        // Skip virtual / non-physical devices
        if name.starts_with("loop")
            || name.starts_with("ram")
            || name.starts_with("dm-")
            || name.starts_with("zram")
        {
            continue;
        }

        let sys_path = ctx.path("/sys/block").join(&name);
        disks.push(collect_single_disk(ctx, &name, &sys_path));
    }

    let total_size_bytes = disks
        .iter()
        .filter_map(|d| d.size_bytes)
        .fold(0u64, u64::saturating_add);

    Ok(BlockInfo {
        total_size_bytes,
        disks,
    })
}

/// Collect detailed info for a single disk.
fn collect_single_disk(ctx: &Context, name: &str, sys_path: &Path) -> Disk {
    let device_path = sys_path.join("device");
    let dev_path = format!("/dev/{}", name);

    let model = read_to_string_trim(device_path.join("model"));

    // Serial:
    //  - For SCSI-like devices: /sys/block/<dev>/device/serial
    //  - For NVMe: /sys/class/nvme/<ctrl>/serial
    let mut serial_number = read_to_string_trim(device_path.join("serial"));

    let size_bytes = read_to_u64(sys_path.join("size")).map(sectors_to_bytes);

    // Rotational: 1 = HDD, 0 = SSD/NVMe
    let rotational = read_to_u64(sys_path.join("queue/rotational")).map(|v| v == 1);

    let mut firmware_version = read_to_string_trim(device_path.join("firmware_rev"))
        .or_else(|| read_to_string_trim(device_path.join("rev")));

    let bus_type = if name.starts_with("nvme") {
        // NVMe namespace: "nvme0n1" -> controller "nvme0"
        let controller = nvme_controller(name);
        let nvme_ctrl_path = ctx.path("/sys/class/nvme").join(controller);

        if firmware_version.is_none() {
            firmware_version = read_to_string_trim(nvme_ctrl_path.join("firmware_rev"));
        }
        if serial_number.is_none() {
            serial_number = read_to_string_trim(nvme_ctrl_path.join("serial"));
        }
        Some("nvme".to_string())
    } else {
        sysfs::read_link_name(device_path.join("subsystem"))
    };

    // smartctl fills in whatever sysfs could not
    let smart = smartctl_info(ctx, &dev_path, bus_type.as_deref());
    if let Some(smart) = &smart {
        if serial_number.is_none() {
            serial_number = smart.serial_number.clone();
        }
        if firmware_version.is_none() {
            firmware_version = smart.firmware_version.clone();
        }
    }

    Disk {
        name: name.to_string(),
        dev_path,
        model,
        serial_number,
        size_bytes,
        rotational,
        bus_type,
        firmware_version,
        partitions: collect_partitions(name, sys_path),
        smart_health: smart.and_then(|s| s.health),
    }
}

fn sectors_to_bytes(sectors: u64) -> u64 {
    sectors.saturating_mul(SECTOR_SIZE)
}

fn nvme_controller(namespace: &str) -> &str {
    match namespace.strip_prefix("nvme") {
        Some(rest) => {
            let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
            &namespace[..4 + digits]
        }
        None => namespace,
    }
}

/// Partitions are subdirectories named after the disk, e.g. sda1 or nvme0n1p1.
fn collect_partitions(disk: &str, sys_path: &Path) -> Vec<Partition> {
    let Ok(entries) = sysfs::list_dir(sys_path) else {
        return Vec::new();
    };

    entries
        .into_iter()
        .filter(|entry| entry.starts_with(disk) && sys_path.join(entry).join("partition").exists())
        .map(|entry| Partition {
            size_bytes: read_to_u64(sys_path.join(&entry).join("size")).map(sectors_to_bytes),
            name: entry,
        })
        .collect()
}

//
// SMART / identity via smartctl
//

struct SmartReport {
    health: Option<String>,
    serial_number: Option<String>,
    firmware_version: Option<String>,
}

/// `smartctl -H -i`; requires smartmontools and usually root.
fn smartctl_info(ctx: &Context, dev_path: &str, bus_type: Option<&str>) -> Option<SmartReport> {
    let mut cmd = ctx.command("smartctl")?;
    cmd.args(["-H", "-i"]);
    if let Some("nvme") = bus_type {
        cmd.args(["-d", "nvme"]);
    }
    let output = cmd.arg(dev_path).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let text = String::from_utf8_lossy(&output.stdout);
    Some(parse_smartctl(&text))
}

fn parse_smartctl(text: &str) -> SmartReport {
    let mut report = SmartReport {
        health: None,
        serial_number: None,
        firmware_version: None,
    };

    for line in text.lines() {
        let line = line.trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim() {
            "Serial Number" | "Serial number" => report.serial_number = Some(value.to_string()),
            "Firmware Version" | "Firmware Revision" => {
                report.firmware_version = Some(value.to_string())
            }
            _ if key.contains("overall-health") || key.contains("Health Status") => {
                report.health = Some(if value.contains("PASSED") || value == "OK" {
                    "PASSED".to_string()
                } else {
                    value.to_string()
                });
            }
            _ => {}
        }
    }

    report
}
