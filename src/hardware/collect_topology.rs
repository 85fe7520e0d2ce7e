use std::fs;
use std::path::Path;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::hardware::sysfs::{self, read_to_string_trim};
use crate::hardware::types::{Architecture, TopologyInfo, TopologyNode};
use crate::host::Subsystem;

pub fn collect_topology_info(ctx: &Context) -> Result<TopologyInfo> {
    let node_root = ctx.path("/sys/devices/system/node");

    let mut nodes = Vec::new();
    if node_root.is_dir() {
        for name in sysfs::list_dir(&node_root)? {
            let Some(id) = name.strip_prefix("node").and_then(|n| n.parse::<u32>().ok()) else {
                continue;
            };
            nodes.push(collect_node(id, &node_root.join(&name))?);
        }
        nodes.sort_by_key(|n| n.id);
    }
    if nodes.is_empty() {
        ctx.warn(Subsystem::Topology, "no NUMA information; assuming a single node");
        nodes.push(single_node(ctx)?);
    }

    let architecture = if nodes.len() > 1 {
        Architecture::Numa
    } else {
        Architecture::Smp
    };

    Ok(TopologyInfo {
        architecture,
        nodes,
    })
}

fn collect_node(id: u32, node_path: &Path) -> Result<TopologyNode> {
    let cpus = match read_to_string_trim(node_path.join("cpulist")) {
        Some(list) => sysfs::parse_cpu_list(&list)?,
        None => Vec::new(),
    };

    let distances = match read_to_string_trim(node_path.join("distance")) {
        Some(line) => line
            .split_whitespace()
            .map(|d| {
                d.parse::<u32>()
                    .map_err(|_| Error::parse("node distance", format!("{:?} for node{}", d, id)))
            })
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(TopologyNode {
        id,
        cpus,
        memory_bytes: node_memory(&node_path.join("meminfo")),
        distances,
    })
}

/// `Node 0 MemTotal:       32768000 kB`
fn node_memory(meminfo_path: &Path) -> Option<u64> {
    let text = fs::read_to_string(meminfo_path).ok()?;
    text.lines().find_map(|line| {
        let (_, rest) = line.split_once("MemTotal:")?;
        let kb = rest.split_whitespace().next()?.parse::<u64>().ok()?;
        Some(kb.saturating_mul(1024))
    })
}

/// Without the online cpu list there is nothing to describe the node with.
fn single_node(ctx: &Context) -> Result<TopologyNode> {
    let Some(list) = read_to_string_trim(ctx.path("/sys/devices/system/cpu/online")) else {
        return Err(Error::Unsupported {
            subsystem: Subsystem::Topology,
        });
    };
    let cpus = sysfs::parse_cpu_list(&list)?;

    Ok(TopologyNode {
        id: 0,
        cpus,
        memory_bytes: None,
        distances: vec![10],
    })
}
