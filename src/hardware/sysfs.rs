use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

pub fn read_to_string_trim<P: AsRef<Path>>(path: P) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn read_to_u64<P: AsRef<Path>>(path: P) -> Option<u64> {
    let s = read_to_string_trim(path)?;
    s.parse::<u64>().ok()
}

pub fn read_to_u32<P: AsRef<Path>>(path: P) -> Option<u32> {
    let s = read_to_string_trim(path)?;
    s.parse::<u32>().ok()
}

/// Basename of a symlink target, e.g. the driver name behind `device/driver`.
pub fn read_link_name<P: AsRef<Path>>(path: P) -> Option<String> {
    let link = fs::read_link(path).ok()?;
    link.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
}

/// Entry names of a directory, sorted. A missing directory is an error.
pub fn list_dir<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let entries = fs::read_dir(path).map_err(|e| Error::io(path, e))?;

    let mut names: Vec<String> = entries
        .flatten()
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    Ok(names)
}

/// Parse a kernel cpu list such as `0-3,8,10-11`.
pub fn parse_cpu_list(list: &str) -> Result<Vec<u32>> {
    let mut cpus = Vec::new();
    let list = list.trim();
    if list.is_empty() {
        return Ok(cpus);
    }

    for part in list.split(',') {
        let part = part.trim();
        let bad = || Error::parse("cpu list", format!("{:?} in {:?}", part, list));
        match part.split_once('-') {
            Some((start, end)) => {
                let start: u32 = start.parse().map_err(|_| bad())?;
                let end: u32 = end.parse().map_err(|_| bad())?;
                if end < start {
                    return Err(bad());
                }
                cpus.extend(start..=end);
            }
            None => cpus.push(part.parse().map_err(|_| bad())?),
        }
    }

    Ok(cpus)
}
