use std::collections::{BTreeMap, BTreeSet};

use procfs::{CpuInfo as ProcCpuInfo, FromRead};
use smbioslib::{
    CoreCount, DefinedStruct, Handle, ProcessorSpeed, SMBiosData, SMBiosProcessorInformation,
    ThreadCount,
};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::hardware::smbios;
use crate::hardware::types::{CpuInfo, Processor};
use crate::host::Subsystem;

pub fn collect_cpu_info(ctx: &Context) -> Result<CpuInfo> {
    let cpuinfo_path = ctx.path("/proc/cpuinfo");
    let cpuinfo = ProcCpuInfo::from_file(&cpuinfo_path).map_err(|source| Error::Proc {
        path: cpuinfo_path.clone(),
        source,
    })?;

    let mut processors = group_by_package(&cpuinfo);

    match smbios::load(ctx) {
        Some(smbios_data) => enrich_from_smbios(&smbios_data, &mut processors),
        None => ctx.warn(Subsystem::Cpu, "SMBIOS table unavailable; socket details skipped"),
    }

    let total_cores = processors.iter().map(|p| p.num_cores).sum();
    let total_threads = processors.iter().map(|p| p.num_threads).sum();

    Ok(CpuInfo {
        total_cores,
        total_threads,
        processors,
    })
}

/// One `Processor` per `physical id`; logical CPUs without one share package 0.
fn group_by_package(cpuinfo: &ProcCpuInfo) -> Vec<Processor> {
    let mut packages: BTreeMap<u32, (Processor, BTreeSet<String>)> = BTreeMap::new();

    for cpu in 0..cpuinfo.num_cores() {
        let field = |name: &str| cpuinfo.get_field(cpu, name).map(|v| v.trim().to_string());

        let id = field("physical id")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);

        let (processor, core_ids) = packages.entry(id).or_insert_with(|| {
            let capabilities = field("flags")
                .or_else(|| field("Features"))
                .map(|flags| flags.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default();
            (
                Processor {
                    id,
                    vendor: field("vendor_id").or_else(|| field("CPU implementer")),
                    model: field("model name").or_else(|| field("Processor")),
                    capabilities,
                    ..Default::default()
                },
                BTreeSet::new(),
            )
        });

        processor.num_threads += 1;
        core_ids.insert(field("core id").unwrap_or_else(|| cpu.to_string()));
    }

    packages
        .into_values()
        .map(|(mut processor, core_ids)| {
            processor.num_cores = core_ids.len() as u32;
            processor
        })
        .collect()
}

/// SMBIOS processor records arrive in socket order, so match them by index.
fn enrich_from_smbios(smbios_data: &SMBiosData, processors: &mut [Processor]) {
    let records = smbios_data.iter().filter_map(|structure| match structure.defined_struct() {
        DefinedStruct::ProcessorInformation(processor) => Some(processor),
        _ => None,
    });

    for (processor, record) in processors.iter_mut().zip(records) {
        processor.slot = smbios::text(record.socket_designation());
        processor.capacity_mhz = processor_speed(&record);

        if processor.num_cores == 0 {
            if let Some(CoreCount::Count(count)) = record.core_count() {
                processor.num_cores = count as u32;
            }
        }
        if processor.num_threads == 0 {
            if let Some(ThreadCount::Count(count)) = record.thread_count() {
                processor.num_threads = count as u32;
            }
        }

        processor.l1_cache_kb = record
            .l1cache_handle()
            .and_then(|h| cache_size_kb(smbios_data, h));
        processor.l2_cache_kb = record
            .l2cache_handle()
            .and_then(|h| cache_size_kb(smbios_data, h));
        processor.l3_cache_kb = record
            .l3cache_handle()
            .and_then(|h| cache_size_kb(smbios_data, h));
    }
}

/// Max speed, falling back to the current speed.
fn processor_speed(record: &SMBiosProcessorInformation) -> Option<u32> {
    match record.max_speed() {
        Some(ProcessorSpeed::MHz(mhz)) if mhz > 0 => Some(mhz as u32),
        _ => match record.current_speed() {
            Some(ProcessorSpeed::MHz(mhz)) if mhz > 0 => Some(mhz as u32),
            _ => None,
        },
    }
}

fn cache_size_kb(smbios_data: &SMBiosData, handle: Handle) -> Option<u32> {
    for structure in smbios_data.iter() {
        if structure.header.handle() != handle {
            continue;
        }
        if let DefinedStruct::CacheInformation(cache) = structure.defined_struct() {
            // CacheMemorySize only exposes the unit through Debug
            let debug_str = format!("{:?}", cache.installed_size()?);
            return debug_str
                .strip_prefix("Kilobytes(")
                .and_then(|rest| rest.strip_suffix(')'))
                .and_then(|n| n.parse::<u32>().ok());
        }
        break;
    }
    None
}
