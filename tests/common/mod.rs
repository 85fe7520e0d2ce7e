// Shared test helpers
#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use host_inventory::hardware::types::*;
use host_inventory::{Context, Error, HostOption, Probe, Probes, Result, Subsystem};
use tempfile::TempDir;

/// Subsystems in the order their probes were called.
pub type CallLog = Rc<RefCell<Vec<Subsystem>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn calls(log: &CallLog, subsystem: Subsystem) -> usize {
    log.borrow().iter().filter(|s| **s == subsystem).count()
}

pub fn stub<T: Clone + 'static>(log: &CallLog, subsystem: Subsystem, value: T) -> Box<dyn Probe<T>> {
    let log = Rc::clone(log);
    Box::new(move |_: &Context| -> Result<T> {
        log.borrow_mut().push(subsystem);
        Ok(value.clone())
    })
}

pub fn failing<T: 'static>(
    log: &CallLog,
    subsystem: Subsystem,
    error: impl Fn() -> Error + 'static,
) -> Box<dyn Probe<T>> {
    let log = Rc::clone(log);
    Box::new(move |_: &Context| -> Result<T> {
        log.borrow_mut().push(subsystem);
        Err(error())
    })
}

/// Fixed, recognisable results for every subsystem.
#[derive(Clone)]
pub struct Sentinels {
    pub memory: MemoryInfo,
    pub block: BlockInfo,
    pub cpu: CpuInfo,
    pub topology: TopologyInfo,
    pub network: NetworkInfo,
    pub gpu: GpuInfo,
    pub accelerator: AcceleratorInfo,
    pub chassis: ChassisInfo,
    pub bios: BiosInfo,
    pub baseboard: BaseboardInfo,
    pub product: ProductInfo,
    pub pci: PciInfo,
}

impl Sentinels {
    pub fn new() -> Self {
        Sentinels {
            memory: MemoryInfo {
                total_physical_bytes: 32 * 1024 * 1024 * 1024,
                total_usable_bytes: 31 * 1024 * 1024 * 1024,
                supported_page_sizes: vec![4096, 2 * 1024 * 1024],
                modules: vec![MemoryModule {
                    slot: Some("DIMM_A1".into()),
                    size_bytes: Some(32 * 1024 * 1024 * 1024),
                    serial_number: Some("DIMM-SERIAL-1".into()),
                    ..Default::default()
                }],
            },
            block: BlockInfo {
                total_size_bytes: 1024 * 1024 * 1024 * 1024,
                disks: vec![Disk {
                    name: "nvme0n1".into(),
                    dev_path: "/dev/nvme0n1".into(),
                    size_bytes: Some(1024 * 1024 * 1024 * 1024),
                    serial_number: Some("NVME-SERIAL-1".into()),
                    ..Default::default()
                }],
            },
            cpu: CpuInfo {
                total_cores: 8,
                total_threads: 16,
                processors: vec![Processor {
                    id: 0,
                    model: Some("Sentinel CPU".into()),
                    num_cores: 8,
                    num_threads: 16,
                    ..Default::default()
                }],
            },
            topology: TopologyInfo {
                architecture: Architecture::Smp,
                nodes: vec![TopologyNode {
                    id: 0,
                    cpus: (0..16).collect(),
                    memory_bytes: None,
                    distances: vec![10],
                }],
            },
            network: NetworkInfo {
                nics: vec![Nic {
                    name: "eth0".into(),
                    mac_address: Some("52:54:00:aa:bb:cc".into()),
                    ..Default::default()
                }],
                routes: vec![],
            },
            gpu: GpuInfo::default(),
            accelerator: AcceleratorInfo::default(),
            chassis: ChassisInfo {
                serial_number: "CHASSIS-SERIAL".into(),
                type_description: "Rack mount chassis".into(),
                vendor: "Sentinel".into(),
                ..Default::default()
            },
            bios: BiosInfo {
                vendor: "Sentinel BIOS".into(),
                version: "1.0".into(),
                date: "01/01/2024".into(),
            },
            baseboard: BaseboardInfo::default(),
            product: ProductInfo {
                name: "Sentinel Server".into(),
                uuid: "00000000-0000-0000-0000-000000000001".into(),
                ..Default::default()
            },
            pci: PciInfo {
                devices: vec![PciDevice {
                    address: "0000:00:00.0".into(),
                    vendor_id: "8086".into(),
                    product_id: "3e0f".into(),
                    class_code: "060000".into(),
                    ..Default::default()
                }],
            },
        }
    }

    /// Probes that record each call and return these values.
    pub fn probes(&self, log: &CallLog) -> Probes {
        Probes {
            memory: stub(log, Subsystem::Memory, self.memory.clone()),
            block: stub(log, Subsystem::Block, self.block.clone()),
            cpu: stub(log, Subsystem::Cpu, self.cpu.clone()),
            topology: stub(log, Subsystem::Topology, self.topology.clone()),
            network: stub(log, Subsystem::Network, self.network.clone()),
            gpu: stub(log, Subsystem::Gpu, self.gpu.clone()),
            accelerator: stub(log, Subsystem::Accelerator, self.accelerator.clone()),
            chassis: stub(log, Subsystem::Chassis, self.chassis.clone()),
            bios: stub(log, Subsystem::Bios, self.bios.clone()),
            baseboard: stub(log, Subsystem::Baseboard, self.baseboard.clone()),
            product: stub(log, Subsystem::Product, self.product.clone()),
            pci: stub(log, Subsystem::Pci, self.pci.clone()),
        }
    }
}

/// Replace one subsystem's probe with one that fails.
pub fn fail_at(probes: &mut Probes, log: &CallLog, subsystem: Subsystem) {
    let error = move || Error::Unsupported { subsystem };
    match subsystem {
        Subsystem::Memory => probes.memory = failing(log, subsystem, error),
        Subsystem::Block => probes.block = failing(log, subsystem, error),
        Subsystem::Cpu => probes.cpu = failing(log, subsystem, error),
        Subsystem::Topology => probes.topology = failing(log, subsystem, error),
        Subsystem::Network => probes.network = failing(log, subsystem, error),
        Subsystem::Gpu => probes.gpu = failing(log, subsystem, error),
        Subsystem::Accelerator => probes.accelerator = failing(log, subsystem, error),
        Subsystem::Chassis => probes.chassis = failing(log, subsystem, error),
        Subsystem::Bios => probes.bios = failing(log, subsystem, error),
        Subsystem::Baseboard => probes.baseboard = failing(log, subsystem, error),
        Subsystem::Product => probes.product = failing(log, subsystem, error),
        Subsystem::Pci => probes.pci = failing(log, subsystem, error),
    }
}

//
// Fixture root filesystems
//

pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Fixture {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, rel: &str, contents: &str) -> &Self {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("create_dir_all");
        fs::write(&path, contents).expect("write");
        self
    }

    pub fn mkdir(&self, rel: &str) -> &Self {
        fs::create_dir_all(self.root().join(rel)).expect("create_dir_all");
        self
    }

    pub fn symlink(&self, target: &str, rel: &str) -> &Self {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("create_dir_all");
        std::os::unix::fs::symlink(target, &path).expect("symlink");
        self
    }

    pub fn opts(&self) -> Vec<HostOption> {
        vec![
            HostOption::Chroot(self.root().to_path_buf()),
            HostOption::DisableTools,
            HostOption::DisableWarnings,
        ]
    }

    pub fn ctx(&self) -> Context {
        Context::new(&self.opts())
    }

    /// Like [`Fixture::opts`] but with warnings left on.
    pub fn opts_with_warnings(&self) -> Vec<HostOption> {
        vec![
            HostOption::Chroot(self.root().to_path_buf()),
            HostOption::DisableTools,
        ]
    }

    pub fn write_bytes(&self, rel: &str, contents: &[u8]) -> &Self {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("create_dir_all");
        fs::write(&path, contents).expect("write");
        self
    }
}

//
// Captured log output
//

#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    /// Lines logged at WARN level.
    pub fn warnings(&self) -> Vec<String> {
        let bytes = self.0.lock().expect("log buffer").clone();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains(" WARN "))
            .map(str::to_string)
            .collect()
    }
}

/// Run `f` with a subscriber that records warnings on this thread.
pub fn with_captured_logs<R>(f: impl FnOnce() -> R) -> (R, CapturedLogs) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs)
}

/// A raw SMBIOS table with a system record (type 1), a locked rack mount
/// chassis (type 3) and the end marker.
pub fn dmi_table() -> Vec<u8> {
    let mut table = Vec::new();

    // Type 1: manufacturer, product name, version, serial, UUID, wake-up type
    table.extend_from_slice(&[1, 0x19, 0x01, 0x00, 1, 2, 0, 0]);
    table.extend_from_slice(&[
        0x78, 0x56, 0x34, 0x12, 0xbc, 0x9a, 0xf0, 0xde, 0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc,
        0xde, 0xf0,
    ]);
    table.push(6);
    table.extend_from_slice(b"Acme\0Widget 9000\0\0");

    // Type 3: manufacturer, type 23 with the lock bit set, version, serial, asset tag
    table.extend_from_slice(&[3, 0x09, 0x02, 0x00, 1, 0x80 | 23, 0, 0, 0]);
    table.extend_from_slice(b"Acme\0\0");

    // Type 127: end of table
    table.extend_from_slice(&[127, 0x04, 0x03, 0x00, 0, 0]);
    table
}

pub const MEMINFO: &str = "\
MemTotal:       16314508 kB
MemFree:         8123456 kB
MemAvailable:   12345678 kB
Buffers:          234567 kB
Cached:          3456789 kB
SwapCached:            0 kB
Active:          4567890 kB
Inactive:        2345678 kB
Active(anon):    3456789 kB
Inactive(anon):    12345 kB
Active(file):    1111101 kB
Inactive(file):  2333333 kB
Unevictable:       65432 kB
Mlocked:              16 kB
SwapTotal:       2097148 kB
SwapFree:        2097148 kB
Dirty:               540 kB
Writeback:             0 kB
AnonPages:       3456000 kB
Mapped:           876543 kB
Shmem:            234567 kB
KReclaimable:     345678 kB
Slab:             456789 kB
SReclaimable:     345678 kB
SUnreclaim:       111111 kB
KernelStack:       23456 kB
PageTables:        45678 kB
NFS_Unstable:          0 kB
Bounce:                0 kB
WritebackTmp:          0 kB
CommitLimit:    10254400 kB
Committed_AS:   12345678 kB
VmallocTotal:   34359738367 kB
VmallocUsed:       67890 kB
VmallocChunk:          0 kB
Percpu:            12345 kB
HardwareCorrupted:     0 kB
AnonHugePages:         0 kB
ShmemHugePages:        0 kB
ShmemPmdMapped:        0 kB
FileHugePages:         0 kB
FilePmdMapped:         0 kB
HugePages_Total:       0
HugePages_Free:        0
HugePages_Rsvd:        0
HugePages_Surp:        0
Hugepagesize:       2048 kB
Hugetlb:               0 kB
DirectMap4k:      456789 kB
DirectMap2M:    12345678 kB
DirectMap1G:     5242880 kB
";

/// Two packages, two cores each, two threads per core.
pub fn cpuinfo() -> String {
    let mut out = String::new();
    for cpu in 0..8u32 {
        let package = cpu / 4;
        let core = (cpu % 4) / 2;
        out.push_str(&format!(
            "processor\t: {cpu}\n\
             vendor_id\t: GenuineIntel\n\
             cpu family\t: 6\n\
             model\t\t: 85\n\
             model name\t: Intel(R) Xeon(R) Silver 4110 CPU @ 2.10GHz\n\
             physical id\t: {package}\n\
             siblings\t: 4\n\
             core id\t\t: {core}\n\
             cpu cores\t: 2\n\
             flags\t\t: fpu vme de pse tsc msr avx2\n\
             \n"
        ));
    }
    out
}

/// A small but complete machine: procfs, block, NUMA, network, PCI and DMI.
pub fn populated_fixture() -> Fixture {
    let fx = Fixture::new();
    fx.write("proc/meminfo", MEMINFO)
        .write("proc/cpuinfo", &cpuinfo())
        .mkdir("sys/kernel/mm/hugepages/hugepages-2048kB")
        .mkdir("sys/kernel/mm/hugepages/hugepages-1048576kB");

    // Block devices
    fx.write("sys/block/sda/size", "1953525168\n")
        .write("sys/block/sda/queue/rotational", "1\n")
        .write("sys/block/sda/device/model", "WDC WD10EZEX-08W\n")
        .write("sys/block/sda/device/serial", "WD-WCC6Y1234567\n")
        .write("sys/block/sda/sda1/partition", "1\n")
        .write("sys/block/sda/sda1/size", "2048\n")
        .write("sys/block/sda/sda2/partition", "2\n")
        .write("sys/block/sda/sda2/size", "1953520000\n")
        .write("sys/block/nvme0n1/size", "1000215216\n")
        .write("sys/block/nvme0n1/queue/rotational", "0\n")
        .write("sys/block/nvme0n1/device/model", "Samsung SSD 980 PRO 512GB\n")
        .write("sys/class/nvme/nvme0/serial", "S5GXNX0R123456\n")
        .write("sys/class/nvme/nvme0/firmware_rev", "5B2QGXA7\n")
        .write("sys/block/loop0/size", "0\n");

    // NUMA
    fx.write("sys/devices/system/node/node0/cpulist", "0-3\n")
        .write("sys/devices/system/node/node0/distance", "10 21\n")
        .write(
            "sys/devices/system/node/node0/meminfo",
            "Node 0 MemTotal:        8157254 kB\nNode 0 MemFree:         4000000 kB\n",
        )
        .write("sys/devices/system/node/node1/cpulist", "4-7\n")
        .write("sys/devices/system/node/node1/distance", "21 10\n")
        .write("sys/devices/system/node/possible", "0-1\n");

    // Network
    fx.write("sys/class/net/eth0/address", "3c:ec:ef:01:02:03\n")
        .write("sys/class/net/eth0/mtu", "1500\n")
        .write("sys/class/net/eth0/speed", "1000\n")
        .write("sys/class/net/eth0/device/vendor", "0x8086\n")
        .write("sys/class/net/eth0/device/device", "0x15b8\n")
        .symlink(
            "../../../../bus/pci/drivers/e1000e",
            "sys/class/net/eth0/device/driver",
        )
        .write("sys/class/net/lo/address", "00:00:00:00:00:00\n")
        .write("sys/class/net/lo/mtu", "65536\n");

    // PCI: integrated graphics, an accelerator, an audio controller
    fx.write("sys/bus/pci/devices/0000:00:02.0/vendor", "0x8086\n")
        .write("sys/bus/pci/devices/0000:00:02.0/device", "0x3e92\n")
        .write("sys/bus/pci/devices/0000:00:02.0/class", "0x030000\n")
        .write("sys/bus/pci/devices/0000:00:02.0/revision", "0x02\n")
        .symlink(
            "../../../bus/pci/drivers/i915",
            "sys/bus/pci/devices/0000:00:02.0/driver",
        )
        .write("sys/bus/pci/devices/0000:00:1f.3/vendor", "0x8086\n")
        .write("sys/bus/pci/devices/0000:00:1f.3/device", "0xa348\n")
        .write("sys/bus/pci/devices/0000:00:1f.3/class", "0x040300\n")
        .write("sys/bus/pci/devices/0000:3b:00.0/vendor", "0x1e52\n")
        .write("sys/bus/pci/devices/0000:3b:00.0/device", "0x0001\n")
        .write("sys/bus/pci/devices/0000:3b:00.0/class", "0x120000\n")
        .symlink(
            "../../../0000:00:02.0",
            "sys/class/drm/card0/device",
        )
        .mkdir("sys/class/drm/card0-DP-1");

    // DMI
    fx.write("sys/class/dmi/id/chassis_type", "23\n")
        .write("sys/class/dmi/id/chassis_vendor", "Supermicro\n")
        .write("sys/class/dmi/id/chassis_serial", "C8170LK12345678\n")
        .write("sys/class/dmi/id/bios_vendor", "American Megatrends Inc.\n")
        .write("sys/class/dmi/id/bios_version", "3.4\n")
        .write("sys/class/dmi/id/bios_date", "11/18/2020\n")
        .write("sys/class/dmi/id/board_vendor", "Supermicro\n")
        .write("sys/class/dmi/id/board_name", "X11DPi-N\n")
        .write("sys/class/dmi/id/board_version", "1.10\n")
        .write("sys/class/dmi/id/product_name", "SYS-6029P-TRT\n")
        .write("sys/class/dmi/id/sys_vendor", "To Be Filled By O.E.M.\n")
        .write(
            "sys/class/dmi/id/product_uuid",
            "00000000-0000-0000-0000-ac1f6b123456\n",
        );

    fx
}
