use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, OnceLock};

use pciid_parser::Database;

use crate::host::Subsystem;

/// A single configuration value for one inventory run.
///
/// The aggregator never looks inside these; only [`Context`] does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOption {
    /// Inspect the tree under this directory instead of `/`.
    Chroot(PathBuf),
    /// Suppress probe warnings.
    DisableWarnings,
    /// Never shell out to `ip`, `ethtool`, `smartctl` or load NVML.
    DisableTools,
    /// Replace serial numbers, asset tags, UUIDs and MAC addresses in
    /// structured output.
    RedactSensitive,
    /// Use this `pci.ids` file for vendor and product names.
    PciIds(PathBuf),
}

/// Read-only settings shared by every probe and the serializer during one
/// inventory run.
#[derive(Debug, Clone)]
pub struct Context {
    options: Vec<HostOption>,
    root: PathBuf,
    warnings: bool,
    tools: bool,
    redact: bool,
    pci_ids: Option<PathBuf>,
    /// Loaded on first use and shared by every probe of the run.
    pci_db: Arc<OnceLock<Option<Database>>>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl Context {
    /// Later options win when the same setting appears twice.
    pub fn new(opts: &[HostOption]) -> Self {
        let mut ctx = Context {
            options: opts.to_vec(),
            root: PathBuf::from("/"),
            warnings: true,
            tools: true,
            redact: false,
            pci_ids: None,
            pci_db: Arc::new(OnceLock::new()),
        };

        for opt in opts {
            match opt {
                HostOption::Chroot(root) => ctx.root = root.clone(),
                HostOption::DisableWarnings => ctx.warnings = false,
                HostOption::DisableTools => ctx.tools = false,
                HostOption::RedactSensitive => ctx.redact = true,
                HostOption::PciIds(path) => ctx.pci_ids = Some(path.clone()),
            }
        }

        ctx
    }

    pub fn options(&self) -> &[HostOption] {
        &self.options
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_chrooted(&self) -> bool {
        self.root != Path::new("/")
    }

    pub fn tools_enabled(&self) -> bool {
        self.tools
    }

    pub fn redact(&self) -> bool {
        self.redact
    }

    pub fn pci_ids(&self) -> Option<&Path> {
        self.pci_ids.as_deref()
    }

    pub(crate) fn pci_db_cell(&self) -> &OnceLock<Option<Database>> {
        &self.pci_db
    }

    /// Resolve an absolute system path such as `/sys/block` under the root.
    pub fn path(&self, abs: impl AsRef<Path>) -> PathBuf {
        let abs = abs.as_ref();
        let relative = abs.strip_prefix("/").unwrap_or(abs);
        self.root.join(relative)
    }

    /// `None` when external tools are disabled.
    pub fn command(&self, program: &str) -> Option<Command> {
        if self.tools {
            Some(Command::new(program))
        } else {
            None
        }
    }

    pub fn warn(&self, subsystem: Subsystem, message: impl std::fmt::Display) {
        if self.warnings {
            tracing::warn!(%subsystem, "{}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let ctx = Context::new(&[]);
        assert_eq!(ctx.root(), Path::new("/"));
        assert!(!ctx.is_chrooted());
        assert!(ctx.tools_enabled());
        assert!(!ctx.redact());
        assert!(ctx.pci_ids().is_none());
        assert_eq!(ctx.path("/sys/block"), PathBuf::from("/sys/block"));
    }

    #[test]
    fn test_chroot_resolves_paths() {
        let ctx = Context::new(&[HostOption::Chroot("/tmp/snap".into())]);
        assert!(ctx.is_chrooted());
        assert_eq!(
            ctx.path("/proc/meminfo"),
            PathBuf::from("/tmp/snap/proc/meminfo")
        );
    }

    #[test]
    fn test_disable_tools_yields_no_command() {
        let ctx = Context::new(&[HostOption::DisableTools]);
        assert!(ctx.command("ip").is_none());
    }

    #[test]
    fn test_options_are_kept_verbatim() {
        let opts = vec![
            HostOption::DisableWarnings,
            HostOption::RedactSensitive,
            HostOption::PciIds("/opt/pci.ids".into()),
        ];
        let ctx = Context::new(&opts);
        assert_eq!(ctx.options(), opts.as_slice());
        assert!(ctx.redact());
        assert_eq!(ctx.pci_ids(), Some(Path::new("/opt/pci.ids")));
    }
}
