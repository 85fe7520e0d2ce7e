//! Host hardware inventory.
//!
//! ```no_run
//! use host_inventory::{HostInfo, HostOption};
//!
//! let host = HostInfo::build(&[HostOption::DisableTools])?;
//! print!("{}", host.text());
//! println!("{}", host.to_json(true)?);
//! # Ok::<(), host_inventory::Error>(())
//! ```

pub mod cli;
pub mod commands;
pub mod context;
pub mod error;
pub mod hardware;
pub mod host;
pub mod output;

pub use context::{Context, HostOption};
pub use error::{Error, Result};
pub use host::{HostInfo, Probe, Probes, Subsystem, PRESENTATION_ORDER, PROBE_ORDER};
