use std::path::PathBuf;

use crate::host::Subsystem;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while probing a subsystem or rendering the inventory.
///
/// Every probe returns this type, so the aggregator hands a failing probe's
/// error back to the caller exactly as the probe produced it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Proc {
        path: PathBuf,
        #[source]
        source: procfs::ProcError,
    },

    #[error("malformed {what}: {detail}")]
    Parse { what: &'static str, detail: String },

    #[error("{subsystem} probing is not supported on this platform")]
    Unsupported { subsystem: Subsystem },

    /// The probing order never produced a value for this subsystem.
    #[error("no {subsystem} information was collected")]
    Incomplete { subsystem: Subsystem },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(what: &'static str, detail: impl Into<String>) -> Self {
        Error::Parse {
            what,
            detail: detail.into(),
        }
    }
}
