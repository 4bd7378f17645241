use std::path::PathBuf;

use thiserror::Error;

use crate::model::CapacityMetric;

#[derive(Debug, Error)]
pub enum ReportError {
    /// The volume resolved but did not report every capacity figure.
    #[error("volume hosting {} reported incomplete capacity: {missing} missing", path.display())]
    IncompleteCapacity {
        path: PathBuf,
        missing: CapacityMetric,
    },

    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
