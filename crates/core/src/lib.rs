pub mod capacity;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod roots;
pub mod size;
pub mod walk;

#[cfg(unix)]
pub use capacity::StatvfsProbe;
pub use capacity::{capacity_snapshot, probe_for, render_capacity, SysinfoProbe, VolumeProbe};
pub use config::{CapacitySource, ReportConfig, WellKnownDirectory};
pub use error::{ReportError, Result};
pub use model::{
    Attachment, CapacityMetric, CapacitySnapshot, FileEntry, ReportSummary, SkipReason,
    VolumeMetrics, WalkItem, ATTACHMENT_FILE_NAME, ATTACHMENT_MIME_TYPE,
};
pub use report::{generate_attachment, AttachmentGenerator};
pub use roots::{provider_for, RootProvider, StaticRoots, WellKnownRoots};
pub use size::{ByteFormatter, SizeUnits};
pub use walk::{DirectoryWalker, WalkOptions};
