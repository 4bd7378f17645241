use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

pub const ATTACHMENT_FILE_NAME: &str = "file_system.txt";
pub const ATTACHMENT_MIME_TYPE: &str = "text/plain";

/// One node discovered while walking a root directory.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub is_dir: bool,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WalkItem {
    Entry(FileEntry),
    Skipped { path: Option<PathBuf>, reason: SkipReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    RootUnavailable,
    Unreadable,
    MetadataUnavailable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RootUnavailable => "root unavailable",
            Self::Unreadable => "unreadable",
            Self::MetadataUnavailable => "metadata unavailable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityMetric {
    Available,
    Important,
    Opportunistic,
    Total,
}

impl fmt::Display for CapacityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Available => "available capacity",
            Self::Important => "available capacity for important usage",
            Self::Opportunistic => "available capacity for opportunistic usage",
            Self::Total => "total capacity",
        };
        f.write_str(label)
    }
}

/// Raw answer from a volume query. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeMetrics {
    pub available_bytes: Option<u64>,
    pub important_bytes: Option<u64>,
    pub opportunistic_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
}

/// Complete capacity figures for one volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacitySnapshot {
    pub available_bytes: u64,
    pub important_bytes: u64,
    pub opportunistic_bytes: u64,
    pub total_bytes: u64,
}

impl VolumeMetrics {
    /// Returns the first missing metric when the set is incomplete.
    pub fn into_snapshot(self) -> Result<CapacitySnapshot, CapacityMetric> {
        Ok(CapacitySnapshot {
            available_bytes: self.available_bytes.ok_or(CapacityMetric::Available)?,
            important_bytes: self.important_bytes.ok_or(CapacityMetric::Important)?,
            opportunistic_bytes: self
                .opportunistic_bytes
                .ok_or(CapacityMetric::Opportunistic)?,
            total_bytes: self.total_bytes.ok_or(CapacityMetric::Total)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl Attachment {
    pub fn text(contents: String) -> Self {
        Self {
            file_name: ATTACHMENT_FILE_NAME.to_string(),
            data: contents.into_bytes(),
            mime_type: ATTACHMENT_MIME_TYPE.to_string(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    /// Writes the payload as `<dir>/<file_name>` and returns the written path.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        fs::write(&path, &self.data)?;
        Ok(path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub roots: Vec<String>,
    pub entries_written: u64,
    pub entries_skipped: u64,
    pub capacity_included: bool,
}
