use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ReportError, Result};
use crate::size::{ByteFormatter, SizeUnits, MAX_FRACTION_DIGITS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellKnownDirectory {
    Documents,
    Data,
    DataLocal,
    Cache,
    Config,
    Home,
    Desktop,
    Downloads,
}

impl WellKnownDirectory {
    pub fn resolve(self) -> Option<PathBuf> {
        match self {
            Self::Documents => dirs::document_dir(),
            Self::Data => dirs::data_dir(),
            Self::DataLocal => dirs::data_local_dir(),
            Self::Cache => dirs::cache_dir(),
            Self::Config => dirs::config_dir(),
            Self::Home => dirs::home_dir(),
            Self::Desktop => dirs::desktop_dir(),
            Self::Downloads => dirs::download_dir(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacitySource {
    Statvfs,
    Sysinfo,
}

impl Default for CapacitySource {
    fn default() -> Self {
        if cfg!(unix) {
            Self::Statvfs
        } else {
            Self::Sysinfo
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Explicit roots, scanned in order. Takes precedence over `well_known`.
    pub roots: Vec<PathBuf>,
    pub well_known: Vec<WellKnownDirectory>,
    pub units: SizeUnits,
    pub fraction_digits: usize,
    pub include_directories: bool,
    pub follow_links: bool,
    pub max_depth: Option<usize>,
    pub excludes: Vec<String>,
    pub capacity_source: CapacitySource,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            well_known: vec![WellKnownDirectory::Documents],
            units: SizeUnits::default(),
            fraction_digits: 2,
            include_directories: false,
            follow_links: false,
            max_depth: None,
            excludes: Vec::new(),
            capacity_source: CapacitySource::default(),
        }
    }
}

impl ReportConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ReportError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&data).map_err(|source| ReportError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fraction_digits > MAX_FRACTION_DIGITS {
            return Err(ReportError::InvalidConfig(format!(
                "fraction_digits must be at most {MAX_FRACTION_DIGITS}, got {}",
                self.fraction_digits
            )));
        }
        if self.max_depth == Some(0) {
            return Err(ReportError::InvalidConfig(
                "max_depth must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn formatter(&self) -> ByteFormatter {
        ByteFormatter::new(self.units, self.fraction_digits)
    }
}
