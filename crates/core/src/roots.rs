use std::path::PathBuf;

use crate::config::{ReportConfig, WellKnownDirectory};

/// Supplies the ordered list of root directories to report on.
///
/// The first root also selects the volume whose capacity is reported.
pub trait RootProvider: Send + Sync {
    fn roots(&self) -> Vec<PathBuf>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticRoots(pub Vec<PathBuf>);

impl RootProvider for StaticRoots {
    fn roots(&self) -> Vec<PathBuf> {
        self.0.clone()
    }
}

#[derive(Debug, Clone)]
pub struct WellKnownRoots(pub Vec<WellKnownDirectory>);

impl RootProvider for WellKnownRoots {
    fn roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::new();
        for directory in &self.0 {
            match directory.resolve() {
                Some(path) if !roots.contains(&path) => roots.push(path),
                Some(_) => {}
                None => tracing::debug!(?directory, "well-known directory not available"),
            }
        }
        roots
    }
}

/// Explicit roots win; otherwise the configured well-known directories.
pub fn provider_for(config: &ReportConfig) -> Box<dyn RootProvider> {
    if config.roots.is_empty() {
        Box::new(WellKnownRoots(config.well_known.clone()))
    } else {
        Box::new(StaticRoots(config.roots.clone()))
    }
}
