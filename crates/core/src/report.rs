use std::path::PathBuf;

use tracing::info;

use crate::capacity::{capacity_snapshot, probe_for, render_capacity, VolumeProbe};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::model::{Attachment, ReportSummary, WalkItem};
use crate::roots::{provider_for, RootProvider};
use crate::size::ByteFormatter;
use crate::walk::{DirectoryWalker, WalkOptions};

/// Builds the `file_system.txt` attachment: one `<size> <path>` line per
/// entry under every root, then a blank line and the capacity block of the
/// volume hosting the first root when one resolves.
///
/// Generation is synchronous, read-only and holds no state between calls.
pub struct AttachmentGenerator {
    roots: Box<dyn RootProvider>,
    probe: Box<dyn VolumeProbe>,
    formatter: ByteFormatter,
    walk_options: WalkOptions,
}

impl AttachmentGenerator {
    pub fn new(roots: Box<dyn RootProvider>, probe: Box<dyn VolumeProbe>) -> Self {
        Self {
            roots,
            probe,
            formatter: ByteFormatter::default(),
            walk_options: WalkOptions::default(),
        }
    }

    pub fn from_config(config: &ReportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(provider_for(config), probe_for(config.capacity_source))
            .with_formatter(config.formatter())
            .with_walk_options(WalkOptions::from(config)))
    }

    pub fn with_formatter(mut self, formatter: ByteFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_walk_options(mut self, walk_options: WalkOptions) -> Self {
        self.walk_options = walk_options;
        self
    }

    /// Roots in provider order, made absolute.
    pub fn resolved_roots(&self) -> Vec<PathBuf> {
        self.roots
            .roots()
            .into_iter()
            .map(|root| std::path::absolute(&root).unwrap_or(root))
            .collect()
    }

    pub fn generate(&self) -> Result<Attachment> {
        self.generate_with_summary().map(|(attachment, _)| attachment)
    }

    pub fn generate_with_summary(&self) -> Result<(Attachment, ReportSummary)> {
        let roots = self.resolved_roots();
        let walker = DirectoryWalker::new(self.walk_options.clone());

        let mut description = String::new();
        let mut summary = ReportSummary {
            roots: roots
                .iter()
                .map(|root| root.to_string_lossy().to_string())
                .collect(),
            ..ReportSummary::default()
        };

        for item in walker.walk(&roots) {
            match item {
                WalkItem::Entry(entry) => {
                    description.push_str(&format!(
                        "{} {}\n",
                        self.formatter.format(entry.size_bytes),
                        entry.path.display()
                    ));
                    summary.entries_written += 1;
                }
                WalkItem::Skipped { .. } => summary.entries_skipped += 1,
            }
        }

        let reference = roots.first().map(PathBuf::as_path);
        if let Some(snapshot) = capacity_snapshot(self.probe.as_ref(), reference)? {
            description.push('\n');
            description.push_str(&render_capacity(&snapshot, &self.formatter));
            summary.capacity_included = true;
        }

        info!(
            roots = summary.roots.len(),
            entries = summary.entries_written,
            skipped = summary.entries_skipped,
            capacity = summary.capacity_included,
            "file system report generated"
        );

        Ok((Attachment::text(description), summary))
    }
}

/// Generates the attachment for the default configuration: the platform
/// documents directory and its volume.
pub fn generate_attachment() -> Result<Attachment> {
    AttachmentGenerator::from_config(&ReportConfig::default())?.generate()
}
