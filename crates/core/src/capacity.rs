use std::path::Path;

use sysinfo::Disks;
use tracing::warn;

use crate::config::CapacitySource;
use crate::error::{ReportError, Result};
use crate::model::{CapacitySnapshot, VolumeMetrics};
use crate::size::ByteFormatter;

const LABEL_WIDTH: usize = 28;

/// Queries capacity figures for the volume hosting a path.
pub trait VolumeProbe: Send + Sync {
    /// `None` when no volume can be resolved for `path`.
    fn query(&self, path: &Path) -> Option<VolumeMetrics>;
}

/// POSIX `statvfs`. Free blocks including the privileged reserve count as
/// capacity for important usage.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, Default)]
pub struct StatvfsProbe;

#[cfg(unix)]
impl VolumeProbe for StatvfsProbe {
    #[allow(clippy::unnecessary_cast)]
    fn query(&self, path: &Path) -> Option<VolumeMetrics> {
        let stat = match nix::sys::statvfs::statvfs(path) {
            Ok(stat) => stat,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "statvfs failed");
                return None;
            }
        };

        let block_size = stat.fragment_size() as u64;
        let available = (stat.blocks_available() as u64).saturating_mul(block_size);
        Some(VolumeMetrics {
            available_bytes: Some(available),
            important_bytes: Some((stat.blocks_free() as u64).saturating_mul(block_size)),
            opportunistic_bytes: Some(available),
            total_bytes: Some((stat.blocks() as u64).saturating_mul(block_size)),
        })
    }
}

/// Resolves the mounted disk with the longest mount point prefixing the path.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysinfoProbe;

impl VolumeProbe for SysinfoProbe {
    fn query(&self, path: &Path) -> Option<VolumeMetrics> {
        let path = match path.canonicalize() {
            Ok(path) => path,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot resolve volume path");
                return None;
            }
        };

        let disks = Disks::new_with_refreshed_list();
        let disk = disks
            .list()
            .iter()
            .filter(|disk| path.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len());

        let Some(disk) = disk else {
            warn!(path = %path.display(), "no mounted disk hosts path");
            return None;
        };

        let available = disk.available_space();
        Some(VolumeMetrics {
            available_bytes: Some(available),
            important_bytes: Some(available),
            opportunistic_bytes: Some(available),
            total_bytes: Some(disk.total_space()),
        })
    }
}

pub fn probe_for(source: CapacitySource) -> Box<dyn VolumeProbe> {
    match source {
        #[cfg(unix)]
        CapacitySource::Statvfs => Box::new(StatvfsProbe),
        #[cfg(not(unix))]
        CapacitySource::Statvfs => {
            warn!("statvfs is unavailable on this platform; using sysinfo");
            Box::new(SysinfoProbe)
        }
        CapacitySource::Sysinfo => Box::new(SysinfoProbe),
    }
}

/// Capacity of the volume hosting `reference`.
///
/// No reference or an unresolvable volume yields `Ok(None)`. A volume that
/// answers with only some of the figures is an [`ReportError::IncompleteCapacity`].
pub fn capacity_snapshot(
    probe: &dyn VolumeProbe,
    reference: Option<&Path>,
) -> Result<Option<CapacitySnapshot>> {
    let Some(path) = reference else {
        return Ok(None);
    };
    let Some(metrics) = probe.query(path) else {
        return Ok(None);
    };

    metrics
        .into_snapshot()
        .map(Some)
        .map_err(|missing| ReportError::IncompleteCapacity {
            path: path.to_path_buf(),
            missing,
        })
}

/// Four aligned label/size lines. The last line carries no trailing newline,
/// so the block ends the report text.
pub fn render_capacity(snapshot: &CapacitySnapshot, formatter: &ByteFormatter) -> String {
    let rows = [
        ("Available Capacity:", snapshot.available_bytes),
        ("  for Important Usage:", snapshot.important_bytes),
        ("  for Opportunistic Usage:", snapshot.opportunistic_bytes),
        ("Total Capacity:", snapshot.total_bytes),
    ];

    rows.iter()
        .map(|(label, bytes)| {
            format!(
                "{label:<width$}{}",
                formatter.format(*bytes),
                width = LABEL_WIDTH
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CapacityMetric;
    use crate::size::SizeUnits;

    struct FixedProbe(Option<VolumeMetrics>);

    impl VolumeProbe for FixedProbe {
        fn query(&self, _path: &Path) -> Option<VolumeMetrics> {
            self.0.clone()
        }
    }

    fn full() -> VolumeMetrics {
        VolumeMetrics {
            available_bytes: Some(2_000_000_000),
            important_bytes: Some(1_900_000_000),
            opportunistic_bytes: Some(1_800_000_000),
            total_bytes: Some(10_000_000_000),
        }
    }

    #[test]
    fn renders_aligned_block_in_fixed_order() {
        let snapshot = full().into_snapshot().expect("complete");
        let block = render_capacity(&snapshot, &ByteFormatter::new(SizeUnits::Decimal, 2));
        assert_eq!(
            block,
            "Available Capacity:         2.00 GB\n\
             \x20 for Important Usage:      1.90 GB\n\
             \x20 for Opportunistic Usage:  1.80 GB\n\
             Total Capacity:             10.00 GB"
        );
    }

    #[test]
    fn no_reference_or_volume_skips_block() {
        let probe = FixedProbe(Some(full()));
        assert_eq!(capacity_snapshot(&probe, None).expect("ok"), None);

        let unresolved = FixedProbe(None);
        assert_eq!(
            capacity_snapshot(&unresolved, Some(Path::new("/data"))).expect("ok"),
            None
        );
    }

    #[test]
    fn partial_metrics_are_fatal() {
        let probe = FixedProbe(Some(VolumeMetrics {
            opportunistic_bytes: None,
            ..full()
        }));
        let err = capacity_snapshot(&probe, Some(Path::new("/data"))).expect_err("fatal");
        assert!(matches!(
            err,
            ReportError::IncompleteCapacity {
                missing: CapacityMetric::Opportunistic,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn statvfs_reports_every_metric_for_existing_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let metrics = StatvfsProbe.query(dir.path()).expect("volume resolves");
        let snapshot = metrics.into_snapshot().expect("complete");
        assert!(snapshot.total_bytes >= snapshot.available_bytes);
        assert!(snapshot.important_bytes >= snapshot.available_bytes);
    }

    #[cfg(unix)]
    #[test]
    fn statvfs_on_missing_path_is_unresolved() {
        assert!(StatvfsProbe
            .query(Path::new("/nonexistent/storage-report"))
            .is_none());
    }
}
