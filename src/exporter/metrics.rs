//! Volume Metrics
//!
//! Prometheus gauges fed from [`VolumeRecord`]s. The records carry decimal
//! strings; parsing into floats happens here and nowhere earlier.

use crate::domain::ports::VolumeRecord;
use crate::error::Result;
use chrono::Utc;
use parking_lot::Mutex;
use prometheus::{Encoder, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use tracing::debug;

/// Label names of every per-volume series
pub const VOLUME_LABELS: [&str; 6] = [
    "filer",
    "vserver",
    "volume",
    "share_id",
    "share_name",
    "project_id",
];

// =============================================================================
// Volume Gauges
// =============================================================================

/// Numeric record fields exported as gauges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeGauge {
    TotalBytes,
    AvailableBytes,
    UsedBytes,
    SnapshotUsedBytes,
    SnapshotAvailableBytes,
    SnapshotReservedBytes,
    UsedPercentage,
    CompressionSavedPercentage,
    DeduplicationSavedPercentage,
    TotalSavedPercentage,
}

impl VolumeGauge {
    pub const ALL: [VolumeGauge; 10] = [
        VolumeGauge::TotalBytes,
        VolumeGauge::AvailableBytes,
        VolumeGauge::UsedBytes,
        VolumeGauge::SnapshotUsedBytes,
        VolumeGauge::SnapshotAvailableBytes,
        VolumeGauge::SnapshotReservedBytes,
        VolumeGauge::UsedPercentage,
        VolumeGauge::CompressionSavedPercentage,
        VolumeGauge::DeduplicationSavedPercentage,
        VolumeGauge::TotalSavedPercentage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VolumeGauge::TotalBytes => "netapp_volume_total_bytes",
            VolumeGauge::AvailableBytes => "netapp_volume_available_bytes",
            VolumeGauge::UsedBytes => "netapp_volume_used_bytes",
            VolumeGauge::SnapshotUsedBytes => "netapp_volume_snapshot_used_bytes",
            VolumeGauge::SnapshotAvailableBytes => "netapp_volume_snapshot_available_bytes",
            VolumeGauge::SnapshotReservedBytes => "netapp_volume_snapshot_reserved_bytes",
            VolumeGauge::UsedPercentage => "netapp_volume_used_percentage",
            VolumeGauge::CompressionSavedPercentage => "netapp_volume_compression_saved_percentage",
            VolumeGauge::DeduplicationSavedPercentage => {
                "netapp_volume_deduplication_saved_percentage"
            }
            VolumeGauge::TotalSavedPercentage => "netapp_volume_total_saved_percentage",
        }
    }

    fn help(&self) -> &'static str {
        match self {
            VolumeGauge::TotalBytes => "Usable volume size in bytes",
            VolumeGauge::AvailableBytes => "Available volume space in bytes",
            VolumeGauge::UsedBytes => "Used volume space in bytes",
            VolumeGauge::SnapshotUsedBytes => "Space used by snapshots in bytes",
            VolumeGauge::SnapshotAvailableBytes => "Snapshot reserve still available in bytes",
            VolumeGauge::SnapshotReservedBytes => "Snapshot reserve size in bytes",
            VolumeGauge::UsedPercentage => "Percentage of volume space used",
            VolumeGauge::CompressionSavedPercentage => "Percentage of space saved by compression",
            VolumeGauge::DeduplicationSavedPercentage => {
                "Percentage of space saved by deduplication"
            }
            VolumeGauge::TotalSavedPercentage => "Percentage of space saved by storage efficiency",
        }
    }

    /// Raw decimal text of this gauge's field
    pub fn field<'a>(&self, record: &'a VolumeRecord) -> &'a str {
        match self {
            VolumeGauge::TotalBytes => &record.size_total,
            VolumeGauge::AvailableBytes => &record.size_available,
            VolumeGauge::UsedBytes => &record.size_used,
            VolumeGauge::SnapshotUsedBytes => &record.size_used_by_snapshots,
            VolumeGauge::SnapshotAvailableBytes => &record.size_available_for_snapshots,
            VolumeGauge::SnapshotReservedBytes => &record.snapshot_reserve_size,
            VolumeGauge::UsedPercentage => &record.percentage_size_used,
            VolumeGauge::CompressionSavedPercentage => &record.percentage_compression_space_saved,
            VolumeGauge::DeduplicationSavedPercentage => {
                &record.percentage_deduplication_space_saved
            }
            VolumeGauge::TotalSavedPercentage => &record.percentage_total_space_saved,
        }
    }
}

// =============================================================================
// Volume Metrics
// =============================================================================

type LabelSet = [String; 6];

/// Per-volume metrics registry
pub struct VolumeMetrics {
    registry: Registry,
    gauges: Vec<(VolumeGauge, GaugeVec)>,
    volumes: GaugeVec,
    poll_errors: IntCounterVec,
    last_poll: GaugeVec,
    /// Label sets written by the last observation of each filer
    series: Mutex<HashMap<String, Vec<LabelSet>>>,
}

impl VolumeMetrics {
    /// Create and register all collectors
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let mut gauges = Vec::with_capacity(VolumeGauge::ALL.len());
        for gauge in VolumeGauge::ALL {
            let vec = GaugeVec::new(Opts::new(gauge.name(), gauge.help()), &VOLUME_LABELS)?;
            registry.register(Box::new(vec.clone()))?;
            gauges.push((gauge, vec));
        }

        let volumes = GaugeVec::new(
            Opts::new("netapp_filer_volumes", "Volumes enumerated in the last poll"),
            &["filer"],
        )?;
        let poll_errors = IntCounterVec::new(
            Opts::new("netapp_filer_poll_errors_total", "Failed filer polls"),
            &["filer"],
        )?;
        let last_poll = GaugeVec::new(
            Opts::new(
                "netapp_filer_last_poll_timestamp_seconds",
                "Unix time of the last successful poll",
            ),
            &["filer"],
        )?;
        registry.register(Box::new(volumes.clone()))?;
        registry.register(Box::new(poll_errors.clone()))?;
        registry.register(Box::new(last_poll.clone()))?;

        Ok(Self {
            registry,
            gauges,
            volumes,
            poll_errors,
            last_poll,
            series: Mutex::new(HashMap::new()),
        })
    }

    /// Replace a filer's series with `records`
    pub fn observe(&self, filer: &str, records: &[VolumeRecord]) {
        let mut series = self.series.lock();

        if let Some(stale) = series.remove(filer) {
            for labels in &stale {
                let values = label_refs(labels);
                for (_, vec) in &self.gauges {
                    // Not every gauge is set for every volume
                    let _ = vec.remove_label_values(&values);
                }
            }
        }

        let mut current = Vec::with_capacity(records.len());
        for record in records {
            let labels = label_set(filer, record);
            let values = label_refs(&labels);

            for (gauge, vec) in &self.gauges {
                let raw = gauge.field(record);
                if raw.is_empty() {
                    continue;
                }
                match raw.parse::<f64>() {
                    Ok(value) => vec.with_label_values(&values).set(value),
                    Err(_) => debug!(
                        filer,
                        volume = %record.volume,
                        metric = gauge.name(),
                        raw,
                        "skipping non-numeric volume field"
                    ),
                }
            }
            current.push(labels);
        }
        series.insert(filer.to_string(), current);

        self.volumes
            .with_label_values(&[filer])
            .set(records.len() as f64);
        self.last_poll
            .with_label_values(&[filer])
            .set(Utc::now().timestamp() as f64);
    }

    /// Count a failed poll of a filer
    pub fn record_poll_error(&self, filer: &str) {
        self.poll_errors.with_label_values(&[filer]).inc();
    }

    /// Render all metrics in text exposition format
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| crate::error::Error::Internal(e.to_string()))
    }

    /// Content type of [`VolumeMetrics::encode`] output
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}

fn label_set(filer: &str, record: &VolumeRecord) -> LabelSet {
    [
        filer.to_string(),
        record.vserver.clone(),
        record.volume.clone(),
        record.share_id.clone(),
        record.share_name.clone(),
        record.project_id.clone(),
    ]
}

fn label_refs(labels: &LabelSet) -> [&str; 6] {
    [
        labels[0].as_str(),
        labels[1].as_str(),
        labels[2].as_str(),
        labels[3].as_str(),
        labels[4].as_str(),
        labels[5].as_str(),
    ]
}
