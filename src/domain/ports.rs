//! Domain Ports - Core type and trait definitions for the exporter
//!
//! The filer connection is consumed only through [`VolumePager`]. Everything
//! the pipeline produces or consumes from it is defined here.

use crate::error::Result;
use crate::filer::query::AttributeQuery;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// =============================================================================
// Raw Volume Data
// =============================================================================

/// Identity attribute group of a raw volume entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeIdAttributes {
    /// Volume name
    pub name: String,
    /// Name of the owning virtual server
    pub owning_vserver_name: String,
    /// UUID of the owning virtual server
    pub owning_vserver_uuid: String,
    /// Free-text annotation, carries the share ownership tag
    pub comment: String,
    /// Volume type (rw, dp, ...)
    pub volume_type: String,
}

/// Space attribute group of a raw volume entry
///
/// Magnitudes are decimal strings in bytes, exactly as the filer reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSpaceAttributes {
    /// Provisioned size in bytes
    pub size: i64,
    pub size_total: String,
    pub size_available: String,
    pub size_used: String,
    pub size_used_by_snapshots: String,
    pub size_available_for_snapshots: String,
    pub snapshot_reserve_size: String,
    pub percentage_size_used: String,
}

/// Storage-efficiency attribute group, absent on volumes without efficiency data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeEfficiencyAttributes {
    pub percentage_compression_space_saved: String,
    pub percentage_deduplication_space_saved: String,
    pub percentage_total_space_saved: String,
}

/// One volume as returned by the paged listing protocol
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVolumeEntry {
    pub id: VolumeIdAttributes,
    pub space: VolumeSpaceAttributes,
    pub efficiency: Option<VolumeEfficiencyAttributes>,
}

/// Error reported by the filer for a single page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageError {
    pub code: String,
    pub reason: String,
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.reason, self.code)
    }
}

/// One response unit of the paged listing protocol
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVolumePage {
    pub entries: Vec<RawVolumeEntry>,
    pub error: Option<PageError>,
}

impl RawVolumePage {
    /// Create a successful page
    pub fn new(entries: Vec<RawVolumeEntry>) -> Self {
        Self {
            entries,
            error: None,
        }
    }

    /// Create a page that only carries an error
    pub fn failed(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            error: Some(PageError {
                code: code.into(),
                reason: reason.into(),
            }),
        }
    }
}

// =============================================================================
// Output Record
// =============================================================================

/// Per-volume output record
///
/// Space and percentage fields are preserved verbatim as decimal strings.
/// An empty string means absent (no efficiency data, or untagged volume).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeRecord {
    pub vserver: String,
    pub volume: String,
    pub size: i64,
    pub size_total: String,
    pub size_available: String,
    pub size_used: String,
    pub size_used_by_snapshots: String,
    pub size_available_for_snapshots: String,
    pub snapshot_reserve_size: String,
    pub percentage_size_used: String,
    pub percentage_compression_space_saved: String,
    pub percentage_deduplication_space_saved: String,
    pub percentage_total_space_saved: String,
    #[serde(rename = "shareID")]
    pub share_id: String,
    pub share_name: String,
    #[serde(rename = "projectID")]
    pub project_id: String,
}

// =============================================================================
// Volume Pager Port
// =============================================================================

/// Signal returned by a page handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    /// Fetch the next page if there is one
    Continue,
    /// Stop fetching; the listing call still completes successfully
    Stop,
}

/// Paged volume listing against one filer
///
/// Implementations deliver pages to `handler` one at a time, in arrival
/// order, and never fetch another page after the handler returned
/// [`PageControl::Stop`]. An `Err` is only returned when the query cannot be
/// started or continued at all.
#[async_trait]
pub trait VolumePager: Send + Sync {
    /// Run a paged volume listing
    async fn list_volumes(
        &self,
        query: &AttributeQuery,
        handler: &mut (dyn FnMut(RawVolumePage) -> PageControl + Send),
    ) -> Result<()>;
}
