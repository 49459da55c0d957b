//! Filer Share Exporter
//!
//! Polls NetApp filers for their volumes and capacity/efficiency figures and
//! correlates each volume with the cloud share and project that owns it,
//! using the ownership tag the share service writes into the volume comment.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                         Collector (per cycle)                         │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │   Filer ──► Attribute Query ──► Paged Listing ──► Record Extractor    │
//! │                                      │                  │             │
//! │                                      │           Comment Tag Parser   │
//! │                                      ▼                                │
//! │                            VolumePager (REST client)                  │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                 Volume Metrics ──► /metrics endpoint                  │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`filer`]: Volume enumeration pipeline
//! - [`ontap`]: Filer management REST connection
//! - [`exporter`]: Prometheus metrics and HTTP endpoint
//! - [`collector`]: Poll cycle over all configured filers
//! - [`config`]: Configuration file
//! - [`domain`]: Core data model and ports
//! - [`error`]: Error types and handling

pub mod collector;
pub mod config;
pub mod domain;
pub mod error;
pub mod exporter;
pub mod filer;
pub mod ontap;

// Re-export commonly used types
pub use collector::{Collector, FilerPoll};
pub use config::{ExporterConfig, FilerConfig};
pub use domain::ports::{
    PageControl, PageError, RawVolumeEntry, RawVolumePage, VolumePager, VolumeRecord,
};
pub use error::{Error, Result};
pub use exporter::VolumeMetrics;
pub use filer::{
    extract, list_all_pages, parse_tag, AttributeQuery, Filer, PollSettings, ShareTag,
    VserverFilter,
};
pub use ontap::{OntapClient, OntapConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
