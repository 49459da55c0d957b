//! Filer Connection
//!
//! REST implementation of the paged volume listing. TLS and basic auth are
//! handled here; the pipeline only sees [`crate::domain::VolumePager`].

pub mod client;
pub mod types;

pub use client::{OntapClient, OntapConfig};
