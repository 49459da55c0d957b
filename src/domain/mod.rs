//! Domain layer - Core data model and port definitions
//!
//! This module defines the types flowing through the volume pipeline and the
//! trait (port) a filer connection implements.

pub mod ports;

pub use ports::*;
