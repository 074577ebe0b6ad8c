//! Application Layer
//!
//! Use cases that orchestrate the domain ports.

mod geo_block_service;

pub use geo_block_service::{CheckVerdict, GeoBlockService};
