//! GeoBlocker Library
//!
//! This module exposes the GeoBlocker components for use in integration
//! tests and as a library.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{CheckVerdict, GeoBlockService};
pub use config::load_config;
pub use domain::entities::{
    BlockedAttempt, BlockedCountry, BlockedCountryDetails, GeoResult, TemporalBlock,
};
pub use domain::ports::{BlockConflict, BlockedStore, GeoService};
pub use domain::value_objects::CountryCode;
