mod blocked_store;
mod geo_service;

pub use blocked_store::{BlockConflict, BlockedStore};
pub use geo_service::GeoService;
