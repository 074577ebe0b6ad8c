mod dashmap_blocked_store;
mod ip_api_geo_service;

pub use dashmap_blocked_store::DashMapBlockedStore;
pub use ip_api_geo_service::IpApiGeoService;
