//! Geolocation Service Port
//!
//! Defines the interface for resolving IP addresses to countries through
//! an upstream provider.

use crate::domain::entities::GeoResult;
use async_trait::async_trait;
use std::net::IpAddr;

/// Resolver for IP address to country, backed by an external service.
///
/// This is an outbound port. All upstream failure modes (transport errors,
/// exhausted rate-limit retries, hard rejections, unparsable payloads)
/// collapse into `None`; callers cannot and need not distinguish them.
///
/// Implementations suspend on network I/O; dropping the returned future
/// abandons any in-flight request or backoff wait.
#[async_trait]
pub trait GeoService: Send + Sync {
    /// Resolve an IP address to a normalized geolocation result, or `None`
    /// if the upstream could not answer.
    async fn lookup(&self, ip: IpAddr) -> Option<GeoResult>;
}
