//! Geo Block Service - Main application use case
//!
//! Orchestrates the check-block flow: resolving a caller's country through
//! the geolocation port, deciding the block verdict against the store, and
//! recording the attempt.

use crate::domain::entities::{BlockedAttempt, GeoResult};
use crate::domain::ports::{BlockedStore, GeoService};
use crate::domain::value_objects::CountryCode;
use chrono::Utc;
use std::net::IpAddr;
use std::sync::Arc;

/// Outcome of a check-block request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckVerdict {
    /// IP as echoed back by the upstream provider
    pub ip: String,
    /// Country code resolved by the provider
    pub country_code: String,
    /// Whether that country is currently blocked
    pub blocked: bool,
}

/// Application service tying the geolocation client to the blocklist store.
pub struct GeoBlockService {
    store: Arc<dyn BlockedStore>,
    geo: Arc<dyn GeoService>,
}

impl GeoBlockService {
    pub fn new(store: Arc<dyn BlockedStore>, geo: Arc<dyn GeoService>) -> Self {
        Self { store, geo }
    }

    /// Resolve an IP through the upstream provider.
    pub async fn lookup(&self, ip: IpAddr) -> Option<GeoResult> {
        self.geo.lookup(ip).await
    }

    /// Resolve the caller's country, decide the verdict, and log the
    /// attempt.
    ///
    /// Returns `None` when the upstream lookup failed; nothing is logged in
    /// that case, since there is no resolved country to record. A provider
    /// country code that is not a valid two-letter code yields a
    /// not-blocked verdict.
    pub async fn check_block(&self, ip: IpAddr, user_agent: &str) -> Option<CheckVerdict> {
        let geo = self.geo.lookup(ip).await?;

        let blocked = CountryCode::parse(&geo.country_code)
            .map(|code| self.store.is_blocked(&code))
            .unwrap_or(false);

        self.store.log(BlockedAttempt {
            ip: geo.ip.clone(),
            timestamp: Utc::now(),
            country_code: geo.country_code.clone(),
            blocked,
            user_agent: user_agent.to_string(),
        });

        Some(CheckVerdict {
            ip: geo.ip,
            country_code: geo.country_code,
            blocked,
        })
    }
}
