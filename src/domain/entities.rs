//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the GeoBlocker domain.
//! They have no external dependencies and contain only business logic.

use crate::domain::value_objects::CountryCode;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A permanently blocked country.
///
/// Created by an explicit block request and kept for the process lifetime
/// unless explicitly unblocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedCountry {
    /// Normalized country code
    pub code: CountryCode,
    /// Human-readable country name
    pub name: String,
}

impl BlockedCountry {
    pub fn new(code: CountryCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }
}

/// A time-limited country block with an absolute expiry timestamp.
///
/// Removed by explicit unblock, by the expiry sweeper, or superseded when a
/// permanent block is added for the same code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalBlock {
    pub code: CountryCode,
    pub name: String,
    /// Absolute expiry; entries at or past this instant are swept
    pub expires_at: DateTime<Utc>,
}

impl TemporalBlock {
    /// Create a block expiring `duration_minutes` from now.
    ///
    /// A zero or negative duration yields an already-expired entry; the
    /// store accepts those so expiry handling can be exercised directly.
    pub fn new(code: CountryCode, name: impl Into<String>, duration_minutes: i64) -> Self {
        Self {
            code,
            name: name.into(),
            expires_at: Utc::now() + Duration::minutes(duration_minutes),
        }
    }

    /// Whether the block has expired at the given instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Ceiling of the time left until expiry, in minutes.
    ///
    /// At least 1 while the block is still active.
    pub fn remaining_minutes(&self, now: DateTime<Utc>) -> i64 {
        let ms = (self.expires_at - now).num_milliseconds();
        ((ms + 59_999) / 60_000).max(1)
    }
}

/// Read model for a currently blocked country.
///
/// Merges permanent entries (`remaining_minutes` absent) with unexpired
/// temporal entries (`remaining_minutes` present, always >= 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedCountryDetails {
    pub code: CountryCode,
    pub name: String,
    pub is_temporary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_minutes: Option<i64>,
}

/// A logged inbound check: which IP resolved to which country, and whether
/// it was blocked at the time. Append-only, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedAttempt {
    pub ip: String,
    pub timestamp: DateTime<Utc>,
    /// Country code as reported by the upstream provider (raw, untyped)
    pub country_code: String,
    pub blocked: bool,
    pub user_agent: String,
}

/// Normalized outcome of a successful upstream geolocation lookup.
///
/// Ephemeral: produced per lookup call, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoResult {
    pub ip: String,
    pub country_code: String,
    pub country_name: String,
    pub org: String,
}
