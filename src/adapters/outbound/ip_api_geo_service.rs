//! IP Geolocation API Client
//!
//! Implements GeoService against an HTTP geolocation provider, with a
//! bounded retry budget and rate-limit backoff.

use crate::domain::entities::GeoResult;
use crate::domain::ports::GeoService;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(10);

/// Provider payload; field names follow the upstream wire format.
#[derive(Debug, Deserialize)]
struct IpGeolocationResponse {
    #[serde(default)]
    ip: String,
    #[serde(rename = "country_code2", default)]
    country_code: String,
    #[serde(rename = "country_name", default)]
    country_name: String,
    #[serde(rename = "isp", default)]
    isp: String,
}

impl From<IpGeolocationResponse> for GeoResult {
    fn from(resp: IpGeolocationResponse) -> Self {
        Self {
            ip: resp.ip,
            country_code: resp.country_code,
            country_name: resp.country_name,
            org: resp.isp,
        }
    }
}

/// Retry loop state. The attempt counter is bounded by `MAX_ATTEMPTS`.
enum RetryState {
    /// Issue upstream request number `n`
    Attempt(u32),
    /// Attempt `n` was rate-limited; sleep before deciding to retry
    Backoff(u32, Duration),
    /// Terminal: the normalized outcome
    Done(Option<GeoResult>),
}

/// HTTP geolocation client.
///
/// Worst case is bounded by design: at most 3 request round trips and 2
/// backoff waits. Transport errors retry immediately, rate limits retry
/// after the provider's `Retry-After` (or a 10s default), and any other
/// non-success response fails fast without another upstream call. Every
/// failure mode surfaces as `None`.
pub struct IpApiGeoService {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl IpApiGeoService {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn attempt(&self, url: &str, attempt: u32) -> RetryState {
        let resp = match self.http.get(url).send().await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::debug!("geo lookup attempt {} failed: {}", attempt, err);
                return if attempt >= MAX_ATTEMPTS {
                    RetryState::Done(None)
                } else {
                    RetryState::Attempt(attempt + 1)
                };
            }
        };

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            let delay = retry_after(resp.headers()).unwrap_or(DEFAULT_RETRY_AFTER);
            tracing::debug!(
                "geo lookup rate-limited on attempt {}, backing off {:?}",
                attempt,
                delay
            );
            return RetryState::Backoff(attempt, delay);
        }

        if !resp.status().is_success() {
            tracing::debug!("geo lookup rejected with status {}", resp.status());
            return RetryState::Done(None);
        }

        match resp.json::<IpGeolocationResponse>().await {
            Ok(body) => RetryState::Done(Some(body.into())),
            Err(err) => {
                tracing::debug!("geo lookup returned unusable payload: {}", err);
                RetryState::Done(None)
            }
        }
    }
}

#[async_trait]
impl GeoService for IpApiGeoService {
    async fn lookup(&self, ip: IpAddr) -> Option<GeoResult> {
        let url = format!("{}?apiKey={}&ip={}", self.base_url, self.api_key, ip);

        let mut state = RetryState::Attempt(1);
        loop {
            state = match state {
                RetryState::Attempt(attempt) => self.attempt(&url, attempt).await,
                RetryState::Backoff(attempt, delay) => {
                    tokio::time::sleep(delay).await;
                    if attempt >= MAX_ATTEMPTS {
                        RetryState::Done(None)
                    } else {
                        RetryState::Attempt(attempt + 1)
                    }
                }
                RetryState::Done(result) => return result,
            };
        }
    }
}

/// Provider-supplied retry delay in whole seconds, if present and parsable.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
