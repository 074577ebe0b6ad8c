//! GeoBlocker API Server
//!
//! HTTP API for managing country blocks, resolving caller IPs, and reading
//! attempt logs. Validation, filtering, and pagination live here; the
//! store and geolocation client stay transport-agnostic.

use crate::application::GeoBlockService;
use crate::domain::entities::BlockedCountryDetails;
use crate::domain::ports::BlockedStore;
use crate::domain::value_objects::CountryCode;
use crate::infrastructure::shutdown::ShutdownController;
use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Permanent block request.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockCountryRequest {
    pub code: String,
    /// Display name; falls back to the normalized code when absent
    #[serde(default)]
    pub name: Option<String>,
}

/// Temporal block request.
#[derive(Debug, Clone, Deserialize)]
pub struct TemporalBlockRequest {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    pub duration_minutes: i64,
}

/// Query for the blocked-country listing.
#[derive(Debug, Deserialize)]
pub struct BlockedListQuery {
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_blocked_page_size")]
    pub page_size: usize,
}

/// Query for the attempt-log listing.
#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_logs_page_size")]
    pub page_size: usize,
}

/// Query for the IP lookup endpoint.
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub ip_address: Option<String>,
}

fn default_page() -> usize {
    1
}
fn default_blocked_page_size() -> usize {
    10
}
fn default_logs_page_size() -> usize {
    20
}

/// Pagination envelope.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub items: Vec<T>,
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub blocked_countries: usize,
}

/// API server state.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn BlockedStore>,
    pub service: Arc<GeoBlockService>,
}

/// API server for the GeoBlocker service.
pub struct ApiServer {
    listen_addr: String,
    state: ApiState,
}

impl ApiServer {
    pub fn new(listen_addr: String, state: ApiState) -> Self {
        Self { listen_addr, state }
    }

    /// Run the API server until the shutdown controller fires.
    pub async fn run(&self, shutdown: ShutdownController) -> anyhow::Result<()> {
        let app = router(self.state.clone());
        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("GeoBlocker API listening on {}", self.listen_addr);

        let mut rx = shutdown.subscribe();
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = rx.recv().await;
        })
        .await?;
        Ok(())
    }
}

/// Build the router. Exposed separately so tests can drive it in-process.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/countries/block", post(block_country_handler))
        .route("/api/countries/block/:code", delete(unblock_country_handler))
        .route("/api/countries/blocked", get(list_blocked_handler))
        .route("/api/countries/temporal-block", post(temporal_block_handler))
        .route("/api/ip/lookup", get(ip_lookup_handler))
        .route("/api/ip/check-block", get(check_block_handler))
        .route("/api/logs/blocked-attempts", get(list_attempts_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Handler functions

async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        blocked_countries: state.store.currently_blocked().len(),
    })
}

async fn block_country_handler(
    State(state): State<ApiState>,
    Json(req): Json<BlockCountryRequest>,
) -> Response {
    let code = match CountryCode::parse(&req.code) {
        Ok(code) => code,
        Err(err) => return bad_request(err.to_string()),
    };
    let name = req.name.unwrap_or_else(|| code.as_str().to_string());

    if state.store.add_permanent(code.clone(), name.clone()) {
        tracing::info!("permanently blocked country {}", code);
        (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "code": code,
                "name": name
            })),
        )
            .into_response()
    } else {
        (
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "error": format!("country {} is already blocked", code)
            })),
        )
            .into_response()
    }
}

async fn unblock_country_handler(
    State(state): State<ApiState>,
    Path(raw_code): Path<String>,
) -> Response {
    let code = match CountryCode::parse(&raw_code) {
        Ok(code) => code,
        Err(err) => return bad_request(err.to_string()),
    };

    if state.store.remove_blocked(&code) {
        tracing::info!("unblocked country {}", code);
        StatusCode::NO_CONTENT.into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("country {} is not blocked", code)
            })),
        )
            .into_response()
    }
}

async fn list_blocked_handler(
    State(state): State<ApiState>,
    Query(query): Query<BlockedListQuery>,
) -> impl IntoResponse {
    let mut details = state.store.currently_blocked();
    if let Some(search) = &query.search {
        details = filter_blocked(details, search);
    }
    Json(paginate(details, query.page, query.page_size))
}

async fn temporal_block_handler(
    State(state): State<ApiState>,
    Json(req): Json<TemporalBlockRequest>,
) -> Response {
    if !(1..=1440).contains(&req.duration_minutes) {
        return bad_request("duration must be between 1 and 1440 minutes".to_string());
    }
    let code = match CountryCode::parse(&req.code) {
        Ok(code) => code,
        Err(err) => return bad_request(err.to_string()),
    };
    let name = req.name.unwrap_or_else(|| code.as_str().to_string());

    match state.store.add_temporal(code, name, req.duration_minutes) {
        Ok(block) => {
            tracing::info!(
                "temporally blocked country {} until {}",
                block.code,
                block.expires_at
            );
            Json(serde_json::json!({
                "country": block.code,
                "expires_at": block.expires_at
            }))
            .into_response()
        }
        Err(conflict) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "error": conflict.to_string() })),
        )
            .into_response(),
    }
}

async fn ip_lookup_handler(
    State(state): State<ApiState>,
    Query(query): Query<LookupQuery>,
    headers: HeaderMap,
    conn: Option<ConnectInfo<SocketAddr>>,
) -> Response {
    let ip = match &query.ip_address {
        Some(raw) => match raw.parse::<IpAddr>() {
            Ok(ip) => ip,
            Err(_) => return bad_request("invalid IP address format".to_string()),
        },
        None => match caller_ip(&headers, conn.map(|c| c.0)) {
            Some(ip) => ip,
            None => return bad_request("could not determine caller address".to_string()),
        },
    };

    match state.service.lookup(ip).await {
        Some(result) => Json(result).into_response(),
        None => upstream_failure(),
    }
}

async fn check_block_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    conn: Option<ConnectInfo<SocketAddr>>,
) -> Response {
    let ip = match caller_ip(&headers, conn.map(|c| c.0)) {
        Some(ip) => ip,
        None => return bad_request("could not determine caller address".to_string()),
    };
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    match state.service.check_block(ip, user_agent).await {
        Some(verdict) => Json(serde_json::json!({
            "ip": verdict.ip,
            "country": verdict.country_code,
            "blocked": verdict.blocked
        }))
        .into_response(),
        None => upstream_failure(),
    }
}

async fn list_attempts_handler(
    State(state): State<ApiState>,
    Query(query): Query<LogsQuery>,
) -> impl IntoResponse {
    let mut logs = state.store.logs();
    logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Json(paginate(logs, query.page, query.page_size))
}

// Helpers

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

fn upstream_failure() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({
            "error": "failed to fetch IP details from upstream service"
        })),
    )
        .into_response()
}

/// Caller IP: first hop of X-Forwarded-For when present, else the socket
/// peer address.
fn caller_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
        .or_else(|| peer.map(|p| p.ip()))
}

/// Case-insensitive substring filter over code and name.
fn filter_blocked(
    details: Vec<BlockedCountryDetails>,
    search: &str,
) -> Vec<BlockedCountryDetails> {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return details;
    }
    details
        .into_iter()
        .filter(|d| {
            d.code.as_str().to_lowercase().contains(&needle)
                || d.name.to_lowercase().contains(&needle)
        })
        .collect()
}

fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = items.len();
    let items = items
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    Page {
        page,
        page_size,
        total,
        items,
    }
}
