use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the character cache is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Which Battle.net region and locale the roster is read from.
    pub battlenet: UpstreamInfo,
    /// Outbound throttle shared by every enrichment worker.
    pub rate_limit: RateLimitInfo,
    pub enrich_workers: usize,
}

#[derive(Serialize)]
pub struct UpstreamInfo {
    pub namespace: String,
    pub locale: String,
}

#[derive(Serialize)]
pub struct RateLimitInfo {
    pub per_second: u32,
    pub burst: u32,
    pub max_wait_ms: u64,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = armory_db::health_check(&state.pool).await.is_ok();
    if !db_healthy {
        tracing::warn!("Health check: character cache unreachable");
    }

    let config = &state.config;
    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        battlenet: UpstreamInfo {
            namespace: config.battlenet.namespace.clone(),
            locale: config.battlenet.locale.clone(),
        },
        rate_limit: RateLimitInfo {
            per_second: config.rate_limit.per_second,
            burst: config.rate_limit.burst,
            max_wait_ms: u64::try_from(config.rate_limit.max_wait.as_millis()).unwrap_or(u64::MAX),
        },
        enrich_workers: config.enrich_workers,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
