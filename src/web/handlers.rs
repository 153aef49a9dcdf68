use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
};
use serde_json::{json, Value};
use std::time::Instant;
use validator::Validate;

use crate::cache::cache_key;
use crate::models::ProxyConfig;
use crate::session::{ScrapeSession, SessionRequest};
use crate::utils::error::AppError;

use super::{ApiError, ApiResponse, AppState, HealthCheck, HealthResponse, ScrapeOutcome};

pub async fn liveness() -> Json<Value> {
    Json(json!({ "message": "Scraping service is running!" }))
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let start = Instant::now();
    let cache = match state.cache.get(&cache_key("__health__")).await {
        Ok(_) => HealthCheck {
            name: "cache".to_string(),
            status: "healthy".to_string(),
            message: None,
            duration_ms: Some(start.elapsed().as_millis() as u64),
        },
        Err(e) => HealthCheck {
            name: "cache".to_string(),
            status: "unhealthy".to_string(),
            message: Some(e.to_string()),
            duration_ms: Some(start.elapsed().as_millis() as u64),
        },
    };

    Json(HealthResponse::from_checks(vec![cache]))
}

/// Proxy descriptor from the request body. An empty body, `null` and `{}` all count as missing.
pub fn parse_proxy_body(body: &[u8]) -> Result<ProxyConfig, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::MissingProxy);
    }

    let proxy: Option<ProxyConfig> =
        serde_json::from_slice(body).map_err(|e| AppError::InvalidProxy {
            scheme: "body".to_string(),
            message: e.to_string(),
        })?;

    let proxy = proxy.unwrap_or_default();
    proxy.validate()?;
    Ok(proxy)
}

pub async fn start_scrape(
    State(state): State<AppState>,
    query: Result<Query<SessionRequest>, QueryRejection>,
    body: Bytes,
) -> Result<Json<ApiResponse<ScrapeOutcome>>, ApiError> {
    let Query(request) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    request.validate().map_err(AppError::from)?;

    let proxy = parse_proxy_body(&body)?;

    let session = ScrapeSession::with_proxy(
        &state.config,
        &proxy,
        state.cache.clone(),
        state.plugins.clone(),
    )?;

    tracing::info!(
        session_id = %session.id(),
        pages = request.pages,
        max_products = request.max_products,
        "Scrape requested"
    );

    let summary = session.run(&request).await.map_err(|e| {
        tracing::error!(session_id = %session.id(), "Scrape failed: {}", e);
        e
    })?;

    Ok(Json(ApiResponse::success(ScrapeOutcome::new(
        summary.scraped_count,
        request.max_products,
    ))))
}
