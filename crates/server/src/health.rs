use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use eshop_deals_core::{Locale, Region};
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    region: Region,
    locale: Locale,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub storefront: HealthCheck,
    pub checked_at: String,
}

pub fn router(region: Region, locale: Locale) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { region, locale })
}

/// Offline readiness: the storefront is not contacted.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: "eshop-deals-server runtime initialized".to_string(),
        },
        storefront: HealthCheck {
            status: "ready",
            detail: format!("catalog region `{}`, price locale `{}`", state.region, state.locale),
        },
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}
