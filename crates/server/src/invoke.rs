//! Hosted-function surface: `GET /run?type=<tag>&title=<argument>`.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use eshop_deals_core::config::AppConfig;
use eshop_deals_core::runner::new_correlation_id;
use eshop_deals_core::{
    run_query, ApplicationError, CatalogProvider, DomainError, InterfaceError, NotificationSink,
    Notifier, NotifierSettings, NotifyOutcome, PriceProvider, QueryMode, QueryResolver,
    ResolverSettings,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// First line of every hosted message unless `notifier.header` is set.
pub const HOSTED_HEADER: &str = "-- *eSHOP CURRENT DEALS* --";

#[derive(Clone)]
pub struct InvokeState {
    resolver: Arc<QueryResolver>,
    notifier: Arc<Notifier>,
}

impl InvokeState {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        prices: Arc<dyn PriceProvider>,
        sink: Arc<dyn NotificationSink>,
        config: &AppConfig,
    ) -> Self {
        let mut notifier_settings = NotifierSettings::from(config);
        notifier_settings.header.get_or_insert_with(|| HOSTED_HEADER.to_string());

        Self {
            resolver: Arc::new(QueryResolver::new(
                catalog,
                prices,
                ResolverSettings::from(config),
            )),
            notifier: Arc::new(Notifier::new(sink, notifier_settings)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RunParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
}

impl RunParams {
    pub fn query(&self) -> Result<eshop_deals_core::Query, DomainError> {
        let mode = QueryMode::from_request_tag(self.kind.as_deref());
        eshop_deals_core::Query::new(mode, self.title.clone().unwrap_or_default())
    }
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub status: &'static str,
    pub correlation_id: String,
    pub lines: Vec<String>,
    pub delivery: NotifyOutcome,
}

#[derive(Debug, Serialize)]
pub struct RunError {
    pub status: &'static str,
    pub error: &'static str,
    pub detail: String,
    pub correlation_id: String,
}

type Rejection = (StatusCode, Json<RunError>);

pub fn router(state: InvokeState) -> Router {
    Router::new().route("/run", get(run)).with_state(state)
}

/// Delivery failures are reported in `delivery`, not as an HTTP error.
pub async fn run(
    State(state): State<InvokeState>,
    Query(params): Query<RunParams>,
) -> Result<Json<RunResponse>, Rejection> {
    let correlation_id = new_correlation_id();

    let query = params
        .query()
        .map_err(|error| reject(ApplicationError::from(error).into_interface(&correlation_id)))?;

    let report = run_query(&state.resolver, &state.notifier, &query, &correlation_id)
        .await
        .map_err(|error| reject(ApplicationError::from(error).into_interface(&correlation_id)))?;

    Ok(Json(RunResponse {
        status: "ok",
        correlation_id: report.correlation_id,
        lines: report.lines.into_iter().map(|line| line.text).collect(),
        delivery: report.delivery,
    }))
}

fn reject(error: InterfaceError) -> Rejection {
    let status = match &error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!(
        event_name = "server.run.rejected",
        correlation_id = error.correlation_id(),
        status = status.as_u16(),
        error = %error,
        "run request rejected"
    );

    (
        status,
        Json(RunError {
            status: "error",
            error: error.user_message(),
            detail: error.to_string(),
            correlation_id: error.correlation_id().to_string(),
        }),
    )
}
