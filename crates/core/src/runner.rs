//! One invocation: resolve, then notify. Lookup failures are logged here and
//! end the run without a notification.

use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::query::Query;
use crate::errors::ResolveError;
use crate::format::DisplayLine;
use crate::notify::{DeliveryPolicy, Notifier, NotifyOutcome};
use crate::resolver::QueryResolver;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub correlation_id: String,
    pub query: Query,
    pub lines: Vec<DisplayLine>,
    pub delivery: NotifyOutcome,
}

pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

pub async fn run_query(
    resolver: &QueryResolver,
    notifier: &Notifier,
    query: &Query,
    correlation_id: &str,
) -> Result<RunReport, ResolveError> {
    info!(
        event_name = "run.started",
        correlation_id,
        mode = %query.mode,
        argument = %query.argument,
        region = %resolver.region(),
        "price notification run started"
    );

    let lines = match resolver.resolve(query).await {
        Ok(lines) => lines,
        Err(resolve_error) => {
            error!(
                event_name = "run.lookup_failed",
                correlation_id,
                mode = %query.mode,
                error = %resolve_error,
                "lookup failed; no notification will be sent"
            );
            return Err(resolve_error);
        }
    };

    let delivery = notifier.notify(&lines, DeliveryPolicy::from(query.mode)).await;
    info!(
        event_name = "run.finished",
        correlation_id,
        lines = lines.len(),
        delivery = ?delivery,
        "price notification run finished"
    );

    Ok(RunReport {
        correlation_id: correlation_id.to_owned(),
        query: query.clone(),
        lines,
        delivery,
    })
}
