//! Readiness endpoint

use axum::{Router, extract::State, response::Response, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use database::mongodb::{Client, check_health};

async fn ready(State(client): State<Client>) -> Response {
    let mongodb: HealthCheckFuture<'_> = Box::pin(async {
        let latency = check_health(&client).await.map_err(|e| e.to_string())?;
        tracing::debug!(latency_ms = latency.as_millis() as u64, "MongoDB ping");
        Ok::<(), String>(())
    });

    run_health_checks(vec![("mongodb", mongodb)]).await
}

/// Router with `GET /ready`, mounted beside the liveness probe.
pub fn router(client: Client) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .with_state(client)
}
