use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use core_config::AppInfo;
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    /// "ready" or "not ready"
    pub status: &'static str,
    /// Dependency name to "connected" / "disconnected"
    pub checks: BTreeMap<String, &'static str>,
}

/// A boxed health check future
pub type HealthCheckFuture<'a> = Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

/// Run the named checks concurrently.
///
/// Returns 200 when all pass and 503 otherwise. Failure reasons are logged,
/// never returned.
///
/// ```ignore
/// run_health_checks(vec![
///     ("database", Box::pin(async { ping(&db).await.map_err(|e| e.to_string()) })),
/// ])
/// .await
/// ```
pub async fn run_health_checks(checks: Vec<(&str, HealthCheckFuture<'_>)>) -> Response {
    let names: Vec<_> = checks.iter().map(|(name, _)| *name).collect();
    let results = join_all(checks.into_iter().map(|(_, check)| check)).await;

    let mut all_healthy = true;
    let mut statuses = BTreeMap::new();

    for (name, result) in names.into_iter().zip(results) {
        match result {
            Ok(()) => {
                statuses.insert(name.to_string(), "connected");
            }
            Err(e) => {
                tracing::error!(check = name, error = %e, "Readiness check failed");
                statuses.insert(name.to_string(), "disconnected");
                all_healthy = false;
            }
        }
    }

    let body = ReadyResponse {
        status: if all_healthy { "ready" } else { "not ready" },
        checks: statuses,
    };
    let status = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(body)).into_response()
}

/// Liveness handler: always 200 while the process is serving.
pub async fn health_handler(State(app): State<AppInfo>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        name: app.name,
        version: app.version,
    })
}

/// Router with `GET /health`.
pub fn health_router(app_info: AppInfo) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(app_info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_router_reports_app_info() {
        let app = health_router(AppInfo {
            name: "spectacles-api",
            version: "1.2.3",
        });

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], "1.2.3");
    }

    #[tokio::test]
    async fn test_all_checks_passing_is_ready() {
        let check: HealthCheckFuture = Box::pin(async { Ok(()) });
        let response = run_health_checks(vec![("database", check)]).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["checks"]["database"], "connected");
    }

    #[tokio::test]
    async fn test_failing_check_is_unavailable_without_leaking_reason() {
        let check: HealthCheckFuture = Box::pin(async { Err("auth failed for admin".to_string()) });
        let response = run_health_checks(vec![("database", check)]).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json(response).await;
        assert_eq!(body["status"], "not ready");
        assert!(!body.to_string().contains("admin"));
    }
}
