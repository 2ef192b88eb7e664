//! HTTP surface for Rusty Digest.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /summarize/batch` – Filter a list of articles and summarize the eligible ones.
//!   Accepts `{ "articles": [...] }` (`items` is accepted as an alias) and returns per-article
//!   results plus run statistics.
//! - `GET /metrics` – Observe cumulative run and item counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.

use crate::batch::{BatchApi, BatchError, BatchReport, Item};
use crate::metrics::MetricsSnapshot;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the batch API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: BatchApi + 'static,
{
    Router::new()
        .route("/summarize/batch", post(summarize_batch::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// Request body for the `POST /summarize/batch` endpoint.
#[derive(Deserialize)]
struct BatchRequest {
    /// Articles to consider for summarization.
    #[serde(default, alias = "items")]
    articles: Vec<Item>,
}

/// Filter and summarize the submitted articles.
async fn summarize_batch<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchReport>, AppError>
where
    S: BatchApi,
{
    if request.articles.is_empty() {
        return Err(AppError::BadRequest("No articles provided".into()));
    }

    let received = request.articles.len();
    let report = service.summarize_batch(request.articles).await?;
    tracing::info!(
        received,
        processed = report.processed_count,
        results = report.results.len(),
        "Batch request completed"
    );
    Ok(Json(report))
}

/// Return cumulative batch counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: BatchApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "summarize_batch",
                method: "POST",
                path: "/summarize/batch",
                description: "Filter articles that still need a summary and summarize them in rate-limited chunks. Response returns { \"results\": [...], \"stats\": {...} }.",
                request_example: Some(json!({
                    "articles": [{
                        "id": "1",
                        "title": "Council approves budget",
                        "content": "Full article text...",
                        "published_at": "2025-01-01T08:00:00Z"
                    }]
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return cumulative run and item counters.",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    BadRequest(String),
    Batch(BatchError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Batch(error) => {
                tracing::error!(error = %error, "Batch request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<BatchError> for AppError {
    fn from(inner: BatchError) -> Self {
        Self::Batch(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{create_router, get_commands};
    use crate::batch::{BatchApi, BatchError, BatchReport, Item, Outcome};
    use crate::metrics::MetricsSnapshot;
    use crate::summarization::Summary;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use std::sync::Arc;
    use time::OffsetDateTime;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[tokio::test]
    async fn commands_catalog_exposes_batch_endpoint() {
        let response = get_commands().await;
        let commands = response.0.commands;
        let batch = commands
            .iter()
            .find(|cmd| cmd.name == "summarize_batch")
            .expect("batch command present");

        assert_eq!(batch.method, "POST");
        assert_eq!(batch.path, "/summarize/batch");
        assert!(batch.description.to_lowercase().contains("chunk"));
    }

    #[tokio::test]
    async fn batch_route_forwards_articles() {
        let service = Arc::new(StubBatchService::default());
        let app = create_router(service.clone());

        let payload = json!({
            "articles": [
                { "id": 1, "title": "First", "content": "Body one" },
                { "id": "2", "title": "Second", "description": "Body two" }
            ]
        });

        let response = app
            .oneshot(json_request("/summarize/batch", payload))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["original_count"], 2);
        assert_eq!(json["results"][0]["status"], "success");
        assert_eq!(json["results"][0]["item_id"], "1");

        let calls = service.calls.lock().await.clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 2);
        assert_eq!(calls[0][1].description.as_deref(), Some("Body two"));
    }

    #[tokio::test]
    async fn items_alias_is_accepted() {
        let service = Arc::new(StubBatchService::default());
        let app = create_router(service.clone());

        let response = app
            .oneshot(json_request(
                "/summarize/batch",
                json!({ "items": [{ "title": "Only" }] }),
            ))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(service.calls.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected() {
        let service = Arc::new(StubBatchService::default());
        let app = create_router(service.clone());

        let response = app
            .oneshot(json_request("/summarize/batch", json!({ "articles": [] })))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["error"], "No articles provided");
        assert!(service.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn run_level_fault_maps_to_server_error() {
        let service = Arc::new(StubBatchService {
            fail_with: Some(BatchError::InvalidConcurrency),
            ..StubBatchService::default()
        });
        let app = create_router(service);

        let response = app
            .oneshot(json_request(
                "/summarize/batch",
                json!({ "articles": [{ "title": "Any" }] }),
            ))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn get_is_not_allowed_on_batch_route() {
        let app = create_router(Arc::new(StubBatchService::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/summarize/batch")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn metrics_route_returns_snapshot() {
        let app = create_router(Arc::new(StubBatchService::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["runs_completed"], 4);
    }

    fn json_request(uri: &str, payload: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request")
    }

    #[derive(Default)]
    struct StubBatchService {
        calls: Mutex<Vec<Vec<Item>>>,
        fail_with: Option<BatchError>,
    }

    #[async_trait]
    impl BatchApi for StubBatchService {
        async fn summarize_batch(&self, items: Vec<Item>) -> Result<BatchReport, BatchError> {
            if let Some(error) = self.fail_with {
                return Err(error);
            }

            self.calls.lock().await.push(items.clone());
            let results = items
                .iter()
                .map(|item| Outcome::success(item, Summary::new("Stub summary.", "stub"), 1))
                .collect();
            Ok(BatchReport {
                original_count: items.len(),
                processed_count: items.len(),
                results,
                stats: None,
                message: None,
                timestamp: OffsetDateTime::now_utc(),
            })
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                runs_completed: 4,
                ..MetricsSnapshot::default()
            }
        }
    }
}
