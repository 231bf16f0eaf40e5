/**
 * Logs Route Handler
 * Receives browser-side log entries and re-emits them through tracing
 */
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use tower_http::request_id::RequestId;

use crate::logging::config::{
    ClientLogBatch, ClientLogEntry, LogLevel, LogResponse, MAX_BATCH_SIZE, MAX_MESSAGE_CHARS,
};

/// POST /api/logs
#[tracing::instrument(skip_all, fields(batch_size = batch.logs.len()))]
pub async fn receive_client_logs(
    request_id: Option<Extension<RequestId>>,
    Json(batch): Json<ClientLogBatch>,
) -> impl IntoResponse {
    let req_id = request_id
        .as_ref()
        .and_then(|ext| ext.0.header_value().to_str().ok())
        .unwrap_or("unknown");

    let received = batch.logs.len();
    if received > MAX_BATCH_SIZE {
        tracing::warn!(request_id = %req_id, received, "client log batch truncated");
    }

    let mut processed = 0;
    for entry in batch.logs.iter().take(MAX_BATCH_SIZE) {
        emit(entry, req_id);
        processed += 1;
    }

    (
        StatusCode::ACCEPTED,
        Json(LogResponse {
            success: true,
            received,
            processed,
        }),
    )
}

fn emit(entry: &ClientLogEntry, request_id: &str) {
    let message: String = entry.message.chars().take(MAX_MESSAGE_CHARS).collect();
    let page = entry.page.as_deref().unwrap_or("-");

    let span = tracing::info_span!(
        "client_log",
        request_id = %request_id,
        timestamp = %entry.timestamp,
        page = %page,
        source = "client",
    );
    let _enter = span.enter();

    match entry.level {
        LogLevel::Trace => tracing::trace!(message = %message, context = ?entry.context, "client log"),
        LogLevel::Debug => tracing::debug!(message = %message, context = ?entry.context, "client log"),
        LogLevel::Info => tracing::info!(message = %message, context = ?entry.context, "client log"),
        LogLevel::Warn => tracing::warn!(message = %message, context = ?entry.context, "client log"),
        LogLevel::Error => tracing::error!(message = %message, context = ?entry.context, "client log"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::post, Router};
    use tower::ServiceExt;

    fn logs_router() -> Router {
        Router::new().route("/api/logs", post(receive_client_logs))
    }

    async fn post_batch(body: serde_json::Value) -> (StatusCode, LogResponse) {
        let req = Request::post("/api/logs")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = logs_router().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_accepts_batch() {
        let (status, body) = post_batch(serde_json::json!({
            "logs": [
                {"timestamp": "t", "level": "info", "message": "quote form opened"},
                {"timestamp": "t", "level": "error", "message": "geocode failed", "page": "/th/quote"}
            ]
        }))
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body.received, 2);
        assert_eq!(body.processed, 2);
    }

    #[tokio::test]
    async fn test_oversized_batch_is_capped() {
        let entries: Vec<_> = (0..MAX_BATCH_SIZE + 5)
            .map(|i| serde_json::json!({"timestamp": "t", "level": "debug", "message": i.to_string()}))
            .collect();
        let (_, body) = post_batch(serde_json::json!({ "logs": entries })).await;
        assert_eq!(body.received, MAX_BATCH_SIZE + 5);
        assert_eq!(body.processed, MAX_BATCH_SIZE);
    }
}
