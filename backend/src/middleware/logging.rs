use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header::CONTENT_LENGTH, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use super::request_id::RequestId;

const MAX_BUFFERED_BODY_BYTES: usize = 64 * 1024;
const MAX_LOGGED_BODY_BYTES: usize = 2048;

/// Records diagnostics whenever a handler answers with a 4xx or 5xx status.
/// The response body is buffered so the same payload can still reach the
/// caller after logging.
pub async fn log_error_responses(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let uri = req.uri().to_string();
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let start = Instant::now();

    let response = next.run(req).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let latency_ms = start.elapsed().as_millis() as u64;
    let (mut parts, body) = response.into_parts();
    match buffer_body(body).await {
        Ok((bytes, preview)) => {
            if status.is_server_error() {
                tracing::error!(
                    status = status.as_u16(),
                    method,
                    uri,
                    request_id,
                    latency_ms,
                    body = preview,
                    "request failed"
                );
            } else {
                tracing::warn!(
                    status = status.as_u16(),
                    method,
                    uri,
                    request_id,
                    latency_ms,
                    body = preview,
                    "request rejected"
                );
            }
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(err) => {
            // Body could not be buffered; forward an empty one rather than a
            // stale content-length.
            parts.headers.remove(CONTENT_LENGTH);
            tracing::error!(
                status = status.as_u16(),
                method,
                uri,
                request_id,
                latency_ms,
                error = ?err,
                "failed to read error response body"
            );
            Response::from_parts(parts, Body::empty())
        }
    }
}

async fn buffer_body(body: Body) -> Result<(Bytes, String), axum::Error> {
    let bytes = to_bytes(body, MAX_BUFFERED_BODY_BYTES).await?;
    let preview = if bytes.len() > MAX_LOGGED_BODY_BYTES {
        format!(
            "{}... (truncated, {} bytes total)",
            String::from_utf8_lossy(&bytes.slice(0..MAX_LOGGED_BODY_BYTES)),
            bytes.len()
        )
    } else {
        String::from_utf8_lossy(&bytes).to_string()
    };
    Ok((bytes, preview))
}
