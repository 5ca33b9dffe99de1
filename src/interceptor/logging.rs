use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Logs method, path, status and latency of each request at debug level
///
/// Server errors are additionally logged at warn.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    tracing::debug!("--> {} {}", method, uri);

    let response = next.run(request).await;
    let elapsed = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        tracing::warn!("<-- {} {} {} {:?}", method, uri, status, elapsed);
    } else {
        tracing::debug!("<-- {} {} {} {:?}", method, uri, status, elapsed);
    }

    response
}
