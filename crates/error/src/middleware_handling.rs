use axum::{
    Json,
    body::Body,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::{error, info};

use crate::ErrorResponse;

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

/// Rewrites framework-generated error responses (unknown route, wrong method,
/// oversized body, ...) into the JSON error shape used by `AppError`.
pub async fn error_handling_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let path = req.uri().path().to_owned();
    let method = req.method().clone();

    let response = next.run(req).await;
    let status = response.status();

    info!(
        "Request completed: {} {} - Status: {} - Time: {:?}",
        method,
        path,
        status,
        start.elapsed()
    );

    if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
        return response;
    }

    if status.is_server_error() {
        error!("Server error occurred: {}", status);
    }

    let message = status.canonical_reason().unwrap_or("Request failed");
    let code = message.to_uppercase().replace([' ', '-'], "_");
    let body = ErrorResponse::new(message, code);

    (status, Json(body)).into_response()
}
