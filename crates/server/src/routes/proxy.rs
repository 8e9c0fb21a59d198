//! `GET /api/proxy/{token}/{...remainder}` — fetch a target document and
//! stream it back into the simulator iframe.

use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use services::services::{ProxyError, ProxyPayload};

use crate::AppState;

pub async fn proxy_target(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    match state.proxy.handle(&path, query.as_deref()).await {
        Ok(payload) => payload_response(payload),
        Err(err) => error_response(&err),
    }
}

/// A proxy URL with no encoded-base segment at all.
pub async fn missing_target() -> Response {
    error_response(&ProxyError::MissingToken)
}

fn payload_response(payload: ProxyPayload) -> Response {
    match payload {
        // Rewritten HTML is always served 200: the document the iframe
        // receives is the proxy's output, not the upstream's.
        ProxyPayload::Html(html) => (
            [
                (header::CONTENT_TYPE, HeaderValue::from_static("text/html")),
                (
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                ),
            ],
            html,
        )
            .into_response(),
        ProxyPayload::Binary {
            status,
            content_type,
            body,
        } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            let mut response = (status, body).into_response();
            match HeaderValue::from_str(&content_type) {
                Ok(value) if !content_type.is_empty() => {
                    response.headers_mut().insert(header::CONTENT_TYPE, value);
                }
                _ => {
                    response.headers_mut().remove(header::CONTENT_TYPE);
                }
            }
            response
        }
    }
}

fn error_response(err: &ProxyError) -> Response {
    if err.is_client_error() {
        tracing::debug!(error = %err, "rejecting malformed proxy request");
        (StatusCode::BAD_REQUEST, err.to_string()).into_response()
    } else {
        tracing::error!(error = %err, "proxy request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Proxy Error").into_response()
    }
}
