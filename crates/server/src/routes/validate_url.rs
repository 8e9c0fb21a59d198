//! `POST /api/validate-url` — probe a candidate target for the wizard.
//!
//! Handled failures still answer 200 with an `error` field so the
//! frontend can always parse the body without branching on transport
//! status; only a missing `url` is a 400.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use api_types::{EmbedVerdict, ValidateUrlRequest};

use crate::AppState;

pub async fn validate_url(
    State(state): State<AppState>,
    Json(request): Json<ValidateUrlRequest>,
) -> Response {
    let url = match request.url {
        Some(url) if !url.trim().is_empty() => url,
        _ => {
            let verdict = EmbedVerdict::unreachable("URL is required");
            return (StatusCode::BAD_REQUEST, Json(verdict)).into_response();
        }
    };

    if !url.starts_with("http://") && !url.starts_with("https://") {
        let verdict = EmbedVerdict::unreachable("URL must start with http:// or https://");
        return Json(verdict).into_response();
    }

    Json(state.probe.probe(&url).await).into_response()
}
