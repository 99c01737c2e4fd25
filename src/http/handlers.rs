//! Request handlers.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Body of every `GET /` response.
pub const GREETING: &str = "Hello from FastAPI";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Greeting {
    pub message: &'static str,
}

/// `GET /`: one INFO record, then the fixed greeting.
pub async fn root() -> Json<Greeting> {
    tracing::info!("Received request at /");
    Json(Greeting { message: GREETING })
}

/// Fallback for unmatched paths when request metrics are on.
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
