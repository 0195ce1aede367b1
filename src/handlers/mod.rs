pub mod embed;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

pub async fn index() -> &'static str {
    "Hello!"
}

pub async fn health_check() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "ogp-embed",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
