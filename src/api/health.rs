use axum::response::Json;
use serde_json::{Value, json};

/// Lets the login flow and users check that the callback server is up.
pub async fn health() -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "status": "waiting_for_callback",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
