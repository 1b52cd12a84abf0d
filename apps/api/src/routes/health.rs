use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and store availability.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let database = if state.intake.store_available() {
        "available"
    } else {
        "unavailable"
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "portfolio",
        "database": database
    }))
}
