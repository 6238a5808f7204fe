//! Operational HTTP endpoints.
//!
//! - `/healthz`    : liveness
//! - `/debug/vars` : expvar storages rendered as JSON, refreshed per request

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{Map, Value};

use crate::app_state::AppState;
use crate::storage::Storage;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn debug_vars(State(state): State<AppState>) -> impl IntoResponse {
    let mut body = Map::new();
    for storage in state.expvars() {
        body.insert(storage.id().to_string(), storage.render().await);
    }
    Json(Value::Object(body))
}
