//! Ping Handler
//!
//! 健康检查，附带远程 TTS 服务的可达性

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::infrastructure::http::dto::PingResponse;
use crate::infrastructure::http::state::AppState;

/// Ping endpoint - 健康检查
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        tts: state.synthesis_engine.health_check().await,
    })
}
