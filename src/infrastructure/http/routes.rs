//! HTTP Routes
//!
//! Endpoints:
//! - /                  GET   落地页（static_dir/index.html）
//! - /static/*          GET   静态资源
//! - /api/upload        POST  上传参考音频和文本，返回合成结果
//! - /api/ping          GET   健康检查
//! - /results/*path     GET   读取合成结果

use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes(static_dir: &Path) -> Router<Arc<AppState>> {
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .nest("/api", api_routes())
        .route("/results/*path", get(handlers::get_result_file))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/upload", post(handlers::upload))
}
