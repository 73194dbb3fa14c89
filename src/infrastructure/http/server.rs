//! HTTP Server
//!
//! Axum HTTP 服务器启动和配置

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::middleware::error_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 落地页所在目录
    pub static_dir: PathBuf,
    /// 请求体大小上限（字节）
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: PathBuf::from("static"),
            max_body_bytes: 50 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    /// 创建新的 HTTP 服务器
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// 构建 Router
    pub fn router(&self) -> Router {
        // CORS 配置 - 允许所有来源的跨域请求
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
            .expose_headers(Any)
            .max_age(std::time::Duration::from_secs(3600));

        create_routes(&self.config.static_dir)
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes))
            .layer(middleware::from_fn(error_logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// 启动服务器
    pub async fn run(self) -> Result<(), std::io::Error> {
        let router = self.router();
        let addr = self.config.addr();

        info!("Starting HTTP server on {}", addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }

    /// 启动服务器（带优雅关闭）
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let addr = self.config.addr();

        info!("Starting HTTP server on {} (with graceful shutdown)", addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::{
        FakeSynthesisEngine, FakeSynthesisEngineConfig, FileArtifactStore, FileUploadStaging,
    };
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    const BOUNDARY: &str = "voxgate-test-boundary";

    struct TestApp {
        temp: TempDir,
        engine: Arc<FakeSynthesisEngine>,
        router: Router,
    }

    async fn test_app(engine_config: impl FnOnce(&mut FakeSynthesisEngineConfig)) -> TestApp {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();

        let static_dir = root.join("static");
        std::fs::create_dir_all(&static_dir).unwrap();
        std::fs::write(static_dir.join("index.html"), "<h1>voxgate</h1>").unwrap();

        let mut config = FakeSynthesisEngineConfig::new(root.join("tmp"));
        config.text = Some("hello there".to_string());
        engine_config(&mut config);
        let engine = Arc::new(FakeSynthesisEngine::new(config));

        let staging = Arc::new(FileUploadStaging::new(root.join("uploads")).await.unwrap());
        let store = Arc::new(FileArtifactStore::new(root.join("results")).await.unwrap());

        let state = AppState::new(staging, engine.clone(), store);
        let server = HttpServer::new(
            ServerConfig::new("127.0.0.1", 5000)
                .with_static_dir(static_dir)
                .with_max_body_bytes(1024 * 1024),
            state,
        );
        let router = server.router();

        TestApp {
            temp,
            engine,
            router,
        }
    }

    enum Part<'a> {
        File(&'a str, Option<&'a str>, &'a [u8]),
        Text(&'a str, &'a str),
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::File(name, Some(filename), data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n",
                            name, filename
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
                Part::File(name, None, data) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                            .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}",
                            name, value
                        )
                        .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_upload_success() {
        let app = test_app(|_| {}).await;

        let response = app
            .router
            .clone()
            .oneshot(upload_request(&[
                Part::File("file", Some("ref.wav"), b"RIFF reference"),
                Part::Text("text", "hello"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json,
            serde_json::json!({
                "message": "File uploaded and processed successfully",
                "filename": "ref.wav",
                "audio_result": "/results/result_1/audio_result.wav",
                "image_result": "/results/result_1/image_result.png",
                "text_result": "hello there",
            })
        );

        let root = app.temp.path();
        assert_eq!(
            std::fs::read(root.join("uploads/ref.wav")).unwrap(),
            b"RIFF reference"
        );
        assert!(root.join("results/result_1/audio_result.wav").is_file());
        assert!(root.join("results/result_1/image_result.png").is_file());

        let request = app.engine.last_request().unwrap();
        assert_eq!(request.reference_text, "hello");
        assert_eq!(request.gen_text, "hello");
    }

    #[tokio::test]
    async fn test_uploaded_result_is_served() {
        let app = test_app(|config| config.audio_bytes = b"synthesized".to_vec()).await;

        let response = app
            .router
            .clone()
            .oneshot(upload_request(&[
                Part::File("file", Some("ref.mp3"), b"ID3"),
                Part::Text("text", "hello"),
            ]))
            .await
            .unwrap();
        let json = body_json(response).await;
        let audio_url = json["audio_result"].as_str().unwrap().to_string();

        let response = app.router.clone().oneshot(get(&audio_url)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "audio/wav");
        assert_eq!(response.headers()["content-length"], "11");
        assert_eq!(body_bytes(response).await, b"synthesized");
    }

    #[tokio::test]
    async fn test_sequential_uploads_use_new_slots() {
        let app = test_app(|_| {}).await;

        for expected in 1..=2 {
            let response = app
                .router
                .clone()
                .oneshot(upload_request(&[
                    Part::File("file", Some("ref.wav"), b"RIFF"),
                    Part::Text("text", "hello"),
                ]))
                .await
                .unwrap();
            let json = body_json(response).await;
            assert_eq!(
                json["image_result"],
                format!("/results/result_{}/image_result.png", expected)
            );
        }
    }

    #[tokio::test]
    async fn test_upload_missing_text() {
        let app = test_app(|_| {}).await;

        let response = app
            .router
            .clone()
            .oneshot(upload_request(&[Part::File("file", Some("ref.wav"), b"RIFF")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "File or text input missing"})
        );
        assert!(!app.temp.path().join("uploads/ref.wav").exists());
        assert_eq!(app.engine.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let app = test_app(|_| {}).await;

        let response = app
            .router
            .clone()
            .oneshot(upload_request(&[Part::Text("text", "hello")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "File or text input missing"})
        );
    }

    #[tokio::test]
    async fn test_upload_empty_filename() {
        let app = test_app(|_| {}).await;

        let response = app
            .router
            .clone()
            .oneshot(upload_request(&[
                Part::File("file", Some(""), b""),
                Part::Text("text", "hello"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "No file selected"})
        );
    }

    #[tokio::test]
    async fn test_upload_file_part_without_filename() {
        let app = test_app(|_| {}).await;

        let response = app
            .router
            .clone()
            .oneshot(upload_request(&[
                Part::File("file", None, b"RIFF"),
                Part::Text("text", "hello"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "File or text input missing"})
        );
        assert_eq!(app.engine.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_disallowed_extension() {
        let app = test_app(|_| {}).await;

        let response = app
            .router
            .clone()
            .oneshot(upload_request(&[
                Part::File("file", Some("script.exe"), b"MZ"),
                Part::Text("text", "hello"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "File type not allowed"})
        );
        assert_eq!(app.engine.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_synthesis_failure() {
        let app = test_app(|config| config.failure = Some("queue is full".to_string())).await;

        let response = app
            .router
            .clone()
            .oneshot(upload_request(&[
                Part::File("file", Some("ref.wav"), b"RIFF"),
                Part::Text("text", "hello"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        let message = json["error"].as_str().unwrap();
        assert!(message.starts_with("Error processing file: "));
        assert!(message.contains("queue is full"));
        assert!(!app.temp.path().join("results/result_1").exists());
    }

    #[tokio::test]
    async fn test_upload_over_body_limit() {
        let app = test_app(|_| {}).await;
        let data = vec![0u8; 2 * 1024 * 1024];

        let response = app
            .router
            .clone()
            .oneshot(upload_request(&[
                Part::File("file", Some("big.wav"), &data),
                Part::Text("text", "hello"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(app.engine.call_count(), 0);
    }

    #[tokio::test]
    async fn test_results_traversal_is_not_found() {
        let app = test_app(|_| {}).await;
        std::fs::write(app.temp.path().join("secret.txt"), "secret").unwrap();

        for uri in [
            "/results/../secret.txt",
            "/results/..%2fsecret.txt",
            "/results/result_1/%2e%2e/%2e%2e/secret.txt",
        ] {
            let response = app.router.clone().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
            let json = body_json(response).await;
            assert!(json["error"]
                .as_str()
                .unwrap()
                .starts_with("Error retrieving result file: "));
        }
    }

    #[tokio::test]
    async fn test_results_missing_file() {
        let app = test_app(|_| {}).await;

        let response = app
            .router
            .clone()
            .oneshot(get("/results/result_9/audio_result.wav"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_index_page() {
        let app = test_app(|_| {}).await;

        let response = app.router.clone().oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"<h1>voxgate</h1>");
    }

    #[tokio::test]
    async fn test_ping() {
        let app = test_app(|_| {}).await;

        let response = app.router.clone().oneshot(get("/api/ping")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["tts"], true);
    }
}
