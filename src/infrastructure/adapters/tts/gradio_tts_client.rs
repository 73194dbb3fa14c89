//! Gradio TTS Client - 调用托管在 Gradio 上的 E2/F5-TTS 服务
//!
//! 实现 SynthesisEnginePort trait
//!
//! 远程 API（Gradio HTTP API，前缀默认 `/gradio_api`）:
//! 1. POST {base}{prefix}/upload            multipart `files` → ["<server path>"]
//! 2. POST {base}{prefix}/call{api_name}    {"data": [...]} → {"event_id": "..."}
//! 3. GET  {base}{prefix}/call{api_name}/{event_id}
//!    SSE: `event: complete` 携带输出数组 [音频 FileData, 图片 FileData, 文本]
//! 4. 下载输出文件（FileData.url，缺省时 {base}{prefix}/file={path}）

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

use crate::application::ports::{SynthesisEnginePort, SynthesisError, SynthesisRequest};
use crate::domain::synthesis::{SynthesisParams, SynthesisResult};

/// 提交任务的响应
#[derive(Debug, Deserialize)]
struct EventIdResponse {
    event_id: String,
}

/// Gradio 文件描述
#[derive(Debug, Clone, Deserialize)]
struct GradioFileData {
    path: String,
    #[serde(default)]
    url: Option<String>,
}

impl GradioFileData {
    /// 输出既可能是 FileData 对象，也可能是旧版本的纯路径字符串
    fn from_output(value: &Value) -> Option<Self> {
        match value {
            Value::String(path) => Some(Self {
                path: path.clone(),
                url: None,
            }),
            Value::Object(_) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        }
    }

    fn extension_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        Path::new(&self.path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(fallback)
    }
}

/// Gradio TTS 客户端配置
#[derive(Debug, Clone)]
pub struct GradioTtsClientConfig {
    /// 服务基础 URL，例如 Hugging Face Space 地址
    pub base_url: String,
    /// API 路径前缀
    pub api_prefix: String,
    /// 端点名称
    pub api_name: String,
    /// 请求超时时间（秒），None 表示不限时
    pub timeout_secs: Option<u64>,
    /// Hugging Face 访问令牌
    pub hf_token: Option<String>,
    /// 输出文件下载目录
    pub download_dir: PathBuf,
    /// 合成参数
    pub params: SynthesisParams,
}

impl Default for GradioTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mrfakename-e2-f5-tts.hf.space".to_string(),
            api_prefix: "/gradio_api".to_string(),
            api_name: "/basic_tts".to_string(),
            timeout_secs: None,
            hf_token: None,
            download_dir: PathBuf::from("data/tmp"),
            params: SynthesisParams::default(),
        }
    }
}

impl GradioTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn with_hf_token(mut self, token: impl Into<String>) -> Self {
        self.hf_token = Some(token.into());
        self
    }
}

/// Gradio TTS 客户端
pub struct GradioTtsClient {
    client: Client,
    config: GradioTtsClientConfig,
}

impl GradioTtsClient {
    /// 创建客户端并确保下载目录存在
    pub fn new(config: GradioTtsClientConfig) -> Result<Self, SynthesisError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| SynthesisError::NetworkError(e.to_string()))?;

        std::fs::create_dir_all(&config.download_dir)
            .map_err(|e| SynthesisError::IoError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}{}{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_prefix,
            path
        )
    }

    fn upload_url(&self) -> String {
        self.api_url("/upload")
    }

    fn call_url(&self) -> String {
        self.api_url(&format!("/call{}", self.config.api_name))
    }

    fn result_url(&self, event_id: &str) -> String {
        format!("{}/{}", self.call_url(), event_id)
    }

    fn file_url(&self, remote_path: &str) -> String {
        self.api_url(&format!("/file={}", remote_path))
    }

    fn health_url(&self) -> String {
        format!("{}/config", self.config.base_url.trim_end_matches('/'))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.hf_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// 构造 `/basic_tts` 的参数数组，顺序由远程端点决定
    fn build_payload(&self, remote_ref_path: &str, request: &SynthesisRequest) -> Value {
        let params = &self.config.params;
        json!({
            "data": [
                {
                    "path": remote_ref_path,
                    "meta": { "_type": "gradio.FileData" }
                },
                request.reference_text,
                request.gen_text,
                params.remove_silence,
                params.cross_fade_duration,
                params.nfe_steps,
                params.speed,
            ]
        })
    }

    /// 上传参考音频，返回服务端路径
    async fn upload_reference(&self, path: &Path) -> Result<String, SynthesisError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| SynthesisError::IoError(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "reference.wav".to_string());

        let form = Form::new().part("files", Part::bytes(data).file_name(file_name));

        let response = self
            .authorized(self.client.post(self.upload_url()))
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = ensure_success(response).await?;

        let paths: Vec<String> = response
            .json()
            .await
            .map_err(|e| SynthesisError::InvalidResponse(format!("upload response: {}", e)))?;

        paths
            .into_iter()
            .next()
            .ok_or_else(|| SynthesisError::InvalidResponse("upload returned no path".to_string()))
    }

    /// 提交推理任务，返回 event_id
    async fn submit(&self, payload: &Value) -> Result<String, SynthesisError> {
        let response = self
            .authorized(self.client.post(self.call_url()))
            .json(payload)
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = ensure_success(response).await?;

        let body: EventIdResponse = response
            .json()
            .await
            .map_err(|e| SynthesisError::InvalidResponse(format!("call response: {}", e)))?;

        Ok(body.event_id)
    }

    /// 读取 SSE 结果流直到 complete 或 error
    async fn await_outputs(&self, event_id: &str) -> Result<Vec<Value>, SynthesisError> {
        let response = self
            .authorized(self.client.get(self.result_url(event_id)))
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = ensure_success(response).await?;

        let mut events = Box::pin(response.bytes_stream().eventsource());

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| SynthesisError::NetworkError(e.to_string()))?;

            match event.event.as_str() {
                "complete" => {
                    return serde_json::from_str(&event.data).map_err(|e| {
                        SynthesisError::InvalidResponse(format!("result payload: {}", e))
                    });
                }
                "error" => {
                    return Err(SynthesisError::ServiceError(remote_error_message(
                        &event.data,
                    )));
                }
                other => {
                    tracing::trace!(event_id = %event_id, event = %other, "Gradio progress event");
                }
            }
        }

        Err(SynthesisError::InvalidResponse(
            "event stream ended without a result".to_string(),
        ))
    }

    /// 下载一个输出文件到本地下载目录
    async fn download(
        &self,
        file: &GradioFileData,
        fallback_ext: &str,
    ) -> Result<PathBuf, SynthesisError> {
        let url = file
            .url
            .clone()
            .unwrap_or_else(|| self.file_url(&file.path));

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = ensure_success(response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::InvalidResponse(format!("Failed to read file: {}", e)))?;

        let local_path = self.config.download_dir.join(format!(
            "{}.{}",
            Uuid::new_v4(),
            file.extension_or(fallback_ext)
        ));
        tokio::fs::write(&local_path, &bytes)
            .await
            .map_err(|e| SynthesisError::IoError(format!("{}: {}", local_path.display(), e)))?;

        tracing::debug!(
            url = %url,
            path = %local_path.display(),
            size = bytes.len(),
            "Downloaded synthesis output"
        );

        Ok(local_path)
    }
}

/// 解析输出数组 [音频, 图片, 文本]
fn parse_outputs(
    outputs: &[Value],
) -> Result<(GradioFileData, GradioFileData, String), SynthesisError> {
    let [audio, image, text, ..] = outputs else {
        return Err(SynthesisError::InvalidResponse(format!(
            "expected 3 outputs, got {}",
            outputs.len()
        )));
    };

    let audio = GradioFileData::from_output(audio)
        .ok_or_else(|| SynthesisError::InvalidResponse("audio output is not a file".to_string()))?;
    let image = GradioFileData::from_output(image)
        .ok_or_else(|| SynthesisError::InvalidResponse("image output is not a file".to_string()))?;
    let text = text
        .as_str()
        .ok_or_else(|| SynthesisError::InvalidResponse("text output is not a string".to_string()))?
        .to_string();

    Ok((audio, image, text))
}

/// error 事件的 data 可能是 null、JSON 字符串或任意文本
fn remote_error_message(data: &str) -> String {
    let data = data.trim();
    if data.is_empty() || data == "null" {
        return "remote synthesis failed".to_string();
    }

    match serde_json::from_str::<Value>(data) {
        Ok(Value::String(message)) => message,
        _ => data.to_string(),
    }
}

fn map_transport_error(e: reqwest::Error) -> SynthesisError {
    if e.is_timeout() {
        SynthesisError::Timeout
    } else if e.is_connect() {
        SynthesisError::NetworkError(format!("Cannot connect to TTS service: {}", e))
    } else {
        SynthesisError::NetworkError(e.to_string())
    }
}

async fn ensure_success(response: Response) -> Result<Response, SynthesisError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    Err(SynthesisError::ServiceError(format!(
        "HTTP {}: {}",
        status, error_text
    )))
}

#[async_trait]
impl SynthesisEnginePort for GradioTtsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult, SynthesisError> {
        tracing::debug!(
            url = %self.call_url(),
            reference = %request.reference_audio.display(),
            text_len = request.gen_text.len(),
            "Sending synthesis request"
        );

        let remote_ref = self.upload_reference(&request.reference_audio).await?;
        let payload = self.build_payload(&remote_ref, &request);
        let event_id = self.submit(&payload).await?;
        let outputs = self.await_outputs(&event_id).await?;
        let (audio, image, generated_text) = parse_outputs(&outputs)?;

        let audio_path = self.download(&audio, "wav").await?;
        let image_path = match self.download(&image, "png").await {
            Ok(path) => path,
            Err(e) => {
                let _ = tokio::fs::remove_file(&audio_path).await;
                return Err(e);
            }
        };

        tracing::info!(
            event_id = %event_id,
            audio = %audio_path.display(),
            image = %image_path.display(),
            "Synthesis completed"
        );

        Ok(SynthesisResult {
            audio_path,
            image_path,
            generated_text,
        })
    }

    async fn health_check(&self) -> bool {
        match self
            .authorized(self.client.get(self.health_url()))
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Multipart, Path as AxumPath, State};
    use axum::http::{header, HeaderMap, StatusCode, Uri};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    /// 结果流的返回方式
    #[derive(Clone, Copy)]
    enum Outcome {
        Complete,
        RemoteError,
        Truncated,
        UploadFails,
    }

    #[derive(Default)]
    struct Recorded {
        uploaded_name: Option<String>,
        uploaded_bytes: Vec<u8>,
        call_payload: Option<Value>,
        authorization: Option<String>,
    }

    struct MockGradio {
        addr: SocketAddr,
        outcome: Outcome,
        recorded: Mutex<Recorded>,
    }

    async fn upload(
        State(mock): State<Arc<MockGradio>>,
        headers: HeaderMap,
        mut multipart: Multipart,
    ) -> axum::response::Response {
        if matches!(mock.outcome, Outcome::UploadFails) {
            return (StatusCode::SERVICE_UNAVAILABLE, "space is sleeping").into_response();
        }

        let mut uploaded = None;
        while let Some(field) = multipart.next_field().await.unwrap() {
            if field.name() == Some("files") {
                let name = field.file_name().map(|s| s.to_string());
                uploaded = Some((name, field.bytes().await.unwrap().to_vec()));
            }
        }

        let mut recorded = mock.recorded.lock().unwrap();
        recorded.authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        if let Some((name, bytes)) = uploaded {
            recorded.uploaded_name = name;
            recorded.uploaded_bytes = bytes;
        }
        drop(recorded);

        Json(json!(["/tmp/gradio/abc/ref.wav"])).into_response()
    }

    async fn call(State(mock): State<Arc<MockGradio>>, Json(payload): Json<Value>) -> Json<Value> {
        mock.recorded.lock().unwrap().call_payload = Some(payload);
        Json(json!({ "event_id": "evt-42" }))
    }

    async fn result(
        State(mock): State<Arc<MockGradio>>,
        AxumPath(event_id): AxumPath<String>,
    ) -> impl IntoResponse {
        assert_eq!(event_id, "evt-42");
        let body = match mock.outcome {
            Outcome::Complete => format!(
                "event: generating\ndata: null\n\n\
                 event: complete\ndata: [{{\"path\": \"/tmp/out/gen.wav\", \"url\": \"http://{}/gradio_api/file=/tmp/out/gen.wav\"}}, {{\"path\": \"/tmp/out/spec.png\"}}, \"hello world\"]\n\n",
                mock.addr
            ),
            Outcome::RemoteError => "event: error\ndata: \"GPU quota exceeded\"\n\n".to_string(),
            Outcome::Truncated | Outcome::UploadFails => "event: heartbeat\ndata: null\n\n".to_string(),
        };
        ([(header::CONTENT_TYPE, "text/event-stream")], body)
    }

    async fn file(uri: Uri) -> axum::response::Response {
        match uri.path() {
            "/gradio_api/file=/tmp/out/gen.wav" => b"RIFF generated".to_vec().into_response(),
            "/gradio_api/file=/tmp/out/spec.png" => b"PNG spectrogram".to_vec().into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn start_mock(outcome: Outcome) -> Arc<MockGradio> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mock = Arc::new(MockGradio {
            addr: listener.local_addr().unwrap(),
            outcome,
            recorded: Mutex::new(Recorded::default()),
        });

        let app = Router::new()
            .route("/config", get(|| async { Json(json!({ "version": "5.0.0" })) }))
            .route("/gradio_api/upload", post(upload))
            .route("/gradio_api/call/basic_tts", post(call))
            .route("/gradio_api/call/basic_tts/:event_id", get(result))
            .fallback(file)
            .with_state(mock.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        mock
    }

    fn client_for(mock: &MockGradio, download_dir: &Path) -> GradioTtsClient {
        let config = GradioTtsClientConfig::new(format!("http://{}", mock.addr))
            .with_download_dir(download_dir)
            .with_hf_token("hf_test");
        GradioTtsClient::new(config).unwrap()
    }

    fn reference(dir: &Path) -> SynthesisRequest {
        let path = dir.join("ref.wav");
        std::fs::write(&path, b"reference audio").unwrap();
        SynthesisRequest::with_shared_text(path, "hello")
    }

    #[test]
    fn test_config_default() {
        let config = GradioTtsClientConfig::default();
        assert_eq!(config.base_url, "https://mrfakename-e2-f5-tts.hf.space");
        assert_eq!(config.api_name, "/basic_tts");
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn test_config_builder() {
        let config = GradioTtsClientConfig::new("http://example.com:7860/").with_timeout(60);
        assert_eq!(config.timeout_secs, Some(60));

        let temp = tempdir().unwrap();
        let client = GradioTtsClient::new(config.with_download_dir(temp.path())).unwrap();
        assert_eq!(client.call_url(), "http://example.com:7860/gradio_api/call/basic_tts");
        assert_eq!(
            client.file_url("/tmp/a.wav"),
            "http://example.com:7860/gradio_api/file=/tmp/a.wav"
        );
    }

    #[test]
    fn test_parse_outputs() {
        let outputs = vec![
            json!({ "path": "/tmp/a.wav", "url": "http://x/a.wav" }),
            json!("/tmp/b.png"),
            json!("text"),
        ];
        let (audio, image, text) = parse_outputs(&outputs).unwrap();
        assert_eq!(audio.url.as_deref(), Some("http://x/a.wav"));
        assert_eq!(image.path, "/tmp/b.png");
        assert_eq!(text, "text");

        assert!(parse_outputs(&outputs[..2]).is_err());
        assert!(parse_outputs(&[json!(1), json!(2), json!("t")]).is_err());
    }

    #[test]
    fn test_remote_error_message() {
        assert_eq!(remote_error_message("null"), "remote synthesis failed");
        assert_eq!(remote_error_message(""), "remote synthesis failed");
        assert_eq!(remote_error_message("\"boom\""), "boom");
        assert_eq!(remote_error_message("plain text"), "plain text");
    }

    #[tokio::test]
    async fn test_synthesize_round_trip() {
        let mock = start_mock(Outcome::Complete).await;
        let temp = tempdir().unwrap();
        let client = client_for(&mock, &temp.path().join("downloads"));

        let result = client.synthesize(reference(temp.path())).await.unwrap();

        assert_eq!(result.generated_text, "hello world");
        assert_eq!(std::fs::read(&result.audio_path).unwrap(), b"RIFF generated");
        assert_eq!(std::fs::read(&result.image_path).unwrap(), b"PNG spectrogram");
        assert!(result.audio_path.starts_with(temp.path().join("downloads")));
        assert_eq!(result.audio_path.extension().unwrap(), "wav");
        assert_eq!(result.image_path.extension().unwrap(), "png");

        let recorded = mock.recorded.lock().unwrap();
        assert_eq!(recorded.uploaded_name.as_deref(), Some("ref.wav"));
        assert_eq!(recorded.uploaded_bytes, b"reference audio");
        assert_eq!(recorded.authorization.as_deref(), Some("Bearer hf_test"));

        let data = recorded.call_payload.as_ref().unwrap()["data"].clone();
        assert_eq!(data[0]["path"], "/tmp/gradio/abc/ref.wav");
        assert_eq!(data[1], "hello");
        assert_eq!(data[2], "hello");
        assert_eq!(data[3], false);
        assert!((data[4].as_f64().unwrap() - 0.15).abs() < 1e-6);
        assert_eq!(data[5], 32);
        assert_eq!(data[6], 1.0);
    }

    #[tokio::test]
    async fn test_remote_error_event() {
        let mock = start_mock(Outcome::RemoteError).await;
        let temp = tempdir().unwrap();
        let client = client_for(&mock, temp.path());

        let err = client.synthesize(reference(temp.path())).await.unwrap_err();
        assert!(matches!(err, SynthesisError::ServiceError(ref m) if m == "GPU quota exceeded"));
    }

    #[tokio::test]
    async fn test_stream_without_result() {
        let mock = start_mock(Outcome::Truncated).await;
        let temp = tempdir().unwrap();
        let client = client_for(&mock, temp.path());

        let err = client.synthesize(reference(temp.path())).await.unwrap_err();
        assert!(matches!(err, SynthesisError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_upload_http_error() {
        let mock = start_mock(Outcome::UploadFails).await;
        let temp = tempdir().unwrap();
        let client = client_for(&mock, temp.path());

        let err = client.synthesize(reference(temp.path())).await.unwrap_err();
        match err {
            SynthesisError::ServiceError(message) => {
                assert!(message.contains("503"));
                assert!(message.contains("space is sleeping"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_reference_file() {
        let mock = start_mock(Outcome::Complete).await;
        let temp = tempdir().unwrap();
        let client = client_for(&mock, temp.path());

        let request = SynthesisRequest::with_shared_text(temp.path().join("missing.wav"), "x");
        let err = client.synthesize(request).await.unwrap_err();
        assert!(matches!(err, SynthesisError::IoError(_)));
    }

    #[tokio::test]
    async fn test_health_check() {
        let mock = start_mock(Outcome::Complete).await;
        let temp = tempdir().unwrap();
        assert!(client_for(&mock, temp.path()).health_check().await);

        let offline = GradioTtsClient::new(
            GradioTtsClientConfig::new("http://127.0.0.1:1").with_download_dir(temp.path()),
        )
        .unwrap();
        assert!(!offline.health_check().await);
    }
}
