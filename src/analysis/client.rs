use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::AnalysisError;
use super::messages::{DetectObjectsResponse, Detection, HealthResponse, ReadTextResponse};
use super::result::AnalysisKind;
use crate::capture::EncodedFrame;

/// Multipart field carrying the frame
pub const IMAGE_FIELD: &str = "image";

const FRAME_FILE_NAME: &str = "frame.jpg";

/// Connection settings for the inference service
#[derive(Debug, Clone)]
pub struct AnalysisClientConfig {
    /// Service root, e.g. `http://127.0.0.1:5000`
    pub base_url: String,

    /// Optional per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for AnalysisClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout: None,
        }
    }
}

pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(config: AnalysisClientConfig) -> Result<Self, AnalysisError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run object detection on one frame
    pub async fn detect_objects(
        &self,
        frame: EncodedFrame,
        cancel: &CancellationToken,
    ) -> Result<Vec<Detection>, AnalysisError> {
        let response: DetectObjectsResponse = self
            .submit(AnalysisKind::DetectObjects, frame, cancel)
            .await?;

        info!("Detection returned {} object(s)", response.objects.len());
        Ok(response.objects)
    }

    /// Run text recognition on one frame. An empty string means no text was found.
    pub async fn recognize_text(
        &self,
        frame: EncodedFrame,
        cancel: &CancellationToken,
    ) -> Result<String, AnalysisError> {
        let response: ReadTextResponse = self.submit(AnalysisKind::ReadText, frame, cancel).await?;

        let text = response.text.unwrap_or_default();
        info!("Text recognition returned {} character(s)", text.len());
        Ok(text)
    }

    /// Probe the service's test endpoint
    pub async fn check_health(&self) -> Result<HealthResponse, AnalysisError> {
        let url = format!("{}/test", self.base_url);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        Self::parse_body(status, &body)
    }

    async fn submit<T: DeserializeOwned>(
        &self,
        kind: AnalysisKind,
        frame: EncodedFrame,
        cancel: &CancellationToken,
    ) -> Result<T, AnalysisError> {
        let url = format!("{}{}", self.base_url, kind.endpoint());
        debug!("POST {} ({} bytes, {})", url, frame.len(), frame.mime);

        let part = Part::bytes(frame.bytes)
            .file_name(FRAME_FILE_NAME)
            .mime_str(&frame.mime)?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let request = async {
            let response = self.http.post(&url).multipart(form).send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, AnalysisError>((status, body))
        };

        let (status, body) = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("{} request cancelled", kind.endpoint());
                return Err(AnalysisError::Cancelled);
            }
            result = request => result?,
        };

        debug!("{} answered {}", kind.endpoint(), status);
        Self::parse_body(status, &body)
    }

    /// Decode a service body. An `error` field wins over the HTTP status.
    fn parse_body<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, AnalysisError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            if status.is_success() {
                AnalysisError::Transport(format!("malformed response: {}", e))
            } else {
                AnalysisError::Transport(format!("HTTP {}", status))
            }
        })?;

        if let Some(error) = value.get("error").filter(|v| is_set(v)) {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            warn!("Service reported error (HTTP {}): {}", status, message);
            return Err(AnalysisError::Remote(message));
        }

        if !status.is_success() {
            return Err(AnalysisError::Transport(format!("HTTP {}", status)));
        }

        serde_json::from_value(value)
            .map_err(|e| AnalysisError::Transport(format!("unexpected response: {}", e)))
    }
}

/// `null`, `false`, `0` and `""` mean no error was reported
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
