//! HTTP client for the WhatsApp bridge REST API.
//!
//! The bridge process owns the WhatsApp session; this backend never talks to
//! WhatsApp itself. Send and download actions are proxied here as single
//! synchronous calls with per-action timeouts, and the bridge's own
//! `{success, message}` payload is passed through unchanged.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

const SEND_MESSAGE_TIMEOUT: Duration = Duration::from_secs(10);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the bridge REST API. Cheap to clone; the underlying
/// `reqwest::Client` is shared.
#[derive(Clone)]
pub struct BridgeClient {
    base_url: String,
    http_client: reqwest::Client,
}

/// Bridge call failures. `Rejected` means the bridge answered with a
/// non-success status; the other variants mean it could not be reached or
/// did not behave like the bridge at all. Callers rely on the distinction.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("{0}")]
    Unreachable(String),

    #[error("status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("{0}")]
    InvalidResponse(String),
}

/// Result payload the bridge returns for both send and download calls.
/// Download responses additionally carry the stored file location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Serialize)]
struct SendBody<'a> {
    recipient: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    media_path: Option<&'a str>,
}

#[derive(Serialize)]
struct DownloadBody<'a> {
    message_id: &'a str,
    chat_jid: &'a str,
}

impl BridgeClient {
    pub fn new(base_url: String, http_client: reqwest::Client) -> Self {
        Self {
            base_url,
            http_client,
        }
    }

    pub async fn send_message(
        &self,
        recipient: &str,
        message: &str,
    ) -> Result<BridgeResponse, BridgeError> {
        let body = SendBody {
            recipient,
            message: Some(message),
            media_path: None,
        };
        self.post("send", &body, Some(SEND_MESSAGE_TIMEOUT)).await
    }

    pub async fn send_file(
        &self,
        recipient: &str,
        media_path: &str,
    ) -> Result<BridgeResponse, BridgeError> {
        let body = SendBody {
            recipient,
            message: None,
            media_path: Some(media_path),
        };
        self.post("send", &body, None).await
    }

    /// Audio clips go through the same send endpoint; the bridge turns an
    /// ogg opus `media_path` into a voice message.
    pub async fn send_audio(
        &self,
        recipient: &str,
        media_path: &str,
    ) -> Result<BridgeResponse, BridgeError> {
        let body = SendBody {
            recipient,
            message: None,
            media_path: Some(media_path),
        };
        self.post("send", &body, None).await
    }

    pub async fn download_media(
        &self,
        message_id: &str,
        chat_jid: &str,
    ) -> Result<BridgeResponse, BridgeError> {
        let body = DownloadBody {
            message_id,
            chat_jid,
        };
        self.post("download", &body, Some(DOWNLOAD_TIMEOUT)).await
    }

    async fn post<T: Serialize>(
        &self,
        endpoint: &str,
        body: &T,
        timeout: Option<Duration>,
    ) -> Result<BridgeResponse, BridgeError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut request = self.http_client.post(&url).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let start = Instant::now();
        let response = request.send().await.map_err(|e| {
            warn!(
                target: "bridge",
                endpoint,
                latency_ms = start.elapsed().as_millis(),
                error = %e,
                "bridge request failed"
            );
            BridgeError::Unreachable(e.to_string())
        })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| BridgeError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            warn!(
                target: "bridge",
                endpoint,
                status = %status,
                body = %response_text,
                "bridge rejected request"
            );
            return Err(BridgeError::Rejected {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let decoded: BridgeResponse = serde_json::from_str(&response_text)
            .map_err(|e| BridgeError::InvalidResponse(format!("{}: {}", e, response_text)))?;

        info!(
            target: "bridge",
            endpoint,
            latency_ms = start.elapsed().as_millis(),
            success = decoded.success,
            "bridge request completed"
        );

        Ok(decoded)
    }
}
