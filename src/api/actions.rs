//! Mutating actions, proxied to the WhatsApp bridge.
//!
//! Validation happens here, before any network call; a request with a
//! missing field never reaches the bridge.

use crate::error::ApiError;
use crate::models::{
    DownloadMediaRequest, DownloadResponse, SendAudioRequest, SendFileRequest, SendMessageRequest,
    SendResponse,
};
use crate::state::AppState;
use axum::{extract::State, response::Json};
use std::path::Path;
use std::sync::Arc;

fn require_media_file(media_path: &str) -> Result<(), ApiError> {
    if media_path.is_empty() {
        return Err(ApiError::Validation("media_path is required".to_string()));
    }
    if !Path::new(media_path).is_file() {
        return Err(ApiError::Validation(format!(
            "Media file not found: {}",
            media_path
        )));
    }
    Ok(())
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    if req.recipient.is_empty() {
        return Err(ApiError::Validation("Recipient is required".to_string()));
    }
    if req.message.is_empty() {
        return Err(ApiError::Validation("Message is required".to_string()));
    }

    let response = state.bridge.send_message(&req.recipient, &req.message).await?;
    Ok(Json(SendResponse {
        success: response.success,
        message: response.message.unwrap_or_default(),
    }))
}

pub async fn send_file(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendFileRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    if req.recipient.is_empty() {
        return Err(ApiError::Validation("Recipient is required".to_string()));
    }
    require_media_file(&req.media_path)?;

    let response = state.bridge.send_file(&req.recipient, &req.media_path).await?;
    Ok(Json(SendResponse {
        success: response.success,
        message: response.message.unwrap_or_default(),
    }))
}

pub async fn send_audio(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendAudioRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    if req.recipient.is_empty() {
        return Err(ApiError::Validation("Recipient is required".to_string()));
    }
    require_media_file(&req.media_path)?;
    // The bridge only sends ogg opus as a voice message; conversion is the
    // caller's job.
    if !req.media_path.to_lowercase().ends_with(".ogg") {
        return Err(ApiError::Validation(
            "Audio messages must be .ogg opus files".to_string(),
        ));
    }

    let response = state.bridge.send_audio(&req.recipient, &req.media_path).await?;
    Ok(Json(SendResponse {
        success: response.success,
        message: response.message.unwrap_or_default(),
    }))
}

pub async fn download_media(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DownloadMediaRequest>,
) -> Result<Json<DownloadResponse>, ApiError> {
    if req.message_id.is_empty() {
        return Err(ApiError::Validation("message_id is required".to_string()));
    }
    if req.chat_jid.is_empty() {
        return Err(ApiError::Validation("chat_jid is required".to_string()));
    }

    let response = state
        .bridge
        .download_media(&req.message_id, &req.chat_jid)
        .await?;
    Ok(Json(DownloadResponse {
        success: response.success,
        message: response.message.unwrap_or_default(),
        path: response.path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeClient;
    use mockito::Server;
    use r2d2::Pool;
    use r2d2_sqlite::SqliteConnectionManager;

    fn test_state(bridge_url: &str) -> Arc<AppState> {
        let store_pool = Pool::builder()
            .max_size(1)
            .build(SqliteConnectionManager::memory())
            .expect("pool");
        Arc::new(AppState {
            store_pool,
            bridge: BridgeClient::new(bridge_url.to_string(), reqwest::Client::new()),
        })
    }

    #[tokio::test]
    async fn test_missing_recipient_never_reaches_the_bridge() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/send").expect(0).create_async().await;

        let result = send_message(
            State(test_state(&server.url())),
            Json(SendMessageRequest {
                recipient: String::new(),
                message: "hi".to_string(),
            }),
        )
        .await;

        mock.assert_async().await;
        match result {
            Err(ApiError::Validation(msg)) => assert_eq!(msg, "Recipient is required"),
            other => panic!("expected validation error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_missing_message_never_reaches_the_bridge() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/send").expect(0).create_async().await;

        let result = send_message(
            State(test_state(&server.url())),
            Json(SendMessageRequest {
                recipient: "5511999999999".to_string(),
                message: String::new(),
            }),
        )
        .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_send_message_passes_bridge_result_through() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/send")
            .with_status(200)
            .with_body(r#"{"success": true, "message": "Message sent"}"#)
            .create_async()
            .await;

        let result = send_message(
            State(test_state(&server.url())),
            Json(SendMessageRequest {
                recipient: "5511999999999".to_string(),
                message: "hi".to_string(),
            }),
        )
        .await;

        mock.assert_async().await;
        let Json(response) = result.expect("send should succeed");
        assert!(response.success);
        assert_eq!(response.message, "Message sent");
    }

    #[tokio::test]
    async fn test_send_file_requires_an_existing_file() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/send").expect(0).create_async().await;

        let result = send_file(
            State(test_state(&server.url())),
            Json(SendFileRequest {
                recipient: "5511999999999".to_string(),
                media_path: "/nonexistent/photo.jpg".to_string(),
            }),
        )
        .await;

        mock.assert_async().await;
        match result {
            Err(ApiError::Validation(msg)) => assert!(msg.contains("Media file not found")),
            other => panic!("expected validation error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_send_audio_rejects_non_ogg_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let media_path = dir.path().join("clip.mp3");
        std::fs::write(&media_path, b"not really audio").expect("write fixture");

        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/send").expect(0).create_async().await;

        let result = send_audio(
            State(test_state(&server.url())),
            Json(SendAudioRequest {
                recipient: "5511999999999".to_string(),
                media_path: media_path.to_string_lossy().into_owned(),
            }),
        )
        .await;

        mock.assert_async().await;
        match result {
            Err(ApiError::Validation(msg)) => assert!(msg.contains(".ogg")),
            other => panic!("expected validation error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_send_audio_forwards_ogg_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let media_path = dir.path().join("clip.ogg");
        std::fs::write(&media_path, b"OggS").expect("write fixture");

        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/send")
            .with_status(200)
            .with_body(r#"{"success": true, "message": "Audio sent"}"#)
            .create_async()
            .await;

        let result = send_audio(
            State(test_state(&server.url())),
            Json(SendAudioRequest {
                recipient: "5511999999999".to_string(),
                media_path: media_path.to_string_lossy().into_owned(),
            }),
        )
        .await;

        mock.assert_async().await;
        let Json(response) = result.expect("send should succeed");
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_download_media_requires_chat_jid() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/download")
            .expect(0)
            .create_async()
            .await;

        let result = download_media(
            State(test_state(&server.url())),
            Json(DownloadMediaRequest {
                message_id: "3EB0ABC123".to_string(),
                chat_jid: String::new(),
            }),
        )
        .await;

        mock.assert_async().await;
        match result {
            Err(ApiError::Validation(msg)) => assert_eq!(msg, "chat_jid is required"),
            other => panic!("expected validation error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_download_media_returns_the_stored_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/download")
            .with_status(200)
            .with_body(
                r#"{"success": true, "message": "Downloaded", "path": "/store/media/photo.jpg"}"#,
            )
            .create_async()
            .await;

        let result = download_media(
            State(test_state(&server.url())),
            Json(DownloadMediaRequest {
                message_id: "3EB0ABC123".to_string(),
                chat_jid: "5511999999999@s.whatsapp.net".to_string(),
            }),
        )
        .await;

        mock.assert_async().await;
        let Json(response) = result.expect("download should succeed");
        assert_eq!(response.path.as_deref(), Some("/store/media/photo.jpg"));
    }

    #[tokio::test]
    async fn test_bridge_rejection_surfaces_the_remote_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/send")
            .with_status(500)
            .with_body("session not connected")
            .create_async()
            .await;

        let result = send_message(
            State(test_state(&server.url())),
            Json(SendMessageRequest {
                recipient: "5511999999999".to_string(),
                message: "hi".to_string(),
            }),
        )
        .await;

        mock.assert_async().await;
        match result {
            Err(ApiError::BridgeRejected { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "session not connected");
            }
            other => panic!("expected rejection, got {:?}", other.err()),
        }
    }
}
