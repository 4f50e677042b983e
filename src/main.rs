mod api;
mod bridge;
mod error;
mod jid;
mod models;
mod services;
mod state;

use api::{actions, chats, contacts, messages};
use bridge::BridgeClient;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Initialize tracing subscriber for logging
    // Use RUST_LOG env var to control log levels, e.g.:
    //   RUST_LOG=bridge=debug  (bridge request/response details)
    //   RUST_LOG=server=info,store=info
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("server=info,bridge=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let db_path = std::env::var("MESSAGES_DB_PATH")
        .unwrap_or_else(|_| "../whatsapp-bridge/store/messages.db".to_string());
    let bridge_base_url = std::env::var("WHATSAPP_API_BASE_URL")
        .unwrap_or_else(|_| bridge::DEFAULT_BASE_URL.to_string());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string());

    // The store belongs to the bridge's ingestion path; this process only
    // ever reads it.
    let store_manager =
        SqliteConnectionManager::file(&db_path).with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY);
    let store_pool = Pool::builder()
        .max_size(4)
        .build(store_manager)
        .expect("Failed to create message store pool");

    // Per-action timeouts are set on each bridge request, not on the client.
    let http_client = reqwest::Client::new();
    let bridge = BridgeClient::new(bridge_base_url.clone(), http_client);

    let state = AppState { store_pool, bridge };

    let app = axum::Router::new()
        .route("/api/health", axum::routing::get(chats::health))
        .route(
            "/api/contacts/search",
            axum::routing::post(contacts::search_contacts),
        )
        .route("/api/chats/list", axum::routing::post(chats::list_chats))
        .route("/api/chats/get", axum::routing::post(chats::get_chat))
        .route(
            "/api/chats/get-by-contact",
            axum::routing::post(chats::get_direct_chat_by_contact),
        )
        .route(
            "/api/chats/get-contact-chats",
            axum::routing::post(chats::get_contact_chats),
        )
        .route(
            "/api/interactions/get-last",
            axum::routing::post(messages::get_last_interaction),
        )
        .route(
            "/api/messages/list",
            axum::routing::post(messages::list_messages),
        )
        .route(
            "/api/messages/get-context",
            axum::routing::post(messages::get_message_context),
        )
        .route(
            "/api/messages/send",
            axum::routing::post(actions::send_message),
        )
        .route("/api/files/send", axum::routing::post(actions::send_file))
        .route("/api/audio/send", axum::routing::post(actions::send_audio))
        .route(
            "/api/media/download",
            axum::routing::post(actions::download_media),
        )
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind");

    info!(target: "server", "Server running on http://{}", bind_addr);
    info!(target: "server", "Using message store: {}", db_path);
    info!(target: "server", "Bridge API at {}", bridge_base_url);

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
