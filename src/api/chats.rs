use crate::api::validate_pagination;
use crate::error::ApiError;
use crate::models::{
    ChatResponse, ChatsResponse, GetChatRequest, GetContactChatsRequest,
    GetDirectChatByContactRequest, ListChatsRequest,
};
use crate::services::chats;
use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

pub async fn list_chats(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ListChatsRequest>,
) -> Result<Json<ChatsResponse>, ApiError> {
    validate_pagination(req.limit, req.page)?;
    let conn = state.store_conn()?;
    let chats = chats::list_chats(
        &conn,
        req.query.as_deref(),
        req.limit,
        req.page,
        req.include_last_message,
        &req.sort_by,
    )?;
    Ok(Json(ChatsResponse {
        success: true,
        chats,
    }))
}

pub async fn get_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let conn = state.store_conn()?;
    let chat = chats::get_chat(&conn, &req.chat_jid, req.include_last_message)?;
    Ok(Json(ChatResponse {
        success: true,
        chat,
    }))
}

pub async fn get_direct_chat_by_contact(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetDirectChatByContactRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.sender_phone_number.is_empty() {
        return Err(ApiError::Validation(
            "sender_phone_number is required".to_string(),
        ));
    }
    let conn = state.store_conn()?;
    let chat = chats::direct_chat_by_contact(&conn, &req.sender_phone_number)?;
    Ok(Json(ChatResponse {
        success: true,
        chat,
    }))
}

pub async fn get_contact_chats(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetContactChatsRequest>,
) -> Result<Json<ChatsResponse>, ApiError> {
    validate_pagination(req.limit, req.page)?;
    let conn = state.store_conn()?;
    let chats = chats::contact_chats(&conn, &req.jid, req.limit, req.page)?;
    Ok(Json(ChatsResponse {
        success: true,
        chats,
    }))
}
