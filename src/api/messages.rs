use crate::api::validate_pagination;
use crate::error::ApiError;
use crate::models::{
    GetLastInteractionRequest, GetMessageContextRequest, LastInteractionResponse,
    ListMessagesRequest, MessageContextResponse, MessageWithContext, MessagesResponse,
};
use crate::services::context;
use crate::services::store::{self, MessageFilters};
use crate::state::AppState;
use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use std::sync::Arc;

fn parse_timestamp(value: Option<&str>, field: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
    match value {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| {
                ApiError::Validation(format!("invalid {} timestamp {:?}: {}", field, raw, e))
            }),
    }
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ListMessagesRequest>,
) -> Result<Json<MessagesResponse>, ApiError> {
    validate_pagination(req.limit, req.page)?;
    if req.include_context && (req.context_before < 0 || req.context_after < 0) {
        return Err(ApiError::Validation(
            "context sizes must not be negative".to_string(),
        ));
    }

    let filters = MessageFilters {
        chat_jid: req.chat_jid,
        sender: req.sender_phone_number,
        after: parse_timestamp(req.after.as_deref(), "after")?,
        before: parse_timestamp(req.before.as_deref(), "before")?,
        query: req.query,
    };

    let conn = state.store_conn()?;
    let messages = store::messages_filtered(&conn, &filters, req.limit, req.page * req.limit)?;

    let mut hits = Vec::with_capacity(messages.len());
    for message in messages {
        let (context_before, context_after) = if req.include_context {
            context::window_around(&conn, &message, req.context_before, req.context_after)?
        } else {
            (Vec::new(), Vec::new())
        };
        hits.push(MessageWithContext {
            message,
            context_before,
            context_after,
        });
    }

    Ok(Json(MessagesResponse {
        success: true,
        messages: hits,
    }))
}

pub async fn get_message_context(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetMessageContextRequest>,
) -> Result<Json<MessageContextResponse>, ApiError> {
    if req.message_id.is_empty() {
        return Err(ApiError::Validation("message_id is required".to_string()));
    }
    if req.before < 0 || req.after < 0 {
        return Err(ApiError::Validation(
            "context sizes must not be negative".to_string(),
        ));
    }

    let conn = state.store_conn()?;
    let context = context::message_context(&conn, &req.message_id, req.before, req.after)?;
    Ok(Json(MessageContextResponse {
        success: true,
        message: context.message,
        before: context.before,
        after: context.after,
    }))
}

pub async fn get_last_interaction(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetLastInteractionRequest>,
) -> Result<Json<LastInteractionResponse>, ApiError> {
    if req.jid.is_empty() {
        return Err(ApiError::Validation("jid is required".to_string()));
    }

    let conn = state.store_conn()?;
    let message = store::last_message_for_contact(&conn, &req.jid)?
        .ok_or_else(|| ApiError::NotFound(format!("no messages found for {}", req.jid)))?;
    Ok(Json(LastInteractionResponse {
        success: true,
        message,
    }))
}
