//! Context expansion: the ordered window of messages around a target.

use crate::error::ApiError;
use crate::models::Message;
use crate::services::store;
use rusqlite::Connection;

#[derive(Debug)]
pub struct MessageContext {
    pub message: Message,
    pub before: Vec<Message>,
    pub after: Vec<Message>,
}

/// The two window halves around an already-resolved message: up to `before`
/// strictly earlier and `after` strictly later neighbors in the same chat,
/// both in chronological order. Messages at the chat edges get short halves.
pub fn window_around(
    conn: &Connection,
    message: &Message,
    before: i64,
    after: i64,
) -> Result<(Vec<Message>, Vec<Message>), ApiError> {
    let earlier = store::messages_before(conn, &message.chat_jid, message.timestamp, before)?;
    let later = store::messages_after(conn, &message.chat_jid, message.timestamp, after)?;
    Ok((earlier, later))
}

pub fn message_context(
    conn: &Connection,
    message_id: &str,
    before: i64,
    after: i64,
) -> Result<MessageContext, ApiError> {
    let target = store::message_by_id(conn, message_id)?
        .ok_or_else(|| ApiError::NotFound(format!("message {} not found", message_id)))?;
    let (before, after) = window_around(conn, &target, before, after)?;
    Ok(MessageContext {
        message: target,
        before,
        after,
    })
}
