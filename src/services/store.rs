//! Centralized, parameterized queries against the bridge's message store.
//!
//! Every SQL statement in the crate lives here as a named operation on a
//! borrowed connection; no query assembly happens anywhere else. Access is
//! strictly read-only — the pool in `AppState` opens the database with
//! `SQLITE_OPEN_READ_ONLY` and the ingestion path belongs to the bridge.

use crate::models::Message;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};

use crate::jid::DIRECT_SUFFIX;

pub const CONTACT_RESULT_LIMIT: i64 = 50;

const MESSAGE_COLUMNS: &str = "id, chat_jid, sender, content, timestamp, is_from_me, media_type, filename";

/// Chat summary with the correlated last message. When several messages share
/// the chat's `last_message_time`, the one with the greatest id wins, so the
/// correlation is deterministic.
const CHAT_WITH_LAST_SELECT: &str = "
    SELECT
        c.jid,
        c.name,
        c.last_message_time,
        m.content AS last_message,
        m.sender AS last_sender,
        m.is_from_me AS last_is_from_me,
        m.media_type
    FROM chats c
    LEFT JOIN messages m ON m.chat_jid = c.jid
        AND m.timestamp = c.last_message_time
        AND m.id = (
            SELECT MAX(m2.id) FROM messages m2
            WHERE m2.chat_jid = c.jid AND m2.timestamp = c.last_message_time
        )";

const CHAT_IDENTITY_SELECT: &str = "SELECT c.jid, c.name, c.last_message_time FROM chats c";

/// Raw chat row as stored, before display fallbacks are applied.
#[derive(Debug, Clone)]
pub struct ChatRecord {
    pub jid: String,
    pub name: Option<String>,
    pub last_message_time: Option<DateTime<Utc>>,
    pub last_message: Option<String>,
    pub last_sender: Option<String>,
    pub last_is_from_me: Option<bool>,
    pub media_type: Option<String>,
}

/// Filters for `messages_filtered`. All fields combine with AND.
#[derive(Debug, Default)]
pub struct MessageFilters {
    pub chat_jid: Option<String>,
    pub sender: Option<String>,
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    pub query: Option<String>,
}

fn map_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        chat_jid: row.get(1)?,
        sender: row.get(2)?,
        content: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        timestamp: row.get(4)?,
        is_from_me: row.get(5)?,
        media_type: row.get(6)?,
        filename: row.get(7)?,
    })
}

fn map_chat_with_last(row: &Row<'_>) -> rusqlite::Result<ChatRecord> {
    Ok(ChatRecord {
        jid: row.get(0)?,
        name: row.get(1)?,
        last_message_time: row.get(2)?,
        last_message: row.get(3)?,
        last_sender: row.get(4)?,
        last_is_from_me: row.get(5)?,
        media_type: row.get(6)?,
    })
}

fn map_chat_identity(row: &Row<'_>) -> rusqlite::Result<ChatRecord> {
    Ok(ChatRecord {
        jid: row.get(0)?,
        name: row.get(1)?,
        last_message_time: row.get(2)?,
        last_message: None,
        last_sender: None,
        last_is_from_me: None,
        media_type: None,
    })
}

fn name_or_jid_filter(sql: &mut String, params_vec: &mut Vec<Box<dyn ToSql>>, query: Option<&str>) {
    if let Some(query) = query {
        sql.push_str(" WHERE (LOWER(c.name) LIKE ? OR LOWER(c.jid) LIKE ?)");
        let pattern = format!("%{}%", query.to_lowercase());
        params_vec.push(Box::new(pattern.clone()));
        params_vec.push(Box::new(pattern));
    }
}

fn query_chats(
    conn: &Connection,
    sql: &str,
    params_vec: &[Box<dyn ToSql>],
    map: fn(&Row<'_>) -> rusqlite::Result<ChatRecord>,
) -> Result<Vec<ChatRecord>, rusqlite::Error> {
    let mut stmt = conn.prepare(sql)?;
    let param_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(param_refs.as_slice(), map)?.collect();
    rows
}

/// Chats ordered by recency, each correlated with its most recent message
/// via the tie-broken left join.
pub fn chats_with_last_message(
    conn: &Connection,
    query: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<ChatRecord>, rusqlite::Error> {
    let mut sql = CHAT_WITH_LAST_SELECT.to_string();
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();
    name_or_jid_filter(&mut sql, &mut params_vec, query);
    sql.push_str(" ORDER BY c.last_message_time DESC LIMIT ? OFFSET ?");
    params_vec.push(Box::new(limit));
    params_vec.push(Box::new(offset));
    query_chats(conn, &sql, &params_vec, map_chat_with_last)
}

/// Chat identity fields only; the correlation join is skipped entirely.
pub fn chats_without_last_message(
    conn: &Connection,
    query: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<ChatRecord>, rusqlite::Error> {
    let mut sql = CHAT_IDENTITY_SELECT.to_string();
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();
    name_or_jid_filter(&mut sql, &mut params_vec, query);
    sql.push_str(" ORDER BY c.last_message_time DESC LIMIT ? OFFSET ?");
    params_vec.push(Box::new(limit));
    params_vec.push(Box::new(offset));
    query_chats(conn, &sql, &params_vec, map_chat_identity)
}

pub fn chat_by_jid(
    conn: &Connection,
    jid: &str,
    include_last_message: bool,
) -> Result<Option<ChatRecord>, rusqlite::Error> {
    if include_last_message {
        let sql = format!("{} WHERE c.jid = ?1 LIMIT 1", CHAT_WITH_LAST_SELECT);
        conn.query_row(&sql, params![jid], map_chat_with_last)
            .optional()
    } else {
        let sql = format!("{} WHERE c.jid = ?1 LIMIT 1", CHAT_IDENTITY_SELECT);
        conn.query_row(&sql, params![jid], map_chat_identity)
            .optional()
    }
}

/// First direct chat whose jid contains the phone number. Group chats can
/// never match: the direct suffix is required.
pub fn direct_chat_by_phone(
    conn: &Connection,
    phone: &str,
) -> Result<Option<ChatRecord>, rusqlite::Error> {
    let sql = format!(
        "{} WHERE c.jid LIKE ?1 AND c.jid LIKE '%{}' LIMIT 1",
        CHAT_WITH_LAST_SELECT, DIRECT_SUFFIX
    );
    let pattern = format!("%{}%", phone);
    conn.query_row(&sql, params![pattern], map_chat_with_last)
        .optional()
}

/// Distinct chats a contact participates in: chats containing messages they
/// sent, plus their own direct chat.
pub fn chats_for_contact(
    conn: &Connection,
    jid: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<ChatRecord>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "
        SELECT DISTINCT c.jid, c.name, c.last_message_time
        FROM chats c
        JOIN messages m ON m.chat_jid = c.jid
        WHERE m.sender = ?1 OR c.jid = ?1
        ORDER BY c.last_message_time DESC
        LIMIT ?2 OFFSET ?3
        ",
    )?;
    let rows = stmt
        .query_map(params![jid, limit, offset], map_chat_identity)?
        .collect();
    rows
}

/// One page of a chat's messages. The page boundary is computed over
/// descending timestamps (page 0 holds the most recent messages), then the
/// page is reversed so callers always receive chronological order.
pub fn messages_for_chat(
    conn: &Connection,
    chat_jid: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Message>, rusqlite::Error> {
    let sql = format!(
        "SELECT {} FROM messages WHERE chat_jid = ?1 ORDER BY timestamp DESC LIMIT ?2 OFFSET ?3",
        MESSAGE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut messages: Vec<Message> = stmt
        .query_map(params![chat_jid, limit, offset], map_message)?
        .collect::<Result<Vec<_>, _>>()?;
    messages.reverse();
    Ok(messages)
}

/// Filtered message listing, paginated identically to `messages_for_chat`.
pub fn messages_filtered(
    conn: &Connection,
    filters: &MessageFilters,
    limit: i64,
    offset: i64,
) -> Result<Vec<Message>, rusqlite::Error> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(chat_jid) = &filters.chat_jid {
        clauses.push("chat_jid = ?");
        params_vec.push(Box::new(chat_jid.clone()));
    }
    if let Some(sender) = &filters.sender {
        clauses.push("sender = ?");
        params_vec.push(Box::new(sender.clone()));
    }
    if let Some(after) = &filters.after {
        clauses.push("timestamp > ?");
        params_vec.push(Box::new(*after));
    }
    if let Some(before) = &filters.before {
        clauses.push("timestamp < ?");
        params_vec.push(Box::new(*before));
    }
    if let Some(query) = &filters.query {
        clauses.push("LOWER(content) LIKE ?");
        params_vec.push(Box::new(format!("%{}%", query.to_lowercase())));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT {} FROM messages{} ORDER BY timestamp DESC LIMIT ? OFFSET ?",
        MESSAGE_COLUMNS, where_clause
    );
    params_vec.push(Box::new(limit));
    params_vec.push(Box::new(offset));

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let mut messages: Vec<Message> = stmt
        .query_map(param_refs.as_slice(), map_message)?
        .collect::<Result<Vec<_>, _>>()?;
    messages.reverse();
    Ok(messages)
}

/// Point lookup. Absence is an `Ok(None)`, not an error. Message ids are
/// only unique within a chat; if two chats reuse an id the first row wins.
pub fn message_by_id(
    conn: &Connection,
    id: &str,
) -> Result<Option<Message>, rusqlite::Error> {
    let sql = format!(
        "SELECT {} FROM messages WHERE id = ?1 LIMIT 1",
        MESSAGE_COLUMNS
    );
    conn.query_row(&sql, params![id], map_message).optional()
}

/// Most recent message involving the contact, in any chat.
pub fn last_message_for_contact(
    conn: &Connection,
    jid: &str,
) -> Result<Option<Message>, rusqlite::Error> {
    let sql = format!(
        "SELECT {} FROM messages WHERE sender = ?1 OR chat_jid = ?1 ORDER BY timestamp DESC LIMIT 1",
        MESSAGE_COLUMNS
    );
    conn.query_row(&sql, params![jid], map_message).optional()
}

/// Up to `count` messages strictly earlier than `ts` in the chat, returned
/// in chronological order.
pub fn messages_before(
    conn: &Connection,
    chat_jid: &str,
    ts: DateTime<Utc>,
    count: i64,
) -> Result<Vec<Message>, rusqlite::Error> {
    let sql = format!(
        "SELECT {} FROM messages WHERE chat_jid = ?1 AND timestamp < ?2 ORDER BY timestamp DESC LIMIT ?3",
        MESSAGE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut messages: Vec<Message> = stmt
        .query_map(params![chat_jid, ts, count], map_message)?
        .collect::<Result<Vec<_>, _>>()?;
    messages.reverse();
    Ok(messages)
}

/// Up to `count` messages strictly later than `ts` in the chat.
pub fn messages_after(
    conn: &Connection,
    chat_jid: &str,
    ts: DateTime<Utc>,
    count: i64,
) -> Result<Vec<Message>, rusqlite::Error> {
    let sql = format!(
        "SELECT {} FROM messages WHERE chat_jid = ?1 AND timestamp > ?2 ORDER BY timestamp ASC LIMIT ?3",
        MESSAGE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![chat_jid, ts, count], map_message)?
        .collect();
    rows
}

/// Distinct direct-chat rows for contact search: `(jid, stored name)`,
/// optionally filtered by a case-insensitive substring over name or jid,
/// ordered by name and capped at `CONTACT_RESULT_LIMIT`.
pub fn direct_contacts(
    conn: &Connection,
    query: &str,
) -> Result<Vec<(String, Option<String>)>, rusqlite::Error> {
    let mut sql = format!(
        "SELECT DISTINCT jid, name FROM chats WHERE jid LIKE '%{}'",
        DIRECT_SUFFIX
    );
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();
    if !query.is_empty() {
        sql.push_str(" AND (LOWER(name) LIKE ? OR LOWER(jid) LIKE ?)");
        let pattern = format!("%{}%", query.to_lowercase());
        params_vec.push(Box::new(pattern.clone()));
        params_vec.push(Box::new(pattern));
    }
    sql.push_str(" ORDER BY name LIMIT ?");
    params_vec.push(Box::new(CONTACT_RESULT_LIMIT));

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })?
        .collect();
    rows
}
