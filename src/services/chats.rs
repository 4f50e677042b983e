//! Chat summaries: store rows mapped to API shapes.
//!
//! Display fallbacks and the group flag are computed here, never stored.

use crate::error::ApiError;
use crate::jid;
use crate::models::ChatSummary;
use crate::services::store::{self, ChatRecord};
use rusqlite::Connection;

/// Recognized `sort_by` values. Anything else is rejected up front instead
/// of silently falling back to a default order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatSort {
    LastActive,
}

impl ChatSort {
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value {
            "last_active" => Ok(ChatSort::LastActive),
            other => Err(ApiError::Validation(format!(
                "unsupported sort_by value: {}",
                other
            ))),
        }
    }
}

fn to_summary(record: ChatRecord, include_last_message: bool) -> ChatSummary {
    let is_group = jid::is_group(&record.jid);
    let name = record
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| record.jid.clone());
    ChatSummary {
        name,
        is_group,
        last_message_time: record.last_message_time,
        last_message: include_last_message.then(|| record.last_message.unwrap_or_default()),
        last_sender: if include_last_message {
            record.last_sender
        } else {
            None
        },
        last_is_from_me: include_last_message.then(|| record.last_is_from_me.unwrap_or(false)),
        media_type: if include_last_message {
            record.media_type
        } else {
            None
        },
        jid: record.jid,
    }
}

pub fn list_chats(
    conn: &Connection,
    query: Option<&str>,
    limit: i64,
    page: i64,
    include_last_message: bool,
    sort_by: &str,
) -> Result<Vec<ChatSummary>, ApiError> {
    // Only one sort key exists; the store queries already order by recency.
    let ChatSort::LastActive = ChatSort::parse(sort_by)?;

    let offset = page * limit;
    let records = if include_last_message {
        store::chats_with_last_message(conn, query, limit, offset)?
    } else {
        store::chats_without_last_message(conn, query, limit, offset)?
    };
    Ok(records
        .into_iter()
        .map(|r| to_summary(r, include_last_message))
        .collect())
}

pub fn get_chat(
    conn: &Connection,
    chat_jid: &str,
    include_last_message: bool,
) -> Result<ChatSummary, ApiError> {
    let record = store::chat_by_jid(conn, chat_jid, include_last_message)?
        .ok_or_else(|| ApiError::NotFound(format!("chat {} not found", chat_jid)))?;
    Ok(to_summary(record, include_last_message))
}

pub fn direct_chat_by_contact(
    conn: &Connection,
    sender_phone_number: &str,
) -> Result<ChatSummary, ApiError> {
    let record = store::direct_chat_by_phone(conn, sender_phone_number)?.ok_or_else(|| {
        ApiError::NotFound(format!(
            "no direct chat found for {}",
            sender_phone_number
        ))
    })?;
    Ok(to_summary(record, true))
}

pub fn contact_chats(
    conn: &Connection,
    contact_jid: &str,
    limit: i64,
    page: i64,
) -> Result<Vec<ChatSummary>, ApiError> {
    let records = store::chats_for_contact(conn, contact_jid, limit, page * limit)?;
    Ok(records.into_iter().map(|r| to_summary(r, false)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::tests::{insert_chat, insert_message, test_conn, ts};

    const ANA: &str = "5511999990001@s.whatsapp.net";
    const GROUP: &str = "120363040000000000@g.us";

    #[test]
    fn test_sort_by_rejects_unknown_values() {
        assert!(ChatSort::parse("last_active").is_ok());
        let err = list_chats(&test_conn(), None, 10, 0, true, "alphabetical").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_summary_name_falls_back_to_jid() {
        let conn = test_conn();
        insert_chat(&conn, ANA, None, ts(1));
        insert_chat(&conn, GROUP, Some(""), ts(2));

        let chats = list_chats(&conn, None, 10, 0, true, "last_active").unwrap();
        assert_eq!(chats[0].name, GROUP);
        assert_eq!(chats[1].name, ANA);
    }

    #[test]
    fn test_is_group_follows_jid_suffix() {
        let conn = test_conn();
        insert_chat(&conn, ANA, Some("Ana"), ts(1));
        insert_chat(&conn, GROUP, Some("Group"), ts(2));

        let chats = list_chats(&conn, None, 10, 0, false, "last_active").unwrap();
        assert!(chats.iter().any(|c| c.jid == GROUP && c.is_group));
        assert!(chats.iter().any(|c| c.jid == ANA && !c.is_group));
    }

    #[test]
    fn test_excluding_last_message_omits_correlation_fields() {
        let conn = test_conn();
        insert_chat(&conn, ANA, Some("Ana"), ts(3));
        insert_message(&conn, "m1", ANA, "5511999990001", "hello", ts(3), false);

        let with = list_chats(&conn, None, 10, 0, true, "last_active").unwrap();
        assert_eq!(with[0].last_message.as_deref(), Some("hello"));

        let without = list_chats(&conn, None, 10, 0, false, "last_active").unwrap();
        assert_eq!(without[0].last_message, None);
        assert_eq!(without[0].last_is_from_me, None);
    }

    #[test]
    fn test_included_last_message_falls_back_to_empty_string() {
        let conn = test_conn();
        // chat timestamp matches no stored message
        insert_chat(&conn, ANA, Some("Ana"), ts(9));

        let chats = list_chats(&conn, None, 10, 0, true, "last_active").unwrap();
        assert_eq!(chats[0].last_message.as_deref(), Some(""));
        assert_eq!(chats[0].last_is_from_me, Some(false));
    }

    #[test]
    fn test_get_chat_not_found() {
        let err = get_chat(&test_conn(), "missing@s.whatsapp.net", true).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
