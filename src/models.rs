use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub fn default_limit() -> i64 {
    20
}

pub fn default_true() -> bool {
    true
}

pub fn default_sort_by() -> String {
    "last_active".to_string()
}

fn default_context_size() -> i64 {
    1
}

fn default_window_size() -> i64 {
    5
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Message {
    pub id: String,
    pub chat_jid: String,
    pub sender: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_from_me: bool,
    pub media_type: Option<String>,
    pub filename: Option<String>,
}

/// Chat summary row: identity fields plus, when requested, the correlated
/// most recent message.
#[derive(Serialize, Clone, Debug)]
pub struct ChatSummary {
    pub jid: String,
    pub name: String,
    pub last_message_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_is_from_me: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    pub is_group: bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct Contact {
    pub jid: String,
    pub name: String,
    pub phone_number: String,
}

#[derive(Serialize, Debug)]
pub struct MessageWithContext {
    #[serde(flatten)]
    pub message: Message,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context_before: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context_after: Vec<Message>,
}

#[derive(Deserialize)]
pub struct SearchContactsRequest {
    pub query: String,
}

#[derive(Serialize)]
pub struct ContactsResponse {
    pub success: bool,
    pub contacts: Vec<Contact>,
}

#[derive(Deserialize)]
pub struct ListChatsRequest {
    pub query: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_true")]
    pub include_last_message: bool,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
}

#[derive(Serialize)]
pub struct ChatsResponse {
    pub success: bool,
    pub chats: Vec<ChatSummary>,
}

#[derive(Deserialize)]
pub struct GetChatRequest {
    pub chat_jid: String,
    #[serde(default = "default_true")]
    pub include_last_message: bool,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub chat: ChatSummary,
}

#[derive(Deserialize)]
pub struct GetDirectChatByContactRequest {
    pub sender_phone_number: String,
}

#[derive(Deserialize)]
pub struct GetContactChatsRequest {
    pub jid: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub page: i64,
}

#[derive(Deserialize)]
pub struct GetLastInteractionRequest {
    pub jid: String,
}

#[derive(Serialize)]
pub struct LastInteractionResponse {
    pub success: bool,
    pub message: Message,
}

#[derive(Deserialize)]
pub struct ListMessagesRequest {
    /// RFC 3339 lower bound on timestamp (exclusive).
    pub after: Option<String>,
    /// RFC 3339 upper bound on timestamp (exclusive).
    pub before: Option<String>,
    pub sender_phone_number: Option<String>,
    pub chat_jid: Option<String>,
    pub query: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_true")]
    pub include_context: bool,
    #[serde(default = "default_context_size")]
    pub context_before: i64,
    #[serde(default = "default_context_size")]
    pub context_after: i64,
}

#[derive(Serialize)]
pub struct MessagesResponse {
    pub success: bool,
    pub messages: Vec<MessageWithContext>,
}

#[derive(Deserialize)]
pub struct GetMessageContextRequest {
    pub message_id: String,
    #[serde(default = "default_window_size")]
    pub before: i64,
    #[serde(default = "default_window_size")]
    pub after: i64,
}

#[derive(Serialize)]
pub struct MessageContextResponse {
    pub success: bool,
    pub message: Message,
    pub before: Vec<Message>,
    pub after: Vec<Message>,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub recipient: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct SendFileRequest {
    pub recipient: String,
    pub media_path: String,
}

#[derive(Deserialize)]
pub struct SendAudioRequest {
    pub recipient: String,
    pub media_path: String,
}

#[derive(Serialize)]
pub struct SendResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize)]
pub struct DownloadMediaRequest {
    pub message_id: String,
    pub chat_jid: String,
}

#[derive(Serialize)]
pub struct DownloadResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}
