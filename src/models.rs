// Data structures (Session, Message, request and response bodies)

use serde::{Deserialize, Serialize};

// Message Role Enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

// Reference to an upload stored in the downloads directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileRef {
    pub name: String,
}

// Message Struct
//
// A user turn carries `message`, an assistant turn carries `reply`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub message: Option<String>,
    pub reply: Option<String>,
    pub time: String,
    pub role: Role,
    pub file: Option<FileRef>,
}

impl Message {
    /// Text used when searching: the user's submission, if any
    pub fn text(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

// Session Struct
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
}

// Search hit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
}

// Response Types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<Session>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SessionSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatIdResponse {
    pub chat_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameResponse {
    pub message: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReplyResponse {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

// Request Types
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateChatRequest {
    pub message: Option<String>,
    pub chat_id: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenameChatRequest {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendMessageRequest {
    pub message: Option<String>,
    pub chat_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}
