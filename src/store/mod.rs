//! Chat session storage
//!
//! The `ChatStore` trait is the seam between request handling and the
//! session table. Handlers only ever hold an `Arc<dyn ChatStore>`, so the
//! single-lock in-memory store can be replaced without touching them.

pub mod memory;

use chrono::Local;
use thiserror::Error;

use crate::models::{Session, SessionSummary};

pub use memory::InMemoryChatStore;

/// Result type for chat store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors returned by chat store operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Session doesn't exist
    #[error("Chat session not found: {0}")]
    NotFound(String),

    /// Argument rejected before touching the store
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Parameters for creating a session explicitly
#[derive(Debug, Clone, Default)]
pub struct NewSession {
    /// Identifier to use; a fresh one is generated when absent
    pub id: Option<String>,
    /// Title to use; derived from `first_message` when absent or empty
    pub title: Option<String>,
    /// Opening message, only used to derive a title
    pub first_message: Option<String>,
}

/// One user turn and the assistant reply to it
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Session to append to; a fresh one is generated when absent
    pub chat_id: Option<String>,
    pub user_text: String,
    pub reply_text: String,
    /// Name of the stored upload attached to the user turn
    pub file_name: Option<String>,
}

/// Session table operations
///
/// Every operation runs to completion under the implementation's lock.
pub trait ChatStore: Send + Sync {
    /// All sessions, in no particular order
    fn list(&self) -> Vec<Session>;

    /// Fetch one session
    fn get(&self, id: &str) -> Result<Session>;

    /// Create a session unless `id` already exists; returns the session id
    fn create(&self, new_session: NewSession) -> String;

    /// Replace a session's title
    fn rename(&self, id: &str, title: &str) -> Result<()>;

    /// Remove one session
    fn delete(&self, id: &str) -> Result<()>;

    /// Remove every session
    fn clear_all(&self);

    /// Remove one message from a session; unknown message ids are ignored
    fn delete_message(&self, id: &str, message_id: &str) -> Result<()>;

    /// Case-insensitive substring search over titles and user messages
    fn search(&self, query: &str) -> Vec<SessionSummary>;

    /// Append a user message and its reply in one step; returns the session id
    fn append_exchange(&self, exchange: Exchange) -> String;
}

const TITLE_MAX_CHARS: usize = 30;
const EXCHANGE_TITLE_CHARS: usize = 20;

/// Title for an explicitly created session without one
///
/// First line of the trimmed message, cut to 30 characters plus "...",
/// or "Chat <date time>" when that line is empty.
pub fn derive_title(message: &str) -> String {
    let first_line = message.trim().split('\n').next().unwrap_or_default();

    if first_line.chars().count() > TITLE_MAX_CHARS {
        let head: String = first_line.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", head)
    } else if first_line.is_empty() {
        format!("Chat {}", Local::now().format("%Y-%m-%d %H:%M"))
    } else {
        first_line.to_string()
    }
}

/// Title for a session created by its first exchange
pub fn exchange_title(user_text: &str) -> String {
    let head: String = user_text.chars().take(EXCHANGE_TITLE_CHARS).collect();
    format!("{}...", head)
}

/// Shared time label for both halves of an exchange
pub fn message_time() -> String {
    Local::now().format("%I:%M %p").to_string()
}
