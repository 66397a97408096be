//! In-memory chat store guarded by a single lock

use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use super::{
    derive_title, exchange_title, message_time, ChatStore, Exchange, NewSession, Result,
    StoreError,
};
use crate::models::{FileRef, Message, Role, Session, SessionSummary};

/// Session table living for the lifetime of the process
///
/// One mutex covers the whole map; no I/O happens while it is held.
#[derive(Default)]
pub struct InMemoryChatStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl InMemoryChatStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently held
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Whether the store holds no sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn empty_session(id: String, title: String) -> Session {
    Session {
        id,
        title,
        messages: Vec::new(),
    }
}

impl ChatStore for InMemoryChatStore {
    fn list(&self) -> Vec<Session> {
        self.sessions.lock().values().cloned().collect()
    }

    fn get(&self, id: &str) -> Result<Session> {
        self.sessions
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn create(&self, new_session: NewSession) -> String {
        let id = new_session.id.unwrap_or_else(new_id);
        let title = match new_session.title {
            Some(title) if !title.is_empty() => title,
            _ => derive_title(new_session.first_message.as_deref().unwrap_or_default()),
        };

        let mut sessions = self.sessions.lock();
        if !sessions.contains_key(&id) {
            debug!(chat_id = %id, %title, "created chat session");
            sessions.insert(id.clone(), empty_session(id.clone(), title));
        }
        id
    }

    fn rename(&self, id: &str, title: &str) -> Result<()> {
        if title.is_empty() {
            return Err(StoreError::InvalidArgument("Title is required".to_string()));
        }

        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        session.title = title.to_string();
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.sessions
            .lock()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn clear_all(&self) {
        self.sessions.lock().clear();
    }

    fn delete_message(&self, id: &str, message_id: &str) -> Result<()> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        session.messages.retain(|m| m.id != message_id);
        Ok(())
    }

    fn search(&self, query: &str) -> Vec<SessionSummary> {
        let query = query.to_lowercase();

        self.sessions
            .lock()
            .values()
            .filter(|session| {
                session.title.to_lowercase().contains(&query)
                    || session.messages.iter().any(|m| {
                        m.text()
                            .map(|text| text.to_lowercase().contains(&query))
                            .unwrap_or(false)
                    })
            })
            .map(|session| SessionSummary {
                id: session.id.clone(),
                title: session.title.clone(),
            })
            .collect()
    }

    fn append_exchange(&self, exchange: Exchange) -> String {
        let id = exchange.chat_id.unwrap_or_else(new_id);
        let time = message_time();

        let user = Message {
            id: new_id(),
            message: Some(exchange.user_text),
            reply: None,
            time: time.clone(),
            role: Role::User,
            file: exchange.file_name.map(|name| FileRef { name }),
        };
        let assistant = Message {
            id: new_id(),
            message: None,
            reply: Some(exchange.reply_text),
            time,
            role: Role::Assistant,
            file: None,
        };

        let mut sessions = self.sessions.lock();
        let session = sessions.entry(id.clone()).or_insert_with(|| {
            let title = exchange_title(user.message.as_deref().unwrap_or_default());
            empty_session(id.clone(), title)
        });
        session.messages.push(user);
        session.messages.push(assistant);
        id
    }
}
