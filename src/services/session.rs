// src/services/session.rs
use std::{fmt::Debug, sync::Arc};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard, RwLock};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

/// Conversation history for the single process-wide session.
///
/// Starts with one system message and only ever grows. Cloning shares the
/// same history.
#[derive(Clone)]
pub struct Session {
    messages: Arc<RwLock<Vec<Message>>>,
    turn: Arc<Mutex<()>>,
}

impl Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: Arc::new(RwLock::new(vec![Message::new(MessageRole::System, system_prompt)])),
            turn: Arc::new(Mutex::new(())),
        }
    }

    pub fn for_assistant(name: &str) -> Self {
        Self::new(format!("You are {name}, witty and practical AI assistant."))
    }

    /// Hold this for one user/assistant exchange so concurrent chats
    /// don't interleave their appends.
    pub async fn begin_turn(&self) -> MutexGuard<'_, ()> {
        self.turn.lock().await
    }

    /// Append a message and return the new history length.
    pub async fn append(&self, role: MessageRole, content: impl Into<String>) -> usize {
        let mut guard = self.messages.write().await;
        guard.push(Message::new(role, content));
        guard.len()
    }

    /// Copy of the full history, system message first.
    pub async fn history(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }
}
