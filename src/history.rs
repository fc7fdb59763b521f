//! In-memory conversation history.
//!
//! Each session holds an ordered log of user and assistant turns. Nothing is
//! persisted; a restart starts with no sessions, and the store holds at most
//! a configured number of them.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::rag::AnswerResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Answer(AnswerResult),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: TurnContent,
    /// Local wall-clock time, `HH:MM`.
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationLog {
    turns: Vec<ConversationTurn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, query: &str) {
        self.push(Role::User, TurnContent::Text(query.to_string()));
    }

    pub fn push_answer(&mut self, answer: AnswerResult) {
        self.push(Role::Assistant, TurnContent::Answer(answer));
    }

    fn push(&mut self, role: Role, content: TurnContent) {
        self.turns.push(ConversationTurn {
            role,
            content,
            timestamp: Local::now().format("%H:%M").to_string(),
        });
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

pub const DEFAULT_MAX_SESSIONS: usize = 1000;

#[derive(Default)]
struct Sessions {
    logs: HashMap<String, ConversationLog>,
    /// Session ids, least recently active first.
    recency: VecDeque<String>,
}

impl Sessions {
    fn touch(&mut self, session_id: &str) {
        if let Some(pos) = self.recency.iter().position(|id| id == session_id) {
            if let Some(id) = self.recency.remove(pos) {
                self.recency.push_back(id);
            }
        }
    }

    fn forget(&mut self, session_id: &str) -> bool {
        self.recency.retain(|id| id != session_id);
        self.logs.remove(session_id).is_some()
    }
}

/// In-memory sessions, bounded to `capacity`.
///
/// Creating a session beyond the bound evicts the least recently active one.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<Sessions>>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(Sessions::default())),
            capacity: capacity.max(1),
        }
    }

    pub async fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;

        while sessions.logs.len() >= self.capacity {
            let Some(oldest) = sessions.recency.pop_front() else {
                break;
            };
            sessions.logs.remove(&oldest);
            tracing::debug!("Evicted idle session {}", oldest);
        }

        sessions.logs.insert(id.clone(), ConversationLog::new());
        sessions.recency.push_back(id.clone());
        id
    }

    pub async fn get(&self, session_id: &str) -> Option<ConversationLog> {
        self.sessions.read().await.logs.get(session_id).cloned()
    }

    pub async fn list(&self) -> Vec<(String, usize)> {
        let sessions = self.sessions.read().await;
        let mut entries: Vec<(String, usize)> = sessions
            .logs
            .iter()
            .map(|(id, log)| (id.clone(), log.len()))
            .collect();
        entries.sort();
        entries
    }

    /// Appends the user's query to the session. Returns `false` for unknown
    /// sessions.
    pub async fn record_query(&self, session_id: &str, query: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(log) = sessions.logs.get_mut(session_id) else {
            return false;
        };
        log.push_user(query);
        sessions.touch(session_id);
        true
    }

    /// Appends an answer. A session deleted mid-query silently drops it.
    pub async fn record_answer(&self, session_id: &str, answer: AnswerResult) {
        if let Some(log) = self.sessions.write().await.logs.get_mut(session_id) {
            log.push_answer(answer);
        }
    }

    pub async fn clear(&self, session_id: &str) -> bool {
        match self.sessions.write().await.logs.get_mut(session_id) {
            Some(log) => {
                log.clear();
                true
            }
            None => false,
        }
    }

    pub async fn delete(&self, session_id: &str) -> bool {
        self.sessions.write().await.forget(session_id)
    }
}
