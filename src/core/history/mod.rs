//! Session history: a capacity-bounded list of past enhance/execute sessions,
//! newest first, persisted in one JSON slot under the data directory.

pub mod storage;

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::text::{SegmentedResponse, segment};

/// Maximum number of sessions kept; adding more evicts the oldest.
pub const MAX_SESSIONS: usize = 10;

/// One saved prompt, its enhanced response, and the optional execution result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub original_prompt: String,
    pub enhanced_response: String,
    #[serde(default)]
    pub execution_result: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl Session {
    /// Single-line title from the original prompt, truncated to `max_len` chars.
    pub fn title(&self, max_len: usize) -> String {
        let s = self.original_prompt.split_whitespace().collect::<Vec<_>>().join(" ");
        if s.chars().count() <= max_len {
            return s;
        }
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated.trim_end())
    }

    /// The enhanced response split into improved prompt and rationale.
    pub fn segmented(&self) -> SegmentedResponse {
        segment(Some(&self.enhanced_response))
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated_at = now.max(self.created_at);
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("No session with id {0}")]
    NotFound(String),
}

/// In-memory history. Index 0 is the newest session.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    sessions: VecDeque<Session>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(MAX_SESSIONS)
    }
}

fn normalize_result(result: &str) -> Option<String> {
    if result.trim().is_empty() {
        None
    } else {
        Some(result.to_string())
    }
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build a store from persisted sessions (newest first), dropping the
    /// oldest entries beyond `capacity`.
    pub fn from_sessions(sessions: Vec<Session>, capacity: usize) -> Self {
        let mut sessions: VecDeque<Session> = sessions.into();
        if sessions.len() > capacity {
            log::warn!(
                "History holds {} sessions, keeping the newest {}",
                sessions.len(),
                capacity
            );
            sessions.truncate(capacity);
        }
        Self { sessions, capacity }
    }

    fn next_id(&self, now: DateTime<Utc>) -> String {
        let stamp = now.timestamp_micros();
        let newest = self
            .sessions
            .iter()
            .filter_map(|s| s.id.parse::<i64>().ok())
            .max();
        match newest {
            Some(max) if max >= stamp => (max + 1).to_string(),
            _ => stamp.to_string(),
        }
    }

    /// Save a new session at the front and return its id.
    pub fn add(&mut self, original_prompt: &str, enhanced_response: &str) -> String {
        let now = Utc::now();
        let id = self.next_id(now);
        self.sessions.push_front(Session {
            id: id.clone(),
            original_prompt: original_prompt.to_string(),
            enhanced_response: enhanced_response.to_string(),
            execution_result: None,
            created_at: now,
            last_updated_at: now,
        });
        self.sessions.truncate(self.capacity);
        id
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Session, HistoryError> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| HistoryError::NotFound(id.to_string()))
    }

    pub fn update_enhanced(&mut self, id: &str, enhanced_response: &str) -> Result<(), HistoryError> {
        let session = self.get_mut(id)?;
        session.enhanced_response = enhanced_response.to_string();
        session.touch(Utc::now());
        Ok(())
    }

    /// Store an execution result. Empty or whitespace-only results are stored as absent.
    pub fn update_execution_result(&mut self, id: &str, result: &str) -> Result<(), HistoryError> {
        let session = self.get_mut(id)?;
        session.execution_result = normalize_result(result);
        session.touch(Utc::now());
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Session, HistoryError> {
        let pos = self
            .sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| HistoryError::NotFound(id.to_string()))?;
        self.sessions
            .remove(pos)
            .ok_or_else(|| HistoryError::NotFound(id.to_string()))
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Sessions, newest first.
    pub fn list(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }

    pub fn newest(&self) -> Option<&Session> {
        self.sessions.front()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
