//! Conversation history and state storage, one record per session.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::HelplineResult;
use crate::memory::store::JsonFileStore;
use crate::models::ConversationState;

/// A transcript line as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredMessage {
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Everything remembered about one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<StoredMessage>,
    pub state: Option<ConversationState>,
}

impl ConversationRecord {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
            state: None,
        }
    }
}

/// JSON-file-backed conversation memory.
pub struct ConversationMemory {
    store: JsonFileStore,
    entries: Mutex<HashMap<String, ConversationRecord>>,
}

impl ConversationMemory {
    pub fn new(file_path: impl AsRef<Path>) -> HelplineResult<Self> {
        let store = JsonFileStore::new(file_path)?;
        let entries = store.load();
        Ok(Self {
            store,
            entries: Mutex::new(entries),
        })
    }

    pub fn save_state(&self, session_id: &str, state: ConversationState) {
        let mut entries = self.entries.lock().expect("conversation memory poisoned");
        let record = entries
            .entry(session_id.to_string())
            .or_insert_with(ConversationRecord::new);
        record.state = Some(state);
        record.updated_at = Utc::now();
        self.store.save(&entries);
        debug!("Saved state for session {}", session_id);
    }

    pub fn get_state(&self, session_id: &str) -> Option<ConversationState> {
        let entries = self.entries.lock().expect("conversation memory poisoned");
        entries.get(session_id).and_then(|r| r.state.clone())
    }

    pub fn add_message(&self, session_id: &str, role: &str, content: &str) {
        let mut entries = self.entries.lock().expect("conversation memory poisoned");
        let record = entries
            .entry(session_id.to_string())
            .or_insert_with(ConversationRecord::new);
        record.messages.push(StoredMessage {
            role: role.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
        });
        record.updated_at = Utc::now();
        self.store.save(&entries);
    }

    /// Transcript for a session, optionally only the trailing `limit` lines.
    pub fn get_messages(&self, session_id: &str, limit: Option<usize>) -> Vec<StoredMessage> {
        let entries = self.entries.lock().expect("conversation memory poisoned");
        let Some(record) = entries.get(session_id) else {
            return Vec::new();
        };
        match limit {
            Some(n) if n < record.messages.len() => {
                record.messages[record.messages.len() - n..].to_vec()
            }
            _ => record.messages.clone(),
        }
    }

    pub fn get_conversation(&self, session_id: &str) -> Option<ConversationRecord> {
        let entries = self.entries.lock().expect("conversation memory poisoned");
        entries.get(session_id).cloned()
    }

    pub fn delete_conversation(&self, session_id: &str) {
        let mut entries = self.entries.lock().expect("conversation memory poisoned");
        if entries.remove(session_id).is_some() {
            self.store.save(&entries);
            info!("Deleted conversation {}", session_id);
        }
    }

    pub fn get_all_sessions(&self) -> Vec<String> {
        let entries = self.entries.lock().expect("conversation memory poisoned");
        entries.keys().cloned().collect()
    }

    /// Drop conversations older than `days`.
    pub fn clear_old_conversations(&self, days: i64) {
        let cutoff = Utc::now() - Duration::days(days);
        let mut entries = self.entries.lock().expect("conversation memory poisoned");
        let before = entries.len();
        entries.retain(|_, record| record.created_at >= cutoff);
        let removed = before - entries.len();
        if removed > 0 {
            self.store.save(&entries);
            info!("Cleared {} old conversations", removed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_memory() -> (tempfile::TempDir, ConversationMemory) {
        let dir = tempfile::tempdir().unwrap();
        let memory = ConversationMemory::new(dir.path().join("conversations.json")).unwrap();
        (dir, memory)
    }

    #[test]
    fn test_state_roundtrip() {
        let (_dir, memory) = temp_memory();

        assert!(memory.get_state("s1").is_none());

        let mut state = ConversationState::new("s1");
        state.push_user("hello");
        memory.save_state("s1", state.clone());

        let loaded = memory.get_state("s1").unwrap();
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(loaded.session_id, "s1");
    }

    #[test]
    fn test_messages_with_limit() {
        let (_dir, memory) = temp_memory();

        for i in 0..5 {
            memory.add_message("s1", "user", &format!("msg {}", i));
        }

        assert_eq!(memory.get_messages("s1", None).len(), 5);
        let tail = memory.get_messages("s1", Some(2));
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[1].content, "msg 4");
        assert!(memory.get_messages("unknown", None).is_empty());
    }

    #[test]
    fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversations.json");

        {
            let memory = ConversationMemory::new(&path).unwrap();
            memory.add_message("s1", "assistant", "welcome");
        }

        let reopened = ConversationMemory::new(&path).unwrap();
        assert_eq!(reopened.get_messages("s1", None).len(), 1);
        assert_eq!(reopened.get_all_sessions(), vec!["s1".to_string()]);
    }

    #[test]
    fn test_delete_and_clear_old() {
        let (_dir, memory) = temp_memory();
        memory.add_message("s1", "user", "hi");
        memory.delete_conversation("s1");
        assert!(memory.get_conversation("s1").is_none());

        memory.add_message("s2", "user", "hi");
        // Nothing is older than 30 days yet.
        memory.clear_old_conversations(30);
        assert!(memory.get_conversation("s2").is_some());
    }
}
