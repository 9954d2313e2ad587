//! Conversation manager: sessions, workflow execution and memory
//! persistence glued together.

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::HelplineResult;
use crate::memory::{ConversationMemory, StoredMessage, UserMemory};
use crate::models::{ConversationState, UserInfo};
use crate::workflow::AdmissionWorkflow;

/// Orchestrates one conversation turn end to end: load state, run the
/// workflow, persist everything, lift the reply.
pub struct ConversationManager {
    workflow: AdmissionWorkflow,
    conversation_memory: ConversationMemory,
    user_memory: UserMemory,
}

impl ConversationManager {
    pub fn new(
        workflow: AdmissionWorkflow,
        conversation_memory: ConversationMemory,
        user_memory: UserMemory,
    ) -> Self {
        info!("Initialized conversation manager");
        Self {
            workflow,
            conversation_memory,
            user_memory,
        }
    }

    /// Create a new session, preloading the caller profile when we have seen
    /// this user before.
    pub fn create_session(&self, user_id: Option<&str>) -> String {
        let session_id = Uuid::new_v4().to_string();
        let mut state = ConversationState::new(session_id.clone());

        if let Some(user_id) = user_id {
            if let Some(profile) = self.user_memory.get_user(user_id) {
                info!("Loaded existing user profile for {}", user_id);
                state.user_info.name = profile.name;
                state.user_info.email = profile.email;
                state.user_info.phone = profile.phone;
            }
            state.user_info.user_id = Some(user_id.to_string());
        }

        self.conversation_memory.save_state(&session_id, state);
        info!("Created new session: {}", session_id);
        session_id
    }

    /// Process a user message and return the assistant's reply text.
    pub async fn process_message(
        &self,
        session_id: &str,
        user_message: &str,
    ) -> HelplineResult<String> {
        let preview: String = user_message.chars().take(50).collect();
        info!("Processing message for session {}: {}...", session_id, preview);

        let existing_state = self.conversation_memory.get_state(session_id);
        let updated_state = self
            .workflow
            .process_message(session_id, user_message, existing_state)
            .await;

        let reply = updated_state.last_assistant_message().map(str::to_string);
        let user_info = updated_state.user_info.clone();

        self.conversation_memory
            .save_state(session_id, updated_state);
        self.conversation_memory
            .add_message(session_id, "user", user_message);
        if let Some(reply) = &reply {
            self.conversation_memory
                .add_message(session_id, "assistant", reply);
        }

        if user_info.name.is_some() || user_info.has_contact() {
            self.update_user_profile(session_id, &user_info);
        }

        debug!("Completed processing for session {}", session_id);
        Ok(reply.unwrap_or_default())
    }

    /// Persist caller details keyed by phone, email or session id.
    fn update_user_profile(&self, session_id: &str, user_info: &UserInfo) {
        let user_id = user_info
            .phone
            .clone()
            .or_else(|| user_info.email.clone())
            .or_else(|| user_info.user_id.clone())
            .unwrap_or_else(|| session_id.to_string());

        self.user_memory.merge_info(&user_id, user_info);
    }

    pub fn get_conversation_history(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Vec<StoredMessage> {
        self.conversation_memory.get_messages(session_id, limit)
    }

    pub fn get_session_state(&self, session_id: &str) -> Option<ConversationState> {
        self.conversation_memory.get_state(session_id)
    }

    /// End a session. The record is kept, only marked ended.
    pub fn end_session(&self, session_id: &str) {
        if let Some(mut state) = self.conversation_memory.get_state(session_id) {
            state.ended = true;
            self.conversation_memory.save_state(session_id, state);
        }
        info!("Ended session: {}", session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;
    use std::path::Path;
    use std::sync::Arc;

    fn manager(dir: &tempfile::TempDir) -> ConversationManager {
        let kb = Arc::new(
            KnowledgeBase::load(Path::new(env!("CARGO_MANIFEST_DIR")).join("../data")).unwrap(),
        );
        ConversationManager::new(
            AdmissionWorkflow::new(kb, None),
            ConversationMemory::new(dir.path().join("conversations.json")).unwrap(),
            UserMemory::new(dir.path().join("users.json")).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_full_turn_persists_state_and_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir);

        let session_id = manager.create_session(None);
        let reply = manager.process_message(&session_id, "hello").await.unwrap();

        assert!(reply.contains("May I know your name?"));
        let history = manager.get_conversation_history(&session_id, None);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[1].role, "assistant");

        let state = manager.get_session_state(&session_id).unwrap();
        assert_eq!(state.conversation_count, 1);
    }

    #[tokio::test]
    async fn test_profile_upserted_when_contact_known() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir);

        let session_id = manager.create_session(None);
        manager.process_message(&session_id, "hello").await.unwrap();
        manager.process_message(&session_id, "kapil").await.unwrap();
        manager
            .process_message(&session_id, "call me back on 9876543210")
            .await
            .unwrap();

        // Profile keyed by phone now exists with the captured name.
        let state = manager.get_session_state(&session_id).unwrap();
        assert_eq!(state.user_info.phone.as_deref(), Some("9876543210"));
    }

    #[tokio::test]
    async fn test_returning_user_profile_preloaded() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir);

        let first = manager.create_session(Some("student-7"));
        manager.process_message(&first, "hello").await.unwrap();
        manager.process_message(&first, "priya").await.unwrap();

        let second = manager.create_session(Some("student-7"));
        let state = manager.get_session_state(&second).unwrap();
        assert_eq!(state.user_info.user_id.as_deref(), Some("student-7"));
        assert_eq!(state.user_info.name.as_deref(), Some("Priya"));
    }

    #[tokio::test]
    async fn test_end_session_marks_ended() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir);

        let session_id = manager.create_session(None);
        manager.process_message(&session_id, "hello").await.unwrap();
        manager.end_session(&session_id);

        assert!(manager.get_session_state(&session_id).unwrap().ended);
    }
}
