//! Conversation and API data types.
//!
//! The conversation state is the single value threaded through the agent
//! graph: agents append messages, record what they learned about the caller
//! and leave routing hints for the workflow. All of it serializes, since the
//! whole state is persisted between turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// A single chat turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Caller intent as classified by the router.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Course,
    Fees,
    Admission,
    Followup,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Course => "course",
            Intent::Fees => "fees",
            Intent::Admission => "admission",
            Intent::Followup => "followup",
            Intent::General => "general",
        }
    }

    /// Parse a classifier label. Anything unrecognized is `None`; the caller
    /// decides the fallback.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "course" => Some(Intent::Course),
            "fees" => Some(Intent::Fees),
            "admission" => Some(Intent::Admission),
            "followup" => Some(Intent::Followup),
            "general" => Some(Intent::General),
            _ => None,
        }
    }
}

/// What we know about the caller so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub greeted: bool,
}

impl UserInfo {
    pub fn has_contact(&self) -> bool {
        self.email.is_some() || self.phone.is_some()
    }
}

/// Routing hints and per-session scratch data left behind by agents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionContext {
    pub waiting_for_name: bool,
    pub ready_for_inquiry: bool,
    pub current_intent: Option<Intent>,
    pub selected_course: Option<String>,
    pub scholarship_percentage: Option<f64>,
}

/// Full conversation state for one session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationState {
    pub session_id: String,
    pub messages: Vec<Message>,
    pub user_info: UserInfo,
    pub context: SessionContext,
    pub visited_agents: Vec<String>,
    pub topics_discussed: Vec<String>,
    pub conversation_count: u32,
    #[serde(default)]
    pub ended: bool,
}

impl ConversationState {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            user_info: UserInfo::default(),
            context: SessionContext::default(),
            visited_agents: Vec::new(),
            topics_discussed: Vec::new(),
            conversation_count: 0,
            ended: false,
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::new(MessageRole::User, content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages
            .push(Message::new(MessageRole::Assistant, content));
    }

    /// Content of the last message, if it came from the caller.
    pub fn last_user_message(&self) -> Option<&str> {
        match self.messages.last() {
            Some(msg) if msg.role == MessageRole::User => Some(msg.content.as_str()),
            _ => None,
        }
    }

    /// Content of the most recent assistant message.
    pub fn last_assistant_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
            .map(|m| m.content.as_str())
    }

    pub fn mark_visited(&mut self, agent: &str) {
        if !self.visited_agents.iter().any(|a| a == agent) {
            self.visited_agents.push(agent.to_string());
        }
    }

    pub fn add_topic(&mut self, topic: &str) {
        if !self.topics_discussed.iter().any(|t| t == topic) {
            self.topics_discussed.push(topic.to_string());
        }
    }
}

/// Media access token response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub url: String,
    pub room_name: String,
    pub participant_name: String,
    pub expires_at: DateTime<Utc>,
}

/// Voice session creation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSessionResponse {
    pub session_id: String,
    pub status: String,
    pub room_name: String,
    pub created_at: DateTime<Utc>,
}

/// Generic API response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            error: None,
        }
    }

    pub fn err(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error.into()),
        }
    }
}
