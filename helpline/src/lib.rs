// Helpline Library
// AI-powered admission assistant - conversation runtime, gateway and voice worker

pub mod agents;
pub mod config;
pub mod conversation;
pub mod error;
pub mod gateway;
pub mod knowledge;
pub mod launcher;
pub mod llm;
pub mod logging;
pub mod media;
pub mod memory;
pub mod models;
pub mod voice;
pub mod workflow;

pub use config::Settings;
pub use conversation::ConversationManager;
pub use error::{HelplineError, HelplineResult};
pub use knowledge::KnowledgeBase;
pub use models::{ConversationState, Message, MessageRole};
pub use workflow::AdmissionWorkflow;
