//! Greeting agent: welcomes the caller, captures their name and opens the
//! inquiry once the name is known.

use async_trait::async_trait;
use tracing::debug;

use crate::agents::Agent;
use crate::error::HelplineResult;
use crate::models::ConversationState;

pub struct GreetingAgent;

impl GreetingAgent {
    pub fn new() -> Self {
        Self
    }

    /// Extract a caller name from a free-text message.
    ///
    /// Strips common lead-ins ("my name is", "i'm", ...) and takes the first
    /// remaining word, capitalized.
    pub fn extract_name_from_message(message: &str) -> String {
        let message = message.trim();
        let message_lower = message.to_lowercase();

        const PREFIXES: &[&str] = &[
            "my name is",
            "i am",
            "i'm",
            "this is",
            "call me",
            "it's",
            "its",
        ];

        for prefix in PREFIXES {
            if message_lower.starts_with(prefix) {
                let rest = message[prefix.len()..].trim();
                if let Some(word) = rest.split_whitespace().next() {
                    return capitalize(word);
                }
            }
        }

        message
            .split_whitespace()
            .next()
            .map(capitalize)
            .unwrap_or_else(|| "Friend".to_string())
    }
}

impl Default for GreetingAgent {
    fn default() -> Self {
        Self::new()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[async_trait]
impl Agent for GreetingAgent {
    fn name(&self) -> &'static str {
        "greeting"
    }

    async fn process(&self, state: &mut ConversationState) -> HelplineResult<()> {
        state.mark_visited(self.name());

        if state.user_info.greeted && state.context.ready_for_inquiry {
            return Ok(());
        }

        match state.user_info.name.clone() {
            None => {
                let greeting = "Hello! Welcome to Parul University Admission Helpline.\n\
I'm your AI admission assistant, here to help you with any questions about courses, fees, admission process, and scholarships.\n\n\
May I know your name?";
                state.push_assistant(greeting);
                state.user_info.greeted = true;
                state.context.waiting_for_name = true;
                debug!("Greeted new caller, waiting for name");
            }
            Some(name) => {
                let greeting = format!(
                    "Nice to meet you, {}! I'm here to help you with information about:\n\n\
- Courses and Programs\n\
- Fees and Payment Options\n\
- Admission Process and Requirements\n\
- Scholarships and Financial Aid\n\n\
How can I assist you today?",
                    name
                );
                state.push_assistant(greeting);
                state.user_info.greeted = true;
                state.context.waiting_for_name = false;
                state.context.ready_for_inquiry = true;
            }
        }

        Ok(())
    }
}
