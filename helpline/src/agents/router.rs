//! Router agent: classifies the caller's intent and picks the next
//! specialist.
//!
//! Primary path is LLM classification (low temperature); an invalid label,
//! a provider error or a missing provider key all fall back to keyword
//! matching, and finally to "general".

use async_trait::async_trait;
use tracing::{info, warn};

use crate::agents::Agent;
use crate::error::HelplineResult;
use crate::llm::LlmClient;
use crate::models::{ConversationState, Intent};

const CLASSIFIER_PROMPT: &str = r#"You are an intent classifier for a university admission helpline.
Classify the user's query into ONE of these categories:

1. "course" - Questions about courses, programs, syllabus, duration, eligibility, subjects
   Examples: "tell me about B.Tech", "what courses do you offer", "CSE syllabus"

2. "fees" - Questions about fee structure, payment, costs, discounts
   Examples: "how much is the fee", "payment options", "total cost"

3. "admission" - Questions about admission process, application, documents, deadlines
   Examples: "how to apply", "admission process", "required documents", "last date"

4. "followup" - User wants to schedule visit, get brochure, talk to counselor, provide contact
   Examples: "campus visit", "send brochure", "call me back", "my email is"

5. "general" - General questions, greetings, thank you, or unclear intent
   Examples: "hello", "thank you", "where is the university"

Respond with ONLY the category name, nothing else."#;

pub struct RouterAgent {
    llm: Option<LlmClient>,
}

impl RouterAgent {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    async fn classify_intent(&self, query: &str, state: &ConversationState) -> Intent {
        if let Some(llm) = &self.llm {
            let mut context_info = String::new();
            if let Some(name) = &state.user_info.name {
                context_info.push_str(&format!("\nUser name: {}", name));
            }
            if !state.topics_discussed.is_empty() {
                context_info.push_str(&format!(
                    "\nPrevious topics: {}",
                    state.topics_discussed.join(", ")
                ));
            }

            let user_message = format!("{}\n\nUser query: {}", context_info, query);
            match llm.chat(CLASSIFIER_PROMPT, &user_message).await {
                Ok(label) => {
                    if let Some(intent) = Intent::parse(&label) {
                        return intent;
                    }
                    warn!("Invalid intent '{}', falling back to keywords", label.trim());
                }
                Err(e) => {
                    warn!("Error classifying intent: {}", e);
                }
            }
        }

        Self::keyword_classify(query)
    }

    /// Keyword classification, used when no provider is configured or the
    /// LLM path failed.
    pub fn keyword_classify(query: &str) -> Intent {
        let query = query.to_lowercase();

        let followup_words = [
            "campus", "visit", "tour", "brochure", "call me", "callback", "counselor",
            "contact", "email", "whatsapp",
        ];
        let fees_words = ["fee", "fees", "cost", "payment", "price", "scholarship"];
        let admission_words = [
            "admission", "apply", "application", "document", "deadline", "entrance",
            "last date",
        ];
        let course_words = [
            "course", "program", "syllabus", "subject", "btech", "b.tech", "mba", "bba",
            "pharma", "engineering", "eligibility",
        ];

        if followup_words.iter().any(|w| query.contains(w)) {
            Intent::Followup
        } else if fees_words.iter().any(|w| query.contains(w)) {
            Intent::Fees
        } else if admission_words.iter().any(|w| query.contains(w)) {
            Intent::Admission
        } else if course_words.iter().any(|w| query.contains(w)) {
            Intent::Course
        } else {
            Intent::General
        }
    }

    /// Whether the query carries more than one intent, e.g. "B.Tech fees and
    /// admission process".
    pub fn detect_multi_intent(query: &str) -> bool {
        let keywords: [(&str, &[&str]); 3] = [
            (
                "course",
                &["course", "program", "syllabus", "subjects", "btech", "mba", "bba"],
            ),
            ("fees", &["fees", "cost", "payment", "price", "scholarship"]),
            (
                "admission",
                &["admission", "apply", "application", "documents", "deadline"],
            ),
        ];

        let query_lower = query.to_lowercase();
        let detected = keywords
            .iter()
            .filter(|(_, words)| words.iter().any(|w| query_lower.contains(w)))
            .count();

        detected > 1
    }
}

#[async_trait]
impl Agent for RouterAgent {
    fn name(&self) -> &'static str {
        "router"
    }

    async fn process(&self, state: &mut ConversationState) -> HelplineResult<()> {
        state.mark_visited(self.name());

        let Some(query) = state.last_user_message().map(str::to_string) else {
            return Ok(());
        };

        let intent = self.classify_intent(&query, state).await;
        state.context.current_intent = Some(intent);

        let preview: String = query.chars().take(50).collect();
        info!("Classified intent: {} for query: {}...", intent.as_str(), preview);

        Ok(())
    }
}
