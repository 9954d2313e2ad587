//! Conversation workflow: the agent graph as an explicit state machine.
//!
//! Entry is always the greeting node. Once the caller is ready for inquiry
//! the router picks a specialist for each turn; a specialist can hand back to
//! the router if the caller's message is still unanswered. An iteration cap
//! guards against routing loops.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::agents::{
    Agent, AdmissionAgent, CourseAgent, FeesAgent, FollowupAgent, GreetingAgent, RouterAgent,
};
use crate::error::HelplineResult;
use crate::knowledge::KnowledgeBase;
use crate::llm::LlmClient;
use crate::models::{ConversationState, Intent};

/// Hard cap on graph steps per turn.
const MAX_STEPS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Greeting,
    Router,
    Course,
    Fees,
    Admission,
    Followup,
    End,
}

/// The admission conversation graph.
pub struct AdmissionWorkflow {
    greeting: GreetingAgent,
    router: RouterAgent,
    course: CourseAgent,
    fees: FeesAgent,
    admission: AdmissionAgent,
    followup: FollowupAgent,
}

impl AdmissionWorkflow {
    /// Build the workflow over a shared knowledge base. `llm` is optional;
    /// without it the router classifies by keywords only.
    pub fn new(kb: Arc<KnowledgeBase>, llm: Option<LlmClient>) -> Self {
        info!("Initialized admission workflow");
        Self {
            greeting: GreetingAgent::new(),
            router: RouterAgent::new(llm),
            course: CourseAgent::new(kb.clone()),
            fees: FeesAgent::new(kb.clone()),
            admission: AdmissionAgent::new(kb.clone()),
            followup: FollowupAgent::new(kb),
        }
    }

    /// Process one user turn through the graph, returning the updated state.
    ///
    /// Internal failures never surface to the caller: the state comes back
    /// with an apology message appended instead.
    pub async fn process_message(
        &self,
        session_id: &str,
        user_message: &str,
        existing_state: Option<ConversationState>,
    ) -> ConversationState {
        let mut state =
            existing_state.unwrap_or_else(|| ConversationState::new(session_id.to_string()));

        state.push_user(user_message);

        // The previous turn asked for the caller's name.
        if state.context.waiting_for_name {
            let name = GreetingAgent::extract_name_from_message(user_message);
            info!("Captured user name: {}", name);
            state.user_info.name = Some(name);
            state.context.waiting_for_name = false;
        }

        match self.run_graph(&mut state).await {
            Ok(()) => {
                state.conversation_count += 1;
                info!(
                    "Processed message for session {}, conversation count: {}",
                    session_id, state.conversation_count
                );
            }
            Err(e) => {
                error!("Error processing message: {}", e);
                state.push_assistant(
                    "I apologize, but I encountered an error. Please try again or contact our helpline at 1800-123-4567.",
                );
            }
        }

        state
    }

    async fn run_graph(&self, state: &mut ConversationState) -> HelplineResult<()> {
        let mut node = Node::Greeting;
        let mut steps = 0;

        while node != Node::End {
            steps += 1;
            if steps > MAX_STEPS {
                warn!("Workflow exceeded {} steps, ending turn", MAX_STEPS);
                break;
            }

            debug!("Executing {:?} node", node);
            node = match node {
                Node::Greeting => {
                    self.greeting.process(state).await?;
                    Self::route_after_greeting(state)
                }
                Node::Router => {
                    self.router.process(state).await?;
                    Self::route_to_specialist(state)
                }
                Node::Course => {
                    self.course.process(state).await?;
                    Self::route_after_specialist(state)
                }
                Node::Fees => {
                    self.fees.process(state).await?;
                    Self::route_after_specialist(state)
                }
                Node::Admission => {
                    self.admission.process(state).await?;
                    Self::route_after_specialist(state)
                }
                Node::Followup => {
                    self.followup.process(state).await?;
                    Self::route_after_specialist(state)
                }
                Node::End => Node::End,
            };
        }

        Ok(())
    }

    /// The router only runs when the caller is ready for inquiry and the
    /// greeting left the turn unanswered (returning-caller fast path). A
    /// greeting reply ends the turn.
    fn route_after_greeting(state: &ConversationState) -> Node {
        if state.context.ready_for_inquiry && state.last_user_message().is_some() {
            Node::Router
        } else {
            Node::End
        }
    }

    fn route_to_specialist(state: &ConversationState) -> Node {
        match state.context.current_intent {
            Some(Intent::Course) => Node::Course,
            Some(Intent::Fees) => Node::Fees,
            Some(Intent::Admission) => Node::Admission,
            // General queries go to followup for contact info.
            Some(Intent::Followup) | Some(Intent::General) => Node::Followup,
            None => Node::End,
        }
    }

    /// Back to the router while the caller's message is still the newest;
    /// otherwise wait for the next turn.
    fn route_after_specialist(state: &ConversationState) -> Node {
        if state.last_user_message().is_some() {
            Node::Router
        } else {
            Node::End
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn workflow() -> AdmissionWorkflow {
        let kb = Arc::new(
            KnowledgeBase::load(Path::new(env!("CARGO_MANIFEST_DIR")).join("../data")).unwrap(),
        );
        AdmissionWorkflow::new(kb, None)
    }

    #[tokio::test]
    async fn test_first_turn_asks_for_name() {
        let wf = workflow();
        let state = wf.process_message("s1", "hello", None).await;

        assert_eq!(state.conversation_count, 1);
        assert!(state.context.waiting_for_name);
        assert!(state
            .last_assistant_message()
            .unwrap()
            .contains("May I know your name?"));
    }

    #[tokio::test]
    async fn test_name_turn_is_captured_and_acknowledged() {
        let wf = workflow();
        let state = wf.process_message("s1", "hello", None).await;
        let state = wf.process_message("s1", "my name is kapil", Some(state)).await;

        assert_eq!(state.user_info.name.as_deref(), Some("Kapil"));
        assert!(!state.context.waiting_for_name);
        assert!(state.context.ready_for_inquiry);
        assert!(state
            .last_assistant_message()
            .unwrap()
            .contains("Nice to meet you, Kapil!"));
    }

    #[tokio::test]
    async fn test_inquiry_turn_routes_to_specialist() {
        let wf = workflow();
        let state = wf.process_message("s1", "hello", None).await;
        let state = wf.process_message("s1", "kapil", Some(state)).await;
        let state = wf
            .process_message("s1", "what are the fees for btech cse", Some(state))
            .await;

        assert_eq!(state.context.current_intent, Some(Intent::Fees));
        assert!(state.visited_agents.contains(&"router".to_string()));
        assert!(state.visited_agents.contains(&"fees".to_string()));
        assert!(state
            .last_assistant_message()
            .unwrap()
            .contains("Fee Structure for"));
        assert_eq!(state.conversation_count, 3);
    }

    #[tokio::test]
    async fn test_returning_caller_skips_name_capture() {
        let wf = workflow();
        let mut state = ConversationState::new("s2");
        state.user_info.name = Some("Amit".to_string());

        let state = wf.process_message("s2", "hi there", Some(state)).await;
        assert!(state.context.ready_for_inquiry);
        assert!(state
            .last_assistant_message()
            .unwrap()
            .contains("Nice to meet you, Amit!"));

        let state = wf
            .process_message("s2", "tell me about the mba program", Some(state))
            .await;
        assert_eq!(state.context.current_intent, Some(Intent::Course));
        assert_eq!(state.context.selected_course.as_deref(), Some("MBA"));
    }

    #[tokio::test]
    async fn test_every_turn_gets_a_reply() {
        let wf = workflow();
        let mut state = None;
        for message in ["hello", "rahul", "admission process", "thanks"] {
            let next = wf.process_message("s3", message, state).await;
            assert_eq!(
                next.messages.last().unwrap().role,
                crate::models::MessageRole::Assistant,
                "no reply for turn '{}'",
                message
            );
            state = Some(next);
        }
    }
}
