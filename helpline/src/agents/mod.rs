//! Conversation agents.
//!
//! Each agent handles one slice of the admission conversation and mutates
//! the shared state: appending replies, capturing caller details and leaving
//! routing hints for the workflow.

use async_trait::async_trait;

use crate::error::HelplineResult;
use crate::models::ConversationState;

pub mod admission;
pub mod course;
pub mod fees;
pub mod followup;
pub mod greeting;
pub mod router;

pub use admission::AdmissionAgent;
pub use course::CourseAgent;
pub use fees::FeesAgent;
pub use followup::FollowupAgent;
pub use greeting::GreetingAgent;
pub use router::RouterAgent;

/// One node in the conversation graph.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &'static str;

    /// Process the current state in place.
    async fn process(&self, state: &mut ConversationState) -> HelplineResult<()>;
}

/// Format a rupee amount with thousands separators ("145000" -> "1,45,000"
/// is the Indian convention, but the upstream materials use western grouping,
/// so: "145,000").
pub(crate) fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_inr() {
        assert_eq!(format_inr(0), "0");
        assert_eq!(format_inr(999), "999");
        assert_eq!(format_inr(1000), "1,000");
        assert_eq!(format_inr(145000), "145,000");
        assert_eq!(format_inr(1234567), "1,234,567");
    }
}
