//! Follow-up agent: captures contact details and drives campus visits,
//! brochures and counselor callbacks.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::agents::Agent;
use crate::error::HelplineResult;
use crate::knowledge::KnowledgeBase;
use crate::models::ConversationState;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email pattern")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\+91[\s-]?)?[6-9]\d{9}\b").expect("valid phone pattern"));

pub struct FollowupAgent {
    kb: Arc<KnowledgeBase>,
}

impl FollowupAgent {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    pub fn extract_email(text: &str) -> Option<String> {
        EMAIL_RE.find(text).map(|m| m.as_str().to_string())
    }

    /// Extract a 10-digit Indian mobile number, stripping an optional +91
    /// prefix and separators.
    pub fn extract_phone(text: &str) -> Option<String> {
        let m = PHONE_RE.find(text)?;
        let digits: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
        match digits.len() {
            10 => Some(digits),
            12 if digits.starts_with("91") => Some(digits[2..].to_string()),
            _ => None,
        }
    }

    fn handle_campus_visit_request(&self, state: &ConversationState) -> String {
        let user_name = state.user_info.name.as_deref().unwrap_or("there");
        let email = state.user_info.email.as_deref();
        let phone = state.user_info.phone.as_deref();

        let mut response = format!(
            "**Campus Visit Booking**\n\n\
Great choice, {}! I'd love to arrange a campus tour for you.\n\n\
**Our campus tour includes:**\n\
- Department and lab visits\n\
- Library and learning centers\n\
- Hostel facilities\n\
- Sports complex\n\
- Interaction with faculty and students\n\
- Admission guidance session\n\n\
**Available Slots:**\n\
- Monday to Saturday: 10:00 AM - 5:00 PM\n\
- Duration: 2-3 hours\n\n\
**To confirm your visit, I need:**",
            user_name
        );

        if phone.is_none() {
            response.push_str("\n- Your mobile number");
        }
        if email.is_none() {
            response.push_str("\n- Your email address");
        }

        if let (Some(phone), Some(email)) = (phone, email) {
            response.push_str(&format!(
                "\n\n✅ **Your Details:**\n\
- Mobile: {}\n\
- Email: {}\n\n\
Your campus visit request has been noted! Our admission team will contact you within 2 hours to confirm the date and time.\n\n\
You'll receive:\n\
- Confirmation SMS\n\
- Google Maps location link\n\
- Visitor pass QR code\n\
- Campus tour schedule",
                phone, email
            ));
        } else {
            response.push_str("\n\nPlease share your contact details so we can confirm your visit.");
        }

        response
    }

    fn handle_brochure_request(&self, state: &ConversationState, course_name: Option<&str>) -> String {
        let user_name = state.user_info.name.as_deref().unwrap_or("there");
        let email = state.user_info.email.as_deref();
        let phone = state.user_info.phone.as_deref();

        let mut response = format!(
            "**Course Brochure & Information**\n\nPerfect, {}! I can send you detailed information about",
            user_name
        );

        match course_name {
            Some(name) => response.push_str(&format!(" {}", name)),
            None => response.push_str(" our programs"),
        }

        response.push_str(
            ".\n\n**What you'll receive:**\n\
- Detailed course brochure\n\
- Fee structure PDF\n\
- Placement statistics\n\
- Scholarship information\n\
- Application form link",
        );

        if email.is_some() || phone.is_some() {
            response.push_str("\n\n**Sending to:**");
            if let Some(email) = email {
                response.push_str(&format!("\n📧 Email: {}", email));
            }
            if let Some(phone) = phone {
                response.push_str(&format!("\n📱 WhatsApp: {}", phone));
            }
            response.push_str("\n\n✅ You'll receive all materials within 5 minutes!");
        } else {
            response.push_str(
                "\n\n**Where should I send it?**\n\
Please provide your:\n\
- Email address, OR\n\
- WhatsApp number",
            );
        }

        response
    }

    fn handle_callback_request(&self, state: &ConversationState) -> String {
        let user_name = state.user_info.name.as_deref().unwrap_or("there");
        let phone = state.user_info.phone.as_deref();

        let mut response = format!(
            "**Callback Request**\n\n\
Absolutely, {}! I'll connect you with our admission counselor.\n\n\
**Our counselors can help with:**\n\
- Detailed course guidance\n\
- Career counseling\n\
- Scholarship evaluation\n\
- Application assistance\n\
- Special admission cases\n\n",
            user_name
        );

        match phone {
            Some(phone) => response.push_str(&format!(
                "✅ **Your Contact:** {}\n\n\
**Callback Options:**\n\
1. Within 30 minutes (9 AM - 6 PM on working days)\n\
2. Schedule for later (choose your preferred time)\n\n\
Our counselor will call you within 30 minutes during working hours (Mon-Sat, 9 AM - 6 PM).\n\n\
**Meanwhile, is there anything else you'd like to know?**",
                phone
            )),
            None => response.push_str(
                "**To arrange a callback, I need:**\n\
- Your mobile number\n\
- Preferred time to call (optional)\n\n\
Please share your number and I'll have our counselor reach out!",
            ),
        }

        response
    }

    fn acknowledge_contact(&self, state: &ConversationState) -> String {
        let user_name = state.user_info.name.as_deref().unwrap_or("there");

        let mut response = format!("Thank you for sharing your details, {}!\n\n", user_name);
        response.push_str("**Your Contact Information:**\n");
        if let Some(email) = &state.user_info.email {
            response.push_str(&format!("📧 Email: {}\n", email));
        }
        if let Some(phone) = &state.user_info.phone {
            response.push_str(&format!("📱 Phone: {}\n", phone));
        }

        response.push_str(
            "\n**What would you like me to do?**\n\
1. Send course brochure and fee details\n\
2. Schedule a campus visit\n\
3. Arrange a callback from admission counselor\n\
4. All of the above\n\n\
Just let me know your preference!",
        );

        response
    }

    fn offer_followup_options(&self, state: &ConversationState) -> String {
        let user_name = state.user_info.name.as_deref().unwrap_or("there");

        format!(
            "**How Can I Help You Further, {}?**\n\n\
I can assist you with:\n\n\
📱 **Get in Touch:**\n\
- Schedule a campus visit\n\
- Arrange callback from admission counselor\n\
- Send detailed brochure via Email/WhatsApp\n\n\
📞 **Contact Information:**\n\
- Helpline: 1800-123-4567 (Toll-free)\n\
- WhatsApp: +91-98765-43210\n\
- Email: admissions@paruluniversity.ac.in\n\n\
🏛️ **Visit Us:**\n\
Parul University\n\
P.O. Limda, Waghodia\n\
Vadodara - 391760, Gujarat\n\n\
📝 **Quick Actions:**\n\
- Apply Online: admissions.paruluniversity.ac.in\n\
- Virtual Campus Tour: Available on website\n\n\
What would you like to do next?",
            user_name
        )
    }
}

#[async_trait]
impl Agent for FollowupAgent {
    fn name(&self) -> &'static str {
        "followup"
    }

    async fn process(&self, state: &mut ConversationState) -> HelplineResult<()> {
        state.mark_visited(self.name());

        let Some(query) = state.last_user_message().map(|q| q.to_lowercase()) else {
            return Ok(());
        };

        let email = Self::extract_email(&query);
        let phone = Self::extract_phone(&query);

        if let Some(email) = &email {
            state.user_info.email = Some(email.clone());
        }
        if let Some(phone) = &phone {
            state.user_info.phone = Some(phone.clone());
        }

        let response = if ["campus", "visit", "tour", "see"].iter().any(|w| query.contains(w)) {
            self.handle_campus_visit_request(state)
        } else if ["brochure", "pdf", "document", "send", "share"]
            .iter()
            .any(|w| query.contains(w))
        {
            let course_name = state
                .context
                .selected_course
                .as_ref()
                .and_then(|id| self.kb.get_course_by_id(id))
                .map(|c| c.name.clone());
            self.handle_brochure_request(state, course_name.as_deref())
        } else if ["call", "callback", "contact", "talk", "counselor"]
            .iter()
            .any(|w| query.contains(w))
        {
            self.handle_callback_request(state)
        } else if email.is_some() || phone.is_some() {
            self.acknowledge_contact(state)
        } else {
            self.offer_followup_options(state)
        };

        state.push_assistant(response);
        state.add_topic("Follow-up");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn agent() -> FollowupAgent {
        let kb = KnowledgeBase::load(Path::new(env!("CARGO_MANIFEST_DIR")).join("../data")).unwrap();
        FollowupAgent::new(Arc::new(kb))
    }

    #[test]
    fn test_extract_email() {
        assert_eq!(
            FollowupAgent::extract_email("my email is kapil@example.com thanks"),
            Some("kapil@example.com".to_string())
        );
        assert_eq!(FollowupAgent::extract_email("no email here"), None);
    }

    #[test]
    fn test_extract_phone_variants() {
        assert_eq!(
            FollowupAgent::extract_phone("call me at 9876543210"),
            Some("9876543210".to_string())
        );
        assert_eq!(
            FollowupAgent::extract_phone("my number is +91 9876543210"),
            Some("9876543210".to_string())
        );
        assert_eq!(
            FollowupAgent::extract_phone("reach me on +91-8765432109"),
            Some("8765432109".to_string())
        );
        // Landline-style or short numbers are rejected.
        assert_eq!(FollowupAgent::extract_phone("call 12345"), None);
    }

    #[tokio::test]
    async fn test_campus_visit_without_contact_asks_for_it() {
        let agent = agent();
        let mut state = ConversationState::new("s1");
        state.user_info.name = Some("Kapil".to_string());
        state.push_user("i want to visit the campus");

        agent.process(&mut state).await.unwrap();

        let reply = state.last_assistant_message().unwrap();
        assert!(reply.contains("Campus Visit Booking"));
        assert!(reply.contains("Your mobile number"));
        assert!(reply.contains("Please share your contact details"));
    }

    #[tokio::test]
    async fn test_contact_captured_and_acknowledged() {
        let agent = agent();
        let mut state = ConversationState::new("s1");
        state.push_user("my email is amit@example.com and phone 9876543210");

        agent.process(&mut state).await.unwrap();

        assert_eq!(state.user_info.email.as_deref(), Some("amit@example.com"));
        assert_eq!(state.user_info.phone.as_deref(), Some("9876543210"));
        let reply = state.last_assistant_message().unwrap();
        assert!(reply.contains("Thank you for sharing your details"));
    }

    #[tokio::test]
    async fn test_callback_with_phone_on_file() {
        let agent = agent();
        let mut state = ConversationState::new("s1");
        state.user_info.phone = Some("9876543210".to_string());
        state.push_user("please arrange a callback");

        agent.process(&mut state).await.unwrap();

        let reply = state.last_assistant_message().unwrap();
        assert!(reply.contains("**Your Contact:** 9876543210"));
    }

    #[tokio::test]
    async fn test_general_offer() {
        let agent = agent();
        let mut state = ConversationState::new("s1");
        state.push_user("hmm okay");

        agent.process(&mut state).await.unwrap();

        let reply = state.last_assistant_message().unwrap();
        assert!(reply.contains("How Can I Help You Further"));
        assert!(state.topics_discussed.contains(&"Follow-up".to_string()));
    }
}
