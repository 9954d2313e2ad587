//! Admission process agent: application steps, documents, dates and
//! entrance tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::Agent;
use crate::error::HelplineResult;
use crate::knowledge::KnowledgeBase;
use crate::models::ConversationState;

pub struct AdmissionAgent {
    kb: Arc<KnowledgeBase>,
}

impl AdmissionAgent {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    fn portal(&self) -> &str {
        self.kb
            .admission()
            .pointer("/admission_process/portal")
            .and_then(|v| v.as_str())
            .unwrap_or("admissions.paruluniversity.ac.in")
    }

    fn helpline_phone(&self) -> &str {
        self.kb
            .admission()
            .pointer("/helpline/phone")
            .and_then(|v| v.as_str())
            .unwrap_or("1800-123-4567")
    }

    fn get_admission_overview(&self) -> String {
        "**Parul University Admission Process**\n\n\
The admission process is simple and straightforward:\n\n\
**5 Easy Steps:**\n\
1. **Online Application** - Fill form and pay ₹1,000 fee\n\
2. **Entrance Test** - Take PU-CET or submit JEE/CAT scores\n\
3. **Counseling** - Choose your branch based on rank\n\
4. **Document Verification** - Submit original documents\n\
5. **Fee Payment** - Pay first semester fee and confirm admission\n\n\
**Timeline:**\n\
- Applications Open: 1st January 2025\n\
- Last Date to Apply: 30th April 2025\n\
- Entrance Test: 15th May 2025\n\
- Counseling: 1st-15th June 2025\n\
- Classes Start: 1st July 2025\n\n\
Would you like detailed information about any specific step?"
            .to_string()
    }

    fn get_full_admission_process(&self) -> String {
        format!(
            "**Detailed Admission Process**\n\n\
**Step 1: Online Application**\n\
- Visit: {portal}\n\
- Fill application form (takes 15 minutes)\n\
- Upload photo and documents\n\
- Pay application fee: ₹1,000\n\
- Deadline: 30th April 2025\n\
- Apply before 15th March for 5% early bird discount!\n\n\
**Step 2: Entrance Test**\n\
Choose one option:\n\
a) PU-CET (Parul University Test)\n\
   - Date: 15th May 2025\n\
   - Duration: 2 hours, 100 questions\n\
   - Online test from home\n\
   - Syllabus: 12th standard (PCM/PCB)\n\n\
b) Submit JEE Main scores (for engineering)\n\
c) Submit CAT/MAT scores (for MBA)\n\
d) Direct admission for BBA based on 12th marks\n\n\
**Step 3: Counseling**\n\
- Online counseling: 1st-15th June 2025\n\
- Choose branch preference based on rank\n\
- Seat allotment in 2 rounds\n\
- Accept/reject seat online\n\n\
**Step 4: Document Verification**\n\
Upload scanned copies and bring originals on joining:\n\
- 10th & 12th marksheets\n\
- Transfer certificate\n\
- Aadhar card\n\
- Character certificate\n\
- Passport size photos (6 nos)\n\
- Caste certificate (if applicable)\n\n\
**Step 5: Fee Payment**\n\
- Pay first semester fee within 7 days\n\
- Scholarships auto-applied if eligible\n\
- Payment modes: Online, DD, Bank Transfer\n\n\
**Contact for Help:**\n\
- Helpline: {phone}\n\
- WhatsApp: +91-98765-43210\n\
- Email: admissions@paruluniversity.ac.in\n\n\
Need help with any specific step?",
            portal = self.portal(),
            phone = self.helpline_phone()
        )
    }

    fn get_documents_info(&self) -> String {
        "**Required Documents for Admission**\n\n\
**Mandatory Documents:**\n\
- 10th Marksheet (Original + 2 photocopies)\n\
- 12th Marksheet (Original + 2 photocopies)\n\
- 12th Passing Certificate (Original + 2 photocopies)\n\
- Aadhar Card (Original + 2 photocopies)\n\
- Transfer Certificate from previous institution (Original)\n\
- Character Certificate (Original)\n\
- Passport Size Photos (6 numbers)\n\n\
**Additional Documents (if applicable):**\n\
- Migration Certificate (if from different board/university)\n\
- Caste Certificate (for reservation/scholarship)\n\
- Income Certificate (for EWS/scholarship)\n\
- Sports Certificate (for sports quota)\n\
- Domicile Certificate (if required)\n\n\
**Document Verification:**\n\
- Upload scanned copies during online application\n\
- Bring originals for physical verification on joining day\n\
- All documents should be attested\n\n\
**Important Notes:**\n\
- Keep extra photocopies for your records\n\
- Ensure all certificates are from recognized boards\n\
- Documents in languages other than English/Hindi need translation\n\n\
Need more information about the admission process?"
            .to_string()
    }

    fn get_important_dates(&self) -> String {
        "**Important Admission Dates 2025**\n\n\
**Application Period:**\n\
- Applications Open: 1st January 2025\n\
- Early Bird Deadline: **15th March 2025** (5% discount)\n\
- Application Closes: 30th April 2025\n\n\
**Entrance Test:**\n\
- PU-CET Exam Date: 15th May 2025\n\
- Result Declaration: 25th May 2025\n\n\
**Counseling:**\n\
- Round 1: 1st June - 7th June 2025\n\
- Round 2: 8th June - 15th June 2025\n\n\
**Session Start:**\n\
- Classes Begin: 1st July 2025\n\n\
**Important:**\n\
- Apply before 15th March to get 5% early bird discount\n\
- Entrance test is online, you can take it from home\n\
- Document verification can be done online\n\n\
**Missed a deadline?**\n\
Don't worry! Contact our admission helpline for special late admission options.\n\n\
Would you like to know about the entrance test or required documents?"
            .to_string()
    }

    fn get_entrance_test_info(&self) -> String {
        "**Entrance Test Options**\n\n\
**For Engineering (B.Tech):**\n\
Option 1: PU-CET (Parul University Common Entrance Test)\n\
- Date: 15th May 2025\n\
- Mode: Online from home\n\
- Duration: 2 hours\n\
- Questions: 100 (PCM based)\n\
- Syllabus: 12th standard\n\n\
Option 2: JEE Main Scores\n\
- Submit your JEE Main scorecard\n\
- No separate test needed\n\n\
**For MBA:**\n\
- Submit CAT or MAT scorecard\n\
- OR take PU management entrance test\n\n\
**For BBA:**\n\
- Direct admission based on 12th marks\n\
- No entrance test required\n\n\
**For B.Pharma:**\n\
- PU-CET (PCB/PCM based)\n\
- OR relevant state/national exam scores\n\n\
**Test Preparation:**\n\
- Syllabus: Based on 12th standard\n\
- Sample papers available on website\n\
- Mock tests provided after registration\n\n\
**Registration:**\n\
- Register while filling application form\n\
- Test link sent via email\n\
- Can be taken from home with webcam\n\n\
Need help with application process or have questions about eligibility?"
            .to_string()
    }
}

#[async_trait]
impl Agent for AdmissionAgent {
    fn name(&self) -> &'static str {
        "admission"
    }

    async fn process(&self, state: &mut ConversationState) -> HelplineResult<()> {
        state.mark_visited(self.name());

        let Some(query) = state.last_user_message().map(|q| q.to_lowercase()) else {
            return Ok(());
        };

        let response = if ["document", "required", "certificate", "marksheet"]
            .iter()
            .any(|w| query.contains(w))
        {
            self.get_documents_info()
        } else if ["date", "deadline", "when", "last date"]
            .iter()
            .any(|w| query.contains(w))
        {
            self.get_important_dates()
        } else if ["entrance", "exam", "test", "jee", "cat"]
            .iter()
            .any(|w| query.contains(w))
        {
            self.get_entrance_test_info()
        } else if ["step", "process", "procedure", "how to"]
            .iter()
            .any(|w| query.contains(w))
        {
            self.get_full_admission_process()
        } else {
            self.get_admission_overview()
        };

        state.push_assistant(response);
        state.add_topic("Admission Process");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn agent() -> AdmissionAgent {
        let kb = KnowledgeBase::load(Path::new(env!("CARGO_MANIFEST_DIR")).join("../data")).unwrap();
        AdmissionAgent::new(Arc::new(kb))
    }

    async fn reply_for(query: &str) -> String {
        let agent = agent();
        let mut state = ConversationState::new("s1");
        state.push_user(query);
        agent.process(&mut state).await.unwrap();
        state.last_assistant_message().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_documents_query() {
        let reply = reply_for("which documents are required").await;
        assert!(reply.contains("Required Documents for Admission"));
    }

    #[tokio::test]
    async fn test_dates_query() {
        let reply = reply_for("what is the last date to apply").await;
        assert!(reply.contains("Important Admission Dates"));
    }

    #[tokio::test]
    async fn test_entrance_query() {
        let reply = reply_for("do i need to give an entrance exam").await;
        assert!(reply.contains("Entrance Test Options"));
    }

    #[tokio::test]
    async fn test_overview_fallback() {
        let reply = reply_for("tell me about admission").await;
        assert!(reply.contains("5 Easy Steps"));
    }

    #[tokio::test]
    async fn test_topic_recorded() {
        let agent = agent();
        let mut state = ConversationState::new("s1");
        state.push_user("admission please");
        agent.process(&mut state).await.unwrap();
        assert!(state
            .topics_discussed
            .contains(&"Admission Process".to_string()));
    }
}
