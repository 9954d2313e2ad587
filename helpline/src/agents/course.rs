//! Course information agent: program details, eligibility, syllabus and the
//! course catalogue.

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::Agent;
use crate::error::HelplineResult;
use crate::knowledge::{Course, KnowledgeBase};
use crate::models::ConversationState;

pub struct CourseAgent {
    kb: Arc<KnowledgeBase>,
}

impl CourseAgent {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    /// Identify which course the caller is asking about: a keyword table per
    /// course id first, then a free-text search.
    pub fn identify_course<'a>(&'a self, query: &str) -> Option<&'a Course> {
        let course_keywords: [(&str, &[&str]); 5] = [
            (
                "BTECH_CSE",
                &[
                    "computer science",
                    "cse",
                    " cs ",
                    "software",
                    "information technology",
                    "btech cse",
                    "b.tech cse",
                ],
            ),
            (
                "BTECH_MECH",
                &[
                    "mechanical",
                    "mech",
                    "automobile",
                    "manufacturing",
                    "btech mech",
                    "b.tech mech",
                ],
            ),
            (
                "MBA",
                &["mba", "master of business", "management"],
            ),
            ("BBA", &["bba", "bachelor of business"]),
            (
                "BPHARMA",
                &["pharmacy", "pharma", "b.pharma", "b pharmacy", "pharmaceutical"],
            ),
        ];

        let query = query.to_lowercase();
        for (course_id, keywords) in course_keywords {
            if keywords.iter().any(|k| query.contains(k)) {
                if let Some(course) = self.kb.get_course_by_id(course_id) {
                    return Some(course);
                }
            }
        }

        self.kb.search_courses(&query).into_iter().next()
    }

    fn generate_course_response(&self, course: &Course, query: &str) -> String {
        let mut response = format!(
            "**{}**\n\n{}\n\n**Duration:** {} years ({} semesters)\n**Seats Available:** {}\n\n**Eligibility:**\n- Education: {}",
            course.name,
            course.description,
            course.duration_years,
            course.duration_semesters,
            course.seats,
            course.eligibility.education
        );

        if !course.eligibility.subjects.is_empty() {
            response.push_str(&format!(
                "\n- Required Subjects: {}",
                course.eligibility.subjects.join(", ")
            ));
        }
        if let Some(min) = course.eligibility.minimum_percentage {
            response.push_str(&format!("\n- Minimum Percentage: {}%", min));
        }

        if (query.contains("specialization") || query.contains("branch"))
            && !course.specializations.is_empty()
        {
            response.push_str("\n\n**Specializations Available:**\n");
            for spec in &course.specializations {
                response.push_str(&format!("- {}\n", spec));
            }
        }

        if (query.contains("subject") || query.contains("syllabus") || query.contains("curriculum"))
            && !course.subjects.is_empty()
        {
            response.push_str("\n**Key Subjects:**\n");
            for subject in course.subjects.iter().take(6) {
                response.push_str(&format!("- {}\n", subject));
            }
        }

        if (query.contains("career") || query.contains("job") || query.contains("placement"))
            && !course.career_options.is_empty()
        {
            response.push_str("\n**Career Opportunities:**\n");
            for career in &course.career_options {
                response.push_str(&format!("- {}\n", career));
            }
        }

        response.push_str(&format!(
            "\n\nWould you like to know about the fee structure, admission process, or scholarship options for {}?",
            course.name
        ));

        response
    }

    fn list_available_courses(&self) -> String {
        let mut response = "We offer the following programs at Parul University:\n\n".to_string();

        let ug = self.kb.get_courses_by_level("undergraduate");
        let pg = self.kb.get_courses_by_level("postgraduate");

        if !ug.is_empty() {
            response.push_str("**Undergraduate Programs:**\n");
            for course in &ug {
                response.push_str(&format!(
                    "- {} ({} years)\n",
                    course.name, course.duration_years
                ));
            }
        }

        if !pg.is_empty() {
            response.push_str("\n**Postgraduate Programs:**\n");
            for course in &pg {
                response.push_str(&format!(
                    "- {} ({} years)\n",
                    course.name, course.duration_years
                ));
            }
        }

        response.push_str("\nWhich program would you like to know more about?");
        response
    }
}

#[async_trait]
impl Agent for CourseAgent {
    fn name(&self) -> &'static str {
        "course"
    }

    async fn process(&self, state: &mut ConversationState) -> HelplineResult<()> {
        state.mark_visited(self.name());

        let Some(query) = state.last_user_message().map(|q| q.to_lowercase()) else {
            return Ok(());
        };

        let response = match self.identify_course(&query) {
            Some(course) => {
                let course_id = course.id.clone();
                let course_name = course.name.clone();
                let response = self.generate_course_response(course, &query);
                state.context.selected_course = Some(course_id);
                state.add_topic(&course_name);
                response
            }
            None => self.list_available_courses(),
        };

        state.push_assistant(response);
        Ok(())
    }
}
