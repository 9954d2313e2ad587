//! Fees & payment agent: fee structures, payment options and scholarship
//! calculations.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::agents::{format_inr, Agent, CourseAgent};
use crate::error::HelplineResult;
use crate::knowledge::KnowledgeBase;
use crate::models::ConversationState;

static PERCENTAGE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(\d+\.?\d*)\s*%",
        r"(\d+\.?\d*)\s*percent",
        r"scored\s+(\d+\.?\d*)",
        r"got\s+(\d+\.?\d*)",
        r"(\d+\.?\d*)\s*in\s+12th",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid percentage pattern"))
    .collect()
});

pub struct FeesAgent {
    kb: Arc<KnowledgeBase>,
    course_lookup: CourseAgent,
}

impl FeesAgent {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self {
            course_lookup: CourseAgent::new(kb.clone()),
            kb,
        }
    }

    /// Extract a 12th-standard percentage from the query, if mentioned.
    pub fn extract_percentage(query: &str) -> Option<f64> {
        for pattern in PERCENTAGE_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(query) {
                if let Ok(value) = caps[1].parse::<f64>() {
                    return Some(value);
                }
            }
        }
        None
    }

    fn generate_fees_response(&self, course_id: &str, query: &str) -> String {
        let (Some(fee_data), Some(course)) = (
            self.kb.get_fees_by_course_id(course_id),
            self.kb.get_course_by_id(course_id),
        ) else {
            return "Sorry, I couldn't find fee information for that course.".to_string();
        };

        let mut response = format!(
            "**Fee Structure for {}**\n\n**Annual Fee:** ₹{}\n\n**Breakdown:**",
            course.name,
            format_inr(fee_data.annual_fee)
        );

        for (key, value) in fee_data.breakdown.iter() {
            let label = title_case(key);
            response.push_str(&format!("\n- {}: ₹{}", label, format_inr(*value)));
        }

        if query.contains("payment") || query.contains("installment") {
            response.push_str("\n\n**Payment Options:**\n");
            for option in &fee_data.payment_options {
                response.push_str(&format!("\n{}: {}", title_case(&option.kind), option.description));
                if let (Some(discount), Some(amount)) =
                    (option.discount_percentage, option.amount)
                {
                    response.push_str(&format!(
                        " - Save {}% (₹{})",
                        discount,
                        format_inr(amount)
                    ));
                } else if let Some(per_installment) = option.amount_per_installment {
                    response.push_str(&format!(
                        " - ₹{} per installment",
                        format_inr(per_installment)
                    ));
                }
            }
        }

        if query.contains("hostel") || query.contains("total") || query.contains("additional") {
            let additional = &fee_data.additional_costs;
            response.push_str("\n\n**Additional Costs (Optional):**");
            response.push_str(&format!(
                "\n- Hostel (AC): ₹{}/year (includes mess)",
                format_inr(additional.hostel)
            ));
            if let Some(books) = additional.books_approx {
                response.push_str(&format!("\n- Books: ₹{}/year (approx.)", format_inr(books)));
            }
        }

        response.push_str(
            "\n\n💡 You may be eligible for scholarships based on your 12th percentage! Would you like me to calculate your scholarship?",
        );

        response
    }

    fn generate_fees_with_scholarship(&self, course_id: &str, percentage: f64) -> String {
        let (Some(fee_data), Some(course)) = (
            self.kb.get_fees_by_course_id(course_id),
            self.kb.get_course_by_id(course_id),
        ) else {
            return "Sorry, I couldn't find fee information for that course.".to_string();
        };

        let scholarship = self.kb.calculate_scholarship(percentage, course_id);

        let mut response = format!(
            "**Fee Structure for {} with Scholarship**\n\n**Your 12th Percentage:** {}%\n",
            course.name, percentage
        );

        if scholarship.eligible {
            let scholarship_name = scholarship
                .scholarship_name
                .as_deref()
                .unwrap_or("Merit Scholarship");
            let other_fees = fee_data.annual_fee - fee_data.tuition();
            let total_with_scholarship = scholarship.final_tuition + other_fees;

            response.push_str(&format!(
                "\n✅ **Congratulations! You're eligible for {}**\n\n\
**Scholarship Details:**\n\
- Discount: {}% on tuition fees\n\
- Original Tuition: ₹{}\n\
- Scholarship Amount: ₹{}\n\
- **Your Tuition: ₹{}**\n\n\
**Total Annual Fee after Scholarship:**\n\
- Tuition: ₹{}\n\
- Other Fees: ₹{}\n\
- **Total: ₹{}**\n\n\
**You Save: ₹{} per year!**",
                scholarship_name,
                scholarship.discount_percentage,
                format_inr(scholarship.original_tuition),
                format_inr(scholarship.discount_amount),
                format_inr(scholarship.final_tuition),
                format_inr(scholarship.final_tuition),
                format_inr(other_fees),
                format_inr(total_with_scholarship),
                format_inr(scholarship.discount_amount),
            ));

            response.push_str(
                "\n\n**Additional Discounts Available:**\n\
- Early Bird (apply before 15th March): 5% extra\n\
- Sibling Discount: 10% if you have a sibling at Parul",
            );

            let best_case = (total_with_scholarship as f64 * 0.85) as u64;
            response.push_str(&format!(
                "\n\nWith all discounts, your fee could be as low as ₹{}/year!",
                format_inr(best_case)
            ));
        } else {
            response.push_str(&format!(
                "\n**Scholarship Status:** Not eligible for merit scholarship\n\
- Merit scholarships require 70%+ in 12th standard\n\n\
**Your Fee:** ₹{}/year\n\n\
**Other Scholarship Options:**\n\
- Sports Scholarship (if you're a state/national player)\n\
- EWS Scholarship (if family income < ₹3 lakhs/year)\n\
- Government schemes (Post-Matric, PM Scholarship)\n",
                format_inr(fee_data.annual_fee)
            ));
        }

        response.push_str("\n\nWould you like to know about the admission process or payment options?");
        response
    }
}

#[async_trait]
impl Agent for FeesAgent {
    fn name(&self) -> &'static str {
        "fees"
    }

    async fn process(&self, state: &mut ConversationState) -> HelplineResult<()> {
        state.mark_visited(self.name());

        let Some(query) = state.last_user_message().map(|q| q.to_lowercase()) else {
            return Ok(());
        };

        // Course may already be selected from an earlier turn.
        let mut course_id = state.context.selected_course.clone();
        if course_id.is_none() {
            if let Some(course) = self.course_lookup.identify_course(&query) {
                course_id = Some(course.id.clone());
                state.context.selected_course = course_id.clone();
            }
        }

        let response = match course_id {
            Some(course_id) => match Self::extract_percentage(&query) {
                Some(percentage) => {
                    state.context.scholarship_percentage = Some(percentage);
                    self.generate_fees_with_scholarship(&course_id, percentage)
                }
                None => self.generate_fees_response(&course_id, &query),
            },
            None => "I'd be happy to help with fee information! Which course are you interested in? We offer B.Tech CSE, B.Tech Mechanical, MBA, BBA, and B.Pharma.".to_string(),
        };

        state.push_assistant(response);
        state.add_topic("Fees");
        Ok(())
    }
}

fn title_case(snake: &str) -> String {
    snake
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
