//! JSON-backed knowledge base for courses, fees, scholarships and the
//! admission process.
//!
//! Loaded once at startup from the data directory. A missing or malformed
//! file degrades to an empty collection with an error log; the assistant
//! keeps answering with whatever data is available.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::HelplineResult;

/// Eligibility requirements for a course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Eligibility {
    pub education: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub minimum_percentage: Option<f64>,
}

/// A degree program.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: String,
    pub name: String,
    /// "undergraduate" or "postgraduate"
    pub level: String,
    pub department: String,
    pub duration_years: u32,
    pub duration_semesters: u32,
    pub seats: u32,
    pub description: String,
    pub eligibility: Eligibility,
    #[serde(default)]
    pub specializations: Vec<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub career_options: Vec<String>,
}

/// One payment option in a fee structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentOption {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub discount_percentage: Option<f64>,
    #[serde(default)]
    pub amount: Option<u64>,
    #[serde(default)]
    pub amount_per_installment: Option<u64>,
}

/// Additional (optional) yearly costs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdditionalCosts {
    #[serde(default)]
    pub hostel: u64,
    #[serde(default)]
    pub books_approx: Option<u64>,
}

/// Annual fee structure for one course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeeStructure {
    pub course_id: String,
    pub annual_fee: u64,
    /// Named components in file order; "tuition" is the one scholarships
    /// discount.
    pub breakdown: IndexMap<String, u64>,
    #[serde(default)]
    pub payment_options: Vec<PaymentOption>,
    #[serde(default)]
    pub additional_costs: AdditionalCosts,
}

impl FeeStructure {
    pub fn tuition(&self) -> u64 {
        self.breakdown.get("tuition").copied().unwrap_or(0)
    }
}

/// A merit scholarship tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScholarshipTier {
    pub min_percentage: f64,
    pub max_percentage: f64,
    pub discount_percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MeritScholarship {
    #[serde(default)]
    pub tiers: Vec<ScholarshipTier>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScholarshipRules {
    #[serde(default)]
    pub merit_based: MeritScholarship,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Scholarships {
    #[serde(default)]
    pub scholarship_rules: ScholarshipRules,
}

/// Result of a scholarship calculation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScholarshipResult {
    pub eligible: bool,
    pub scholarship_name: Option<String>,
    pub discount_percentage: f64,
    pub original_tuition: u64,
    pub discount_amount: u64,
    pub final_tuition: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CoursesFile {
    #[serde(default)]
    courses: Vec<Course>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FeesFile {
    #[serde(default)]
    fee_structure: Vec<FeeStructure>,
}

/// The loaded knowledge base.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    courses: Vec<Course>,
    fees: Vec<FeeStructure>,
    scholarships: Scholarships,
    admission: serde_json::Value,
}

impl KnowledgeBase {
    /// Load all data files from `data_dir`.
    pub fn load(data_dir: impl AsRef<Path>) -> HelplineResult<Self> {
        let dir = data_dir.as_ref();
        info!("Loading knowledge base from {}", dir.display());

        let courses = load_json::<CoursesFile>(&dir.join("courses.json"))
            .unwrap_or_default()
            .courses;
        let fees = load_json::<FeesFile>(&dir.join("fees.json"))
            .unwrap_or_default()
            .fee_structure;
        let scholarships =
            load_json::<Scholarships>(&dir.join("scholarships.json")).unwrap_or_default();
        let admission =
            load_json::<serde_json::Value>(&dir.join("admission.json")).unwrap_or(serde_json::Value::Null);

        info!(
            "Loaded {} courses, {} fee structures",
            courses.len(),
            fees.len()
        );

        Ok(Self {
            courses,
            fees,
            scholarships,
            admission,
        })
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn fees(&self) -> &[FeeStructure] {
        &self.fees
    }

    pub fn scholarships(&self) -> &Scholarships {
        &self.scholarships
    }

    pub fn admission(&self) -> &serde_json::Value {
        &self.admission
    }

    pub fn get_course_by_id(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == course_id)
    }

    /// Substring match on the course name, case-insensitive.
    pub fn get_course_by_name(&self, name: &str) -> Option<&Course> {
        let needle = name.to_lowercase();
        self.courses
            .iter()
            .find(|c| c.name.to_lowercase().contains(&needle))
    }

    /// Search across name, description and department.
    pub fn search_courses(&self, query: &str) -> Vec<&Course> {
        let needle = query.to_lowercase();
        self.courses
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.description.to_lowercase().contains(&needle)
                    || c.department.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn get_courses_by_level(&self, level: &str) -> Vec<&Course> {
        self.courses.iter().filter(|c| c.level == level).collect()
    }

    pub fn get_courses_by_department(&self, department: &str) -> Vec<&Course> {
        let needle = department.to_lowercase();
        self.courses
            .iter()
            .filter(|c| c.department.to_lowercase() == needle)
            .collect()
    }

    pub fn get_fees_by_course_id(&self, course_id: &str) -> Option<&FeeStructure> {
        self.fees.iter().find(|f| f.course_id == course_id)
    }

    /// Merit scholarship calculation against the tier table.
    pub fn calculate_scholarship(&self, percentage: f64, course_id: &str) -> ScholarshipResult {
        let mut result = ScholarshipResult::default();

        let Some(fee_structure) = self.get_fees_by_course_id(course_id) else {
            return result;
        };

        let original_tuition = fee_structure.tuition();
        result.original_tuition = original_tuition;

        let tiers = &self.scholarships.scholarship_rules.merit_based.tiers;
        for tier in tiers {
            if tier.min_percentage <= percentage && percentage <= tier.max_percentage {
                let discount_amount =
                    (original_tuition as f64 * tier.discount_percentage / 100.0).round() as u64;
                result.eligible = true;
                result.scholarship_name = Some("Merit Scholarship".to_string());
                result.discount_percentage = tier.discount_percentage;
                result.discount_amount = discount_amount;
                result.final_tuition = original_tuition - discount_amount;
                break;
            }
        }

        result
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Option<T> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => {
            error!("File not found: {}", path.display());
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => {
            info!("Loaded {} successfully", path.display());
            Some(value)
        }
        Err(e) => {
            error!("Error parsing JSON in {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace_data_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../data")
    }

    fn load_kb() -> KnowledgeBase {
        KnowledgeBase::load(workspace_data_dir()).unwrap()
    }

    #[test]
    fn test_loads_shipped_data() {
        let kb = load_kb();
        assert!(kb.courses().len() >= 5);
        assert!(kb.get_course_by_id("BTECH_CSE").is_some());
        assert!(kb.get_course_by_id("NOPE").is_none());
    }

    #[test]
    fn test_course_search() {
        let kb = load_kb();
        assert!(kb.get_course_by_name("computer science").is_some());
        let engineering = kb.search_courses("engineering");
        assert!(!engineering.is_empty());
        let ug = kb.get_courses_by_level("undergraduate");
        let pg = kb.get_courses_by_level("postgraduate");
        assert!(!ug.is_empty());
        assert!(!pg.is_empty());
    }

    #[test]
    fn test_fees_lookup_and_breakdown_order() {
        let kb = load_kb();
        let fees = kb.get_fees_by_course_id("BTECH_CSE").unwrap();
        assert!(fees.annual_fee > 0);
        assert!(fees.tuition() > 0);
        // tuition is the first breakdown component in the data file
        let first = fees.breakdown.iter().next().unwrap();
        assert_eq!(first.0.as_str(), "tuition");
    }

    #[test]
    fn test_scholarship_tiers() {
        let kb = load_kb();

        let eligible = kb.calculate_scholarship(92.0, "BTECH_CSE");
        assert!(eligible.eligible);
        assert!(eligible.discount_percentage > 0.0);
        assert_eq!(
            eligible.final_tuition + eligible.discount_amount,
            eligible.original_tuition
        );

        let not_eligible = kb.calculate_scholarship(50.0, "BTECH_CSE");
        assert!(!not_eligible.eligible);
        assert_eq!(not_eligible.discount_amount, 0);

        let unknown_course = kb.calculate_scholarship(92.0, "NOPE");
        assert!(!unknown_course.eligible);
        assert_eq!(unknown_course.original_tuition, 0);
    }

    #[test]
    fn test_missing_dir_degrades_to_empty() {
        let kb = KnowledgeBase::load("/nonexistent/helpline-data").unwrap();
        assert!(kb.courses().is_empty());
        assert!(kb.fees().is_empty());
        assert!(kb.calculate_scholarship(90.0, "BTECH_CSE").original_tuition == 0);
    }
}
