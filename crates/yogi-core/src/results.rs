//! Results derived from a finished (or partial) response set, and the
//! contact form shown on the completion screen.

use serde::{Deserialize, Serialize};

use crate::catalog::{self, Category};
use crate::error::ScoringError;
use crate::responses::ResponseSet;
use crate::scoring::{self, CategoryXp, Level};

/// Everything the results view shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResults {
    pub category_xp: CategoryXp,
    pub total_xp: u32,
    pub percentage: u32,
    pub level: Level,
    pub strongest: Category,
    pub weakest: Category,
    pub answered: usize,
    pub question_count: usize,
}

impl AssessmentResults {
    /// Score against the full catalog, so unanswered questions count as zero.
    pub fn from_responses(responses: &ResponseSet) -> Result<Self, ScoringError> {
        let category_xp = CategoryXp::from_responses(responses)?;
        let question_count = catalog::question_count();
        let total_xp = scoring::total_xp(&category_xp);
        let percentage = scoring::percentage(total_xp, question_count);

        Ok(Self {
            total_xp,
            percentage,
            level: scoring::level(percentage),
            strongest: category_xp.strongest(),
            weakest: category_xp.weakest(),
            answered: responses.len(),
            question_count,
            category_xp,
        })
    }

    /// Highest achievable points for one category.
    pub fn category_max(category: Category) -> u32 {
        catalog::questions_in(category).count() as u32 * scoring::MAX_POINTS
    }
}

/// Contact details collected on the completion screen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactForm {
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
}

impl ContactForm {
    pub fn new(email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            phone: phone.into(),
            ..Default::default()
        }
    }

    /// Required fields that are empty or malformed.
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            missing.push("email".to_string());
        }
        if self.phone.trim().is_empty() {
            missing.push("phone".to_string());
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}
