//! Assessment flow: the stage state machine and its auto-advance driver.
//!
//! ## Stages
//!
//! ```text
//! sectioned: Stats -> AssessmentIntro -> Intro -> [SectionIntro -> Questions] x 4 -> Completion
//! flat:      Intro -> Questions -> Completion
//! ```

mod driver;
mod session;

pub use driver::FlowDriver;
pub use session::{AdvanceTicket, AssessmentSession, Feedback, Progress, Section, Selection};

use serde::{Deserialize, Serialize};
use std::fmt;

/// How questions are grouped on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowMode {
    /// Profile form, intros, and one section per category.
    #[default]
    Sectioned,
    /// A single run of all questions after one intro screen.
    Flat,
}

/// Position of the respondent in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// Intake profile form.
    Stats,
    AssessmentIntro,
    Intro,
    SectionIntro {
        section: usize,
    },
    Questions {
        section: usize,
        /// Index within the section.
        index: usize,
    },
    Completion,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Stats => f.write_str("stats"),
            Stage::AssessmentIntro => f.write_str("assessment_intro"),
            Stage::Intro => f.write_str("intro"),
            Stage::SectionIntro { section } => write!(f, "section_intro[{section}]"),
            Stage::Questions { section, index } => write!(f, "questions[{section}:{index}]"),
            Stage::Completion => f.write_str("completion"),
        }
    }
}
