//! # Yogi Core Library
//!
//! Business logic for the Yogi self-assessment: an intake profile, fourteen
//! questions across four life categories, and a scored result. Every rule
//! lives here so any front end (the `yogi` CLI today) stays a thin layer.
//!
//! ## Architecture
//!
//! - **Catalog**: static questions grouped by [`Category`]
//! - **Scoring**: static score table, per-category XP, percentage and level
//! - **Assessment**: the [`AssessmentSession`] stage machine and the
//!   [`FlowDriver`] that owns its auto-advance timer
//! - **Submission**: logging or HTTP delivery of finished assessments
//!
//! ## Key Components
//!
//! - [`AssessmentSession`]: one respondent's pass through the flow
//! - [`RespondentProfile`]: intake form with its completeness rule
//! - [`AssessmentResults`]: derived scores for the results view
//! - [`Config`]: user configuration

pub mod assessment;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod profile;
pub mod responses;
pub mod results;
pub mod routes;
pub mod scoring;
pub mod submission;

pub use assessment::{AssessmentSession, FlowDriver, FlowMode, Stage};
pub use catalog::{Category, Question};
pub use config::Config;
pub use error::{ConfigError, CoreError, FlowError, ProfileError, ScoringError, SubmissionError};
pub use events::Event;
pub use profile::{ProfileField, ProfileUpdate, RespondentProfile};
pub use responses::{Response, ResponseSet};
pub use results::{AssessmentResults, ContactForm};
pub use routes::{resolve, Resolution, Route};
pub use scoring::{CategoryXp, Level};
pub use submission::{Confirmation, SubmissionPayload, Submitter};
