//! Core error types for yogi-core.
//!
//! Each concern gets its own thiserror enum; [`CoreError`] wraps them so the
//! CLI can propagate any of them with `?`.

use std::path::PathBuf;
use thiserror::Error;

use crate::assessment::Stage;

/// Core error type for yogi-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Assessment flow errors
    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    /// Profile form errors
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Score table errors
    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    /// Submission errors
    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Home directory could not be determined
    #[error("Could not determine the home directory")]
    NoHomeDir,

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised by the assessment state machine.
///
/// These correspond to affordances a UI would render disabled; callers are
/// expected to check them rather than treat them as failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// The respondent profile is missing required fields
    #[error("Profile is incomplete; missing: {}", .missing.join(", "))]
    ProfileIncomplete { missing: Vec<String> },

    /// Command is not valid in the current stage
    #[error("'{command}' is not available in stage {stage}")]
    WrongStage { command: &'static str, stage: Stage },

    /// The option is not one of the current question's options
    #[error("'{answer}' is not an option for question {question_id}")]
    InvalidOption { question_id: u32, answer: String },

    /// goNext without a recorded answer
    #[error("Question {0} has not been answered yet")]
    NotAnswered(u32),

    /// goBack on the first question of a section
    #[error("Already at the first question of this section")]
    AtSectionStart,

    /// The flow has reached completion
    #[error("Assessment already complete")]
    AlreadyComplete,

    /// Catalog option without a score table entry
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

/// Profile form errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// Field name not recognised
    #[error("Unknown profile field: {0}")]
    UnknownField(String),

    /// Assignment not in `field=value` form
    #[error("Expected field=value, got '{0}'")]
    MalformedAssignment(String),
}

/// Score table errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// No score table entry for the pair
    #[error("No score entry for question {question_id} answer '{answer}'")]
    Unscored { question_id: u32, answer: String },

    /// Response references a question outside the catalog
    #[error("Unknown question id: {0}")]
    UnknownQuestion(u32),
}

/// Submission errors.
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// Contact form is missing required fields
    #[error("Contact form is incomplete; missing: {}", .0.join(", "))]
    ContactIncomplete(Vec<String>),

    /// Assessment has not reached completion
    #[error("Assessment is not complete")]
    NotComplete,

    /// Endpoint URL could not be parsed
    #[error("Invalid submission endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// Transport failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("Submission rejected (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
