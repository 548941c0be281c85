use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assessment::Stage;
use crate::catalog::Category;
use crate::profile::ProfileField;

/// Every state change in a flow session produces an Event.
/// Front ends render from them; the CLI prints them with `--json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ProfileUpdated {
        field: ProfileField,
        /// Whether the profile passes the completeness check after the edit.
        complete: bool,
        at: DateTime<Utc>,
    },
    StageChanged {
        from: Stage,
        to: Stage,
        at: DateTime<Utc>,
    },
    AnswerRecorded {
        question_id: u32,
        category: Category,
        answer: String,
        points: u32,
        feedback: String,
        /// Answer this one replaced, if the question was answered before.
        replaced: Option<String>,
        at: DateTime<Utc>,
    },
    ResultsSubmitted {
        confirmation_id: String,
        target: String,
        at: DateTime<Utc>,
    },
}
