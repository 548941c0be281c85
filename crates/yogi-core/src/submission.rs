//! Sending a completed assessment.
//!
//! With no endpoint configured the payload is only logged and a local
//! confirmation id is issued. With an endpoint the payload is POSTed to
//! `{endpoint}/assessment-results`, which must answer 2xx with
//! `{"confirmation_id": "..."}`.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::assessment::AssessmentSession;
use crate::config::SubmissionConfig;
use crate::error::{CoreError, SubmissionError};
use crate::events::Event;
use crate::profile::RespondentProfile;
use crate::responses::ResponseSet;
use crate::results::{AssessmentResults, ContactForm};
use crate::scoring::{CategoryXp, Level};

pub const RESULTS_RESOURCE: &str = "assessment-results";

/// Score block of the submission body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub category_xp: CategoryXp,
    pub total_xp: u32,
    pub percentage: u32,
    pub level: Level,
}

impl From<&AssessmentResults> for ScoreSummary {
    fn from(results: &AssessmentResults) -> Self {
        Self {
            category_xp: results.category_xp.clone(),
            total_xp: results.total_xp,
            percentage: results.percentage,
            level: results.level,
        }
    }
}

/// Body of `POST /assessment-results`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub session_id: String,
    pub profile: RespondentProfile,
    pub contact: ContactForm,
    pub responses: ResponseSet,
    pub scores: ScoreSummary,
}

impl SubmissionPayload {
    /// Build the payload from a completed session.
    pub fn from_session(
        session: &AssessmentSession,
        contact: ContactForm,
    ) -> Result<Self, CoreError> {
        if !session.is_complete() {
            return Err(SubmissionError::NotComplete.into());
        }
        let missing = contact.missing_fields();
        if !missing.is_empty() {
            return Err(SubmissionError::ContactIncomplete(missing).into());
        }
        let results = session.results()?;

        Ok(Self {
            session_id: session.id().to_string(),
            profile: session.profile().clone(),
            contact,
            responses: session.responses().clone(),
            scores: ScoreSummary::from(&results),
        })
    }
}

/// Acknowledgement of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub confirmation_id: String,
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl Confirmation {
    pub fn to_event(&self, target: &str) -> Event {
        Event::ResultsSubmitted {
            confirmation_id: self.confirmation_id.clone(),
            target: target.to_string(),
            at: self.received_at,
        }
    }
}

/// HTTP client for the results service.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: Client,
    url: Url,
}

impl HttpSubmitter {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, SubmissionError> {
        let invalid = |source| SubmissionError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            source,
        };
        let mut base = endpoint.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let url = Url::parse(&base)
            .and_then(|u| u.join(RESULTS_RESOURCE))
            .map_err(invalid)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn submit(&self, payload: &SubmissionPayload) -> Result<Confirmation, SubmissionError> {
        let resp = self.client.post(self.url.clone()).json(payload).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "results service rejected submission");
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<Confirmation>().await?)
    }
}

/// Destination for completed assessments.
#[derive(Debug, Clone)]
pub enum Submitter {
    /// Log the payload and confirm locally.
    Log,
    Http(HttpSubmitter),
}

impl Submitter {
    pub fn from_config(config: &SubmissionConfig) -> Result<Self, SubmissionError> {
        if config.endpoint.trim().is_empty() {
            return Ok(Submitter::Log);
        }
        HttpSubmitter::new(&config.endpoint, Duration::from_secs(config.timeout_secs))
            .map(Submitter::Http)
    }

    /// Human-readable destination.
    pub fn target(&self) -> String {
        match self {
            Submitter::Log => "local log".to_string(),
            Submitter::Http(http) => http.url().to_string(),
        }
    }

    pub async fn submit(&self, payload: &SubmissionPayload) -> Result<Confirmation, SubmissionError> {
        match self {
            Submitter::Log => {
                let confirmation = Confirmation {
                    confirmation_id: uuid::Uuid::new_v4().to_string(),
                    received_at: Utc::now(),
                };
                info!(
                    session = %payload.session_id,
                    confirmation = %confirmation.confirmation_id,
                    email = %payload.contact.email,
                    total_xp = payload.scores.total_xp,
                    level = payload.scores.level.value(),
                    "assessment submitted"
                );
                Ok(confirmation)
            }
            Submitter::Http(http) => {
                let confirmation = http.submit(payload).await?;
                info!(
                    session = %payload.session_id,
                    confirmation = %confirmation.confirmation_id,
                    "assessment submitted to {}",
                    http.url()
                );
                Ok(confirmation)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_results_resource() {
        let http = HttpSubmitter::new("https://api.example.com/v1", Duration::from_secs(1)).unwrap();
        assert_eq!(http.url().as_str(), "https://api.example.com/v1/assessment-results");

        let http = HttpSubmitter::new("https://api.example.com/", Duration::from_secs(1)).unwrap();
        assert_eq!(http.url().as_str(), "https://api.example.com/assessment-results");
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        assert!(matches!(
            HttpSubmitter::new("not a url", Duration::from_secs(1)),
            Err(SubmissionError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn empty_endpoint_selects_log_submitter() {
        let submitter = Submitter::from_config(&SubmissionConfig::default()).unwrap();
        assert!(matches!(submitter, Submitter::Log));
        assert_eq!(submitter.target(), "local log");
    }

    #[test]
    fn incomplete_session_cannot_be_submitted() {
        let session = AssessmentSession::new(crate::assessment::FlowMode::Flat);
        let err = SubmissionPayload::from_session(&session, ContactForm::new("a@b.c", "1")).unwrap_err();
        assert!(matches!(err, CoreError::Submission(SubmissionError::NotComplete)));
    }
}
