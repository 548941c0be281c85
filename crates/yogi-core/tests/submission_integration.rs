//! Integration tests for delivering completed assessments.

use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

use yogi_core::config::SubmissionConfig;
use yogi_core::submission::HttpSubmitter;
use yogi_core::{
    AssessmentSession, ContactForm, FlowMode, Stage, SubmissionError, SubmissionPayload, Submitter,
};

fn completed_session() -> AssessmentSession {
    let mut session = AssessmentSession::new(FlowMode::Flat);
    session.proceed().unwrap();
    while let Stage::Questions { .. } = session.stage() {
        let q = session.current_question().unwrap();
        session.answer(q.options[1]).unwrap();
    }
    assert!(session.is_complete());
    session
}

fn payload() -> SubmissionPayload {
    SubmissionPayload::from_session(
        &completed_session(),
        ContactForm::new("respondent@example.com", "+1 555 0100"),
    )
    .unwrap()
}

#[tokio::test]
async fn test_http_submission_posts_payload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/assessment-results")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "contact": { "email": "respondent@example.com" },
            "scores": { "total_xp": 98, "percentage": 70, "level": 3 }
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"confirmation_id": "conf-42"}"#)
        .create_async()
        .await;

    let submitter = Submitter::from_config(&SubmissionConfig {
        endpoint: server.url(),
        timeout_secs: 5,
    })
    .unwrap();
    let confirmation = submitter.submit(&payload()).await.unwrap();

    assert_eq!(confirmation.confirmation_id, "conf-42");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_http_submission_surfaces_rejection() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/assessment-results")
        .with_status(422)
        .with_body("missing profile")
        .create_async()
        .await;

    let submitter = HttpSubmitter::new(&server.url(), Duration::from_secs(5)).unwrap();
    let err = submitter.submit(&payload()).await.unwrap_err();

    match err {
        SubmissionError::Rejected { status, body } => {
            assert_eq!(status, 422);
            assert_eq!(body, "missing profile");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_log_submission_issues_local_confirmation() {
    let submitter = Submitter::Log;
    let first = submitter.submit(&payload()).await.unwrap();
    let second = submitter.submit(&payload()).await.unwrap();
    assert!(!first.confirmation_id.is_empty());
    assert_ne!(first.confirmation_id, second.confirmation_id);
}

#[test]
fn test_payload_requires_contact_details() {
    let err = SubmissionPayload::from_session(&completed_session(), ContactForm::default())
        .unwrap_err();
    assert!(err.to_string().contains("email"));
    assert!(err.to_string().contains("phone"));
}
