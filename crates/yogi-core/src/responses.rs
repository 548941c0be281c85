//! Collected answers for one assessment session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The respondent's choice for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub question_id: u32,
    pub answer: String,
    #[serde(default = "Utc::now")]
    pub answered_at: DateTime<Utc>,
}

impl Response {
    pub fn new(question_id: u32, answer: impl Into<String>) -> Self {
        Self {
            question_id,
            answer: answer.into(),
            answered_at: Utc::now(),
        }
    }
}

/// At most one [`Response`] per question.
///
/// Recording a second answer for a question replaces the first. Iteration is
/// by question id; insertion order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Response>", into = "Vec<Response>")]
pub struct ResponseSet {
    by_question: BTreeMap<u32, Response>,
}

impl ResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a response. Returns the response it replaced, if any.
    pub fn record(&mut self, response: Response) -> Option<Response> {
        self.by_question.insert(response.question_id, response)
    }

    pub fn get(&self, question_id: u32) -> Option<&Response> {
        self.by_question.get(&question_id)
    }

    pub fn answer(&self, question_id: u32) -> Option<&str> {
        self.get(question_id).map(|r| r.answer.as_str())
    }

    pub fn is_answered(&self, question_id: u32) -> bool {
        self.by_question.contains_key(&question_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Response> {
        self.by_question.values()
    }

    pub fn len(&self) -> usize {
        self.by_question.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_question.is_empty()
    }
}

impl From<Vec<Response>> for ResponseSet {
    fn from(responses: Vec<Response>) -> Self {
        let mut set = ResponseSet::new();
        for response in responses {
            set.record(response);
        }
        set
    }
}

impl From<ResponseSet> for Vec<Response> {
    fn from(set: ResponseSet) -> Self {
        set.by_question.into_values().collect()
    }
}

impl FromIterator<Response> for ResponseSet {
    fn from_iter<I: IntoIterator<Item = Response>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_replaces_previous_answer() {
        let mut set = ResponseSet::new();
        assert!(set.record(Response::new(3, "Daily")).is_none());
        let replaced = set.record(Response::new(3, "Rarely")).unwrap();

        assert_eq!(replaced.answer, "Daily");
        assert_eq!(set.len(), 1);
        assert_eq!(set.answer(3), Some("Rarely"));
    }

    #[test]
    fn deserializing_duplicates_keeps_last() {
        let json = r#"[
            {"question_id": 1, "answer": "Daily"},
            {"question_id": 2, "answer": "Weekly"},
            {"question_id": 1, "answer": "Rarely"}
        ]"#;
        let set: ResponseSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.answer(1), Some("Rarely"));
    }

    #[test]
    fn serializes_as_list_ordered_by_question() {
        let set: ResponseSet = vec![Response::new(9, "Never"), Response::new(2, "Daily")].into();
        let value = serde_json::to_value(&set).unwrap();
        let ids: Vec<u64> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["question_id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![2, 9]);
    }
}
