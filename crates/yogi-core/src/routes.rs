//! Navigation route table.
//!
//! Two pages exist. The questionnaire lives at `/questionnaire/`; the
//! slash-less form answers with a permanent redirect that keeps the query
//! string.

use serde::{Deserialize, Serialize};

pub const LANDING_PATH: &str = "/";
pub const QUESTIONNAIRE_PATH: &str = "/questionnaire/";

/// HTTP 308, permanent and method-preserving.
pub const PERMANENT_REDIRECT: u16 = 308;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Landing,
    Questionnaire,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => LANDING_PATH,
            Route::Questionnaire => QUESTIONNAIRE_PATH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    Render { route: Route },
    Redirect { location: String, status: u16 },
    NotFound,
}

/// Resolve a request path (optionally with `?query`).
pub fn resolve(request: &str) -> Resolution {
    let (path, query) = match request.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (request, None),
    };

    match path {
        "" | LANDING_PATH => Resolution::Render {
            route: Route::Landing,
        },
        QUESTIONNAIRE_PATH => Resolution::Render {
            route: Route::Questionnaire,
        },
        "/questionnaire" => {
            let location = match query {
                Some(q) => format!("{QUESTIONNAIRE_PATH}?{q}"),
                None => QUESTIONNAIRE_PATH.to_string(),
            };
            Resolution::Redirect {
                location,
                status: PERMANENT_REDIRECT,
            }
        }
        _ => Resolution::NotFound,
    }
}
