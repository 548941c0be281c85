//! Assessment session state machine.
//!
//! The session is plain data plus synchronous commands; it never sleeps or
//! spawns. Advancing after an answer is split in two steps so a front end can
//! delay it: [`AssessmentSession::select_answer`] records the answer and hands
//! out an [`AdvanceTicket`], and [`AssessmentSession::complete_advance`] moves
//! the pointer only if that ticket is still the pending one. A newer
//! selection, `go_back`, `go_next` or `cancel_pending` invalidates the ticket;
//! profile edits and rejected commands leave it in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{FlowMode, Stage};
use crate::catalog::{self, Category, Question};
use crate::error::{FlowError, ScoringError};
use crate::events::Event;
use crate::profile::{ProfileUpdate, RespondentProfile};
use crate::responses::{Response, ResponseSet};
use crate::results::AssessmentResults;
use crate::scoring::{self, CategoryXp};

/// Contiguous run of questions presented together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// `None` for the single section of the flat flow.
    pub category: Option<Category>,
    pub question_ids: Vec<u32>,
}

impl Section {
    pub fn len(&self) -> usize {
        self.question_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.question_ids.is_empty()
    }
}

/// Feedback shown for the answer just selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub question_id: u32,
    pub points: u32,
    pub text: String,
}

/// Handle for a deferred advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceTicket(u64);

/// Outcome of [`AssessmentSession::select_answer`].
#[derive(Debug, Clone)]
pub struct Selection {
    pub event: Event,
    pub ticket: AdvanceTicket,
}

/// Progress counters for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
    /// 1-based position within the current section, when on a question.
    pub position_in_section: Option<(usize, usize)>,
}

/// One respondent's pass through the assessment.
///
/// Created when the flow starts and dropped when it ends; nothing here is
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSession {
    id: String,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    mode: FlowMode,
    sections: Vec<Section>,
    stage: Stage,
    profile: RespondentProfile,
    responses: ResponseSet,
    feedback: Option<Feedback>,
    pending: Option<AdvanceTicket>,
    next_ticket: u64,
}

impl AssessmentSession {
    pub fn new(mode: FlowMode) -> Self {
        let (sections, stage) = match mode {
            FlowMode::Sectioned => {
                let sections = catalog::categories()
                    .iter()
                    .map(|c| Section {
                        category: Some(*c),
                        question_ids: catalog::questions_in(*c).map(|q| q.id).collect(),
                    })
                    .filter(|s| !s.is_empty())
                    .collect();
                (sections, Stage::Stats)
            }
            FlowMode::Flat => {
                let section = Section {
                    category: None,
                    question_ids: catalog::questions().iter().map(|q| q.id).collect(),
                };
                (vec![section], Stage::Intro)
            }
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            completed_at: None,
            mode,
            sections,
            stage,
            profile: RespondentProfile::new(),
            responses: ResponseSet::new(),
            feedback: None,
            pending: None,
            next_ticket: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> FlowMode {
        self.mode
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn is_complete(&self) -> bool {
        self.stage == Stage::Completion
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn profile(&self) -> &RespondentProfile {
        &self.profile
    }

    pub fn responses(&self) -> &ResponseSet {
        &self.responses
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn pending_advance(&self) -> Option<AdvanceTicket> {
        self.pending
    }

    /// Section being introduced or answered.
    pub fn current_section(&self) -> Option<&Section> {
        match self.stage {
            Stage::SectionIntro { section } | Stage::Questions { section, .. } => {
                self.sections.get(section)
            }
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&'static Question> {
        let Stage::Questions { section, index } = self.stage else {
            return None;
        };
        let id = *self.sections.get(section)?.question_ids.get(index)?;
        catalog::question(id)
    }

    /// Answer previously recorded for the current question.
    pub fn selected_answer(&self) -> Option<&str> {
        self.current_question()
            .and_then(|q| self.responses.answer(q.id))
    }

    pub fn can_go_back(&self) -> bool {
        matches!(self.stage, Stage::Questions { index, .. } if index > 0)
    }

    pub fn can_go_next(&self) -> bool {
        self.selected_answer().is_some()
    }

    pub fn progress(&self) -> Progress {
        let position_in_section = match self.stage {
            Stage::Questions { section, index } => {
                self.sections.get(section).map(|s| (index + 1, s.len()))
            }
            _ => None,
        };
        Progress {
            answered: self.responses.len(),
            total: self.sections.iter().map(Section::len).sum(),
            position_in_section,
        }
    }

    /// Category totals recomputed from the recorded responses.
    pub fn category_xp(&self) -> Result<CategoryXp, ScoringError> {
        CategoryXp::from_responses(&self.responses)
    }

    pub fn results(&self) -> Result<AssessmentResults, ScoringError> {
        AssessmentResults::from_responses(&self.responses)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply one profile form edit.
    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<Event, FlowError> {
        if self.is_complete() {
            return Err(FlowError::AlreadyComplete);
        }
        let field = update.field();
        self.profile.apply(update);
        Ok(Event::ProfileUpdated {
            field,
            complete: self.profile.is_complete(),
            at: Utc::now(),
        })
    }

    /// Leave the current non-question screen.
    pub fn proceed(&mut self) -> Result<Event, FlowError> {
        let next = match self.stage {
            Stage::Stats => {
                let missing = self.profile.missing_fields();
                if !missing.is_empty() {
                    return Err(FlowError::ProfileIncomplete {
                        missing: missing.iter().map(|f| f.to_string()).collect(),
                    });
                }
                Stage::AssessmentIntro
            }
            Stage::AssessmentIntro => Stage::Intro,
            Stage::Intro => match self.mode {
                FlowMode::Sectioned => Stage::SectionIntro { section: 0 },
                FlowMode::Flat => Stage::Questions {
                    section: 0,
                    index: 0,
                },
            },
            Stage::SectionIntro { section } => Stage::Questions { section, index: 0 },
            Stage::Questions { .. } => {
                return Err(FlowError::WrongStage {
                    command: "proceed",
                    stage: self.stage,
                })
            }
            Stage::Completion => return Err(FlowError::AlreadyComplete),
        };
        Ok(self.transition(next))
    }

    /// Record an answer for the current question.
    ///
    /// The pointer does not move until [`Self::complete_advance`] is called
    /// with the returned ticket.
    pub fn select_answer(&mut self, option: &str) -> Result<Selection, FlowError> {
        let question = self.require_question("select_answer")?;
        if !question.has_option(option) {
            return Err(FlowError::InvalidOption {
                question_id: question.id,
                answer: option.to_string(),
            });
        }
        let entry = scoring::lookup(question.id, option)?;
        let points = entry.tier.points();

        let replaced = self
            .responses
            .record(Response::new(question.id, option))
            .map(|r| r.answer);
        debug!(question_id = question.id, answer = option, points, "answer recorded");

        self.feedback = Some(Feedback {
            question_id: question.id,
            points,
            text: entry.feedback.to_string(),
        });

        let ticket = AdvanceTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending = Some(ticket);

        Ok(Selection {
            event: Event::AnswerRecorded {
                question_id: question.id,
                category: question.category,
                answer: option.to_string(),
                points,
                feedback: entry.feedback.to_string(),
                replaced,
                at: Utc::now(),
            },
            ticket,
        })
    }

    /// Perform the advance promised by `ticket`.
    ///
    /// Returns `None` when the ticket was superseded or cancelled.
    pub fn complete_advance(&mut self, ticket: AdvanceTicket) -> Option<Event> {
        if self.pending != Some(ticket) {
            debug!(?ticket, "stale advance ignored");
            return None;
        }
        self.pending = None;
        self.advance().ok()
    }

    /// Select and advance in one step.
    pub fn answer(&mut self, option: &str) -> Result<Vec<Event>, FlowError> {
        let selection = self.select_answer(option)?;
        let mut events = vec![selection.event];
        events.extend(self.complete_advance(selection.ticket));
        Ok(events)
    }

    /// Drop any pending advance.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    pub fn go_back(&mut self) -> Result<Event, FlowError> {
        let Stage::Questions { section, index } = self.stage else {
            return Err(self.wrong_stage("go_back"));
        };
        if index == 0 {
            return Err(FlowError::AtSectionStart);
        }
        self.pending = None;
        Ok(self.transition(Stage::Questions {
            section,
            index: index - 1,
        }))
    }

    pub fn go_next(&mut self) -> Result<Event, FlowError> {
        let question = self.require_question("go_next")?;
        if !self.responses.is_answered(question.id) {
            return Err(FlowError::NotAnswered(question.id));
        }
        self.pending = None;
        self.advance()
    }

    // ── Internals ────────────────────────────────────────────────────

    fn require_question(&self, command: &'static str) -> Result<&'static Question, FlowError> {
        match self.stage {
            Stage::Completion => Err(FlowError::AlreadyComplete),
            Stage::Questions { .. } => self
                .current_question()
                .ok_or_else(|| self.wrong_stage(command)),
            _ => Err(self.wrong_stage(command)),
        }
    }

    fn wrong_stage(&self, command: &'static str) -> FlowError {
        if self.is_complete() {
            return FlowError::AlreadyComplete;
        }
        FlowError::WrongStage {
            command,
            stage: self.stage,
        }
    }

    /// Move past the current question.
    fn advance(&mut self) -> Result<Event, FlowError> {
        let Stage::Questions { section, index } = self.stage else {
            return Err(self.wrong_stage("advance"));
        };
        let current = &self.sections[section];

        let next = if index + 1 < current.len() {
            Stage::Questions {
                section,
                index: index + 1,
            }
        } else if let Some(gap) = current
            .question_ids
            .iter()
            .position(|id| !self.responses.is_answered(*id))
        {
            Stage::Questions { section, index: gap }
        } else if section + 1 < self.sections.len() {
            Stage::SectionIntro {
                section: section + 1,
            }
        } else {
            Stage::Completion
        };
        Ok(self.transition(next))
    }

    fn transition(&mut self, to: Stage) -> Event {
        let from = self.stage;
        self.stage = to;
        self.feedback = None;
        debug!(session = %self.id, %from, %to, "stage changed");

        if to == Stage::Completion {
            self.completed_at = Some(Utc::now());
            info!(
                session = %self.id,
                answered = self.responses.len(),
                "assessment completed"
            );
        }

        Event::StageChanged {
            from,
            to,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileUpdate;

    fn complete_profile(session: &mut AssessmentSession) {
        for assignment in [
            "name=Sam",
            "age=29",
            "height=180",
            "weight=80",
            "body_fat=18",
            "income_bracket=25k-50k",
            "work_status=part-time",
        ] {
            session
                .update_profile(ProfileUpdate::parse_assignment(assignment).unwrap())
                .unwrap();
        }
    }

    fn at_first_question() -> AssessmentSession {
        let mut session = AssessmentSession::new(FlowMode::Sectioned);
        complete_profile(&mut session);
        session.proceed().unwrap(); // -> assessment intro
        session.proceed().unwrap(); // -> intro
        session.proceed().unwrap(); // -> section intro 0
        session.proceed().unwrap(); // -> questions
        session
    }

    #[test]
    fn sectioned_flow_starts_at_stats() {
        let session = AssessmentSession::new(FlowMode::Sectioned);
        assert_eq!(session.stage(), Stage::Stats);
        assert_eq!(session.sections().len(), 4);
        assert_eq!(session.progress().total, 14);
    }

    #[test]
    fn flat_flow_starts_at_intro_with_one_section() {
        let mut session = AssessmentSession::new(FlowMode::Flat);
        assert_eq!(session.stage(), Stage::Intro);
        assert_eq!(session.sections().len(), 1);

        session.proceed().unwrap();
        assert_eq!(session.stage(), Stage::Questions { section: 0, index: 0 });
    }

    #[test]
    fn incomplete_profile_blocks_proceed() {
        let mut session = AssessmentSession::new(FlowMode::Sectioned);
        let err = session.proceed().unwrap_err();
        assert!(matches!(err, FlowError::ProfileIncomplete { ref missing } if missing.len() == 7));
        assert_eq!(session.stage(), Stage::Stats);
    }

    #[test]
    fn select_records_but_waits_for_ticket() {
        let mut session = at_first_question();
        let selection = session.select_answer("Daily").unwrap();

        assert_eq!(session.stage(), Stage::Questions { section: 0, index: 0 });
        assert_eq!(session.feedback().unwrap().points, 10);
        assert_eq!(session.pending_advance(), Some(selection.ticket));

        let event = session.complete_advance(selection.ticket).unwrap();
        assert!(matches!(event, Event::StageChanged { .. }));
        assert_eq!(session.stage(), Stage::Questions { section: 0, index: 1 });
        assert!(session.feedback().is_none());
    }

    #[test]
    fn invalid_option_is_rejected() {
        let mut session = at_first_question();
        let err = session.select_answer("Sometimes").unwrap_err();
        assert_eq!(
            err,
            FlowError::InvalidOption {
                question_id: 1,
                answer: "Sometimes".into()
            }
        );
        assert!(session.responses().is_empty());
    }

    #[test]
    fn go_back_cancels_pending_advance() {
        let mut session = at_first_question();
        session.answer("Daily").unwrap();
        let selection = session.select_answer("Rarely").unwrap();

        session.go_back().unwrap();
        assert_eq!(session.stage(), Stage::Questions { section: 0, index: 0 });
        assert!(session.feedback().is_none());
        assert!(session.complete_advance(selection.ticket).is_none());
        assert_eq!(session.stage(), Stage::Questions { section: 0, index: 0 });
    }

    #[test]
    fn newer_selection_supersedes_older_ticket() {
        let mut session = at_first_question();
        let first = session.select_answer("Rarely").unwrap();
        let second = session.select_answer("Daily").unwrap();

        assert!(session.complete_advance(first.ticket).is_none());
        assert!(session.complete_advance(second.ticket).is_some());
        assert_eq!(session.responses().answer(1), Some("Daily"));
    }

    #[test]
    fn go_back_at_section_start_is_guarded() {
        let mut session = at_first_question();
        assert!(!session.can_go_back());
        assert_eq!(session.go_back().unwrap_err(), FlowError::AtSectionStart);
    }

    #[test]
    fn go_next_requires_an_answer() {
        let mut session = at_first_question();
        assert!(!session.can_go_next());
        assert_eq!(session.go_next().unwrap_err(), FlowError::NotAnswered(1));
    }

    #[test]
    fn back_then_next_restores_question_and_selection() {
        let mut session = at_first_question();
        session.answer("Daily").unwrap();
        session.answer("A few times a month").unwrap();
        session.go_back().unwrap();

        let second = session.current_question().unwrap();
        assert_eq!(second.id, 2);
        assert_eq!(session.selected_answer(), Some("A few times a month"));

        session.go_back().unwrap();
        assert_eq!(session.selected_answer(), Some("Daily"));
        session.go_next().unwrap();

        assert_eq!(session.current_question().unwrap(), second);
        assert_eq!(session.selected_answer(), Some("A few times a month"));
        assert_eq!(session.responses().len(), 2);
    }

    #[test]
    fn last_question_of_section_moves_to_next_section_intro() {
        let mut session = at_first_question();
        for _ in 0..4 {
            let option = session.current_question().unwrap().options[0];
            session.answer(option).unwrap();
        }
        assert_eq!(session.stage(), Stage::SectionIntro { section: 1 });
        assert_eq!(
            session.current_section().unwrap().category,
            Some(Category::Physical)
        );
    }

    #[test]
    fn profile_edit_keeps_pending_advance() {
        let mut session = at_first_question();
        let selection = session.select_answer("Daily").unwrap();
        session
            .update_profile(ProfileUpdate::parse_assignment("name=Alex").unwrap())
            .unwrap();

        assert_eq!(session.pending_advance(), Some(selection.ticket));
        assert!(session.complete_advance(selection.ticket).is_some());
        assert_eq!(session.stage(), Stage::Questions { section: 0, index: 1 });
    }

    #[test]
    fn cancel_pending_invalidates_ticket() {
        let mut session = at_first_question();
        let selection = session.select_answer("Daily").unwrap();
        session.cancel_pending();
        assert!(session.complete_advance(selection.ticket).is_none());
        assert_eq!(session.stage(), Stage::Questions { section: 0, index: 0 });
    }

    #[test]
    fn answering_everything_reaches_completion() {
        let mut session = at_first_question();
        while !session.is_complete() {
            match session.stage() {
                Stage::SectionIntro { .. } => {
                    session.proceed().unwrap();
                }
                Stage::Questions { .. } => {
                    let option = session.current_question().unwrap().options[0];
                    session.answer(option).unwrap();
                }
                other => panic!("unexpected stage {other}"),
            }
        }
        assert!(session.completed_at().is_some());
        let results = session.results().unwrap();
        assert_eq!(results.total_xp, 140);
        assert_eq!(results.percentage, 100);
        assert_eq!(results.level.value(), 5);
        assert_eq!(session.select_answer("Daily").unwrap_err(), FlowError::AlreadyComplete);
        assert_eq!(session.proceed().unwrap_err(), FlowError::AlreadyComplete);
    }

    #[test]
    fn changing_an_answer_recomputes_instead_of_accumulating() {
        let mut session = at_first_question();
        session.answer("Daily").unwrap();
        session.go_back().unwrap();
        let events = session.answer("Rarely").unwrap();

        assert!(matches!(
            &events[0],
            Event::AnswerRecorded { replaced: Some(prev), .. } if prev == "Daily"
        ));
        assert_eq!(session.responses().len(), 1);
        assert_eq!(session.category_xp().unwrap().get(Category::Mental), 1);
    }

    #[test]
    fn proceed_is_not_available_on_questions() {
        let mut session = at_first_question();
        assert!(matches!(
            session.proceed().unwrap_err(),
            FlowError::WrongStage { command: "proceed", .. }
        ));
    }
}
