//! Flow driver with a cancellable auto-advance timer.
//!
//! After an answer is selected the driver waits `delay` before moving to the
//! next question, so a front end can show the selection and its feedback.
//! The timer belongs to the driver. A newer selection or a successful
//! navigation command stops it, as does dropping the driver, and the
//! session's ticket check rejects an advance that lost the race. An advance
//! that fires between commands is reported by the next one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use super::AssessmentSession;
use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::events::Event;
use crate::profile::ProfileUpdate;

pub struct FlowDriver {
    session: Arc<Mutex<AssessmentSession>>,
    delay: Duration,
    timer: Option<JoinHandle<Option<Event>>>,
    /// Advances that fired on their own and have not been handed out yet.
    fired: Vec<Event>,
}

impl FlowDriver {
    pub fn new(session: AssessmentSession, delay: Duration) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            delay,
            timer: None,
            fired: Vec::new(),
        }
    }

    /// Start a fresh session using the flow settings from config.
    pub fn from_config(config: &FlowConfig) -> Self {
        Self::new(
            AssessmentSession::new(config.mode),
            Duration::from_millis(config.auto_advance_ms),
        )
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether an auto-advance is scheduled and has not fired yet.
    pub fn has_pending_timer(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Run `f` against the current session state.
    pub async fn inspect<R>(&self, f: impl FnOnce(&AssessmentSession) -> R) -> R {
        let session = self.session.lock().await;
        f(&session)
    }

    /// Clone of the current session state.
    pub async fn snapshot(&self) -> AssessmentSession {
        self.session.lock().await.clone()
    }

    // ── Commands ─────────────────────────────────────────────────────
    //
    // Each command returns the events it caused, preceded by the stage change
    // of an auto-advance that fired since the last call. A rejected command
    // leaves a pending advance running.

    /// Profile edits do not touch a pending advance.
    pub async fn update_profile(&mut self, update: ProfileUpdate) -> Result<Vec<Event>, FlowError> {
        let event = self.session.lock().await.update_profile(update)?;
        self.reap().await;
        Ok(self.with_fired(vec![event]))
    }

    pub async fn proceed(&mut self) -> Result<Vec<Event>, FlowError> {
        let event = self.session.lock().await.proceed()?;
        self.stop_timer().await;
        Ok(self.with_fired(vec![event]))
    }

    /// Record an answer and schedule the advance.
    ///
    /// A rejected option leaves any earlier pending advance running. With a
    /// zero delay the advance happens before returning and its event is
    /// included; otherwise use [`Self::settle`] to wait for it.
    pub async fn select_answer(&mut self, option: &str) -> Result<Vec<Event>, FlowError> {
        let selection = self.session.lock().await.select_answer(option)?;
        // The new ticket already invalidates the old one; stop its task and
        // keep its event if it fired first.
        self.stop_timer().await;
        let mut events = vec![selection.event];

        if self.delay.is_zero() {
            events.extend(self.session.lock().await.complete_advance(selection.ticket));
            return Ok(self.with_fired(events));
        }

        let shared = Arc::clone(&self.session);
        let delay = self.delay;
        let ticket = selection.ticket;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.lock().await.complete_advance(ticket)
        }));
        debug!(?ticket, ?delay, "auto-advance scheduled");
        Ok(self.with_fired(events))
    }

    /// Step back; a pending advance is dropped.
    pub async fn go_back(&mut self) -> Result<Vec<Event>, FlowError> {
        let event = self.session.lock().await.go_back()?;
        self.stop_timer().await;
        Ok(self.with_fired(vec![event]))
    }

    /// Step forward over an answered question; a pending advance is dropped.
    pub async fn go_next(&mut self) -> Result<Vec<Event>, FlowError> {
        let event = self.session.lock().await.go_next()?;
        self.stop_timer().await;
        Ok(self.with_fired(vec![event]))
    }

    /// Wait for a scheduled auto-advance to fire.
    ///
    /// Returns the stage change it produced (or one that fired earlier and was
    /// not handed out yet), or `None` if nothing was pending or the advance
    /// was superseded.
    pub async fn settle(&mut self) -> Option<Event> {
        if let Some(timer) = self.timer.take() {
            if let Ok(fired) = timer.await {
                self.fired.extend(fired);
            }
        }
        if self.fired.is_empty() {
            None
        } else {
            Some(self.fired.remove(0))
        }
    }

    /// Abort the pending timer and invalidate its ticket.
    ///
    /// An advance that already fired is kept and handed out by the next
    /// command or [`Self::settle`].
    pub async fn cancel(&mut self) {
        if self.stop_timer().await {
            self.session.lock().await.cancel_pending();
        }
    }

    /// End the flow, returning the final session state.
    pub async fn finish(mut self) -> AssessmentSession {
        self.cancel().await;
        self.session.lock().await.clone()
    }

    /// Collect the event of a timer that already fired, leaving a running one.
    async fn reap(&mut self) {
        if self.timer.as_ref().is_some_and(|t| t.is_finished()) {
            self.stop_timer().await;
        }
    }

    /// Abort the timer task, collecting its event if it completed first.
    /// Returns whether a task was running.
    async fn stop_timer(&mut self) -> bool {
        let Some(timer) = self.timer.take() else {
            return false;
        };
        timer.abort();
        match timer.await {
            Ok(fired) => self.fired.extend(fired),
            Err(_) => debug!("auto-advance cancelled"),
        }
        true
    }

    fn with_fired(&mut self, events: Vec<Event>) -> Vec<Event> {
        let mut all = std::mem::take(&mut self.fired);
        all.extend(events);
        all
    }
}

impl Default for FlowDriver {
    fn default() -> Self {
        Self::from_config(&FlowConfig::default())
    }
}

impl Drop for FlowDriver {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl std::fmt::Debug for FlowDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowDriver")
            .field("delay", &self.delay)
            .field("timer_pending", &self.timer.is_some())
            .field("fired", &self.fired.len())
            .finish()
    }
}
