//! Waitlist form state and the per-attempt submission state machine.

use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use document_store::{ConnectivityResult, CreatedEntry};
use shared::{
    domain::{UserType, WaitlistEntry, WaitlistFields},
    error::{classify_remote_error, FormError, RemoteError, ValidationError, SUCCESS_MESSAGE},
};
use tracing::{debug, error, info, warn};

use crate::{view::FormView, WaitlistGateway};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Connectivity {
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

impl From<&ConnectivityResult> for Connectivity {
    fn from(value: &ConnectivityResult) -> Self {
        if value.is_success() {
            Connectivity::Connected
        } else {
            Connectivity::Disconnected
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed(FormError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTone {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub tone: MessageTone,
}

impl StatusMessage {
    fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: MessageTone::Success,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: MessageTone::Error,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionState {
    pub fields: WaitlistFields,
    pub phase: SubmissionPhase,
    pub message: Option<StatusMessage>,
    pub connectivity: Connectivity,
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        self.phase == SubmissionPhase::Submitting
    }

    pub fn can_submit(&self) -> bool {
        !self.is_submitting() && self.connectivity != Connectivity::Disconnected
    }
}

static NEXT_CONTROLLER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle for one attempt in `Submitting`. Bound to the controller and attempt that
/// issued it; results carried by any other ticket are discarded.
#[derive(Debug)]
pub struct SubmitTicket {
    controller_id: u64,
    attempt: u64,
    entry: WaitlistEntry,
}

impl SubmitTicket {
    pub fn entry(&self) -> &WaitlistEntry {
        &self.entry
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Validation passed; the caller must issue exactly one create call.
    Started(SubmitTicket),
    Rejected(ValidationError),
    /// An attempt is already in flight.
    Ignored,
    /// The store was reported unreachable at mount; the submit control is disabled.
    Unavailable,
}

pub struct WaitlistController {
    id: u64,
    gateway: Arc<dyn WaitlistGateway>,
    state: SubmissionState,
    mounted: bool,
    probe_applied: bool,
    attempt: u64,
}

impl WaitlistController {
    pub fn new(gateway: Arc<dyn WaitlistGateway>) -> Self {
        Self {
            id: NEXT_CONTROLLER_ID.fetch_add(1, Ordering::Relaxed),
            gateway,
            state: SubmissionState::default(),
            mounted: false,
            probe_applied: false,
            attempt: 0,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn view(&self) -> FormView {
        FormView::from_state(&self.state)
    }

    /// Marks the form mounted and hands back the one-time connectivity probe.
    ///
    /// The returned future holds no borrow of the controller, so edits and submits
    /// can be applied while it is pending. Feed its result to [`Self::apply_probe`].
    /// Later calls return `None`.
    pub fn mount(&mut self) -> Option<impl Future<Output = ConnectivityResult> + Send + 'static> {
        if self.mounted {
            return None;
        }
        self.mounted = true;

        let gateway = Arc::clone(&self.gateway);
        Some(async move { gateway.probe_connectivity().await })
    }

    /// Records the probe result. Only the first result is kept.
    pub fn apply_probe(&mut self, result: &ConnectivityResult) -> Connectivity {
        if self.probe_applied {
            debug!("ignoring repeated connectivity result");
            return self.state.connectivity;
        }
        self.probe_applied = true;

        self.state.connectivity = Connectivity::from(result);
        match result.error() {
            None => info!("document store reachable"),
            Some(err) => warn!(
                code = ?err.code,
                kind = ?err.kind,
                remote_message = ?err.message,
                "document store unreachable; submit disabled"
            ),
        }
        self.state.connectivity
    }

    /// Mounts and waits for the probe in one step.
    pub async fn connect(&mut self) -> Connectivity {
        if let Some(probe) = self.mount() {
            let result = probe.await;
            self.apply_probe(&result);
        }
        self.state.connectivity
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        self.edit(|fields| fields.name = name.into())
    }

    pub fn set_email(&mut self, email: impl Into<String>) -> bool {
        self.edit(|fields| fields.email = email.into())
    }

    pub fn set_user_type(&mut self, user_type: UserType) -> bool {
        self.edit(|fields| fields.user_type = user_type)
    }

    // Inputs are disabled while an attempt is in flight.
    fn edit(&mut self, apply: impl FnOnce(&mut WaitlistFields)) -> bool {
        if self.state.is_submitting() {
            debug!("ignoring field edit while submitting");
            return false;
        }
        apply(&mut self.state.fields);
        true
    }

    pub fn begin_submit(&mut self) -> SubmitOutcome {
        if self.state.is_submitting() {
            debug!("submit ignored, attempt already in flight");
            return SubmitOutcome::Ignored;
        }

        self.state.phase = SubmissionPhase::Validating;
        self.state.message = None;

        let entry = match self.state.fields.validate() {
            Ok(entry) => entry,
            Err(err) => {
                info!(reason = %err, "waitlist draft rejected");
                self.state.message = Some(StatusMessage::error(err.to_string()));
                self.state.phase = SubmissionPhase::Failed(err.into());
                return SubmitOutcome::Rejected(err);
            }
        };

        if self.state.connectivity == Connectivity::Disconnected {
            warn!("submit blocked, document store unreachable");
            self.state.phase = SubmissionPhase::Idle;
            return SubmitOutcome::Unavailable;
        }

        self.attempt += 1;
        info!(
            attempt = self.attempt,
            user_type = %entry.user_type(),
            "submitting waitlist entry"
        );
        self.state.phase = SubmissionPhase::Submitting;
        SubmitOutcome::Started(SubmitTicket {
            controller_id: self.id,
            attempt: self.attempt,
            entry,
        })
    }

    fn is_current(&self, controller_id: u64, attempt: u64) -> bool {
        self.state.is_submitting() && controller_id == self.id && attempt == self.attempt
    }

    /// Gives up on an attempt whose create call will never be reported. The form
    /// returns to `Idle` with its fields intact.
    pub fn abandon_submit(&mut self, ticket: SubmitTicket) -> bool {
        self.abandon_attempt(ticket.controller_id, ticket.attempt)
    }

    fn abandon_attempt(&mut self, controller_id: u64, attempt: u64) -> bool {
        if !self.is_current(controller_id, attempt) {
            return false;
        }
        warn!(attempt, "waitlist submission abandoned");
        self.state.phase = SubmissionPhase::Idle;
        true
    }

    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<CreatedEntry, RemoteError>,
    ) -> &SubmissionPhase {
        if !self.is_current(ticket.controller_id, ticket.attempt) {
            debug!(
                attempt = ticket.attempt,
                "discarding result for an attempt this form is not waiting on"
            );
            return &self.state.phase;
        }

        match result {
            Ok(created) => {
                info!(document_id = ?created.id, "waitlist submission succeeded");
                self.state.message = Some(StatusMessage::success(SUCCESS_MESSAGE));
                self.state.fields = WaitlistFields::default();
                self.state.phase = SubmissionPhase::Succeeded;
            }
            Err(err) => {
                error!(
                    code = ?err.code,
                    kind = ?err.kind,
                    remote_message = ?err.message,
                    "waitlist submission failed"
                );
                let classified = classify_remote_error(&err);
                self.state.message = Some(StatusMessage::error(classified.to_string()));
                self.state.phase = SubmissionPhase::Failed(classified.into());
            }
        }
        &self.state.phase
    }

    /// Runs one full attempt: validation, at most one create call, and the result.
    ///
    /// Dropping the returned future mid-flight abandons the attempt.
    pub async fn submit(&mut self) -> &SubmissionPhase {
        let SubmitOutcome::Started(ticket) = self.begin_submit() else {
            return &self.state.phase;
        };

        let gateway = Arc::clone(&self.gateway);
        {
            let mut guard = AttemptGuard {
                controller: &mut *self,
                controller_id: ticket.controller_id,
                attempt: ticket.attempt,
                armed: true,
            };
            let result = gateway.create_entry(ticket.entry()).await;
            guard.armed = false;
            guard.controller.finish_submit(ticket, result);
        }
        &self.state.phase
    }
}

struct AttemptGuard<'a> {
    controller: &'a mut WaitlistController,
    controller_id: u64,
    attempt: u64,
    armed: bool,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.controller
                .abandon_attempt(self.controller_id, self.attempt);
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
