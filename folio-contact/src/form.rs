//! Contact form submission lifecycle.
//!
//! `Idle -> Sending -> {Succeeded, Failed} -> Idle`. The resolved states fall
//! back to `Idle` on their own after a short delay, clearing the result
//! message. Every state change is published on a `watch` channel so a
//! renderer can follow along.

use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{ContactFields, Field, FormError, FormRelay, RelayResponse, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Submission {
    #[default]
    Idle,
    Sending,
    Succeeded,
    Failed,
}

/// Texts shown next to the submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMessages {
    pub sending: String,
    pub success: String,
    pub failure: String,
}

impl Default for FormMessages {
    fn default() -> Self {
        Self {
            sending: "Sending....".into(),
            success: "Form Submitted Successfully".into(),
            failure: "Something went wrong. Please try again.".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSettings {
    pub messages: FormMessages,
    /// How long the success message and overlay stay up.
    pub success_reset: Duration,
    /// How long the failure message stays up.
    pub failure_reset: Duration,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            messages: FormMessages::default(),
            success_reset: Duration::from_millis(4000),
            failure_reset: Duration::from_millis(3000),
        }
    }
}

/// Everything a renderer needs to draw the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormSnapshot {
    pub fields: ContactFields,
    pub submission: Submission,
    pub result_message: String,
    /// Success acknowledgment overlay.
    pub overlay_open: bool,
    /// Number of submissions started so far.
    pub attempt: u64,
}

impl FormSnapshot {
    /// The submit control is disabled while a request is in flight.
    pub fn can_submit(&self) -> bool {
        self.submission != Submission::Sending
    }
}

/// Why an attempt ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The relay answered `success: false`.
    Rejected(Option<String>),
    /// The request failed or the answer could not be read.
    Transport(String),
    /// The caller gave up on `submit()` before the relay answered.
    Dropped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Succeeded,
    Failed(FailureReason),
    /// Another submission was already sending; nothing happened.
    InFlight,
    /// The form was stopped before the relay answered; the answer was dropped.
    Abandoned,
}

struct Inner {
    relay: Arc<dyn FormRelay>,
    settings: FormSettings,
    state: watch::Sender<FormSnapshot>,
    cancel: CancellationToken,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// A mounted contact form. Clones share the same state.
///
/// Dropping the last clone unmounts the form the same way
/// [`stop`](Self::stop) does: pending resets never fire.
#[derive(Clone)]
pub struct ContactForm {
    inner: Arc<Inner>,
}

/// Resolves a started attempt as failed if `submit()` is dropped mid-flight,
/// so the form cannot stay in `Sending` forever.
struct PendingAttempt<'a> {
    inner: &'a Arc<Inner>,
    attempt: u64,
    armed: bool,
}

impl PendingAttempt<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingAttempt<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!(attempt = self.attempt, "contact.submit.dropped");
        let outcome = SubmitOutcome::Failed(FailureReason::Dropped);
        if tokio::runtime::Handle::try_current().is_ok() {
            resolve(self.inner, self.attempt, &outcome);
        } else {
            // No runtime to run the reset timer on; go straight back to idle.
            expire(Arc::downgrade(self.inner), self.attempt, true);
        }
    }
}

enum Begin {
    InFlight,
    Invalid(ValidationError),
    Started { fields: ContactFields, attempt: u64 },
}

impl ContactForm {
    pub fn new(relay: Arc<dyn FormRelay>, settings: FormSettings) -> Self {
        let (state, _) = watch::channel(FormSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                relay,
                settings,
                state,
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FormSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> FormSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Plain assignment; no validation happens until [`submit`](Self::submit).
    pub fn update_field(&self, field: Field, value: impl Into<String>) {
        if self.is_stopped() {
            return;
        }
        let value = value.into();
        self.inner.state.send_modify(|s| s.fields.set(field, value));
    }

    /// Post the current fields to the relay and wait for its verdict.
    ///
    /// Invalid fields are rejected up front without touching the submission
    /// state. A call made while another submission is sending returns
    /// [`SubmitOutcome::InFlight`] and changes nothing.
    pub async fn submit(&self) -> Result<SubmitOutcome, FormError> {
        let inner = &self.inner;
        if inner.cancel.is_cancelled() {
            return Err(FormError::Stopped);
        }

        let mut begin = Begin::InFlight;
        inner.state.send_if_modified(|s| {
            if s.submission == Submission::Sending {
                return false;
            }
            if let Err(e) = s.fields.validate() {
                begin = Begin::Invalid(e);
                return false;
            }
            s.attempt += 1;
            s.submission = Submission::Sending;
            s.result_message = inner.settings.messages.sending.clone();
            s.overlay_open = false;
            begin = Begin::Started {
                fields: s.fields.clone(),
                attempt: s.attempt,
            };
            true
        });

        let (fields, attempt) = match begin {
            Begin::InFlight => {
                tracing::debug!("contact.submit.ignored_in_flight");
                return Ok(SubmitOutcome::InFlight);
            }
            Begin::Invalid(e) => {
                tracing::debug!(error = %e, "contact.submit.invalid");
                return Err(FormError::Invalid(e));
            }
            Begin::Started { fields, attempt } => (fields, attempt),
        };

        let submission_id = Uuid::new_v4();
        tracing::info!(%submission_id, attempt, "contact.submit.start");

        let mut pending = PendingAttempt {
            inner,
            attempt,
            armed: true,
        };
        let result = tokio::select! {
            biased;
            _ = inner.cancel.cancelled() => None,
            r = inner.relay.deliver(&fields) => Some(r),
        };
        pending.disarm();
        let Some(result) = result else {
            tracing::debug!(%submission_id, "contact.submit.abandoned");
            return Ok(SubmitOutcome::Abandoned);
        };

        let outcome = match result {
            Ok(RelayResponse { success: true, .. }) => SubmitOutcome::Succeeded,
            Ok(RelayResponse { message, .. }) => SubmitOutcome::Failed(FailureReason::Rejected(message)),
            Err(e) => SubmitOutcome::Failed(FailureReason::Transport(e.to_string())),
        };

        if !resolve(inner, attempt, &outcome) {
            tracing::debug!(%submission_id, "contact.submit.abandoned");
            return Ok(SubmitOutcome::Abandoned);
        }

        match &outcome {
            SubmitOutcome::Succeeded => {
                tracing::info!(%submission_id, attempt, "contact.submit.succeeded");
            }
            SubmitOutcome::Failed(reason) => {
                tracing::warn!(%submission_id, attempt, ?reason, "contact.submit.failed");
            }
            _ => {}
        }
        Ok(outcome)
    }

    /// Unmount: cancel pending resets and ignore any answer still in flight.
    pub fn stop(&self) {
        let inner = &self.inner;
        if inner.cancel.is_cancelled() {
            return;
        }
        inner.state.send_if_modified(|_| {
            inner.cancel.cancel();
            false
        });
        tracing::debug!("contact.form.stop");
    }
}

/// Apply the verdict and arm the reset timer. False if the form was stopped
/// or a newer attempt has begun.
fn resolve(inner: &Arc<Inner>, attempt: u64, outcome: &SubmitOutcome) -> bool {
    let settings = &inner.settings;
    let succeeded = matches!(outcome, SubmitOutcome::Succeeded);

    let applied = inner.state.send_if_modified(|s| {
        if inner.cancel.is_cancelled() || s.attempt != attempt {
            return false;
        }
        if succeeded {
            s.submission = Submission::Succeeded;
            s.result_message = settings.messages.success.clone();
            s.overlay_open = true;
            s.fields.clear();
        } else {
            s.submission = Submission::Failed;
            s.result_message = settings.messages.failure.clone();
        }
        true
    });
    if !applied {
        return false;
    }

    let delay = if succeeded {
        settings.success_reset
    } else {
        settings.failure_reset
    };
    let cancel = inner.cancel.clone();
    let weak = Arc::downgrade(inner);
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {}
            _ = sleep(delay) => expire(weak, attempt, false),
        }
    });
    true
}

/// Clear the result of `attempt` unless a newer attempt has begun since.
/// With `from_sending`, an attempt still marked `Sending` is cleared too.
fn expire(weak: Weak<Inner>, attempt: u64, from_sending: bool) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    inner.state.send_if_modified(|s| {
        let clearable = match s.submission {
            Submission::Succeeded | Submission::Failed => true,
            Submission::Sending => from_sending,
            Submission::Idle => false,
        };
        if inner.cancel.is_cancelled() || s.attempt != attempt || !clearable {
            return false;
        }
        s.submission = Submission::Idle;
        s.result_message.clear();
        s.overlay_open = false;
        true
    });
    tracing::debug!(attempt, "contact.result.expired");
}
