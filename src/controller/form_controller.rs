use crate::domain::{FormData, FormField, NewSubmission, SubmissionRecord};
use crate::error::StoreError;
use crate::store::SubmissionStore;
use crate::validation::{self, ValidationError};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Where the form is in its submission lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
    Success,
    Error(String),
}

/// Lifecycle of the debounced email-existence probe. Runs independently of
/// the submission phase, superseded on every email keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmailCheckState {
    #[default]
    Unchecked,
    Debouncing,
    Checking,
    Exists,
    Available,
}

/// What a `submit` call resolved to. The same information is observable
/// through the controller's state; nothing here ever surfaces as a panic
/// or a raw transport error.
#[derive(Debug)]
pub enum SubmitOutcome {
    Created(SubmissionRecord),
    /// Validation failed; no network call was made.
    Rejected(Vec<ValidationError>),
    /// The email is already on the waitlist, whether known before the
    /// call or reported by the store.
    DuplicateEmail,
    /// Another submission is already in flight; this call did nothing.
    AlreadySubmitting,
    Failed(StoreError),
}

/// Timing knobs for a controller instance.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Validate a field the moment it changes instead of debouncing a
    /// full-form validation.
    pub validate_on_change: bool,
    pub validation_debounce: Duration,
    pub email_check_debounce: Duration,
    /// How long a successful submission stays on screen before the form
    /// returns to its pristine state. `None` disables the auto-reset.
    pub auto_reset_after: Option<Duration>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            validate_on_change: false,
            validation_debounce: Duration::from_millis(300),
            email_check_debounce: Duration::from_millis(500),
            auto_reset_after: Some(Duration::from_millis(5000)),
        }
    }
}

#[derive(Default)]
struct Timers {
    validation: Option<JoinHandle<()>>,
    email_check: Option<JoinHandle<()>>,
    auto_reset: Option<JoinHandle<()>>,
}

impl Timers {
    fn cancel_all(&mut self) {
        for handle in [
            self.validation.take(),
            self.email_check.take(),
            self.auto_reset.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        // A disposed form must not be poked by a straggling timer.
        self.cancel_all();
    }
}

#[derive(Default)]
struct FormState {
    data: FormData,
    errors: BTreeMap<FormField, ValidationError>,
    touched: BTreeSet<FormField>,
    dirty: BTreeSet<FormField>,
    phase: FormPhase,
    email_check: EmailCheckState,
    /// Monotonic counter; a probe commits its result only if the epoch it
    /// was armed with is still current.
    email_epoch: u64,
    timers: Timers,
}

/// Drives a single signup form: field updates, debounced validation, the
/// email-existence probe, submission and reset.
///
/// Cloning yields another handle onto the same form. Background timers
/// hold weak references to the shared state, so they die with the last
/// handle instead of keeping it alive.
#[derive(Clone)]
pub struct FormController {
    state: Arc<Mutex<FormState>>,
    store: Arc<dyn SubmissionStore>,
    config: ControllerConfig,
    source: String,
}

impl FormController {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        config: ControllerConfig,
        source: impl Into<String>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(FormState::default())),
            store,
            config,
            source: source.into(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().expect("form state lock poisoned")
    }

    /// Record a keystroke. Marks the field dirty and touched, triggers
    /// immediate or debounced validation per configuration, and re-arms
    /// the email-existence probe when the email changed.
    pub fn update_field(&self, field: FormField, value: impl Into<String>) {
        let mut state = self.lock_state();
        state.data.set_text(field, value.into());
        state.dirty.insert(field);
        state.touched.insert(field);

        if self.config.validate_on_change {
            Self::apply_field_validation(&mut state, field);
        } else {
            self.arm_validation_debounce(&mut state);
        }
        if field == FormField::Email {
            self.arm_email_check(&mut state);
        }
    }

    /// Record the newsletter checkbox. Never validated, so no timer is
    /// armed.
    pub fn set_subscribed(&self, subscribed: bool) {
        let mut state = self.lock_state();
        state.data.subscribed_newsletter = subscribed;
        state.dirty.insert(FormField::SubscribedNewsletter);
        state.touched.insert(FormField::SubscribedNewsletter);
    }

    /// Leaving a field validates it immediately, regardless of any pending
    /// debounce.
    pub fn blur_field(&self, field: FormField) {
        let mut state = self.lock_state();
        state.touched.insert(field);
        Self::apply_field_validation(&mut state, field);
    }

    /// Attempt the submission. See `SubmitOutcome` for the possible
    /// resolutions; the guard at the top makes a second call while one is
    /// in flight a no-op.
    pub async fn submit(&self) -> SubmitOutcome {
        let submission = {
            let mut state = self.lock_state();
            if state.phase == FormPhase::Submitting {
                return SubmitOutcome::AlreadySubmitting;
            }

            let outcome = validation::validate_and_sanitize(&state.data);
            if !outcome.is_valid {
                // Surface every failure, including on fields never
                // visited.
                state.touched.extend(FormField::TEXT_FIELDS);
                state.errors = outcome
                    .errors
                    .iter()
                    .cloned()
                    .map(|error| (error.field, error))
                    .collect();
                return SubmitOutcome::Rejected(outcome.errors);
            }
            state.errors.clear();

            if state.email_check == EmailCheckState::Exists {
                state.phase = FormPhase::Error(StoreError::DuplicateEmail.to_string());
                return SubmitOutcome::DuplicateEmail;
            }

            state.phase = FormPhase::Submitting;
            NewSubmission::from_form(outcome.data, self.source.clone())
        };

        tracing::info!(
            email = %submission.email,
            source = %submission.source,
            "Submitting waitlist signup"
        );
        let result = self.store.submit(&submission).await;

        let mut state = self.lock_state();
        match result {
            Ok(record) => {
                state.phase = FormPhase::Success;
                self.arm_auto_reset(&mut state);
                SubmitOutcome::Created(record)
            }
            Err(StoreError::DuplicateEmail) => {
                // An earlier probe may have said "available"; the store's
                // answer wins.
                state.email_check = EmailCheckState::Exists;
                state.phase = FormPhase::Error(StoreError::DuplicateEmail.to_string());
                SubmitOutcome::DuplicateEmail
            }
            Err(error) => {
                state.phase = FormPhase::Error(error.to_string());
                SubmitOutcome::Failed(error)
            }
        }
    }

    /// Return the form to its pristine state, cancelling every pending
    /// timer.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        Self::clear(&mut state);
    }

    // Read side, consumed by the presentation layer.

    pub fn field_value(&self, field: FormField) -> Option<String> {
        self.lock_state().data.text(field).map(str::to_owned)
    }

    pub fn subscribed(&self) -> bool {
        self.lock_state().data.subscribed_newsletter
    }

    pub fn form_data(&self) -> FormData {
        self.lock_state().data.clone()
    }

    /// The field's current error, shown only once the field has been
    /// touched (or a submit attempt touched everything).
    pub fn error_for(&self, field: FormField) -> Option<ValidationError> {
        let state = self.lock_state();
        if state.touched.contains(&field) {
            state.errors.get(&field).cloned()
        } else {
            None
        }
    }

    pub fn is_valid(&self) -> bool {
        validation::validate_and_sanitize(&self.lock_state().data).is_valid
    }

    pub fn is_dirty(&self) -> bool {
        !self.lock_state().dirty.is_empty()
    }

    pub fn phase(&self) -> FormPhase {
        self.lock_state().phase.clone()
    }

    pub fn email_check(&self) -> EmailCheckState {
        self.lock_state().email_check
    }

    // Internals.

    fn apply_field_validation(state: &mut FormState, field: FormField) {
        match validation::validate_field(field, state.data.text(field)) {
            Some(error) => {
                state.errors.insert(field, error);
            }
            None => {
                state.errors.remove(&field);
            }
        }
    }

    fn apply_form_validation(state: &mut FormState) {
        let result = validation::validate_form(&state.data);
        state.errors = result
            .errors
            .into_iter()
            .map(|error| (error.field, error))
            .collect();
    }

    /// (Re)arm the debounced full-form validation, superseding a pending
    /// one. The timer reads the form at fire time, so it always validates
    /// the latest values.
    fn arm_validation_debounce(&self, state: &mut FormState) {
        if let Some(handle) = state.timers.validation.take() {
            handle.abort();
        }
        let weak = Arc::downgrade(&self.state);
        let debounce = self.config.validation_debounce;
        state.timers.validation = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if let Some(shared) = weak.upgrade() {
                let mut state = shared.lock().expect("form state lock poisoned");
                Self::apply_form_validation(&mut state);
            }
        }));
    }

    /// (Re)arm the debounced email-existence probe. Superseding bumps the
    /// epoch, so a stale in-flight probe can never commit its answer over
    /// a newer value.
    fn arm_email_check(&self, state: &mut FormState) {
        state.email_epoch += 1;
        let epoch = state.email_epoch;
        if let Some(handle) = state.timers.email_check.take() {
            handle.abort();
        }

        let email = state.data.email.trim().to_lowercase();
        if email.is_empty() {
            state.email_check = EmailCheckState::Unchecked;
            return;
        }
        state.email_check = EmailCheckState::Debouncing;

        let weak = Arc::downgrade(&self.state);
        let store = Arc::clone(&self.store);
        let debounce = self.config.email_check_debounce;
        state.timers.email_check = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            {
                // A newer keystroke may have re-armed the probe while we
                // slept.
                let Some(shared) = weak.upgrade() else { return };
                let mut state = shared.lock().expect("form state lock poisoned");
                if state.email_epoch != epoch {
                    return;
                }
                state.email_check = EmailCheckState::Checking;
            }

            let outcome = store.email_exists(&email).await;

            let Some(shared) = weak.upgrade() else { return };
            let mut state = shared.lock().expect("form state lock poisoned");
            // Last write wins: discard the response if the value moved on
            // while the probe was in flight.
            if state.email_epoch != epoch || state.data.email.trim().to_lowercase() != email {
                return;
            }
            state.email_check = match outcome {
                Ok(true) => EmailCheckState::Exists,
                Ok(false) => EmailCheckState::Available,
                Err(error) => {
                    // The probe is advisory; the store enforces uniqueness
                    // on submit either way.
                    tracing::warn!(error.message = %error, "Email existence probe failed");
                    EmailCheckState::Unchecked
                }
            };
        }));
    }

    fn arm_auto_reset(&self, state: &mut FormState) {
        let Some(delay) = self.config.auto_reset_after else {
            return;
        };
        if let Some(handle) = state.timers.auto_reset.take() {
            handle.abort();
        }
        let weak = Arc::downgrade(&self.state);
        state.timers.auto_reset = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(shared) = weak.upgrade() else { return };
            let mut state = shared.lock().expect("form state lock poisoned");
            // A reset or a fresh submission in the meantime wins.
            if state.phase == FormPhase::Success {
                Self::clear(&mut state);
            }
        }));
    }

    fn clear(state: &mut FormState) {
        state.timers.cancel_all();
        state.data = FormData::default();
        state.errors.clear();
        state.touched.clear();
        state.dirty.clear();
        state.phase = FormPhase::Idle;
        state.email_check = EmailCheckState::Unchecked;
        // Orphan any probe that was already past its epoch check.
        state.email_epoch += 1;
    }
}
