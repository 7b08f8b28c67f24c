//! Origin creation page controller.
//!
//! ```text
//! Idle → Editing → Checking ⇄ Editing → Valid → Submitting → Succeeded
//!                                                          ↘ Failed
//! ```
//!
//! `Idle`..`Valid` are derived from the name field; `Submitting`,
//! `Succeeded` and `Failed` are tracked by the page itself. Submission is
//! only accepted from `Valid` (or from `Failed`, to retry, while the name is
//! still valid). A submit during `Checking` is refused rather than queued.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use builder_api::{AvailabilityChecker, OriginApi};
use builder_core::{AppStore, BuilderConfig, Origin, SubmissionError, ORIGIN_NAME_MAX_LEN};

use crate::actions::{self, CreateOrigin};
use crate::error::WorkflowError;
use crate::form::{FieldStatus, NameField, SharedField};
use crate::lock;
use crate::router::{Router, SignInGuard};
use crate::tasks::ScopedTaskSet;
use crate::validator::AsyncValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub check_debounce: Duration,
    pub first_origin_nudge: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self::from(&BuilderConfig::default())
    }
}

impl From<&BuilderConfig> for WorkflowConfig {
    fn from(config: &BuilderConfig) -> Self {
        Self {
            check_debounce: config.check_debounce(),
            first_origin_nudge: config.first_origin_nudge(),
        }
    }
}

/// External collaborators the page is wired to.
#[derive(Clone)]
pub struct Collaborators {
    pub checker: Arc<dyn AvailabilityChecker>,
    pub api: Arc<dyn OriginApi>,
    pub router: Arc<dyn Router>,
    pub guard: Arc<dyn SignInGuard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Editing,
    Checking,
    Valid,
    Submitting,
    Succeeded,
    Failed(SubmissionError),
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Idle => write!(f, "idle"),
            WorkflowState::Editing => write!(f, "editing"),
            WorkflowState::Checking => write!(f, "checking"),
            WorkflowState::Valid => write!(f, "valid"),
            WorkflowState::Submitting => write!(f, "submitting"),
            WorkflowState::Succeeded => write!(f, "succeeded"),
            WorkflowState::Failed(err) => write!(f, "failed ({err})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Form,
    Submitting,
    Succeeded,
    Failed(SubmissionError),
}

fn derive_state(phase: &Phase, field: &NameField) -> WorkflowState {
    match phase {
        Phase::Submitting => WorkflowState::Submitting,
        Phase::Succeeded => WorkflowState::Succeeded,
        Phase::Failed(err) => WorkflowState::Failed(err.clone()),
        Phase::Form => match field.status() {
            FieldStatus::Unknown if !field.is_dirty() => WorkflowState::Idle,
            FieldStatus::Checking => WorkflowState::Checking,
            FieldStatus::Available => WorkflowState::Valid,
            _ => WorkflowState::Editing,
        },
    }
}

/// Route shown after an origin is created.
pub fn origin_route(name: &str) -> String {
    format!("/origins/{name}")
}

pub struct OriginCreatePage {
    store: AppStore,
    api: Arc<dyn OriginApi>,
    router: Arc<dyn Router>,
    validator: AsyncValidator,
    field: SharedField,
    phase: Mutex<Phase>,
    tasks: ScopedTaskSet,
    mounted: AtomicBool,
}

impl OriginCreatePage {
    pub const MAX_LENGTH: usize = ORIGIN_NAME_MAX_LEN;

    /// Initialize the page.
    ///
    /// The sign-in guard runs first; without a session the guard redirects
    /// and nothing else happens. For a user owning no origins, a one-shot
    /// nudge is scheduled that marks the name field dirty after
    /// `config.first_origin_nudge`.
    ///
    /// The nudge and the availability checks run on the current tokio
    /// runtime. Mounted outside one, the page still accepts edits but no
    /// deferred work runs.
    pub fn mount(
        store: AppStore,
        collaborators: Collaborators,
        config: WorkflowConfig,
    ) -> Result<Self, WorkflowError> {
        if !collaborators.guard.require_sign_in(&store.get_state()) {
            return Err(WorkflowError::NotSignedIn);
        }

        let page = Self {
            validator: AsyncValidator::new(collaborators.checker, config.check_debounce),
            api: collaborators.api,
            router: collaborators.router,
            store,
            field: SharedField::new(),
            phase: Mutex::new(Phase::Form),
            tasks: ScopedTaskSet::new(),
            mounted: AtomicBool::new(true),
        };

        if page.is_first_origin() {
            page.schedule_first_origin_nudge(config.first_origin_nudge);
        }
        tracing::debug!(username = ?page.username(), "origin creation page mounted");
        Ok(page)
    }

    fn schedule_first_origin_nudge(&self, delay: Duration) {
        let field = self.field.clone();
        let validator = self.validator.clone();
        let tasks = self.tasks.clone();
        self.tasks.spawn_after(delay, async move {
            if let Some(generation) = field.update(NameField::force_validation) {
                validator.schedule(&tasks, field.clone(), generation);
            }
            tracing::debug!("first-origin nudge: name field marked dirty");
        });
    }

    // -- Store-derived views ------------------------------------------------

    pub fn creating(&self) -> bool {
        self.store.get_state().origins.ui.creating
    }

    /// True iff the signed-in user currently owns zero origins.
    pub fn is_first_origin(&self) -> bool {
        self.store.get_state().owns_no_origins()
    }

    pub fn username(&self) -> Option<String> {
        self.store.get_state().username().map(str::to_string)
    }

    /// Last submission error recorded in the store.
    pub fn error(&self) -> Option<SubmissionError> {
        self.store.get_state().origins.ui.last_error.clone()
    }

    // -- Page state ---------------------------------------------------------

    pub fn field(&self) -> NameField {
        self.field.snapshot()
    }

    pub fn state(&self) -> WorkflowState {
        let phase = lock(&self.phase);
        self.field.read(|field| derive_state(&phase, field))
    }

    pub fn can_submit(&self) -> bool {
        self.is_mounted()
            && matches!(
                self.state(),
                WorkflowState::Valid | WorkflowState::Failed(_)
            )
            && self.field.read(NameField::is_valid)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Wait until no availability check is outstanding.
    pub async fn settle(&self) -> WorkflowState {
        let mut revisions = self.field.subscribe();
        loop {
            let state = self.state();
            if state != WorkflowState::Checking || !self.is_mounted() {
                return state;
            }
            if revisions.changed().await.is_err() {
                return self.state();
            }
        }
    }

    // -- User events --------------------------------------------------------

    /// The user edited the name field.
    pub fn input(&self, value: &str) {
        if !self.is_mounted() {
            return;
        }
        {
            let mut phase = lock(&self.phase);
            if matches!(*phase, Phase::Submitting | Phase::Succeeded) {
                tracing::debug!(phase = ?*phase, "ignoring edit");
                return;
            }
            // Editing after a failed submission starts over.
            *phase = Phase::Form;
        }
        if let Some(generation) = self.field.update(|f| f.set_value(value)) {
            self.validator
                .schedule(&self.tasks, self.field.clone(), generation);
        }
    }

    /// The user confirmed creation.
    pub async fn submit(&self) -> Result<Origin, WorkflowError> {
        if !self.is_mounted() {
            return Err(WorkflowError::TornDown);
        }

        let name = {
            let mut phase = lock(&self.phase);
            let field = self.field.snapshot();
            let ready = matches!(*phase, Phase::Form | Phase::Failed(_)) && field.is_valid();
            if !ready {
                return Err(WorkflowError::NotReady(derive_state(&phase, &field)));
            }
            *phase = Phase::Submitting;
            field.value().to_string()
        };
        let mut submitting = SubmittingGuard {
            phase: &self.phase,
            armed: true,
        };

        let state = self.store.get_state();
        let Some(auth_token) = state.auth_token().map(str::to_string) else {
            return Err(WorkflowError::NotSignedIn);
        };
        let request = CreateOrigin {
            name,
            auth_token,
            is_first_origin: state.owns_no_origins(),
        };

        let result = actions::create_origin(&self.store, self.api.as_ref(), request).await;
        if !self.is_mounted() {
            submitting.armed = false;
            return result.map_err(WorkflowError::from);
        }

        let next = match &result {
            Ok(_) => Phase::Succeeded,
            Err(err) => Phase::Failed(err.clone()),
        };
        {
            let mut phase = lock(&self.phase);
            *phase = next;
            // A 409 means the name went stale between the check and the
            // submit; it must not stay submittable.
            if matches!(result, Err(SubmissionError::NameTaken)) {
                self.field.update(NameField::mark_taken);
            }
        }
        submitting.armed = false;

        let origin = result?;
        self.router.navigate(&origin_route(origin.name.as_str()));
        Ok(origin)
    }

    /// Cancel every deferred task and stop accepting commits.
    pub fn teardown(&self) {
        if !self.mounted.swap(false, Ordering::SeqCst) {
            return;
        }
        self.field.update(NameField::detach);
        self.tasks.drain();
        tracing::debug!("origin creation page torn down");
    }
}

impl Drop for OriginCreatePage {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Returns the page to `Form` if a submission ends without recording an
/// outcome (early return or the submit future being dropped).
struct SubmittingGuard<'a> {
    phase: &'a Mutex<Phase>,
    armed: bool,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut phase = lock(self.phase);
            if *phase == Phase::Submitting {
                *phase = Phase::Form;
            }
        }
    }
}
