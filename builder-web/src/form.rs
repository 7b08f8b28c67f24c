//! The origin name field.
//!
//! Every edit bumps the field's generation. A remote check is started for a
//! specific generation and may only commit while that generation is still
//! current, so a slow answer for an old value never overwrites a newer one.

use std::fmt;
use std::sync::{Arc, Mutex};

use builder_core::{OriginName, ValidationError};
use tokio::sync::watch;

use crate::lock;

/// Validity of the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldStatus {
    /// Never validated.
    #[default]
    Unknown,
    /// Local checks passed; waiting on the availability check.
    Checking,
    Available,
    Taken,
    /// Failed a local check or the availability check could not be made.
    Invalid,
}

impl fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldStatus::Unknown => write!(f, "unknown"),
            FieldStatus::Checking => write!(f, "checking"),
            FieldStatus::Available => write!(f, "available"),
            FieldStatus::Taken => write!(f, "taken"),
            FieldStatus::Invalid => write!(f, "invalid"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameField {
    value: String,
    status: FieldStatus,
    dirty: bool,
    error: Option<ValidationError>,
    generation: u64,
    detached: bool,
}

impl NameField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn status(&self) -> FieldStatus {
        self.status
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_valid(&self) -> bool {
        self.status == FieldStatus::Available
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// True while `generation` is the latest edit and the field is mounted.
    pub fn is_current(&self, generation: u64) -> bool {
        !self.detached && generation == self.generation
    }

    /// Apply an edit. Returns the generation a remote check must carry, or
    /// `None` when a local check already failed (including a cleared field,
    /// which abandons any outstanding check).
    pub fn set_value(&mut self, value: &str) -> Option<u64> {
        if self.detached {
            return None;
        }
        self.value = value.to_string();
        self.dirty = true;
        self.generation += 1;
        self.run_local_checks()
    }

    pub fn mark_as_dirty(&mut self) {
        if !self.detached {
            self.dirty = true;
        }
    }

    /// Forced validation pass: marks the field dirty and, if the current
    /// value was never validated, runs the local checks. Returns a
    /// generation when a remote check should follow.
    pub fn force_validation(&mut self) -> Option<u64> {
        if self.detached {
            return None;
        }
        self.dirty = true;
        if self.status != FieldStatus::Unknown {
            return None;
        }
        self.generation += 1;
        self.run_local_checks()
    }

    fn run_local_checks(&mut self) -> Option<u64> {
        match OriginName::validate(&self.value) {
            Ok(()) => {
                self.status = FieldStatus::Checking;
                self.error = None;
                Some(self.generation)
            }
            Err(err) => {
                self.status = FieldStatus::Invalid;
                self.error = Some(err);
                None
            }
        }
    }

    /// Commit the outcome of the remote check for `generation`. Returns
    /// `false`, leaving the field untouched, when the result is stale.
    pub fn resolve(&mut self, generation: u64, outcome: Result<(), ValidationError>) -> bool {
        if !self.is_current(generation) || self.status != FieldStatus::Checking {
            return false;
        }
        match outcome {
            Ok(()) => {
                self.status = FieldStatus::Available;
                self.error = None;
            }
            Err(ValidationError::NameTaken) => {
                self.status = FieldStatus::Taken;
                self.error = Some(ValidationError::NameTaken);
            }
            Err(err) => {
                self.status = FieldStatus::Invalid;
                self.error = Some(err);
            }
        }
        true
    }

    /// The server refused the current value as taken at submission time.
    pub fn mark_taken(&mut self) {
        if self.detached {
            return;
        }
        self.dirty = true;
        self.status = FieldStatus::Taken;
        self.error = Some(ValidationError::NameTaken);
    }

    /// Teardown: no further edits or commits are accepted.
    pub fn detach(&mut self) {
        self.detached = true;
        self.generation += 1;
        if self.status == FieldStatus::Checking {
            self.status = FieldStatus::Unknown;
        }
    }
}

/// A [`NameField`] shared between a component and its scoped tasks, with a
/// revision channel that ticks after every mutation.
#[derive(Clone)]
pub struct SharedField {
    field: Arc<Mutex<NameField>>,
    revisions: Arc<watch::Sender<u64>>,
}

impl Default for SharedField {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedField {
    pub fn new() -> Self {
        let (revisions, _) = watch::channel(0);
        Self {
            field: Arc::new(Mutex::new(NameField::new())),
            revisions: Arc::new(revisions),
        }
    }

    /// Mutate the field under its lock, then publish a new revision.
    pub fn update<R>(&self, f: impl FnOnce(&mut NameField) -> R) -> R {
        let result = f(&mut lock(&self.field));
        self.revisions.send_modify(|rev| *rev += 1);
        result
    }

    /// Read under the lock without publishing a revision.
    pub fn read<R>(&self, f: impl FnOnce(&NameField) -> R) -> R {
        f(&lock(&self.field))
    }

    pub fn snapshot(&self) -> NameField {
        self.read(NameField::clone)
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revisions.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_passing_local_checks_starts_checking() {
        let mut field = NameField::new();
        let generation = field.set_value("core").expect("check scheduled");
        assert_eq!(field.status(), FieldStatus::Checking);
        assert!(field.is_dirty());
        assert!(field.resolve(generation, Ok(())));
        assert!(field.is_valid());
    }

    #[test]
    fn stale_result_is_discarded() {
        let mut field = NameField::new();
        let old = field.set_value("cor").expect("first");
        let new = field.set_value("core").expect("second");

        assert!(!field.resolve(old, Ok(())));
        assert_eq!(field.status(), FieldStatus::Checking);

        assert!(field.resolve(new, Err(ValidationError::NameTaken)));
        assert_eq!(field.status(), FieldStatus::Taken);
        assert_eq!(field.error(), Some(&ValidationError::NameTaken));
    }

    #[test]
    fn clearing_abandons_outstanding_check() {
        let mut field = NameField::new();
        let generation = field.set_value("core").expect("check");
        assert_eq!(field.set_value(""), None);
        assert_eq!(field.error(), Some(&ValidationError::Required));
        assert!(!field.resolve(generation, Ok(())));
        assert_eq!(field.status(), FieldStatus::Invalid);
    }

    #[test]
    fn check_unavailable_is_distinct_from_taken() {
        let mut field = NameField::new();
        let generation = field.set_value("core").expect("check");
        assert!(field.resolve(generation, Err(ValidationError::CheckUnavailable)));
        assert_eq!(field.status(), FieldStatus::Invalid);
        assert_eq!(field.error(), Some(&ValidationError::CheckUnavailable));
    }

    #[test]
    fn forced_validation_on_untouched_field_shows_required() {
        let mut field = NameField::new();
        assert_eq!(field.force_validation(), None);
        assert!(field.is_dirty());
        assert_eq!(field.status(), FieldStatus::Invalid);
        assert_eq!(field.error(), Some(&ValidationError::Required));
    }

    #[test]
    fn forced_validation_leaves_in_flight_check_alone() {
        let mut field = NameField::new();
        let generation = field.set_value("core").expect("check");
        assert_eq!(field.force_validation(), None);
        assert!(field.resolve(generation, Ok(())));
    }

    #[test]
    fn taken_at_submission_invalidates_an_available_value() {
        let mut field = NameField::new();
        let generation = field.set_value("core").expect("check");
        assert!(field.resolve(generation, Ok(())));

        field.mark_taken();
        assert!(!field.is_valid());
        assert_eq!(field.status(), FieldStatus::Taken);
        assert_eq!(field.error(), Some(&ValidationError::NameTaken));
    }

    #[test]
    fn detached_field_rejects_everything() {
        let mut field = NameField::new();
        let generation = field.set_value("core").expect("check");
        field.detach();
        assert!(!field.resolve(generation, Ok(())));
        assert_eq!(field.set_value("other"), None);
        assert_eq!(field.value(), "core");
        assert_eq!(field.status(), FieldStatus::Unknown);
    }

    #[tokio::test]
    async fn shared_field_publishes_revisions() {
        let shared = SharedField::new();
        let mut revisions = shared.subscribe();
        shared.update(|f| f.set_value("core"));
        revisions.changed().await.expect("revision");
        assert_eq!(shared.snapshot().value(), "core");
    }
}
