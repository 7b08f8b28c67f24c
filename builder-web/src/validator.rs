//! Availability check as a debounced, latest-wins field validator.

use std::sync::Arc;
use std::time::Duration;

use builder_api::AvailabilityChecker;
use builder_core::ValidationError;

use crate::form::SharedField;
use crate::tasks::{ScopedTaskSet, TaskHandle};

#[derive(Clone)]
pub struct AsyncValidator {
    checker: Arc<dyn AvailabilityChecker>,
    debounce: Duration,
}

impl AsyncValidator {
    pub fn new(checker: Arc<dyn AvailabilityChecker>, debounce: Duration) -> Self {
        Self { checker, debounce }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// One availability check mapped to a field-level result. Checker
    /// failures never escape: they become [`ValidationError::CheckUnavailable`].
    pub async fn check(&self, name: &str) -> Result<(), ValidationError> {
        match self.checker.check_availability(name).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(ValidationError::NameTaken),
            Err(err) => {
                tracing::warn!(origin = name, error = %err, "availability check unavailable");
                Err(ValidationError::CheckUnavailable)
            }
        }
    }

    /// Schedule the check for `generation` of `field` on `tasks`.
    ///
    /// The task waits out the debounce window first; if the field moved on
    /// meanwhile, it exits without calling the checker. After the checker
    /// answers, the result is committed only if `generation` is still current.
    pub fn schedule(
        &self,
        tasks: &ScopedTaskSet,
        field: SharedField,
        generation: u64,
    ) -> Option<TaskHandle> {
        let validator = self.clone();
        tasks.spawn_after(self.debounce, async move {
            let Some(name) =
                field.read(|f| f.is_current(generation).then(|| f.value().to_string()))
            else {
                tracing::debug!(generation, "edit superseded before check started");
                return;
            };

            let outcome = validator.check(&name).await;
            let applied = field.update(|f| f.resolve(generation, outcome));
            if applied {
                tracing::debug!(origin = %name, generation, "availability result applied");
            } else {
                tracing::debug!(origin = %name, generation, "discarded stale availability result");
            }
        })
    }
}
