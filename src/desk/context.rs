use std::sync::Arc;

use tracing::warn;

use super::api::DeskApi;
use super::notify::{Notifier, Toast};
use crate::errors::DeskError;

/// Everything a view needs from its surroundings: the backend and the toast
/// sink. Cloned into each view instead of living in globals.
#[derive(Clone)]
pub struct DeskContext {
    pub api: Arc<dyn DeskApi>,
    pub notifier: Arc<dyn Notifier>,
}

impl DeskContext {
    pub fn new(api: Arc<dyn DeskApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notifier.notify(Toast::success(message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notifier.notify(Toast::info(message));
    }

    /// Log a failed action and raise a single error toast for it.
    pub fn report_failure(&self, action: &str, err: &DeskError) {
        warn!(action, error = %err, "action failed");
        let message = if err.is_validation() {
            err.to_string()
        } else {
            format!("Failed to {}: {}", action, err)
        };
        self.notifier.notify(Toast::error(message));
    }

    /// Pass a result through, toasting the error if there is one.
    pub fn checked<T>(&self, action: &str, result: Result<T, DeskError>) -> Result<T, DeskError> {
        if let Err(ref err) = result {
            self.report_failure(action, err);
        }
        result
    }
}
