//! User-facing notices for failed backend calls.

use std::sync::Arc;

use procura_domain::Notice;

use crate::error::ApiError;
use crate::ports::Notifier;

/// Turns API failures into short-lived notices.
pub struct ErrorHandler {
    notifier: Arc<dyn Notifier>,
}

impl ErrorHandler {
    /// Creates a handler that shows notices through `notifier`.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Picks the notice for `error`.
    ///
    /// Category messages win over the backend's own message, which wins
    /// over `fallback`. Authentication failures yield no notice; they are
    /// handled by the refresh and login flow.
    #[must_use]
    pub fn notice_for(error: &ApiError, fallback: Option<&str>) -> Option<Notice> {
        match error {
            ApiError::Unauthorized => None,
            ApiError::Transport(_) => Notice::for_status(0, None),
            ApiError::Status { status, message } => {
                Notice::for_status(*status, message.as_deref().or(fallback))
            }
            ApiError::Decode(_) | ApiError::Domain(_) => {
                Some(Notice::error(fallback.unwrap_or(Notice::GENERIC)))
            }
        }
    }

    /// Logs `error` and shows the matching notice, if any.
    pub fn handle(&self, error: &ApiError, fallback: Option<&str>) {
        tracing::error!(%error, "Error occurred");
        if let Some(notice) = Self::notice_for(error, fallback) {
            self.notifier.notify(notice);
        }
    }

    /// Shows an error notice.
    pub fn show_error(&self, message: impl Into<String>) {
        self.notifier.notify(Notice::error(message));
    }

    /// Shows a success notice.
    pub fn show_success(&self, message: impl Into<String>) {
        self.notifier.notify(Notice::success(message));
    }

    /// Shows an info notice.
    pub fn show_info(&self, message: impl Into<String>) {
        self.notifier.notify(Notice::info(message));
    }
}
