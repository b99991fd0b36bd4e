//! Short-lived, dismissible user notices.

use std::time::Duration;

use serde::Serialize;

/// Severity of a notice; each kind has its own display time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// A failed operation.
    Error,
    /// A completed operation.
    Success,
    /// Neutral information.
    Info,
}

impl NoticeKind {
    /// How long the notice stays visible.
    #[must_use]
    pub const fn display_for(self) -> Duration {
        match self {
            Self::Error => Duration::from_millis(5000),
            Self::Success => Duration::from_millis(3000),
            Self::Info => Duration::from_millis(4000),
        }
    }
}

/// A message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// Message for 403 responses.
    pub const PERMISSION_DENIED: &'static str =
        "You do not have permission to perform this action.";
    /// Message for 404 responses.
    pub const NOT_FOUND: &'static str = "The requested resource was not found.";
    /// Message when the backend could not be reached at all.
    pub const NETWORK: &'static str = "Network error. Please check your internet connection.";
    /// Message for 5xx responses.
    pub const SERVER: &'static str = "Server error. Please try again later.";
    /// Fallback message.
    pub const GENERIC: &'static str = "An error occurred. Please try again.";

    /// Creates an error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    /// Creates a success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    /// Creates an info notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    /// Picks the error notice for a failed backend call.
    ///
    /// `status` is 0 when no response was received. Returns `None` for 401:
    /// authentication failures are recovered by redirecting to login, not
    /// by telling the user.
    #[must_use]
    pub fn for_status(status: u16, api_message: Option<&str>) -> Option<Self> {
        let message = match status {
            401 => return None,
            403 => Self::PERMISSION_DENIED,
            404 => Self::NOT_FOUND,
            0 => Self::NETWORK,
            s if s >= 500 => Self::SERVER,
            _ => api_message.unwrap_or(Self::GENERIC),
        };
        Some(Self::error(message))
    }

    /// How long this notice stays visible.
    #[must_use]
    pub const fn display_for(&self) -> Duration {
        self.kind.display_for()
    }
}
