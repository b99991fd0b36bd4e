//! Terminal adapters for the browser-facing ports.

use std::sync::{Mutex, PoisonError};

use procura_application::ports::{LoginRedirect, Notifier};
use procura_domain::{Notice, NoticeKind};
use url::Url;

/// Prints provider URLs for the user to open in a browser.
#[derive(Debug, Default)]
pub struct TerminalRedirect {
    last: Mutex<Option<Url>>,
}

impl TerminalRedirect {
    /// Creates the redirect.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent URL shown.
    pub fn last_url(&self) -> Option<Url> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LoginRedirect for TerminalRedirect {
    fn redirect(&self, url: &Url) {
        println!("Open this URL in your browser:\n  {url}");
        if url.path().ends_with("/auth") {
            println!("Then paste the address you were sent back to here.");
        }
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(url.clone());
    }
}

/// Writes notices to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl StderrNotifier {
    /// One-line rendering of `notice`.
    #[must_use]
    pub fn render(notice: &Notice) -> String {
        let label = match notice.kind {
            NoticeKind::Error => "error",
            NoticeKind::Success => "ok",
            NoticeKind::Info => "info",
        };
        format!("[{label}] {}", notice.message)
    }
}

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("{}", Self::render(&notice));
    }
}
