//! Purchase-order email threads.

use procura_domain::ApiRequest;
use procura_domain::workflow::{EmailThread, EmailThreadNode, ProcessingState, ThreadStats};

use super::client::ApiClient;
use crate::error::ApiResult;

const EMAILS: &str = "/pro/api/emails";

/// Look-back window used when none is given.
pub const DEFAULT_RECENT_DAYS: u32 = 7;

/// Read access to the mail pipeline's stored threads.
#[derive(Debug, Clone)]
pub struct EmailService {
    client: ApiClient,
}

impl EmailService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn po_path(po_number: &str, suffix: &str) -> String {
        format!("{EMAILS}/po/{}{suffix}", urlencoding::encode(po_number))
    }

    /// Messages for a purchase order, flat.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn by_po(&self, po_number: &str) -> ApiResult<Vec<EmailThread>> {
        self.client
            .json(ApiRequest::get(Self::po_path(po_number, "")))
            .await
    }

    /// Messages for a purchase order as a reply tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn hierarchy(&self, po_number: &str) -> ApiResult<Vec<EmailThreadNode>> {
        self.client
            .json(ApiRequest::get(Self::po_path(po_number, "/hierarchy")))
            .await
    }

    /// Statistics for a purchase order's thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn thread_stats(&self, po_number: &str) -> ApiResult<ThreadStats> {
        self.client
            .json(ApiRequest::get(Self::po_path(po_number, "/stats")))
            .await
    }

    /// Messages sent by `email`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn by_sender(&self, email: &str) -> ApiResult<Vec<EmailThread>> {
        let path = format!("{EMAILS}/sender/{}", urlencoding::encode(email));
        self.client.json(ApiRequest::get(path)).await
    }

    /// Messages classified as procurement.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn procurement(&self) -> ApiResult<Vec<EmailThread>> {
        self.client
            .json(ApiRequest::get(format!("{EMAILS}/procurement")))
            .await
    }

    /// Messages in one pipeline state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn by_state(&self, state: ProcessingState) -> ApiResult<Vec<EmailThread>> {
        let path = format!("{EMAILS}/state/{}", state.as_str());
        self.client.json(ApiRequest::get(path)).await
    }

    /// Messages from the last `days` days.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn recent(&self, days: u32) -> ApiResult<Vec<EmailThread>> {
        self.client
            .json(ApiRequest::get(format!("{EMAILS}/recent")).query("days", days))
            .await
    }

    /// PO numbers that have at least one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn po_numbers(&self) -> ApiResult<Vec<String>> {
        self.client
            .json(ApiRequest::get(format!("{EMAILS}/po-numbers")))
            .await
    }

    /// Full-text search.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn search(&self, query: &str) -> ApiResult<Vec<EmailThread>> {
        self.client
            .json(ApiRequest::get(format!("{EMAILS}/search")).query("query", query))
            .await
    }
}
