//! General-ledger service.

use procura_domain::ApiRequest;
use procura_domain::workflow::{GlEntry, GlStats, GlTransactionType};

use super::client::ApiClient;
use crate::error::ApiResult;

const LEDGER: &str = "/pro/api/gl";

/// Look-back window used when none is given.
pub const DEFAULT_RECENT_DAYS: u32 = 30;

/// Read access to ledger postings.
#[derive(Debug, Clone)]
pub struct LedgerService {
    client: ApiClient,
}

impl LedgerService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn list(&self, request: ApiRequest) -> ApiResult<Vec<GlEntry>> {
        self.client.json(request).await
    }

    /// All postings.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn all(&self) -> ApiResult<Vec<GlEntry>> {
        self.list(ApiRequest::get(LEDGER)).await
    }

    /// One posting.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn by_id(&self, id: i64) -> ApiResult<GlEntry> {
        self.client
            .json(ApiRequest::get(format!("{LEDGER}/{id}")))
            .await
    }

    /// Postings for a source reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn by_reference(&self, reference: &str) -> ApiResult<Vec<GlEntry>> {
        let path = format!("{LEDGER}/reference/{}", urlencoding::encode(reference));
        self.list(ApiRequest::get(path)).await
    }

    /// Postings of one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn by_type(&self, kind: GlTransactionType) -> ApiResult<Vec<GlEntry>> {
        self.list(ApiRequest::get(format!("{LEDGER}/type/{}", kind.as_str())))
            .await
    }

    /// Postings for a requester.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn by_requester(&self, email: &str) -> ApiResult<Vec<GlEntry>> {
        let path = format!("{LEDGER}/requester/{}", urlencoding::encode(email));
        self.list(ApiRequest::get(path)).await
    }

    /// Postings from the last `days` days.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn recent(&self, days: u32) -> ApiResult<Vec<GlEntry>> {
        self.list(ApiRequest::get(format!("{LEDGER}/recent")).query("days", days))
            .await
    }

    /// Aggregate figures.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn stats(&self) -> ApiResult<GlStats> {
        self.client.json(ApiRequest::get(format!("{LEDGER}/stats"))).await
    }
}
