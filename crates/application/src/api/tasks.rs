//! Workflow task service.

use procura_domain::ApiRequest;
use procura_domain::workflow::{
    PurchaseOrder, TaskActions, TaskHistoryEntry, TaskListKind, TaskPage, TaskQuery, TaskRef,
    WorkflowPerformRequest,
};

use super::client::ApiClient;
use crate::error::ApiResult;

/// Task inbox, task commands and the documents attached to a task.
#[derive(Debug, Clone)]
pub struct TaskService {
    client: ApiClient,
    prefix: String,
}

impl TaskService {
    /// Creates the service. `prefix` is the task API mount point, `/api`
    /// by default.
    pub fn new(client: ApiClient, prefix: impl Into<String>) -> Self {
        Self {
            client,
            prefix: prefix.into().trim_end_matches('/').to_string(),
        }
    }

    fn bpa(&self, path: &str) -> String {
        format!("{}/bpa/{path}", self.prefix)
    }

    /// Fetches one page of a task list.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn list(&self, kind: TaskListKind, query: &TaskQuery) -> ApiResult<TaskPage> {
        let path = self.bpa(&format!("task/{}", kind.path_segment()));
        self.client
            .json(ApiRequest::get(path).query_pairs(query.to_query_pairs()))
            .await
    }

    /// Tasks ready to be claimed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn ready(&self, query: &TaskQuery) -> ApiResult<TaskPage> {
        self.list(TaskListKind::Ready, query).await
    }

    /// Tasks the user is working on.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn in_progress(&self, query: &TaskQuery) -> ApiResult<TaskPage> {
        self.list(TaskListKind::InProgress, query).await
    }

    /// Tasks the user started.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn own(&self, query: &TaskQuery) -> ApiResult<TaskPage> {
        self.list(TaskListKind::Own, query).await
    }

    /// Actions available on a task.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn actions(&self, task: &TaskRef) -> ApiResult<TaskActions> {
        self.client
            .json(ApiRequest::get(self.bpa("actions")).query_pairs(task.to_query_pairs()))
            .await
    }

    /// Step history of a task.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn history(&self, task: &TaskRef) -> ApiResult<Vec<TaskHistoryEntry>> {
        self.client
            .json(ApiRequest::get(self.bpa("history")).query_pairs(task.to_query_pairs()))
            .await
    }

    /// Assigns a task to the current user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn claim(&self, task: &TaskRef) -> ApiResult<serde_json::Value> {
        tracing::info!(module = %task.module, key = %task.key, "Claiming task");
        self.client
            .command(ApiRequest::put(self.bpa("claim")).query_pairs(task.to_query_pairs()))
            .await
    }

    /// Returns a claimed task to the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn release(&self, task: &TaskRef) -> ApiResult<serde_json::Value> {
        tracing::info!(module = %task.module, key = %task.key, "Releasing task");
        self.client
            .command(ApiRequest::put(self.bpa("release")).query_pairs(task.to_query_pairs()))
            .await
    }

    /// Performs a workflow action on a task.
    ///
    /// The perform endpoint lives under the module's own API, not the task
    /// API prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn perform(&self, task: &TaskRef, action: &str) -> ApiResult<serde_json::Value> {
        let path = format!("/pro/{}/v1/workflow/perform", urlencoding::encode(&task.module));
        let body = WorkflowPerformRequest::new(task, action);
        tracing::info!(module = %task.module, key = %task.key, action, "Performing workflow action");
        self.client.command(ApiRequest::post(path).json(&body)?).await
    }

    /// Rendered process diagram image.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn diagram(&self, process_id: &str) -> ApiResult<Vec<u8>> {
        let path = self.bpa(&format!(
            "process-api/runtime/process-instances/{}/diagram",
            urlencoding::encode(process_id)
        ));
        self.client.bytes(ApiRequest::get(path)).await
    }

    /// The purchase order behind a task.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn procurement_order(&self, po_number: &str) -> ApiResult<PurchaseOrder> {
        let path = format!("/pro/api/procurement/{}", urlencoding::encode(po_number));
        self.client.json(ApiRequest::get(path)).await
    }

    /// HTML content of the requisition form for a purchase order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn rrf_content(&self, po_number: &str) -> ApiResult<String> {
        let path = format!("/pro/api/rrf/{}/content", urlencoding::encode(po_number));
        self.client.text(ApiRequest::get(path)).await
    }
}
