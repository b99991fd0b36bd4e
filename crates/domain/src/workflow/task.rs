//! Workflow task types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which task list to page through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskListKind {
    /// Claimable tasks nobody holds yet.
    Ready,
    /// Tasks currently being worked on.
    InProgress,
    /// Tasks assigned to the current user.
    Own,
}

impl TaskListKind {
    /// Path segment under `/bpa/task/`.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::InProgress => "in-progress",
            Self::Own => "own",
        }
    }
}

/// A workflow task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task id.
    pub id: String,
    /// Owning module.
    pub module: String,
    /// Process code.
    pub code: String,
    /// Business reference.
    #[serde(rename = "ref")]
    pub reference_key: String,
    /// Current assignee.
    #[serde(default)]
    pub assignee: Option<String>,
    /// Current workflow step.
    pub step_name: String,
    /// When the step started.
    pub started_at: String,
    /// Task name.
    pub name: String,
    /// Who started the process.
    #[serde(default)]
    pub initiator: Option<String>,
    /// When the task was claimed.
    #[serde(default)]
    pub claim_time: Option<String>,
    /// Display title.
    pub title: String,
    /// Secondary reference, such as a PO number.
    #[serde(default)]
    pub reference: Option<String>,
    /// User who started the process instance.
    #[serde(default)]
    pub start_user_initiator: Option<String>,
    /// Link to the task's view.
    #[serde(default)]
    pub view_url: Option<String>,
    /// Free-form metadata.
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
    /// When the task ended.
    #[serde(default)]
    pub end_time: Option<String>,
}

impl Task {
    /// The triple identifying this task in action endpoints.
    #[must_use]
    pub fn task_ref(&self) -> TaskRef {
        TaskRef::new(&self.module, &self.code, &self.reference_key)
    }
}

/// One page of a task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPage {
    /// Rows in this page.
    pub rows: Vec<Task>,
    /// Total row count across all pages.
    pub last_row: u64,
}

/// A single column filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    /// Filter family, e.g. `text`.
    pub filter_type: String,
    /// Operator, e.g. `contains`.
    #[serde(rename = "type")]
    pub operator: String,
    /// Operand.
    pub filter: String,
}

impl FilterCondition {
    /// A case-insensitive substring match on text columns.
    #[must_use]
    pub fn text_contains(value: impl Into<String>) -> Self {
        Self {
            filter_type: "text".to_string(),
            operator: "contains".to_string(),
            filter: value.into(),
        }
    }
}

/// Column filters keyed by column name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskFilter(pub BTreeMap<String, FilterCondition>);

impl TaskFilter {
    /// Adds a condition on `column`.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, condition: FilterCondition) -> Self {
        self.0.insert(column.into(), condition);
        self
    }

    /// Returns true if no column is filtered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encodes as `filter[<column>][filterType|type|filter]` query pairs.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .flat_map(|(column, condition)| {
                [
                    (
                        format!("filter[{column}][filterType]"),
                        condition.filter_type.clone(),
                    ),
                    (format!("filter[{column}][type]"), condition.operator.clone()),
                    (format!("filter[{column}][filter]"), condition.filter.clone()),
                ]
            })
            .collect()
    }
}

/// Pagination and filtering for task lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Rows to skip.
    pub offset: u64,
    /// Page size.
    pub limit: u64,
    /// Optional column filters.
    #[serde(default)]
    pub filter: Option<TaskFilter>,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
            filter: None,
        }
    }
}

impl TaskQuery {
    /// Creates a query for one page.
    #[must_use]
    pub const fn page(offset: u64, limit: u64) -> Self {
        Self {
            offset,
            limit,
            filter: None,
        }
    }

    /// Attaches column filters.
    #[must_use]
    pub fn with_filter(mut self, filter: TaskFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Encodes as query pairs, pagination first.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("offset".to_string(), self.offset.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(filter) = &self.filter {
            pairs.extend(filter.to_query_pairs());
        }
        pairs
    }
}

/// Identifies a task for action, history, claim and release calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskRef {
    /// Owning module.
    pub module: String,
    /// Task key (process code).
    pub key: String,
    /// Business reference.
    #[serde(rename = "ref")]
    pub reference: String,
}

impl TaskRef {
    /// Creates a task reference.
    #[must_use]
    pub fn new(module: impl Into<String>, key: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            key: key.into(),
            reference: reference.into(),
        }
    }

    /// Encodes as `module`, `key`, `ref` query pairs.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("module".to_string(), self.module.clone()),
            ("key".to_string(), self.key.clone()),
            ("ref".to_string(), self.reference.clone()),
        ]
    }
}

/// A button the workflow offers for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAction {
    /// Action id sent back when performing it.
    pub name: String,
    /// Display label.
    pub label: String,
    /// Styling hint.
    #[serde(default)]
    pub css: String,
    /// Placement hint.
    #[serde(default)]
    pub place: String,
}

/// Actions and claim state for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskActions {
    /// Step name.
    pub name: String,
    /// Step label.
    pub label: String,
    /// Available actions.
    #[serde(default)]
    pub actions: Vec<TaskAction>,
    /// Current assignee.
    #[serde(default)]
    pub assignee: Option<String>,
    /// Fields the user may edit.
    #[serde(default)]
    pub is_editable: Vec<String>,
    /// Whether the current user may claim.
    #[serde(default)]
    pub claimable: bool,
    /// Whether the current user may release.
    #[serde(default)]
    pub releasable: bool,
}

/// One step in a task's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHistoryEntry {
    /// Process instance id.
    pub process_id: String,
    /// Step name.
    pub step_name: String,
    /// Step start.
    pub start_at: String,
    /// Step end.
    #[serde(default)]
    pub end_at: Option<String>,
    /// Remarks entered with the action.
    #[serde(default)]
    pub remarks: Option<String>,
    /// Assignee.
    #[serde(default)]
    pub assignee: Option<String>,
    /// Who acted.
    #[serde(default)]
    pub update_by: Option<String>,
    /// Action id taken.
    #[serde(default)]
    pub action_name: Option<String>,
    /// Action label taken.
    #[serde(default)]
    pub action_label: Option<String>,
}

/// Body for performing a workflow action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowPerformRequest {
    /// Action id.
    pub action: String,
    /// Task key.
    pub key: String,
    /// Business reference.
    #[serde(rename = "ref")]
    pub reference: String,
}

impl WorkflowPerformRequest {
    /// Builds the body for `action` on `task`.
    #[must_use]
    pub fn new(task: &TaskRef, action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            key: task.key.clone(),
            reference: task.reference.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_query_pairs_with_filter() {
        let query = TaskQuery::page(50, 25).with_filter(
            TaskFilter::default().with("code", FilterCondition::text_contains("ProcurementAutomation")),
        );

        let pairs = query.to_query_pairs();
        let pairs: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("offset", "50"),
                ("limit", "25"),
                ("filter[code][filterType]", "text"),
                ("filter[code][type]", "contains"),
                ("filter[code][filter]", "ProcurementAutomation"),
            ]
        );
    }

    #[test]
    fn test_task_page_deserializes() {
        let json = r#"{
            "rows": [{
                "id": "t1", "module": "po", "code": "ProcurementAutomation", "ref": "PO-7",
                "assignee": null, "stepName": "Approve", "startedAt": "2025-01-04T10:00:00",
                "name": "Approve PO", "initiator": "system", "claimTime": null,
                "title": "PO-7 laptops", "reference": "PO-7", "startUserInitiator": null,
                "viewUrl": null, "meta": null, "endTime": null
            }],
            "lastRow": 1
        }"#;

        let page: TaskPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.last_row, 1);
        assert_eq!(page.rows[0].task_ref(), TaskRef::new("po", "ProcurementAutomation", "PO-7"));
    }

    #[test]
    fn test_perform_request_shape() {
        let task = TaskRef::new("po", "ProcurementAutomation", "PO-7");
        let body = serde_json::to_value(WorkflowPerformRequest::new(&task, "approve")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "action": "approve", "key": "ProcurementAutomation", "ref": "PO-7" })
        );
    }

    #[test]
    fn test_list_kind_segments() {
        assert_eq!(TaskListKind::Ready.path_segment(), "ready");
        assert_eq!(TaskListKind::InProgress.path_segment(), "in-progress");
        assert_eq!(TaskListKind::Own.path_segment(), "own");
    }
}
