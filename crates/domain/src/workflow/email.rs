//! Email threads attached to purchase orders.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How far the mail pipeline got with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingState {
    /// Stored, not yet classified.
    EmailReceived,
    /// Classified.
    Classified,
    /// Related records gathered.
    ContextGathered,
    /// Stock checked.
    InventoryChecked,
    /// Options sent to the requester.
    RecommendationsSent,
    /// Requester confirmed.
    ConfirmationReceived,
    /// PO raised.
    PoGenerated,
    /// Ledger updated.
    AccountingUpdated,
    /// Completion mail sent.
    CompletionSent,
    /// Not a procurement mail.
    NotProcurement,
    /// Sender unknown.
    UserNotFound,
    /// Pipeline failure.
    Error,
}

impl ProcessingState {
    /// Wire name used in `/state/{state}` paths.
    #[must_use]
    pub fn as_str(self) -> String {
        serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default()
    }
}

/// A single message in a PO thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailThread {
    /// Row id.
    pub id: i64,
    /// PO the thread belongs to.
    pub po_number: String,
    /// RFC 5322 message id.
    pub message_id: String,
    /// Parent message id.
    #[serde(default)]
    pub parent_message_id: Option<String>,
    /// Sender.
    pub from_email: String,
    /// Recipient.
    pub to_email: String,
    /// Subject.
    pub subject: String,
    /// Body with quoting stripped.
    #[serde(default)]
    pub cleaned_body: String,
    /// Original body.
    #[serde(default)]
    pub raw_content: String,
    /// Sent by the system itself.
    #[serde(default)]
    pub system_message: bool,
    /// Classified as procurement.
    #[serde(default)]
    pub procurement_related: bool,
    /// Pipeline state.
    pub processing_state: ProcessingState,
    /// When received.
    pub received_at: String,
    /// When stored.
    pub created_at: String,
    /// Depth in the reply tree.
    #[serde(default)]
    pub depth_level: u32,
    /// Extra metadata.
    #[serde(default)]
    pub metadata: Option<String>,
}

/// A message with its replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailThreadNode {
    /// The message.
    pub email: EmailThread,
    /// Replies.
    #[serde(default)]
    pub children: Vec<EmailThreadNode>,
}

/// Per-thread statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadStats {
    /// Messages in the thread.
    pub total_emails: u64,
    /// Procurement-classified messages.
    pub procurement_emails: u64,
    /// System-sent messages.
    pub system_emails: u64,
    /// Distinct addresses.
    #[serde(default)]
    pub participants: Vec<String>,
    /// Distinct address count.
    pub participant_count: u64,
    /// First message timestamp.
    #[serde(default)]
    pub first_email: Option<String>,
    /// Last message timestamp.
    #[serde(default)]
    pub last_email: Option<String>,
    /// Messages per processing state.
    #[serde(default)]
    pub state_breakdown: BTreeMap<String, u64>,
}
