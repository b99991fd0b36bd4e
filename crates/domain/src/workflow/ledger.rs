//! General-ledger entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind of ledger posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlTransactionType {
    /// Budget allocation.
    Allocation,
    /// Purchase posting.
    Purchase,
}

impl GlTransactionType {
    /// Wire name used in `/type/{type}` paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allocation => "ALLOCATION",
            Self::Purchase => "PURCHASE",
        }
    }
}

/// A double-entry ledger posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlEntry {
    /// Entry id.
    pub id: i64,
    /// Posting kind.
    pub transaction_type: GlTransactionType,
    /// Debited account.
    pub account_debit: String,
    /// Credited account.
    pub account_credit: String,
    /// Amount.
    pub amount: f64,
    /// Source reference, usually a PO number.
    pub reference_number: String,
    /// Requester email.
    pub requester_email: String,
    /// Posting date.
    pub transaction_date: String,
    /// Narrative.
    #[serde(default)]
    pub description: String,
}

/// Aggregate ledger figures reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlStats {
    /// Number of entries.
    pub total_entries: u64,
    /// Sum of amounts.
    pub total_amount: f64,
    /// Entry count per type.
    #[serde(default)]
    pub entries_by_type: BTreeMap<String, u64>,
    /// Amount per type.
    #[serde(default)]
    pub amount_by_type: BTreeMap<String, f64>,
}
