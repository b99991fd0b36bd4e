//! Purchase orders and inventory.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Awaiting approval.
    Pending,
    /// Approved.
    Approved,
    /// Rejected.
    Rejected,
    /// Fulfilled.
    Completed,
}

impl OrderStatus {
    /// Wire name used in `/status/{status}` paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Completed => "COMPLETED",
        }
    }
}

/// A purchase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    /// PO number.
    pub po_number: String,
    /// Ordered item.
    pub item_name: String,
    /// Item category.
    pub item_type: String,
    /// Free-form specifications.
    #[serde(default)]
    pub specifications: Option<serde_json::Map<String, serde_json::Value>>,
    /// Units ordered.
    pub quantity: u32,
    /// Total amount.
    pub amount: f64,
    /// Requester email.
    pub requester_email: String,
    /// Requester role.
    pub requester_role: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Current status.
    pub status: OrderStatus,
}

/// Aggregate order figures reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcurementStats {
    /// Number of orders.
    pub total_orders: u64,
    /// Sum of order amounts.
    pub total_amount: f64,
    /// Order count per status.
    #[serde(default)]
    pub orders_by_status: BTreeMap<String, u64>,
    /// Order count per item type.
    #[serde(default)]
    pub orders_by_type: BTreeMap<String, u64>,
}

/// A stocked inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Item id.
    pub id: String,
    /// Item name.
    pub name: String,
    /// Item category.
    #[serde(rename = "type")]
    pub item_type: String,
    /// Free-form specifications.
    #[serde(default)]
    pub specifications: serde_json::Map<String, serde_json::Value>,
    /// Units on hand.
    pub available_quantity: u32,
    /// Book value per unit.
    pub book_value: f64,
}

/// Aggregate inventory figures reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    /// Distinct items.
    pub total_items: u64,
    /// Units on hand.
    pub total_quantity: u64,
    /// Total book value.
    pub total_value: f64,
    /// Item count per type.
    #[serde(default)]
    pub items_by_type: BTreeMap<String, u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_deserializes() {
        let json = r#"{
            "poNumber": "PO-2025-0012", "itemName": "ThinkPad T14", "itemType": "LAPTOP",
            "quantity": 4, "amount": 5200.0, "requesterEmail": "a@example.edu",
            "requesterRole": "FACULTY", "createdAt": "2025-02-01T09:30:00", "status": "APPROVED"
        }"#;
        let order: PurchaseOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Approved);
        assert!(order.specifications.is_none());
        assert_eq!(order.status.as_str(), "APPROVED");
    }

    #[test]
    fn test_inventory_item_type_field() {
        let json = r#"{
            "id": "inv-1", "name": "Monitor", "type": "DISPLAY",
            "specifications": {"size": 27}, "availableQuantity": 12, "bookValue": 180.5
        }"#;
        let item: InventoryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.item_type, "DISPLAY");
        assert_eq!(item.specifications["size"], 27);
    }
}
