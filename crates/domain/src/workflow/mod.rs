//! Records exchanged with the procurement backend.

mod email;
mod ledger;
mod procurement;
mod task;

pub use email::{EmailThread, EmailThreadNode, ProcessingState, ThreadStats};
pub use ledger::{GlEntry, GlStats, GlTransactionType};
pub use procurement::{
    InventoryItem, InventoryStats, OrderStatus, ProcurementStats, PurchaseOrder,
};
pub use task::{
    FilterCondition, Task, TaskAction, TaskActions, TaskFilter, TaskHistoryEntry, TaskListKind,
    TaskPage, TaskQuery, TaskRef, WorkflowPerformRequest,
};
