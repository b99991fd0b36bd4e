//! Local persistence adapters.

mod session_storage;

pub use session_storage::{FileSessionStorage, MemorySessionStorage};
