// Re-export the modules that make up the ChatterFlow core
pub mod chat;
pub mod models;
pub mod store;

// Re-export main types for convenience
pub use chat::{ChatSession, ChatSnapshot, Notice, NoticeKind};
pub use models::*;
pub use store::{MockStore, StoreError};
