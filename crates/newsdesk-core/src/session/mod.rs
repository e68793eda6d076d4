//! Authenticated session: identity, token, inactivity lock, permissions.

pub mod model;
pub mod repository;
pub mod store;

pub use model::{Permissions, Session, SessionSnapshot, UserProfile};
pub use repository::{MemorySnapshotRepository, SnapshotRepository};
pub use store::{SessionStore, INACTIVITY_LOCK_MINUTES};
