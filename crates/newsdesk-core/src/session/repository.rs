//! Snapshot repository trait.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::Result;
use crate::session::model::SessionSnapshot;

/// Durable storage for the session snapshot.
///
/// Implementations persist the `{token, user}` pair so a session survives a
/// process restart. Corrupt stored content surfaces as
/// [`NewsdeskError::PersistedState`](crate::error::NewsdeskError); the
/// session store reacts by clearing the snapshot and starting
/// unauthenticated.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Loads the stored snapshot, or `None` when nothing is persisted.
    async fn load(&self) -> Result<Option<SessionSnapshot>>;

    /// Saves the snapshot, replacing any previous one.
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<()>;

    /// Erases the stored snapshot. Idempotent.
    async fn clear(&self) -> Result<()>;
}

/// In-memory snapshot repository.
///
/// Suitable for tests and for embedders that do not want durable sessions.
#[derive(Debug, Default)]
pub struct MemorySnapshotRepository {
    snapshot: Mutex<Option<SessionSnapshot>>,
}

impl MemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotRepository for MemorySnapshotRepository {
    async fn load(&self) -> Result<Option<SessionSnapshot>> {
        Ok(self.snapshot.lock().expect("snapshot lock poisoned").clone())
    }

    async fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        *self.snapshot.lock().expect("snapshot lock poisoned") = Some(snapshot.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.snapshot.lock().expect("snapshot lock poisoned") = None;
        Ok(())
    }
}
