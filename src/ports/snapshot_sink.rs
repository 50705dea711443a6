use async_trait::async_trait;
use eyre::Result;

use crate::core::snapshot::Snapshot;

/// Trait for delivery targets that receive every freshly rendered snapshot.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Publish the full snapshot, replacing whatever was delivered before.
    async fn publish(&self, snapshot: &Snapshot) -> Result<()>;
}
