use std::path::{Path, PathBuf};

use async_trait::async_trait;
use eyre::{Result, WrapErr};

use crate::{core::snapshot::Snapshot, ports::snapshot_sink::SnapshotSink};

pub const CLUSTERS_FILE: &str = "clusters.json";
pub const ROUTES_FILE: &str = "routes.json";
pub const SNAPSHOT_FILE: &str = "snapshot.json";

/// Writes each snapshot into a directory for path based discovery.
///
/// Every file is written under a temporary name and then renamed, so a data
/// plane watching the directory never reads a half-written envelope.
#[derive(Debug, Clone)]
pub struct FileSnapshotSink {
    dir: PathBuf,
}

impl FileSnapshotSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write_atomic(&self, file_name: &str, contents: &str) -> Result<()> {
        let target = self.dir.join(file_name);
        let staging = self.dir.join(format!(".{file_name}.tmp"));

        tokio::fs::write(&staging, contents)
            .await
            .wrap_err_with(|| format!("Failed to write {}", staging.display()))?;
        tokio::fs::rename(&staging, &target)
            .await
            .wrap_err_with(|| format!("Failed to move snapshot into {}", target.display()))?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotSink for FileSnapshotSink {
    async fn publish(&self, snapshot: &Snapshot) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .wrap_err_with(|| format!("Failed to create {}", self.dir.display()))?;

        let combined = snapshot
            .to_json()
            .wrap_err("Failed to render combined snapshot")?;

        self.write_atomic(CLUSTERS_FILE, &snapshot.clusters).await?;
        self.write_atomic(ROUTES_FILE, &snapshot.routes).await?;
        self.write_atomic(SNAPSHOT_FILE, &combined).await?;

        tracing::debug!("Published snapshot to {}", self.dir.display());
        Ok(())
    }
}
