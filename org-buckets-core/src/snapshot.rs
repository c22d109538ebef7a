//! File-backed snapshot source: reads a JSON or YAML directory export from disk.

use crate::config::{DataFormat, SnapshotConfig};
use crate::contract::{Snapshot, SnapshotError, SnapshotSource};
use async_trait::async_trait;
use tracing::{debug, error, info};

/// Reads the snapshot described by a [`SnapshotConfig`] on every load.
pub struct FileSnapshotSource {
    config: SnapshotConfig,
}

impl FileSnapshotSource {
    pub fn new(config: SnapshotConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotSource {
    async fn load_snapshot(&self) -> Result<Snapshot, SnapshotError> {
        let path = &self.config.path;
        let format = self.config.resolved_format();
        debug!(path = %path.display(), ?format, "Reading snapshot file");

        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            error!(error = ?e, path = %path.display(), "Failed to read snapshot file");
            SnapshotError::Io {
                path: path.clone(),
                source: e,
            }
        })?;

        let parsed = match format {
            DataFormat::Json => Snapshot::from_json_str(&raw),
            DataFormat::Yaml => Snapshot::from_yaml_str(&raw),
        };
        match &parsed {
            Ok(snapshot) => info!(
                path = %path.display(),
                records = snapshot.len(),
                "Snapshot loaded"
            ),
            Err(e) => error!(error = %e, path = %path.display(), "Failed to decode snapshot"),
        }
        parsed
    }

    fn describe(&self) -> String {
        format!("file:{}", self.config.path.display())
    }
}
