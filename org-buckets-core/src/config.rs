use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk encoding of a snapshot or report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Json,
    Yaml,
}

impl DataFormat {
    /// `.yaml`/`.yml` means YAML, anything else JSON.
    pub fn infer(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => DataFormat::Yaml,
            _ => DataFormat::Json,
        }
    }
}

/// Where to read the directory snapshot from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub format: Option<DataFormat>,
}

impl SnapshotConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
        }
    }

    /// The configured format, or the one implied by the file extension.
    pub fn resolved_format(&self) -> DataFormat {
        self.format.unwrap_or_else(|| DataFormat::infer(&self.path))
    }

    pub fn trace_loaded(&self) {
        info!(
            path = %self.path.display(),
            format = ?self.resolved_format(),
            "Loaded SnapshotConfig"
        );
        debug!(?self, "SnapshotConfig loaded (full debug)");
    }
}
