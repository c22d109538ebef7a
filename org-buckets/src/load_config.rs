/// `load_config` module: loads the static YAML config for the CLI and applies environment overrides.
///
/// This is the only place where user-supplied YAML is parsed into typed config.
///
/// # Responsibilities
/// - Parse the config file into [`CliConfig`] (snapshot source + output settings)
/// - Apply the `ORG_BUCKETS_SNAPSHOT` override for the snapshot path
/// - Fail with clear diagnostics: every load failure names the file and the stage
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use org_buckets_core::config::{DataFormat, SnapshotConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Environment variable that replaces `snapshot.path` when set.
pub const SNAPSHOT_PATH_ENV: &str = "ORG_BUCKETS_SNAPSHOT";

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where and how results are written.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Output file; stdout when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_format")]
    pub format: DataFormat,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_format() -> DataFormat {
    DataFormat::Json
}

fn default_pretty() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            format: default_format(),
            pretty: default_pretty(),
        }
    }
}

impl OutputConfig {
    pub fn trace_loaded(&self) {
        info!(
            path = ?self.path,
            format = ?self.format,
            pretty = self.pretty,
            "Loaded OutputConfig"
        );
    }
}

/// Loads a static YAML config file and applies environment overrides.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let mut config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if let Ok(override_path) = std::env::var(SNAPSHOT_PATH_ENV) {
        if !override_path.trim().is_empty() {
            info!(
                env = SNAPSHOT_PATH_ENV,
                snapshot_path = %override_path,
                "Snapshot path overridden from environment"
            );
            config.snapshot.path = PathBuf::from(override_path);
        }
    }

    config.snapshot.trace_loaded();
    config.output.trace_loaded();
    Ok(config)
}
