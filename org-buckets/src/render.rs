//! Serializes results and writes them to the configured destination.

use crate::load_config::OutputConfig;
use anyhow::{Context, Result};
use org_buckets_core::config::DataFormat;
use serde::Serialize;
use std::io::Write;
use tracing::info;

/// Encodes `value` as configured.
pub fn render<T: Serialize>(value: &T, output: &OutputConfig) -> Result<String> {
    let text = match (output.format, output.pretty) {
        (DataFormat::Json, true) => serde_json::to_string_pretty(value)?,
        (DataFormat::Json, false) => serde_json::to_string(value)?,
        (DataFormat::Yaml, _) => serde_yaml::to_string(value)?,
    };
    Ok(text)
}

/// Renders `value` and writes it to `output.path`, or stdout when no path is set.
pub fn emit<T: Serialize>(value: &T, output: &OutputConfig) -> Result<()> {
    let text = render(value, output)?;
    match &output.path {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write output file {}", path.display()))?;
            info!(path = %path.display(), bytes = text.len(), "Wrote output file");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}").context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
