//! # contract: interface to the directory collaborator
//!
//! The engine never fetches anything itself. Whatever owns the personnel
//! directory (a data store export, an HTTP API, a fixture in a test) hands over a
//! point-in-time [`Snapshot`] through the [`SnapshotSource`] trait.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so tests can feed the pipeline a
//!   fixed snapshot or a failure without touching the filesystem.
//!
//! ## Adding New Sources
//! - Implement [`SnapshotSource`] and map every upstream failure into a
//!   [`SnapshotError`] variant.

use crate::record::PersonRecord;
use async_trait::async_trait;
use mockall::automock;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// Errors raised while obtaining or decoding a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse snapshot YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("duplicate record id in snapshot: {0}")]
    DuplicateId(String),
    #[error("snapshot source unavailable: {0}")]
    Unavailable(String),
}

/// An immutable, point-in-time list of personnel records with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    records: Vec<PersonRecord>,
}

/// Accepted document shapes: a bare list, or an object with a `records` list.
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    List(Vec<PersonRecord>),
    Wrapped { records: Vec<PersonRecord> },
}

impl From<SnapshotDocument> for Vec<PersonRecord> {
    fn from(doc: SnapshotDocument) -> Self {
        match doc {
            SnapshotDocument::List(records) | SnapshotDocument::Wrapped { records } => records,
        }
    }
}

impl Snapshot {
    /// Wraps `records`, rejecting duplicate ids.
    pub fn new(records: Vec<PersonRecord>) -> Result<Self, SnapshotError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                return Err(SnapshotError::DuplicateId(record.id.clone()));
            }
        }
        Ok(Self { records })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SnapshotError> {
        let doc: SnapshotDocument = serde_json::from_str(raw)?;
        Self::new(doc.into())
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, SnapshotError> {
        let doc: SnapshotDocument = serde_yaml::from_str(raw)?;
        Self::new(doc.into())
    }

    pub fn records(&self) -> &[PersonRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Supplies directory snapshots to the pipeline.
///
/// Implemented by [`crate::snapshot::FileSnapshotSource`] and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Loads the current snapshot.
    async fn load_snapshot(&self) -> Result<Snapshot, SnapshotError>;

    /// Human-readable origin, used in log lines.
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_list_and_wrapped_documents() {
        let list = Snapshot::from_json_str(r#"[{"id":"1","displayName":"A"}]"#).unwrap();
        let wrapped =
            Snapshot::from_json_str(r#"{"records":[{"id":"1","displayName":"A"}]}"#).unwrap();
        assert_eq!(list, wrapped);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Snapshot::from_json_str(
            r#"[{"id":"1","displayName":"A"},{"id":"1","displayName":"B"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicateId(ref id) if id == "1"));
    }

    #[test]
    fn yaml_document() {
        let yaml = "records:\n  - id: \"7\"\n    displayName: Dave\n    jobTitle: Systems Engineer\n    team: \"Ops, Infra\"\n";
        let snapshot = Snapshot::from_yaml_str(yaml).unwrap();
        assert_eq!(snapshot.records()[0].team_labels, vec!["Ops", "Infra"]);
    }
}
