//! High-level pipeline: snapshot → classification → forests.
//!
//! [`build_report`] is the entry point used by the CLI and integration tests. It
//! pulls one snapshot from a [`SnapshotSource`], resolves every record's
//! memberships once, and builds the per-bucket forests from those memberships.
//!
//! # Major Types
//! - [`OrgReport`]: forests plus per-record assignments and per-bucket counts
//! - [`Assignment`]: one record's primary and secondary buckets
//!
//! # Error Handling
//! Only loading the snapshot can fail. Classification and forest construction
//! always succeed, whatever the data quality of the snapshot.

use crate::catalog::Bucket;
use crate::contract::{SnapshotError, SnapshotSource};
use crate::forest::{build_forests_with, BucketForest};
use crate::record::PersonRecord;
use crate::secondary::Membership;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("snapshot load failed: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// One record's bucket memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub display_name: String,
    pub primary: Bucket,
    pub secondary: Vec<Bucket>,
}

/// Size of one populated bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketCount {
    #[serde(rename = "bucketName")]
    pub bucket: Bucket,
    pub nodes: usize,
    pub roots: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgReport {
    pub record_count: usize,
    pub forests: Vec<BucketForest>,
    pub assignments: Vec<Assignment>,
    pub bucket_counts: Vec<BucketCount>,
}

impl OrgReport {
    pub fn forest(&self, bucket: Bucket) -> Option<&BucketForest> {
        self.forests.iter().find(|f| f.bucket == bucket)
    }

    pub fn assignment(&self, id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }
}

/// Runs the engine over an in-memory record list.
pub fn report_for(records: &[PersonRecord]) -> OrgReport {
    let memberships: Vec<Membership> = records.iter().map(Membership::resolve).collect();

    let assignments = records
        .iter()
        .zip(&memberships)
        .map(|(record, membership)| Assignment {
            id: record.id.clone(),
            display_name: record.display_name.clone(),
            primary: membership.primary,
            secondary: membership.secondary.clone(),
        })
        .collect();

    let forests = build_forests_with(records, &memberships);
    let bucket_counts = forests
        .iter()
        .map(|f| BucketCount {
            bucket: f.bucket,
            nodes: f.node_count(),
            roots: f.roots.len(),
        })
        .collect();

    OrgReport {
        record_count: records.len(),
        forests,
        assignments,
        bucket_counts,
    }
}

/// Loads one snapshot from `source` and builds the report for it.
pub async fn build_report<S>(source: &S) -> Result<OrgReport, PipelineError>
where
    S: SnapshotSource + ?Sized,
{
    let origin = source.describe();
    info!(source = %origin, "[ORG] Starting bucket report");

    let snapshot = match source.load_snapshot().await {
        Ok(snapshot) => {
            info!(source = %origin, records = snapshot.len(), "[ORG][SNAPSHOT] Snapshot loaded");
            snapshot
        }
        Err(e) => {
            error!(source = %origin, error = %e, "[ORG][ERROR] Snapshot load failed");
            return Err(e.into());
        }
    };

    let report = report_for(snapshot.records());
    for count in &report.bucket_counts {
        info!(
            bucket = %count.bucket,
            nodes = count.nodes,
            roots = count.roots,
            "[ORG] Bucket populated"
        );
    }
    info!(
        records = report.record_count,
        buckets = report.forests.len(),
        "[ORG] Bucket report complete"
    );
    Ok(report)
}
