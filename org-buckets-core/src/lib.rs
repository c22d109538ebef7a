#![doc = "org-buckets-core: core logic library for org-buckets."]

//! This crate contains the classification engine and data models for org-buckets.
//! It turns a flat directory snapshot of personnel records into one reporting
//! forest per organizational bucket.
//!
//! # Layout
//! - [`catalog`]: the fixed, ordered bucket catalog
//! - [`record`]: input records and ingestion helpers
//! - [`classify`]: primary bucket classification
//! - [`secondary`]: dual-role (secondary) memberships
//! - [`forest`]: two-pass forest construction
//! - [`contract`], [`config`], [`snapshot`], [`pipeline`]: loading a snapshot and running the engine on it

pub mod catalog;
pub mod classify;
pub mod config;
pub mod contract;
pub mod forest;
pub mod pipeline;
pub mod record;
pub mod secondary;
pub mod snapshot;

pub use catalog::{Bucket, TeamNumber};
pub use classify::classify;
pub use forest::{build_forests, BucketForest, OrgNode};
pub use pipeline::{build_report, report_for, Assignment, OrgReport};
pub use record::PersonRecord;
pub use secondary::{has_secondary_membership, secondary_memberships, Membership};
