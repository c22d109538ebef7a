///
/// This module implements the CLI interface for org-buckets: command parsing,
/// main entrypoints and user-visible output.
///
/// All classification and forest logic lives in the [`org-buckets-core`] crate.
/// This module is strictly CLI glue: load config, pick a snapshot source, run
/// the pipeline, write the result.
///
/// ## How To Use
/// - For command-line users: use the installed `org-buckets` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`org-buckets-core`]: ../../org-buckets-core/
use crate::load_config::load_config;
use crate::render::emit;
use anyhow::Result;
use clap::{Parser, Subcommand};
use org_buckets_core::classify::classify_with_rule;
use org_buckets_core::pipeline::build_report;
use org_buckets_core::record::split_team_labels;
use org_buckets_core::secondary::secondary_memberships;
use org_buckets_core::snapshot::FileSnapshotSource;
use org_buckets_core::PersonRecord;
use std::path::PathBuf;

/// CLI for org-buckets: organizational bucket forests from a directory export.
#[derive(Parser)]
#[clap(
    name = "org-buckets",
    version,
    about = "Classify a personnel directory into organizational buckets and build per-bucket reporting trees"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the per-bucket forests for the snapshot named in the config file
    Forest {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
    /// List every record's primary and secondary buckets
    Assign {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
    /// Classify one ad-hoc record from its title and team labels
    Classify {
        /// Job title
        #[clap(long)]
        title: Option<String>,
        /// Team labels; repeat the flag or pass a comma-separated list
        #[clap(long)]
        team: Vec<String>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Forest { config } => {
            let config = load_config(config)?;
            tracing::info!(command = "forest", "Building bucket forests");
            let source = FileSnapshotSource::new(config.snapshot.clone());
            let report = build_report(&source).await?;
            emit(&report.forests, &config.output)?;
            tracing::info!(
                command = "forest",
                buckets = report.forests.len(),
                "Bucket forests written"
            );
            Ok(())
        }
        Commands::Assign { config } => {
            let config = load_config(config)?;
            tracing::info!(command = "assign", "Resolving bucket assignments");
            let source = FileSnapshotSource::new(config.snapshot.clone());
            let report = build_report(&source).await?;
            emit(&report.assignments, &config.output)?;
            tracing::info!(
                command = "assign",
                records = report.assignments.len(),
                "Assignments written"
            );
            Ok(())
        }
        Commands::Classify { title, team } => {
            let labels: Vec<String> = team.iter().flat_map(|t| split_team_labels(t)).collect();
            let (primary, rule) = classify_with_rule(title.as_deref(), &labels);
            let record = PersonRecord {
                id: String::new(),
                display_name: String::new(),
                job_title: title,
                team_labels: labels,
                manager_id: None,
            };
            let secondary = secondary_memberships(&record, primary);
            tracing::info!(command = "classify", bucket = %primary, rule, "Classified record");

            println!("primary: {primary} (rule: {rule})");
            let names: Vec<String> = secondary.iter().map(|b| b.name()).collect();
            if names.is_empty() {
                println!("secondary: none");
            } else {
                println!("secondary: {}", names.join(", "));
            }
            Ok(())
        }
    }
}
