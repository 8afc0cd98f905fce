//! Sequential batch orchestration over resolved groups.
//!
//! Strictly one artifact at a time, one attempt per artifact per run. A bad
//! entry or a failed transfer is recorded and the batch moves on; re-running
//! the whole process is the only retry mechanism, which idempotent fetching
//! keeps cheap.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::catalog::{ArtifactRef, Catalog};
use crate::config::Config;
use crate::error::Error;
use crate::hub::{DownloadTarget, FetchOutcome, Fetcher, Transport};

/// Per-artifact result recorded in the run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    Present,
    Downloaded,
    /// Malformed entry or URL; never reached the transport.
    Skipped(String),
    /// Transfer failed.
    Failed(String),
    /// Transferred but not relocated to its flat destination path.
    Unstaged(String),
}

impl fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactStatus::Present => write!(f, "present"),
            ArtifactStatus::Downloaded => write!(f, "downloaded"),
            ArtifactStatus::Skipped(e) => write!(f, "skipped: {}", e),
            ArtifactStatus::Failed(e) => write!(f, "failed: {}", e),
            ArtifactStatus::Unstaged(e) => write!(f, "unstaged: {}", e),
        }
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub results: Vec<(String, ArtifactStatus)>,
    pub unknown_groups: Vec<String>,
}

impl RunReport {
    fn count(&self, pred: impl Fn(&ArtifactStatus) -> bool) -> usize {
        self.results.iter().filter(|(_, s)| pred(s)).count()
    }

    pub fn present(&self) -> usize {
        self.count(|s| matches!(s, ArtifactStatus::Present))
    }

    pub fn downloaded(&self) -> usize {
        self.count(|s| matches!(s, ArtifactStatus::Downloaded))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, ArtifactStatus::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ArtifactStatus::Failed(_)))
    }

    pub fn unstaged(&self) -> usize {
        self.count(|s| matches!(s, ArtifactStatus::Unstaged(_)))
    }

    /// Everything that is not cleanly on disk at its flat path.
    pub fn problems(&self) -> impl Iterator<Item = (&str, &ArtifactStatus)> {
        self.results
            .iter()
            .filter(|(_, s)| {
                !matches!(s, ArtifactStatus::Present | ArtifactStatus::Downloaded)
            })
            .map(|(entry, status)| (entry.as_str(), status))
    }
}

/// Run the whole batch: enabled groups in declaration order, artifacts in
/// table order. Never returns an error; per-artifact outcomes live in the
/// report and do not affect the process exit code.
pub fn provision<T: Transport>(
    catalog: &Catalog,
    config: &Config,
    fetcher: &Fetcher<T>,
) -> RunReport {
    let resolution = catalog.resolve(config);

    let mut report = RunReport {
        unknown_groups: resolution.unknown,
        ..RunReport::default()
    };
    for name in &report.unknown_groups {
        error!("No model group named '{}', ignoring its flag", name);
    }

    for group in resolution.enabled {
        info!("Provisioning group {} ({} artifacts)", group.name, group.entries.len());
        for entry in &group.entries {
            let status = fetch_entry(fetcher, entry);
            match &status {
                ArtifactStatus::Skipped(e) => error!("{}: {}", entry, e),
                ArtifactStatus::Failed(e) => warn!("{}: {}", entry, e),
                ArtifactStatus::Unstaged(e) => warn!("{}: {}", entry, e),
                _ => {}
            }
            report.results.push((entry.clone(), status));
        }
    }

    info!(
        "Run complete: {} present, {} downloaded, {} failed, {} skipped",
        report.present(),
        report.downloaded(),
        report.failed(),
        report.skipped()
    );

    report
}

fn fetch_entry<T: Transport>(fetcher: &Fetcher<T>, entry: &str) -> ArtifactStatus {
    let artifact = match ArtifactRef::parse(entry) {
        Ok(artifact) => artifact,
        Err(e) => return ArtifactStatus::Skipped(e.to_string()),
    };
    let target = match DownloadTarget::new(&artifact) {
        Ok(target) => target,
        Err(e) => return ArtifactStatus::Skipped(e.to_string()),
    };
    match fetcher.ensure(&target) {
        Ok(FetchOutcome::Present) => ArtifactStatus::Present,
        Ok(FetchOutcome::Downloaded) => ArtifactStatus::Downloaded,
        Err(Error::Stage(e)) => ArtifactStatus::Unstaged(e),
        Err(e) => ArtifactStatus::Failed(e.to_string()),
    }
}

/// One line of `provy plan` output.
#[derive(Debug, Serialize)]
pub struct PlanEntry {
    pub group: String,
    pub entry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Resolve groups and derive destinations without touching the network or
/// the filesystem.
pub fn plan(catalog: &Catalog, config: &Config) -> Vec<PlanEntry> {
    let resolution = catalog.resolve(config);

    let mut out = Vec::new();
    for group in resolution.enabled {
        for entry in &group.entries {
            let derived = ArtifactRef::parse(entry).and_then(|a| DownloadTarget::new(&a));
            out.push(match derived {
                Ok(target) => PlanEntry {
                    group: group.name.clone(),
                    entry: entry.clone(),
                    dest: Some(
                        target
                            .output_dir(&config.models_dir)
                            .join(&target.file.filename),
                    ),
                    error: None,
                },
                Err(e) => PlanEntry {
                    group: group.name.clone(),
                    entry: entry.clone(),
                    dest: None,
                    error: Some(e.to_string()),
                },
            });
        }
    }
    out
}
