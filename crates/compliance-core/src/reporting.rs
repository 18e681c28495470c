use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::aggregate::{AggregationState, MergePolicy};

pub const RUN_SUMMARY_SCHEMA_VERSION: &str = "1.0";

/// One input file as seen by the run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputSummary {
    pub path: String,
    /// SHA-256 of the file bytes, hex encoded.
    pub sha256: String,
    pub hosts: usize,
    pub records: usize,
}

/// Per-host tallies in the final report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostSummary {
    pub host: String,
    pub benchmark: String,
    pub passed: usize,
    pub failed: usize,
    pub warning: usize,
    pub total: usize,
}

/// Machine-readable companion to the spreadsheet report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub merge_policy: MergePolicy,
    pub output: String,
    pub inputs: Vec<InputSummary>,
    pub hosts: Vec<HostSummary>,
}

impl RunSummary {
    pub fn new(
        merge_policy: MergePolicy,
        output: &Path,
        inputs: Vec<InputSummary>,
        state: &AggregationState,
    ) -> Self {
        let hosts = state
            .hosts()
            .iter()
            .map(|host| {
                let tally = host.tally();
                HostSummary {
                    host: host.host.clone(),
                    benchmark: host.benchmark().to_string(),
                    passed: tally.passed,
                    failed: tally.failed,
                    warning: tally.warning,
                    total: tally.total(),
                }
            })
            .collect();

        Self {
            schema_version: RUN_SUMMARY_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            merge_policy,
            output: output.display().to_string(),
            inputs,
            hosts,
        }
    }
}

/// Hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Write the run summary in pretty JSON format.
pub fn write_run_summary_json(path: &Path, summary: &RunSummary) -> Result<()> {
    let content = serde_json::to_string_pretty(summary).context("serialize run summary")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}
