//! Per-host grouping of compliance records.

use serde::{Deserialize, Serialize};

use super::record::{ComplianceCheckRecord, ComplianceStatus};

/// Status counts for one host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTally {
    pub passed: usize,
    pub failed: usize,
    pub warning: usize,
}

impl StatusTally {
    pub fn record(&mut self, status: ComplianceStatus) {
        match status {
            ComplianceStatus::Passed => self.passed += 1,
            ComplianceStatus::Failed => self.failed += 1,
            ComplianceStatus::Warning => self.warning += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.warning
    }
}

/// The records that belong to one host after aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostReport {
    pub host: String,
    pub records: Vec<ComplianceCheckRecord>,
}

impl HostReport {
    pub fn new(host: impl Into<String>, records: Vec<ComplianceCheckRecord>) -> Self {
        Self {
            host: host.into(),
            records,
        }
    }

    pub fn tally(&self) -> StatusTally {
        let mut tally = StatusTally::default();
        for record in &self.records {
            tally.record(record.status);
        }
        tally
    }

    /// First non-empty benchmark label among the host's records.
    pub fn benchmark(&self) -> &str {
        self.records
            .iter()
            .map(|r| r.benchmark.as_str())
            .find(|b| !b.is_empty())
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
