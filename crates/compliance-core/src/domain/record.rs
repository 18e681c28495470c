//! Compliance check records and result normalization.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized outcome of a single compliance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    #[serde(alias = "PASSED")]
    Passed,
    #[serde(alias = "FAILED")]
    Failed,
    #[serde(alias = "WARNING")]
    Warning,
}

impl ComplianceStatus {
    pub const ALL: [ComplianceStatus; 3] = [
        ComplianceStatus::Passed,
        ComplianceStatus::Failed,
        ComplianceStatus::Warning,
    ];

    /// Label written into report cells.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Passed => "PASSED",
            ComplianceStatus::Failed => "FAILED",
            ComplianceStatus::Warning => "WARNING",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup table from raw `compliance-result` strings to a [`ComplianceStatus`].
///
/// Matching is exact and case-sensitive. Anything not in the table maps to
/// the fallback, which by default folds `ERROR` (and every other scanner
/// value) into [`ComplianceStatus::Warning`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMap {
    entries: BTreeMap<String, ComplianceStatus>,
    fallback: ComplianceStatus,
}

impl Default for StatusMap {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert("PASSED".to_string(), ComplianceStatus::Passed);
        entries.insert("FAILED".to_string(), ComplianceStatus::Failed);
        Self {
            entries,
            fallback: ComplianceStatus::Warning,
        }
    }
}

impl StatusMap {
    /// Add or replace a mapping for `raw`.
    pub fn with_entry(mut self, raw: impl Into<String>, status: ComplianceStatus) -> Self {
        self.entries.insert(raw.into(), status);
        self
    }

    pub fn with_fallback(mut self, fallback: ComplianceStatus) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> ComplianceStatus {
        self.fallback
    }

    pub fn normalize(&self, raw: &str) -> ComplianceStatus {
        self.entries.get(raw).copied().unwrap_or(self.fallback)
    }
}

/// One compliance finding for one host, as extracted from a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceCheckRecord {
    pub host: String,
    pub check_name: String,
    pub status: ComplianceStatus,
    /// Informational text (`compliance-info`).
    pub details: String,
    pub policy_value: String,
    pub actual_value: String,
    /// Remediation text (`compliance-solution`).
    pub solution: String,
    /// Benchmark profile, e.g. `Level 1 - Server`.
    pub profile: String,
    /// See-also references.
    pub reference: String,
    /// `"<benchmark name> v<version>"`, empty when the scan does not say.
    pub benchmark: String,
}

impl ComplianceCheckRecord {
    /// Record with only the core columns populated.
    pub fn new(
        host: impl Into<String>,
        check_name: impl Into<String>,
        status: ComplianceStatus,
        details: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            check_name: check_name.into(),
            status,
            details: details.into(),
            policy_value: String::new(),
            actual_value: String::new(),
            solution: String::new(),
            profile: String::new(),
            reference: String::new(),
            benchmark: String::new(),
        }
    }
}
