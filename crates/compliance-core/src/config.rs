//! Run configuration.
//!
//! Built-in defaults, optionally overlaid by a TOML file, then by CLI flags
//! in the binary. Every field has a default so a config file only names what
//! it changes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregator, MergePolicy};
use crate::domain::{ComplianceError, ComplianceStatus, Result, StatusMap};
use crate::extract::{RecordExtractor, TextPolicy, DEFAULT_MAX_CELL_CHARS, TRUNCATION_MARKER};
use crate::report::{resolver_for, OutputFormat, ReportWriter, DEFAULT_FONT};

/// Hard Excel limit on characters in one cell.
const EXCEL_CELL_LIMIT: usize = 32_767;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub merge_policy: MergePolicy,
    pub format: OutputFormat,
    /// Status for result strings not listed in `status_map`.
    pub fallback_status: ComplianceStatus,
    /// Extra raw result → status entries on top of PASSED and FAILED.
    pub status_map: BTreeMap<String, ComplianceStatus>,
    /// Check names left out of the report.
    pub ignored_checks: Vec<String>,
    pub font_name: String,
    pub status_colors: bool,
    pub raw_text: bool,
    pub max_cell_chars: usize,
    pub summary_json: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            merge_policy: MergePolicy::default(),
            format: OutputFormat::default(),
            fallback_status: ComplianceStatus::Warning,
            status_map: BTreeMap::new(),
            ignored_checks: Vec::new(),
            font_name: DEFAULT_FONT.to_string(),
            status_colors: false,
            raw_text: false,
            max_cell_chars: DEFAULT_MAX_CELL_CHARS,
            summary_json: None,
        }
    }
}

impl ReportConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ComplianceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ComplianceError::Config(format!("cannot read config file {:?}: {e}", path))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ComplianceError::Config(detail) => {
                ComplianceError::Config(format!("{}: {detail}", path.display()))
            }
            other => other,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.font_name.trim().is_empty() {
            return Err(ComplianceError::Config("font_name must not be empty".into()));
        }
        let ceiling = EXCEL_CELL_LIMIT - TRUNCATION_MARKER.chars().count();
        if self.max_cell_chars == 0 || self.max_cell_chars > ceiling {
            return Err(ComplianceError::Config(format!(
                "max_cell_chars must be between 1 and {ceiling}, got {}",
                self.max_cell_chars
            )));
        }
        Ok(())
    }

    pub fn status_map(&self) -> StatusMap {
        self.status_map
            .iter()
            .fold(StatusMap::default(), |map, (raw, status)| {
                map.with_entry(raw.clone(), *status)
            })
            .with_fallback(self.fallback_status)
    }

    pub fn text_policy(&self) -> TextPolicy {
        TextPolicy {
            clean_whitespace: !self.raw_text,
            max_chars: self.max_cell_chars,
        }
    }

    pub fn extractor(&self) -> RecordExtractor {
        RecordExtractor::new(self.status_map(), self.text_policy())
            .with_ignored_checks(self.ignored_checks.iter().cloned())
    }

    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new(self.merge_policy)
    }

    pub fn report_writer(&self) -> ReportWriter {
        ReportWriter::new(self.format)
            .with_font(self.font_name.clone())
            .with_styles(resolver_for(self.status_colors))
    }
}
