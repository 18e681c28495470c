//! Report rendering.
//!
//! The aggregated state is first turned into a [`ReportLayout`]: a list of
//! sheets with titled columns and styled cells. The layout is then rendered
//! to XLSX (one sheet per host plus a leading summary) or to a single flat
//! CSV table.

pub mod csv;
pub mod style;
pub mod xlsx;

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregationState;
use crate::domain::{ComplianceCheckRecord, ComplianceError, HostReport, Result};
use crate::obs;

pub use style::{resolver_for, CellStyle, PlainStyles, StatusColors, StyleResolver};

pub const SUMMARY_SHEET_NAME: &str = "Summary";

/// Column titles of every host sheet, in order.
pub const HOST_SHEET_HEADERS: [&str; 8] = [
    "Check",
    "Result",
    "Description",
    "Policy Value",
    "Actual Value",
    "Remediation",
    "Profile",
    "Reference",
];

pub const SUMMARY_HEADERS: [&str; 7] = [
    "No.", "IP", "Benchmark", "Passed", "Failed", "Warning", "Total",
];

pub const DEFAULT_FONT: &str = "IBM Plex Sans";

/// Excel's limit on worksheet name length.
const MAX_SHEET_NAME_CHARS: usize = 31;

/// Index of the `Result` column on host sheets.
const RESULT_COLUMN: usize = 1;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Self {
            value: CellValue::Text(value.into()),
            style: CellStyle::body(),
        }
    }

    fn number(value: usize) -> Self {
        Self {
            value: CellValue::Number(value as f64),
            style: CellStyle::body(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            CellValue::Text(s) => Some(s),
            CellValue::Number(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub title: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    /// Set for per-host sheets, `None` for the summary.
    pub host: Option<String>,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

/// Renderer-neutral report: the summary sheet followed by one sheet per host.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub sheets: Vec<Sheet>,
}

impl ReportLayout {
    pub fn build(state: &AggregationState, styles: &dyn StyleResolver) -> Self {
        let mut namer = SheetNamer::default();
        namer.reserve(SUMMARY_SHEET_NAME);

        let mut sheets = Vec::with_capacity(state.len() + 1);
        sheets.push(summary_sheet(state.hosts()));
        for host in state.hosts() {
            sheets.push(host_sheet(host, namer.name_for(&host.host), styles));
        }
        Self { sheets }
    }

    pub fn summary(&self) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.host.is_none())
    }

    pub fn host_sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter().filter(|s| s.host.is_some())
    }

    pub fn host_sheet(&self, host: &str) -> Option<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.host.as_deref() == Some(host))
    }
}

fn summary_sheet(hosts: &[HostReport]) -> Sheet {
    let columns = SUMMARY_HEADERS
        .iter()
        .map(|title| Column {
            title: title.to_string(),
            width: 20.0,
        })
        .collect();

    let rows = hosts
        .iter()
        .enumerate()
        .map(|(i, host)| {
            let tally = host.tally();
            vec![
                Cell::number(i + 1),
                Cell::text(&host.host),
                Cell::text(host.benchmark()),
                Cell::number(tally.passed),
                Cell::number(tally.failed),
                Cell::number(tally.warning),
                Cell::number(tally.total()),
            ]
        })
        .collect();

    Sheet {
        name: SUMMARY_SHEET_NAME.to_string(),
        host: None,
        columns,
        rows,
    }
}

fn host_sheet(host: &HostReport, name: String, styles: &dyn StyleResolver) -> Sheet {
    let columns = HOST_SHEET_HEADERS
        .iter()
        .enumerate()
        .map(|(i, title)| Column {
            title: title.to_string(),
            width: host_column_width(i, title),
        })
        .collect();

    let rows = host
        .records
        .iter()
        .map(|record| {
            let mut row: Vec<Cell> = record_columns(record).into_iter().map(Cell::text).collect();
            row[RESULT_COLUMN].style = styles.status_style(record.status);
            row
        })
        .collect();

    Sheet {
        name,
        host: Some(host.host.clone()),
        columns,
        rows,
    }
}

/// Cell texts of one record, in [`HOST_SHEET_HEADERS`] order.
pub fn record_columns(record: &ComplianceCheckRecord) -> [&str; 8] {
    [
        &record.check_name,
        record.status.as_str(),
        &record.details,
        &record.policy_value,
        &record.actual_value,
        &record.solution,
        &record.profile,
        &record.reference,
    ]
}

fn host_column_width(index: usize, title: &str) -> f64 {
    match index {
        0 => 30.0,
        2 => 80.0,
        3 | 4 => 50.0,
        5 => 35.0,
        7 => 40.0,
        _ => (title.len() as f64 * 1.3).floor(),
    }
}

/// Hands out valid, case-insensitively unique worksheet names.
#[derive(Debug, Default)]
struct SheetNamer {
    used: HashSet<String>,
}

impl SheetNamer {
    fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_lowercase());
    }

    fn name_for(&mut self, host: &str) -> String {
        let base = sanitize_sheet_name(&format!("{host} Issues"));
        let mut candidate = base.clone();
        let mut n = 2;
        while self.used.contains(&candidate.to_lowercase()) {
            let suffix = format!("~{n}");
            let keep = MAX_SHEET_NAME_CHARS - suffix.chars().count();
            candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
            n += 1;
        }
        self.reserve(&candidate);
        candidate
    }
}

/// Replace characters Excel rejects in sheet names and cut to 31 characters.
pub fn sanitize_sheet_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let trimmed = cleaned.trim_matches('\'');
    if trimmed.trim().is_empty() {
        "Host".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Artifact format of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }

    /// Output file used when none is given.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "Compliance_Summary.xlsx",
            OutputFormat::Csv => "Compliance_Summary.csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ComplianceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xlsx" => Ok(OutputFormat::Xlsx),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(ComplianceError::Config(format!(
                "unknown output format '{other}' (expected xlsx or csv)"
            ))),
        }
    }
}

/// Writes an [`AggregationState`] to disk in the chosen format.
pub struct ReportWriter {
    format: OutputFormat,
    font_name: String,
    styles: Box<dyn StyleResolver>,
}

impl ReportWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            font_name: DEFAULT_FONT.to_string(),
            styles: Box::new(PlainStyles),
        }
    }

    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        self
    }

    pub fn with_styles(mut self, styles: Box<dyn StyleResolver>) -> Self {
        self.styles = styles;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn layout(&self, state: &AggregationState) -> ReportLayout {
        ReportLayout::build(state, self.styles.as_ref())
    }

    pub fn write(&self, state: &AggregationState, destination: &Path) -> Result<()> {
        match self.format {
            OutputFormat::Xlsx => {
                xlsx::write_xlsx(destination, &self.layout(state), &self.font_name)?
            }
            OutputFormat::Csv => csv::write_csv(destination, state)?,
        }
        obs::emit_report_written(destination, self.format.as_str(), state.len());
        Ok(())
    }
}
