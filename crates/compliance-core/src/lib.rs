//! Nessus Compliance Reporter core library
//!
//! Reads Nessus compliance audit exports (`.nessus` XML), folds the per-host
//! check results of one or more scans together and writes them out as a
//! spreadsheet report.

pub mod aggregate;
pub mod config;
pub mod document;
pub mod domain;
pub mod extract;
pub mod obs;
pub mod pipeline;
pub mod report;
pub mod reporting;
pub mod telemetry;

pub use aggregate::{AggregationState, Aggregator, MergePolicy};
pub use config::ReportConfig;
pub use document::{Element, ScanDocument};
pub use domain::{
    ComplianceCheckRecord, ComplianceError, ComplianceStatus, HostReport, Result, StatusMap,
    StatusTally,
};
pub use extract::{HostScan, RecordExtractor, TextPolicy};
pub use pipeline::{aggregate_inputs, convert, ConversionOutcome};
pub use report::{
    OutputFormat, PlainStyles, ReportLayout, ReportWriter, StatusColors, StyleResolver,
};
pub use reporting::{write_run_summary_json, InputSummary, RunSummary};
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
