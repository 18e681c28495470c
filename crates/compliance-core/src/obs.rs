//! Structured observability hooks for the conversion lifecycle.
//!
//! This module provides:
//! - An input-scoped tracing span via the `InputSpan` RAII guard
//! - Emission functions for key lifecycle events: input parsed, host
//!   extracted or skipped, host replaced during aggregation, report written
//!
//! Events go through `tracing`; filtering follows `RUST_LOG`.

use std::path::Path;

use tracing::{debug, info, warn};

/// RAII guard that enters a span tagged with the input file being processed.
///
/// # Example
///
/// ```ignore
/// let _span = InputSpan::enter(Path::new("scan.nessus"));
/// // every event emitted here carries input = "scan.nessus"
/// ```
pub struct InputSpan {
    _span: tracing::span::EnteredSpan,
}

impl InputSpan {
    pub fn enter(path: &Path) -> Self {
        let span = tracing::info_span!("compliance.input", input = %path.display());
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: an input document was parsed.
pub fn emit_input_parsed(path: &Path, hosts: usize, records: usize) {
    info!(
        event = "input.parsed",
        input = %path.display(),
        hosts = hosts,
        records = records,
    );
}

/// Emit event: compliance items were extracted for a host.
pub fn emit_host_extracted(host: &str, checks: usize) {
    info!(event = "host.extracted", host = %host, checks = checks);
}

/// Emit event: a `ReportHost` was dropped (warning level).
pub fn emit_host_skipped(position: usize, reason: &str) {
    warn!(event = "host.skipped", position = position, reason = %reason);
}

/// Emit event: a later input replaced or extended a host seen earlier.
pub fn emit_host_replaced(host: &str, policy: &str, previous: usize, current: usize) {
    debug!(
        event = "host.replaced",
        host = %host,
        policy = %policy,
        previous_checks = previous,
        current_checks = current,
    );
}

/// Emit event: the report artifact was written.
pub fn emit_report_written(path: &Path, format: &str, hosts: usize) {
    info!(
        event = "report.written",
        output = %path.display(),
        format = %format,
        hosts = hosts,
    );
}

/// Emit event: the JSON run summary was written.
pub fn emit_summary_written(path: &Path) {
    info!(event = "summary.written", output = %path.display());
}
