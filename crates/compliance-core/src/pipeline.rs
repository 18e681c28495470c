//! End-to-end conversion: read every input in order, fold, then write once.
//!
//! All inputs are parsed and aggregated before anything is written, so a
//! missing or malformed input aborts the run without leaving an artifact.

use std::path::{Path, PathBuf};

use crate::aggregate::AggregationState;
use crate::config::ReportConfig;
use crate::document::ScanDocument;
use crate::domain::{ComplianceError, Result};
use crate::obs::{self, InputSpan};
use crate::reporting::{sha256_hex, write_run_summary_json, InputSummary, RunSummary};

/// What a successful conversion produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutcome {
    pub output: PathBuf,
    pub hosts: usize,
    pub records: usize,
    pub inputs: Vec<InputSummary>,
    pub summary_path: Option<PathBuf>,
}

/// Parse and fold every input, in order, into one state.
pub fn aggregate_inputs(
    inputs: &[PathBuf],
    config: &ReportConfig,
) -> Result<(AggregationState, Vec<InputSummary>)> {
    if inputs.is_empty() {
        return Err(ComplianceError::NoInputs);
    }

    let extractor = config.extractor();
    let aggregator = config.aggregator();
    let mut state = AggregationState::new();
    let mut summaries = Vec::with_capacity(inputs.len());

    for path in inputs {
        let _span = InputSpan::enter(path);
        let (doc, bytes) = ScanDocument::load_with_bytes(path)?;

        let scans: Vec<_> = extractor.extract_hosts(&doc).collect();
        let hosts = scans.len();
        let records = scans.iter().map(|s| s.records.len()).sum();
        obs::emit_input_parsed(path, hosts, records);

        state = aggregator.fold_scan(state, scans);
        summaries.push(InputSummary {
            path: path.display().to_string(),
            sha256: sha256_hex(&bytes),
            hosts,
            records,
        });
    }

    Ok((state, summaries))
}

/// Convert `inputs` into a report at `destination`.
pub fn convert(
    inputs: &[PathBuf],
    config: &ReportConfig,
    destination: &Path,
) -> Result<ConversionOutcome> {
    let (state, summaries) = aggregate_inputs(inputs, config)?;

    config.report_writer().write(&state, destination)?;

    let summary_path = match &config.summary_json {
        Some(path) => {
            let summary = RunSummary::new(
                config.merge_policy,
                destination,
                summaries.clone(),
                &state,
            );
            write_run_summary_json(path, &summary).map_err(|e| ComplianceError::FileWrite {
                path: path.clone(),
                detail: format!("{e:#}"),
            })?;
            obs::emit_summary_written(path);
            Some(path.clone())
        }
        None => None,
    };

    Ok(ConversionOutcome {
        output: destination.to_path_buf(),
        hosts: state.len(),
        records: state.record_count(),
        inputs: summaries,
        summary_path,
    })
}
