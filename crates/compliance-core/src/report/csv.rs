//! Flat CSV rendering: one table, a leading `Host` column, hosts in order.
//! A host without checks still gets one row with every other column empty.

use std::path::Path;

use super::{record_columns, HOST_SHEET_HEADERS};
use crate::aggregate::AggregationState;
use crate::domain::{ComplianceError, Result};

pub const HOST_COLUMN: &str = "Host";

pub fn write_csv(path: &Path, state: &AggregationState) -> Result<()> {
    let to_write_error = |detail: String| ComplianceError::FileWrite {
        path: path.to_path_buf(),
        detail,
    };

    let mut writer = ::csv::Writer::from_path(path).map_err(|e| to_write_error(e.to_string()))?;

    let mut header = vec![HOST_COLUMN];
    header.extend(HOST_SHEET_HEADERS);
    writer
        .write_record(&header)
        .map_err(|e| to_write_error(e.to_string()))?;

    for host in state.hosts() {
        if host.is_empty() {
            let mut row = vec![""; HOST_SHEET_HEADERS.len() + 1];
            row[0] = host.host.as_str();
            writer
                .write_record(&row)
                .map_err(|e| to_write_error(e.to_string()))?;
            continue;
        }
        for record in &host.records {
            let mut row = vec![host.host.as_str()];
            row.extend(record_columns(record));
            writer
                .write_record(&row)
                .map_err(|e| to_write_error(e.to_string()))?;
        }
    }

    writer.flush().map_err(|e| to_write_error(e.to_string()))?;
    Ok(())
}
