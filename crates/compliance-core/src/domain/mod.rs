//! Domain model: records, per-host reports and the error taxonomy.

pub mod error;
pub mod host;
pub mod record;

pub use error::{ComplianceError, Result};
pub use host::{HostReport, StatusTally};
pub use record::{ComplianceCheckRecord, ComplianceStatus, StatusMap};
