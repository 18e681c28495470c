//! Aggregation of compliance records across scan files.
//!
//! Each input is folded into an [`AggregationState`] in command-line order.
//! Records are grouped by host within the input first; each group is then
//! applied to the state according to the [`MergePolicy`]. The default,
//! [`MergePolicy::Overwrite`], is last-write-wins: a host seen in a later
//! file loses every record from earlier files.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{ComplianceCheckRecord, ComplianceError, HostReport};
use crate::extract::HostScan;
use crate::obs;

/// How a host's records from a later input combine with earlier ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Replace the host's records wholesale.
    #[default]
    Overwrite,
    /// Keep one record per check name, newest wins.
    Merge,
    /// Concatenate, keeping duplicates.
    Append,
}

impl MergePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergePolicy::Overwrite => "overwrite",
            MergePolicy::Merge => "merge",
            MergePolicy::Append => "append",
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergePolicy {
    type Err = ComplianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(MergePolicy::Overwrite),
            "merge" => Ok(MergePolicy::Merge),
            "append" => Ok(MergePolicy::Append),
            other => Err(ComplianceError::Config(format!(
                "unknown merge policy '{other}' (expected overwrite, merge or append)"
            ))),
        }
    }
}

/// Host → records, in first-seen host order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationState {
    hosts: Vec<HostReport>,
    index: HashMap<String, usize>,
}

impl AggregationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn get(&self, host: &str) -> Option<&HostReport> {
        self.index.get(host).map(|&i| &self.hosts[i])
    }

    pub fn hosts(&self) -> &[HostReport] {
        &self.hosts
    }

    pub fn record_count(&self) -> usize {
        self.hosts.iter().map(|h| h.records.len()).sum()
    }

    fn apply_group(
        &mut self,
        host: String,
        group: Vec<ComplianceCheckRecord>,
        policy: MergePolicy,
    ) {
        let Some(&slot) = self.index.get(&host) else {
            self.index.insert(host.clone(), self.hosts.len());
            self.hosts.push(HostReport::new(host, group));
            return;
        };

        let existing = &mut self.hosts[slot];
        let previous = existing.records.len();
        match policy {
            MergePolicy::Overwrite => existing.records = group,
            MergePolicy::Append => existing.records.extend(group),
            MergePolicy::Merge => {
                {
                    let incoming: HashSet<&str> =
                        group.iter().map(|r| r.check_name.as_str()).collect();
                    existing
                        .records
                        .retain(|r| !incoming.contains(r.check_name.as_str()));
                }
                existing.records.extend(group);
            }
        }
        obs::emit_host_replaced(&host, policy.as_str(), previous, existing.records.len());
    }
}

/// Folds per-input record sequences into an [`AggregationState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    policy: MergePolicy,
}

impl Aggregator {
    pub fn new(policy: MergePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Fold one input's records into `state`.
    ///
    /// An empty sequence returns `state` unchanged.
    pub fn fold<I>(&self, state: AggregationState, records: I) -> AggregationState
    where
        I: IntoIterator<Item = ComplianceCheckRecord>,
    {
        let mut groups = HostGroups::default();
        for record in records {
            groups.entry(&record.host).push(record);
        }
        self.apply(state, groups)
    }

    /// Fold one input's per-host groups into `state`. Unlike [`fold`], a
    /// host with no compliance items still claims its entry.
    ///
    /// [`fold`]: Aggregator::fold
    pub fn fold_scan<I>(&self, state: AggregationState, scans: I) -> AggregationState
    where
        I: IntoIterator<Item = HostScan>,
    {
        let mut groups = HostGroups::default();
        for scan in scans {
            groups.entry(&scan.host).extend(scan.records);
        }
        self.apply(state, groups)
    }

    fn apply(&self, mut state: AggregationState, groups: HostGroups) -> AggregationState {
        for (host, group) in groups.groups {
            state.apply_group(host, group, self.policy);
        }
        state
    }
}

/// Records of a single input grouped by host, in first-seen order.
#[derive(Default)]
struct HostGroups {
    groups: Vec<(String, Vec<ComplianceCheckRecord>)>,
    index: HashMap<String, usize>,
}

impl HostGroups {
    fn entry(&mut self, host: &str) -> &mut Vec<ComplianceCheckRecord> {
        let slot = match self.index.get(host) {
            Some(&slot) => slot,
            None => {
                self.index.insert(host.to_string(), self.groups.len());
                self.groups.push((host.to_string(), Vec::new()));
                self.groups.len() - 1
            }
        };
        &mut self.groups[slot].1
    }
}
