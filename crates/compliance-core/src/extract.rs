//! Record extraction from parsed `.nessus` documents.
//!
//! Hosts are the `Report/ReportHost` elements under the document root. A
//! host is identified by its `host-ip` property, falling back to the
//! `ReportHost` `name` attribute; hosts with neither are skipped. Within a
//! host, every `ReportItem` that carries `compliance-*` fields becomes one
//! [`ComplianceCheckRecord`].

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::document::{Element, ScanDocument};
use crate::domain::{ComplianceCheckRecord, ComplianceError, StatusMap};
use crate::obs;

pub const FIELD_CHECK_NAME: &str = "compliance-check-name";
pub const FIELD_RESULT: &str = "compliance-result";
pub const FIELD_INFO: &str = "compliance-info";
pub const FIELD_POLICY_VALUE: &str = "compliance-policy-value";
pub const FIELD_ACTUAL_VALUE: &str = "compliance-actual-value";
pub const FIELD_SOLUTION: &str = "compliance-solution";
pub const FIELD_PROFILE: &str = "compliance-benchmark-profile";
pub const FIELD_SEE_ALSO: &str = "compliance-see-also";
pub const FIELD_BENCHMARK_NAME: &str = "compliance-benchmark-name";
pub const FIELD_BENCHMARK_VERSION: &str = "compliance-benchmark-version";

/// Fields every compliance item is expected to carry.
const EXPECTED_FIELDS: [&str; 8] = [
    FIELD_CHECK_NAME,
    FIELD_RESULT,
    FIELD_INFO,
    FIELD_POLICY_VALUE,
    FIELD_ACTUAL_VALUE,
    FIELD_SOLUTION,
    FIELD_PROFILE,
    FIELD_SEE_ALSO,
];

/// Appended to cell text that had to be cut.
pub const TRUNCATION_MARKER: &str = " [Text Cut Due To Length]";

/// Excel refuses cells over 32 767 characters; stay well under it.
pub const DEFAULT_MAX_CELL_CHARS: usize = 32_000;

/// How raw element text is turned into cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPolicy {
    /// Turn line breaks into tabs, strip outer spaces and collapse
    /// repeated spaces.
    pub clean_whitespace: bool,
    pub max_chars: usize,
}

impl Default for TextPolicy {
    fn default() -> Self {
        Self {
            clean_whitespace: true,
            max_chars: DEFAULT_MAX_CELL_CHARS,
        }
    }
}

impl TextPolicy {
    pub fn raw() -> Self {
        Self {
            clean_whitespace: false,
            ..Self::default()
        }
    }

    pub fn apply(&self, raw: &str) -> String {
        let mut value = if self.clean_whitespace {
            let flattened = raw.replace("\r\n", "\n").replace('\n', "\t");
            repeated_spaces()
                .replace_all(flattened.trim_matches(' '), " ")
                .into_owned()
        } else {
            raw.to_string()
        };

        if let Some((cut, _)) = value.char_indices().nth(self.max_chars) {
            value.truncate(cut);
            value.push_str(TRUNCATION_MARKER);
        }
        value
    }
}

fn repeated_spaces() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(" {2,}").expect("static pattern is valid"))
}

/// All compliance records of one host in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostScan {
    pub host: String,
    pub records: Vec<ComplianceCheckRecord>,
}

/// Walks documents and yields normalized records.
#[derive(Debug, Clone, Default)]
pub struct RecordExtractor {
    status_map: StatusMap,
    ignored_checks: BTreeSet<String>,
    text: TextPolicy,
}

impl RecordExtractor {
    pub fn new(status_map: StatusMap, text: TextPolicy) -> Self {
        Self {
            status_map,
            ignored_checks: BTreeSet::new(),
            text,
        }
    }

    /// Drop records whose check name matches one of `names` exactly.
    pub fn with_ignored_checks<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_checks.extend(names.into_iter().map(Into::into));
        self
    }

    /// Per-host groups in document order, including hosts without any
    /// compliance items. Every call walks the document again.
    pub fn extract_hosts<'a>(
        &'a self,
        doc: &'a ScanDocument,
    ) -> impl Iterator<Item = HostScan> + 'a {
        report_hosts(doc.root())
            .enumerate()
            .filter_map(move |(position, element)| self.extract_host(position, element))
    }

    /// Flat record sequence in document order.
    pub fn records<'a>(
        &'a self,
        doc: &'a ScanDocument,
    ) -> impl Iterator<Item = ComplianceCheckRecord> + 'a {
        self.extract_hosts(doc).flat_map(|scan| scan.records)
    }

    fn extract_host(&self, position: usize, element: &Element) -> Option<HostScan> {
        let Some(host) = host_identifier(element) else {
            obs::emit_host_skipped(position, "missing host identifier");
            return None;
        };

        let records: Vec<_> = element
            .children_named("ReportItem")
            .filter(|item| is_compliance_item(item))
            .filter_map(|item| self.extract_item(&host, item))
            .collect();

        obs::emit_host_extracted(&host, records.len());
        Some(HostScan { host, records })
    }

    fn extract_item(&self, host: &str, item: &Element) -> Option<ComplianceCheckRecord> {
        for field in EXPECTED_FIELDS {
            if item.child(field).is_none() {
                let err = ComplianceError::MissingField {
                    host: host.to_string(),
                    field: field.to_string(),
                };
                debug!(error = %err, "substituting empty value");
            }
        }

        let field = |name: &str| {
            item.child(name)
                .map(|el| self.text.apply(&el.text))
                .unwrap_or_default()
        };

        let check_name = field(FIELD_CHECK_NAME);
        if self.ignored_checks.contains(&check_name) {
            debug!(host = %host, check = %check_name, "ignoring check");
            return None;
        }

        let raw_result = item
            .child(FIELD_RESULT)
            .map(|el| el.text.as_str())
            .unwrap_or("");

        Some(ComplianceCheckRecord {
            host: host.to_string(),
            check_name,
            status: self.status_map.normalize(raw_result),
            details: field(FIELD_INFO),
            policy_value: field(FIELD_POLICY_VALUE),
            actual_value: field(FIELD_ACTUAL_VALUE),
            solution: field(FIELD_SOLUTION),
            profile: field(FIELD_PROFILE),
            reference: field(FIELD_SEE_ALSO),
            benchmark: benchmark_label(&field(FIELD_BENCHMARK_NAME), &field(FIELD_BENCHMARK_VERSION)),
        })
    }
}

fn report_hosts(root: &Element) -> impl Iterator<Item = &Element> {
    root.children_named("Report")
        .flat_map(|report| report.children_named("ReportHost"))
}

fn host_identifier(host: &Element) -> Option<String> {
    let from_properties = host
        .child("HostProperties")
        .into_iter()
        .flat_map(|props| props.children_named("tag"))
        .find(|tag| tag.attribute("name") == Some("host-ip"))
        .map(|tag| tag.text.trim())
        .filter(|ip| !ip.is_empty());

    from_properties
        .or_else(|| host.attribute("name").map(str::trim).filter(|n| !n.is_empty()))
        .map(str::to_string)
}

fn is_compliance_item(item: &Element) -> bool {
    item.children.iter().any(|c| c.name.starts_with("compliance-"))
}

fn benchmark_label(name: &str, version: &str) -> String {
    match (name.is_empty(), version.is_empty()) {
        (true, _) => String::new(),
        (false, true) => name.to_string(),
        (false, false) => format!("{name} v{version}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ComplianceStatus;

    fn doc(xml: &str) -> ScanDocument {
        ScanDocument::parse(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_text_policy_cleans_whitespace() {
        let policy = TextPolicy::default();
        assert_eq!(policy.apply("  a   b\nc  "), "a b\tc");
        assert_eq!(policy.apply("line1\r\nline2"), "line1\tline2");
    }

    #[test]
    fn test_text_policy_strips_only_spaces_at_the_edges() {
        let policy = TextPolicy::default();
        assert_eq!(policy.apply("\nvalue\n"), "\tvalue\t");
        assert_eq!(policy.apply("  \tvalue  "), "\tvalue");
    }

    #[test]
    fn test_padded_result_is_not_a_known_status() {
        let d = doc(r#"<N><Report><ReportHost name="10.0.0.5">
            <ReportItem><compliance-check-name>1.1</compliance-check-name>
              <compliance-result> PASSED </compliance-result></ReportItem>
            <ReportItem><compliance-check-name>1.2</compliance-check-name>
              <compliance-result>
FAILED
</compliance-result></ReportItem>
            <ReportItem><compliance-check-name>1.3</compliance-check-name>
              <compliance-result>FAILED</compliance-result></ReportItem>
            </ReportHost></Report></N>"#);
        let statuses: Vec<_> = RecordExtractor::default()
            .records(&d)
            .map(|r| r.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                ComplianceStatus::Warning,
                ComplianceStatus::Warning,
                ComplianceStatus::Failed,
            ]
        );
    }

    #[test]
    fn test_text_policy_raw_keeps_text() {
        assert_eq!(TextPolicy::raw().apply("  a   b\n"), "  a   b\n");
    }

    #[test]
    fn test_text_policy_truncates_long_text() {
        let policy = TextPolicy {
            clean_whitespace: true,
            max_chars: 5,
        };
        assert_eq!(policy.apply("abcdefgh"), format!("abcde{TRUNCATION_MARKER}"));
        assert_eq!(policy.apply("abcde"), "abcde");
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let policy = TextPolicy {
            clean_whitespace: false,
            max_chars: 2,
        };
        assert_eq!(policy.apply("ééé"), format!("éé{TRUNCATION_MARKER}"));
    }

    #[test]
    fn test_host_ip_property_wins_over_name() {
        let d = doc(r#"<N><Report><ReportHost name="web01">
            <HostProperties><tag name="host-ip">10.0.0.7</tag></HostProperties>
            </ReportHost></Report></N>"#);
        let hosts: Vec<_> = RecordExtractor::default().extract_hosts(&d).collect();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].host, "10.0.0.7");
        assert!(hosts[0].records.is_empty());
    }

    #[test]
    fn test_non_compliance_items_are_ignored() {
        let d = doc(r#"<N><Report><ReportHost name="10.0.0.5">
            <ReportItem pluginID="19506"><plugin_output>scan info</plugin_output></ReportItem>
            <ReportItem pluginID="21156"><compliance-check-name>1.1</compliance-check-name>
              <compliance-result>FAILED</compliance-result></ReportItem>
            </ReportHost></Report></N>"#);
        let records: Vec<_> = RecordExtractor::default().records(&d).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].check_name, "1.1");
        assert_eq!(records[0].status, ComplianceStatus::Failed);
        assert_eq!(records[0].details, "");
    }

    #[test]
    fn test_ignored_checks_are_dropped() {
        let d = doc(r#"<N><Report><ReportHost name="10.0.0.5">
            <ReportItem><compliance-check-name>audit file</compliance-check-name></ReportItem>
            <ReportItem><compliance-check-name>1.2</compliance-check-name></ReportItem>
            </ReportHost></Report></N>"#);
        let extractor = RecordExtractor::default().with_ignored_checks(["audit file"]);
        let names: Vec<_> = extractor.records(&d).map(|r| r.check_name).collect();
        assert_eq!(names, vec!["1.2"]);
    }

    #[test]
    fn test_benchmark_label() {
        assert_eq!(benchmark_label("CIS", "1.0.0"), "CIS v1.0.0");
        assert_eq!(benchmark_label("CIS", ""), "CIS");
        assert_eq!(benchmark_label("", "1.0.0"), "");
    }

    #[test]
    fn test_records_can_be_walked_twice() {
        let d = doc(r#"<N><Report><ReportHost name="10.0.0.5">
            <ReportItem><compliance-check-name>1.1</compliance-check-name></ReportItem>
            </ReportHost></Report></N>"#);
        let extractor = RecordExtractor::default();
        assert_eq!(extractor.records(&d).count(), 1);
        assert_eq!(extractor.records(&d).count(), 1);
    }
}
