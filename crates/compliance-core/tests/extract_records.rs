mod common;

use std::collections::HashSet;

use common::{compliance_item, host, nessus, plugin_item, report_host};
use compliance_core::{
    AggregationState, Aggregator, ComplianceStatus, RecordExtractor, ReportConfig, ScanDocument,
    StatusMap, TextPolicy,
};

fn parse(xml: &str) -> ScanDocument {
    ScanDocument::parse(xml.as_bytes()).expect("fixture parses")
}

#[test]
fn extracts_every_field_of_a_compliance_item() {
    let doc = parse(&nessus(&[host(
        "10.0.0.5",
        &[compliance_item(
            "5.2.8 Ensure SSH root login is disabled",
            "FAILED",
            "The PermitRootLogin parameter specifies if root can log in",
        )],
    )]));

    let records: Vec<_> = RecordExtractor::default().records(&doc).collect();
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!(r.host, "10.0.0.5");
    assert_eq!(r.check_name, "5.2.8 Ensure SSH root login is disabled");
    assert_eq!(r.status, ComplianceStatus::Failed);
    assert_eq!(
        r.details,
        "The PermitRootLogin parameter specifies if root can log in"
    );
    assert_eq!(r.policy_value, "expect: ^no$");
    assert_eq!(r.actual_value, "yes");
    assert_eq!(r.solution, "Edit /etc/ssh/sshd_config");
    assert_eq!(r.profile, "Level 1 - Server");
    assert_eq!(r.reference, "https://workbench.cisecurity.org/");
    assert_eq!(r.benchmark, "CIS Ubuntu Linux 20.04 LTS v1.1.0");
}

#[test]
fn host_sheet_count_matches_distinct_hosts() {
    let doc = parse(&nessus(&[
        host("10.0.0.1", &[compliance_item("1.1", "PASSED", "")]),
        host("10.0.0.2", &[compliance_item("1.1", "FAILED", "")]),
        host("10.0.0.3", &[plugin_item()]),
        host("10.0.0.1", &[compliance_item("1.2", "PASSED", "")]),
    ]));

    let extractor = RecordExtractor::default();
    let distinct: HashSet<_> = extractor.extract_hosts(&doc).map(|s| s.host).collect();
    let state = Aggregator::default().fold_scan(AggregationState::new(), extractor.extract_hosts(&doc));

    assert_eq!(distinct.len(), 3);
    assert_eq!(state.len(), distinct.len());
    let names: Vec<_> = state
        .get("10.0.0.1")
        .unwrap()
        .records
        .iter()
        .map(|r| r.check_name.as_str())
        .collect();
    assert_eq!(names, vec!["1.1", "1.2"]);
}

#[test]
fn status_is_always_one_of_three_values() {
    let results = ["PASSED", "FAILED", "WARNING", "ERROR", "passed", "", "INFO"];
    let items: Vec<_> = results
        .iter()
        .enumerate()
        .map(|(i, result)| compliance_item(&format!("check {i}"), result, ""))
        .collect();
    let doc = parse(&nessus(&[host("10.0.0.5", &items)]));

    let statuses: Vec<_> = RecordExtractor::default()
        .records(&doc)
        .map(|r| r.status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            ComplianceStatus::Passed,
            ComplianceStatus::Failed,
            ComplianceStatus::Warning,
            ComplianceStatus::Warning,
            ComplianceStatus::Warning,
            ComplianceStatus::Warning,
            ComplianceStatus::Warning,
        ]
    );
}

#[test]
fn configured_status_map_overrides_default_collapse() {
    let doc = parse(&nessus(&[host(
        "10.0.0.5",
        &[compliance_item("1.1", "ERROR", "")],
    )]));
    let config = ReportConfig::from_toml_str("[status_map]\nERROR = \"failed\"\n").unwrap();
    let record = config.extractor().records(&doc).next().unwrap();
    assert_eq!(record.status, ComplianceStatus::Failed);

    let custom = RecordExtractor::new(
        StatusMap::default().with_entry("ERROR", ComplianceStatus::Passed),
        TextPolicy::default(),
    );
    assert_eq!(
        custom.records(&doc).next().unwrap().status,
        ComplianceStatus::Passed
    );
}

#[test]
fn host_without_identifier_is_skipped_and_later_hosts_survive() {
    let doc = parse(&nessus(&[
        host("10.0.0.1", &[compliance_item("1.1", "PASSED", "")]),
        report_host(None, None, &[compliance_item("1.1", "FAILED", "")]),
        report_host(Some("  "), None, &[compliance_item("1.1", "FAILED", "")]),
        host("10.0.0.3", &[compliance_item("1.1", "WARNING", "")]),
    ]));

    let hosts: Vec<_> = RecordExtractor::default()
        .extract_hosts(&doc)
        .map(|s| s.host)
        .collect();
    assert_eq!(hosts, vec!["10.0.0.1", "10.0.0.3"]);

    let records: Vec<_> = RecordExtractor::default().records(&doc).collect();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.status != ComplianceStatus::Failed));
}

#[test]
fn name_attribute_is_used_when_host_ip_is_missing() {
    let doc = parse(&nessus(&[report_host(
        Some("db01.internal"),
        None,
        &[compliance_item("1.1", "PASSED", "")],
    )]));
    let record = RecordExtractor::default().records(&doc).next().unwrap();
    assert_eq!(record.host, "db01.internal");
}

#[test]
fn missing_fields_default_to_empty_strings() {
    let item = r#"<ReportItem pluginID="21156">
  <cm:compliance-check-name>1.4.1 Ensure bootloader password is set</cm:compliance-check-name>
  <cm:compliance-result>WARNING</cm:compliance-result>
</ReportItem>"#;
    let doc = parse(&nessus(&[host("10.0.0.5", &[item.to_string()])]));
    let record = RecordExtractor::default().records(&doc).next().unwrap();
    assert_eq!(record.check_name, "1.4.1 Ensure bootloader password is set");
    assert_eq!(record.details, "");
    assert_eq!(record.actual_value, "");
    assert_eq!(record.benchmark, "");
}

#[test]
fn special_characters_survive_extraction() {
    let details = r#"Run "grep -E '^\s*PASS_MAX_DAYS' /etc/login.defs" & check < 365"#;
    let doc = parse(&nessus(&[host(
        "10.0.0.5",
        &[compliance_item("5.4.1.1", "FAILED", details)],
    )]));
    let record = RecordExtractor::default().records(&doc).next().unwrap();
    assert_eq!(record.details, details);
}

#[test]
fn multiline_text_is_flattened_unless_raw() {
    let info = "First line.\n    Second   line.";
    let doc = parse(&nessus(&[host(
        "10.0.0.5",
        &[compliance_item("1.1", "PASSED", info)],
    )]));

    let cleaned = RecordExtractor::default().records(&doc).next().unwrap();
    assert_eq!(cleaned.details, "First line.\t Second line.");

    let raw = RecordExtractor::new(StatusMap::default(), TextPolicy::raw())
        .records(&doc)
        .next()
        .unwrap();
    assert_eq!(raw.details, info);
}

#[test]
fn padded_result_strings_fall_back_to_warning() {
    let doc = parse(&nessus(&[host(
        "10.0.0.5",
        &[
            compliance_item("1.1", " PASSED ", ""),
            compliance_item("1.2", "\nFAILED\n", ""),
            compliance_item("1.3", "PASSED", ""),
        ],
    )]));

    let statuses: Vec<_> = RecordExtractor::default()
        .records(&doc)
        .map(|r| r.status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            ComplianceStatus::Warning,
            ComplianceStatus::Warning,
            ComplianceStatus::Passed,
        ]
    );
}
