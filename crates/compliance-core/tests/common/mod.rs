#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Escape text for use inside an XML element.
pub fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// A `ReportItem` carrying every compliance field.
pub fn compliance_item(check: &str, result: &str, info: &str) -> String {
    format!(
        r#"<ReportItem port="0" svc_name="general" protocol="tcp" severity="1" pluginID="21156" pluginName="Unix Compliance Checks" pluginFamily="Policy Compliance">
  <compliance>true</compliance>
  <cm:compliance-check-name>{check}</cm:compliance-check-name>
  <cm:compliance-result>{result}</cm:compliance-result>
  <cm:compliance-info>{info}</cm:compliance-info>
  <cm:compliance-policy-value>expect: ^no$</cm:compliance-policy-value>
  <cm:compliance-actual-value>yes</cm:compliance-actual-value>
  <cm:compliance-solution>Edit /etc/ssh/sshd_config</cm:compliance-solution>
  <cm:compliance-benchmark-profile>Level 1 - Server</cm:compliance-benchmark-profile>
  <cm:compliance-see-also>https://workbench.cisecurity.org/</cm:compliance-see-also>
  <cm:compliance-benchmark-name>CIS Ubuntu Linux 20.04 LTS</cm:compliance-benchmark-name>
  <cm:compliance-benchmark-version>1.1.0</cm:compliance-benchmark-version>
</ReportItem>"#,
        check = xml_escape(check),
        result = xml_escape(result),
        info = xml_escape(info),
    )
}

/// A plain vulnerability finding with no compliance fields.
pub fn plugin_item() -> String {
    r#"<ReportItem port="22" svc_name="ssh" protocol="tcp" severity="0" pluginID="10267" pluginName="SSH Server Type and Version Information" pluginFamily="Service detection">
  <plugin_output>SSH version : SSH-2.0-OpenSSH_8.2p1</plugin_output>
</ReportItem>"#
        .to_string()
}

/// A `ReportHost`. `name` becomes the element attribute, `host_ip` the
/// `host-ip` property; either may be absent.
pub fn report_host(name: Option<&str>, host_ip: Option<&str>, items: &[String]) -> String {
    let name_attr = name
        .map(|n| format!(r#" name="{}""#, xml_escape(n)))
        .unwrap_or_default();
    let ip_tag = host_ip
        .map(|ip| format!(r#"<tag name="host-ip">{ip}</tag>"#))
        .unwrap_or_default();
    format!(
        "<ReportHost{name_attr}>\n<HostProperties>\n<tag name=\"operating-system\">Linux</tag>\n{ip_tag}\n</HostProperties>\n{}\n</ReportHost>",
        items.join("\n")
    )
}

pub fn host(ip: &str, items: &[String]) -> String {
    report_host(Some(ip), Some(ip), items)
}

/// A complete `.nessus` document.
pub fn nessus(hosts: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" ?>
<NessusClientData_v2 xmlns:cm="http://www.nessus.org/cm">
<Policy><policyName>CIS L1</policyName></Policy>
<Report name="Weekly compliance" xmlns:cm="http://www.nessus.org/cm">
{}
</Report>
</NessusClientData_v2>
"#,
        hosts.join("\n")
    )
}

pub fn write_scan(dir: &Path, file_name: &str, xml: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, xml).expect("write scan fixture");
    path
}
