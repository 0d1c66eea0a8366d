//! Human-readable and JSON rendering of results.

use serde::Serialize;
use std::fmt::Write;

use wifiscan::{AccessPointList, AutoConnectReport, AutoConnectStep, ScanResult};

/// Prints `value` as pretty JSON, or the text produced by `human`.
pub fn emit<T: Serialize>(value: &T, json: bool, human: impl FnOnce() -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", human());
    }
    Ok(())
}

pub fn access_points(list: &AccessPointList) -> String {
    if list.is_empty() {
        return "No access points in range.".to_string();
    }
    list.to_string()
}

pub fn scan_result(result: &ScanResult) -> String {
    let mut out = String::new();
    for host in &result.reachable {
        let _ = writeln!(out, "{host}");
    }
    let _ = write!(
        out,
        "{} of {} hosts on {}0/24 reachable",
        result.count(),
        result.probed,
        result.subnet
    );
    out
}

pub fn auto_connect_report(report: &AutoConnectReport) -> String {
    if report.steps.is_empty() {
        return "No access points in range.".to_string();
    }

    let lines: Vec<String> = report
        .steps
        .iter()
        .map(|step| match step {
            AutoConnectStep::Scanned { name, result } => {
                let hosts: Vec<String> = result.reachable.iter().map(|h| h.to_string()).collect();
                format!(
                    "{name}: {} hosts reachable on {}0/24 [{}]",
                    result.count(),
                    result.subnet,
                    hosts.join(", ")
                )
            }
            AutoConnectStep::Skipped { name } => format!("{name}: skipped, no stored profile"),
            AutoConnectStep::ConnectFailed { name, reason } => {
                format!("{name}: connection failed: {reason}")
            }
            AutoConnectStep::ScanFailed { name, reason } => format!("{name}: scan failed: {reason}"),
        })
        .collect();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use wifiscan::Subnet;

    fn result() -> ScanResult {
        ScanResult {
            subnet: Subnet::parse("192.168.1.").unwrap(),
            reachable: vec![Ipv4Addr::new(192, 168, 1, 1), Ipv4Addr::new(192, 168, 1, 20)],
            probed: 254,
        }
    }

    #[test]
    fn scan_result_lists_hosts_then_total() {
        assert_eq!(
            scan_result(&result()),
            "192.168.1.1\n192.168.1.20\n2 of 254 hosts on 192.168.1.0/24 reachable"
        );
    }

    #[test]
    fn report_has_one_line_per_step() {
        let report = AutoConnectReport {
            steps: vec![
                AutoConnectStep::Scanned {
                    name: "Home".into(),
                    result: result(),
                },
                AutoConnectStep::Skipped { name: "Guest".into() },
                AutoConnectStep::ConnectFailed {
                    name: "Cafe".into(),
                    reason: "network 'Cafe' is not in range".into(),
                },
            ],
        };
        let text = auto_connect_report(&report);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Home: 2 hosts reachable on 192.168.1.0/24 [192.168.1.1, 192.168.1.20]"
        );
        assert_eq!(lines[1], "Guest: skipped, no stored profile");
        assert!(lines[2].starts_with("Cafe: connection failed"));
    }

    #[test]
    fn empty_listing_message() {
        assert_eq!(access_points(&AccessPointList::default()), "No access points in range.");
    }
}
