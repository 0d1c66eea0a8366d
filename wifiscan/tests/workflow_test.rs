//! Auto-connect and discovery workflows.

mod common;

use common::{Call, FakeAdapter, FakeProbe, StaticAddresses, host, script, transcript};
use std::collections::HashSet;
use wifiscan::{
    AccessPoint, AutoConnectStep, ConnectionStatus, Finder, SecurityKind, WifiError,
};

fn known_networks() -> Vec<AccessPoint> {
    vec![
        AccessPoint::new("ap1", 90, SecurityKind::WpaPsk).with_profile(true),
        AccessPoint::new("ap2", 70, SecurityKind::WpaPsk),
        AccessPoint::new("ap3", 50, SecurityKind::Open).with_profile(true),
    ]
}

fn finder(adapter: FakeAdapter, probe: FakeProbe) -> Finder<FakeAdapter, FakeProbe> {
    Finder::new(adapter, probe).with_host_addresses(StaticAddresses::v4(192, 168, 1, 20))
}

#[tokio::test]
async fn test_connect_all_scans_each_known_network() {
    let finder = finder(
        FakeAdapter::new(known_networks()),
        FakeProbe::new([host(1), host(20)]),
    );

    let report = finder.connect_all().await.unwrap();

    assert_eq!(finder.adapter().count(&Call::Disconnect), 3);
    let connected: Vec<String> = finder
        .adapter()
        .connects()
        .into_iter()
        .map(|(name, creds, overwrite)| {
            assert!(creds.reuse_existing_profile);
            assert!(!overwrite);
            name
        })
        .collect();
    assert_eq!(connected, ["ap1", "ap3"]);

    let skipped: Vec<&str> = report.skipped().collect();
    assert_eq!(skipped, ["ap2"]);

    let scans: Vec<(&str, usize)> = report
        .scans()
        .map(|(name, result)| (name, result.count()))
        .collect();
    assert_eq!(scans, [("ap1", 2), ("ap3", 2)]);
    assert_eq!(report.failures(), 0);
}

#[tokio::test]
async fn test_connect_all_continues_after_connect_failure() {
    let finder = finder(
        FakeAdapter::new(known_networks()).failing("ap1", "out of range"),
        FakeProbe::new([host(5)]),
    );

    let report = finder.connect_all().await.unwrap();

    assert_eq!(
        report.steps[0],
        AutoConnectStep::ConnectFailed {
            name: "ap1".into(),
            reason: "out of range".into(),
        }
    );
    assert_eq!(report.failures(), 1);
    let scanned: Vec<&str> = report.scans().map(|(name, _)| name).collect();
    assert_eq!(scanned, ["ap3"]);
}

#[tokio::test]
async fn test_connect_all_tolerates_disconnect_errors() {
    let finder = finder(
        FakeAdapter::new(known_networks()).failing_disconnect(),
        FakeProbe::new([]),
    );

    let report = finder.connect_all().await.unwrap();

    assert_eq!(report.steps.len(), 3);
    assert_eq!(report.scans().count(), 2);
}

#[tokio::test]
async fn test_connect_all_records_scan_failures() {
    let finder = Finder::new(FakeAdapter::new(known_networks()), FakeProbe::new([]))
        .with_host_addresses(StaticAddresses::none());

    let report = finder.connect_all().await.unwrap();

    assert_eq!(report.failures(), 2);
    assert!(report.steps.iter().any(|step| matches!(
        step,
        AutoConnectStep::ScanFailed { name, .. } if name == "ap3"
    )));
}

#[tokio::test]
async fn test_connect_all_report_serializes() {
    let finder = finder(FakeAdapter::new(known_networks()), FakeProbe::new([host(1)]));

    let report = finder.connect_all().await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0]["status"], "scanned");
    assert_eq!(steps[0]["result"]["subnet"], "192.168.1.");
    assert_eq!(steps[0]["result"]["reachable"][0], "192.168.1.1");
    assert_eq!(steps[1]["status"], "skipped");
}

#[tokio::test]
async fn test_discover_connects_when_offline() {
    let finder = finder(
        FakeAdapter::new(known_networks()),
        FakeProbe::new([host(1), host(50), host(254)]),
    );
    let mut input = script("2\n");

    let result = finder.discover(&mut input).await.unwrap();

    assert_eq!(
        result.reachable_set(),
        HashSet::from([host(1), host(50), host(254)])
    );
    let connects = finder.adapter().connects();
    assert_eq!(connects.len(), 1);
    assert_eq!(connects[0].0, "ap3");
    assert_eq!(finder.adapter().count(&Call::Disconnect), 0);
    assert!(transcript(input).contains("Initiating network scan on 192.168.1."));
}

#[tokio::test]
async fn test_discover_keeps_current_network() {
    let finder = finder(
        FakeAdapter::new(known_networks()).connected(),
        FakeProbe::new([host(9)]),
    );
    let mut input = script("n\n");

    let result = finder.discover(&mut input).await.unwrap();

    assert_eq!(result.count(), 1);
    assert!(finder.adapter().connects().is_empty());
    assert_eq!(finder.adapter().count(&Call::Disconnect), 0);
    assert!(transcript(input).contains("do you want to change (y/n)?"));
}

#[tokio::test]
async fn test_discover_switches_network() {
    let finder = finder(
        FakeAdapter::new(known_networks()).connected(),
        FakeProbe::new([]),
    );
    let mut input = script("y\n0\ny\n");

    finder.discover(&mut input).await.unwrap();

    let calls = finder.adapter().calls();
    let disconnect = calls.iter().position(|c| *c == Call::Disconnect).unwrap();
    let connect = calls
        .iter()
        .position(|c| matches!(c, Call::Connect { .. }))
        .unwrap();
    assert!(disconnect < connect);
    assert_eq!(finder.adapter().connects()[0].0, "ap1");
}

#[tokio::test]
async fn test_discover_fails_when_connect_fails() {
    let probe = FakeProbe::new([host(1)]);
    let log = probe.log();
    let finder = finder(
        FakeAdapter::new(known_networks()).failing("ap3", "no DHCP lease"),
        probe,
    );
    let mut input = script("2\n");

    let err = finder
        .discover_from(ConnectionStatus::NotConnected, &mut input)
        .await
        .unwrap_err();

    assert!(matches!(err, WifiError::NotConnected { ref reason } if reason == "no DHCP lease"));
    assert!(log.probed().is_empty());
}

#[tokio::test]
async fn test_discover_without_ipv4() {
    let finder = Finder::new(
        FakeAdapter::new(known_networks()).connected(),
        FakeProbe::new([]),
    )
    .with_host_addresses(StaticAddresses::none());
    let mut input = script("n\n");

    assert!(matches!(
        finder.discover(&mut input).await,
        Err(WifiError::NetworkUnavailable)
    ));
}
