use std::fs;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use reachr_common::network::protocol::Protocol;
use reachr_common::network::target::TargetSet;
use reachr_common::probing::{Probe, ProbeStatus};
use reachr_common::reporting::{ReportFormat, Reporter};
use reachr_common::source;
use reachr_core::dispatcher::{DispatchConfig, Dispatcher};
use reachr_core::probe::NetworkProbe;
use reachr_core::report::FileReporter;

use crate::support;

fn config() -> DispatchConfig {
    DispatchConfig {
        timeout: Duration::from_secs(2),
        concurrency: 4,
        grace_period: Duration::from_millis(200),
    }
}

fn inventory(rows: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "name,ansible_host,site").unwrap();
    for (i, row) in rows.iter().enumerate() {
        writeln!(file, "node{i},{row},lab").unwrap();
    }
    file
}

/// CSV inventory in, per-host ssh verdicts out, in file order with
/// duplicates collapsed.
#[tokio::test]
async fn ssh_inventory_to_text_report() {
    let server = support::ssh_server().await;
    let csv = inventory(&["127.0.0.1", " 127.0.0.1 ", "not a host!", "", "127.0.0.1"]);

    let raw = source::load_hosts(csv.path(), "ansible_host").unwrap();
    let targets = Arc::new(TargetSet::new(raw).unwrap());
    assert_eq!(targets.len(), 2);

    let probe: Arc<dyn Probe> = Arc::new(NetworkProbe::new().with_port(Protocol::Ssh, server.port()));
    let report = Dispatcher::new(probe, config())
        .unwrap()
        .dispatch(&targets, Protocol::Ssh)
        .await
        .unwrap();

    assert_eq!(report.len(), 2);
    assert_eq!(report.outcomes()[0].host().as_str(), "127.0.0.1");
    assert_eq!(report.outcomes()[0].status(), ProbeStatus::Success);
    assert!(report.outcomes()[0].detail().starts_with("SSH-2.0-OpenSSH_9.6"));
    assert_eq!(report.outcomes()[1].host().as_str(), "not a host!");
    assert_eq!(report.outcomes()[1].status(), ProbeStatus::Error);

    let dir = tempfile::tempdir().unwrap();
    let reporter = FileReporter::new(dir.path().join("results"), ReportFormat::Text);
    let path = reporter.write(&report).unwrap();
    assert_eq!(path, dir.path().join("results").join("ssh.txt"));

    let written = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("IP: 127.0.0.1, SSH Success: SSH-2.0-OpenSSH_9.6"), "{}", lines[0]);
    assert!(lines[1].starts_with("IP: not a host!, SSH Error:"), "{}", lines[1]);
}

/// Both protocols against the same targets, one artifact each.
#[tokio::test]
async fn every_protocol_gets_its_own_artifact() {
    let ssh = support::ssh_server().await;
    let snmp = support::snmp_agent("lab-ro").await;

    let targets = Arc::new(TargetSet::new(["127.0.0.1"]).unwrap());
    let probe: Arc<dyn Probe> = Arc::new(
        NetworkProbe::new()
            .with_port(Protocol::Ssh, ssh.port())
            .with_port(Protocol::Snmp, snmp.port())
            .with_community("lab-ro"),
    );
    let dispatcher = Dispatcher::new(probe, config()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let reporter = FileReporter::new(dir.path(), ReportFormat::Csv);

    for protocol in Protocol::ALL {
        let report = dispatcher.dispatch(&targets, protocol).await.unwrap();
        assert_eq!(report.protocol(), protocol);
        assert_eq!(report.count(ProbeStatus::Success), 1, "{protocol}: {:?}", report.outcomes());
        reporter.write(&report).unwrap();
    }

    let snmp_csv = fs::read_to_string(dir.path().join("snmp.csv")).unwrap();
    let mut rows = snmp_csv.lines();
    assert_eq!(rows.next(), Some("host,protocol,status,detail,latency_ms"));
    let row = rows.next().unwrap();
    assert!(row.starts_with("127.0.0.1,snmp,Success,"), "{row}");
    assert!(row.contains(support::SYS_DESCR), "{row}");
    assert!(rows.next().is_none());

    assert!(dir.path().join("ssh.csv").exists());
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

/// Agents with a multi-line sysDescr still produce one report line per host.
#[tokio::test]
async fn multi_line_sys_descr_keeps_one_line_per_host() {
    const IOS_DESCR: &str = "Cisco IOS Software, C2960 Software (C2960-LANBASEK9-M), Version 15.0(2)SE11\r\n\
         Technical Support: http://www.cisco.com/techsupport\r\n\
         Copyright (c) 1986-2017 by Cisco Systems, Inc.\r\n";
    let agent = support::snmp_agent_describing("public", IOS_DESCR).await;

    let targets = Arc::new(TargetSet::new(["127.0.0.1", "bad host!"]).unwrap());
    let probe: Arc<dyn Probe> = Arc::new(NetworkProbe::new().with_port(Protocol::Snmp, agent.port()));
    let report = Dispatcher::new(probe, config())
        .unwrap()
        .dispatch(&targets, Protocol::Snmp)
        .await
        .unwrap();
    assert_eq!(report.outcomes()[0].status(), ProbeStatus::Success);

    let dir = tempfile::tempdir().unwrap();
    let path = FileReporter::new(dir.path(), ReportFormat::Text).write(&report).unwrap();
    let written = fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = written.lines().collect();

    assert_eq!(lines.len(), targets.len());
    assert!(lines[0].contains("Version 15.0(2)SE11 Technical Support:"), "{}", lines[0]);
    assert!(lines[1].starts_with("IP: bad host!, SNMP Error:"), "{}", lines[1]);
}

/// A dead port is reported, not raised, and the healthy target beside it
/// still gets its verdict.
#[tokio::test]
async fn refused_host_is_isolated() {
    let closed = support::closed_tcp_port().await;

    let targets = Arc::new(TargetSet::new(["127.0.0.1", "bad host!"]).unwrap());
    let probe: Arc<dyn Probe> = Arc::new(NetworkProbe::new().with_port(Protocol::Ssh, closed));
    let report = Dispatcher::new(probe, config())
        .unwrap()
        .dispatch(&targets, Protocol::Ssh)
        .await
        .unwrap();

    assert_eq!(report.len(), 2);
    assert_eq!(report.outcomes()[0].status(), ProbeStatus::Unreachable);
    assert_eq!(report.outcomes()[1].status(), ProbeStatus::Error);
}

#[test]
fn missing_column_stops_before_probing() {
    let csv = inventory(&["10.0.0.1"]);
    let err = source::load_hosts(csv.path(), "ip_address").unwrap_err();
    assert!(err.to_string().contains("ip_address"), "{err}");
}
