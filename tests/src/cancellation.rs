use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use reachr_common::network::host::Host;
use reachr_common::network::protocol::Protocol;
use reachr_common::network::target::TargetSet;
use reachr_common::probing::{Probe, ProbeOutcome, ProbeStatus};
use reachr_common::reporting::{ReportFormat, Reporter};
use reachr_core::cancel::CancelSignal;
use reachr_core::dispatcher::{DispatchConfig, Dispatcher};
use reachr_core::report::FileReporter;

/// Answers every host after a fixed pause.
struct SlowProbe(Duration);

#[async_trait]
impl Probe for SlowProbe {
    async fn probe(&self, host: &Host, protocol: Protocol, _timeout: Duration) -> ProbeOutcome {
        tokio::time::sleep(self.0).await;
        ProbeOutcome::new(host.clone(), protocol, ProbeStatus::Success, "ok", self.0)
    }
}

fn targets(n: usize) -> Arc<TargetSet> {
    Arc::new(TargetSet::new((1..=n).map(|i| format!("10.1.0.{i}"))).unwrap())
}

/// A run cut short by its deadline lets in-flight probes finish inside the
/// grace period and marks the rest cancelled.
#[tokio::test]
async fn deadline_mid_run() -> anyhow::Result<()> {
    let cancel = CancelSignal::new();
    let dispatcher = Dispatcher::new(
        Arc::new(SlowProbe(Duration::from_millis(300))),
        DispatchConfig {
            timeout: Duration::from_secs(5),
            concurrency: 2,
            grace_period: Duration::from_secs(1),
        },
    )?
    .with_cancel(cancel.clone());

    let _deadline = cancel.cancel_after(Duration::from_millis(450));
    let report = dispatcher.dispatch(&targets(6), Protocol::Ssh).await?;

    assert_eq!(report.len(), 6);
    assert_eq!(report.count(ProbeStatus::Success), 4);
    assert_eq!(report.count(ProbeStatus::Cancelled), 2);
    assert!(report.outcomes()[..4].iter().all(|o| o.status().is_success()));
    assert!(report.outcomes()[4..].iter().all(|o| o.status() == ProbeStatus::Cancelled));
    Ok(())
}

/// Cancelling before dispatch still yields a full report and a written
/// artifact.
#[tokio::test]
async fn cancelled_run_still_reports() -> anyhow::Result<()> {
    let cancel = CancelSignal::new();
    cancel.cancel();

    let dispatcher = Dispatcher::new(Arc::new(SlowProbe(Duration::from_secs(10))), DispatchConfig::default())?
        .with_cancel(cancel);

    let started = Instant::now();
    let report = dispatcher.dispatch(&targets(25), Protocol::Snmp).await?;
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(report.count(ProbeStatus::Cancelled), 25);

    let dir = tempfile::tempdir()?;
    let path = FileReporter::new(dir.path(), ReportFormat::Text).write(&report)?;
    let written = fs::read_to_string(path)?;
    assert_eq!(written.lines().count(), 25);
    assert!(written.lines().next().is_some_and(|l| l.starts_with("IP: 10.1.0.1, SNMP Cancelled")));
    Ok(())
}

/// A probe that ignores its budget is cut off by the dispatcher.
#[tokio::test]
async fn runaway_probe_is_bounded() -> anyhow::Result<()> {
    let dispatcher = Dispatcher::new(
        Arc::new(SlowProbe(Duration::from_secs(30))),
        DispatchConfig {
            timeout: Duration::from_millis(200),
            concurrency: 8,
            grace_period: Duration::from_millis(100),
        },
    )?;

    let started = Instant::now();
    let report = dispatcher.dispatch(&targets(8), Protocol::Ssh).await?;
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(report.count(ProbeStatus::Timeout), 8);
    Ok(())
}
