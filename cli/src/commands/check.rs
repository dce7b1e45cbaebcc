use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::{Instrument, error, info, warn};

use reachr_common::config::Config;
use reachr_common::network::protocol::Protocol;
use reachr_common::network::target::TargetSet;
use reachr_common::probing::{Probe, ProbeStatus, ProtocolReport};
use reachr_common::reporting::Reporter;
use reachr_common::source;
use reachr_core::cancel::CancelSignal;
use reachr_core::dispatcher::{DispatchConfig, Dispatcher};
use reachr_core::probe::NetworkProbe;
use reachr_core::report::FileReporter;

use crate::terminal::{colors, print, progress};

pub async fn check(
    file: &Path,
    column: &str,
    protocols: &[Protocol],
    cfg: &Config,
) -> anyhow::Result<()> {
    let raw_hosts: Vec<String> = source::load_hosts(file, column)
        .with_context(|| format!("Could not read hosts from {}", file.display()))?;
    let targets: Arc<TargetSet> = Arc::new(TargetSet::new(raw_hosts)?);
    info!("Loaded {} unique hosts from {}", targets.len(), file.display());

    let reporter = FileReporter::new(cfg.results_dir.clone(), cfg.format);
    reporter.ensure_dir()?;

    let probe: Arc<dyn Probe> = Arc::new(
        NetworkProbe::new()
            .with_ports(&cfg.port_overrides)
            .with_community(cfg.community.clone()),
    );

    let cancel = CancelSignal::new();
    watch_interrupt(cancel.clone());
    let _deadline = cfg.deadline.map(|d| cancel.cancel_after(d));

    let start_time: Instant = Instant::now();
    let mut written: usize = 0;

    for &protocol in protocols {
        let span = progress::protocol_span(protocol, targets.len());
        let dispatcher = Dispatcher::new(probe.clone(), DispatchConfig::from(cfg))?
            .with_cancel(cancel.clone())
            .on_outcome(progress::hook_for(&span));

        let report: ProtocolReport = dispatcher
            .dispatch(&targets, protocol)
            .instrument(span)
            .await?;

        // A failed write for one protocol does not stop the others.
        match reporter.write(&report) {
            Ok(_) => written += 1,
            Err(e) => error!("{e}"),
        }

        print::header(&format!("{} reachability", protocol.name()), cfg.quiet);
        print::report(&report, cfg.quiet);
        print::summary(&report, cfg.quiet);
        print_failures(&report, cfg);
    }

    if cancel.is_cancelled() {
        warn!("Run was cancelled, unfinished hosts are reported as Cancelled");
    }
    run_ends(written, protocols.len(), start_time.elapsed(), cfg);
    Ok(())
}

fn watch_interrupt(cancel: CancelSignal) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling outstanding probes");
            cancel.cancel();
        }
    });
}

fn print_failures(report: &ProtocolReport, cfg: &Config) {
    if cfg.quiet != 1 {
        return;
    }
    // -q hides the per-host table, so still surface hosts that need attention.
    for outcome in report.iter().filter(|o| o.status() != ProbeStatus::Success) {
        print::print(&format!(
            "{} {} {}",
            outcome.host().as_str().color(colors::PRIMARY),
            print::status_colored(outcome.status()),
            outcome.detail()
        ));
    }
}

fn run_ends(written: usize, expected: usize, total_time: Duration, cfg: &Config) {
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let reports: ColoredString = format!("{written}/{expected} reports").bold().green();
    let output: ColoredString = format!(
        "Check Complete: {reports} written to {} in {total_time}",
        cfg.results_dir.display()
    )
    .color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output.to_string());
            print::end_of_program();
        }
        _ => info!("{}", output),
    }
}
