//! # Probe Dispatcher
//!
//! Runs one probe per host for a single protocol on a bounded pool of
//! workers. Workers pull the next host index from a shared cursor, so the
//! number of probes in flight never exceeds the pool size no matter how long
//! the target list is.
//!
//! Host failures are data: every host ends up with exactly one outcome in the
//! report, whether its probe succeeded, failed, panicked, overran its budget
//! or never started because the run was cancelled.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use reachr_common::ReachError;
use reachr_common::config::{self, Config};
use reachr_common::network::host::Host;
use reachr_common::network::protocol::Protocol;
use reachr_common::network::target::TargetSet;
use reachr_common::probing::{Probe, ProbeOutcome, ProbeStatus, ProtocolReport};

use crate::aggregator::Aggregator;
use crate::cancel::CancelSignal;

/// Headroom on top of the probe timeout before the dispatcher gives up on a
/// probe that ignores its own budget.
pub const ENFORCEMENT_SLACK: Duration = Duration::from_millis(100);

pub type OutcomeHook = Arc<dyn Fn(&ProbeOutcome) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    pub timeout: Duration,
    pub concurrency: usize,
    pub grace_period: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout: config::DEFAULT_TIMEOUT,
            concurrency: config::DEFAULT_CONCURRENCY,
            grace_period: config::DEFAULT_GRACE_PERIOD,
        }
    }
}

impl From<&Config> for DispatchConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            timeout: cfg.timeout,
            concurrency: cfg.concurrency,
            grace_period: cfg.grace_period,
        }
    }
}

pub struct Dispatcher {
    probe: Arc<dyn Probe>,
    config: DispatchConfig,
    cancel: CancelSignal,
    on_outcome: Option<OutcomeHook>,
}

impl Dispatcher {
    pub fn new(probe: Arc<dyn Probe>, config: DispatchConfig) -> Result<Self, ReachError> {
        if config.concurrency == 0 {
            return Err(ReachError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            probe,
            config,
            cancel: CancelSignal::new(),
            on_outcome: None,
        })
    }

    /// Shares an existing cancellation signal, e.g. one wired to Ctrl-C.
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// Called once for every outcome as it is recorded.
    pub fn on_outcome(mut self, hook: OutcomeHook) -> Self {
        self.on_outcome = Some(hook);
        self
    }

    pub fn cancel_signal(&self) -> CancelSignal {
        self.cancel.clone()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Probes every host in `targets` for `protocol`.
    ///
    /// Returns only once every host has an outcome. The report is in target
    /// set order.
    pub async fn dispatch(
        &self,
        targets: &Arc<TargetSet>,
        protocol: Protocol,
    ) -> Result<ProtocolReport, ReachError> {
        let started = Instant::now();
        let aggregator = Arc::new(Aggregator::new(protocol, targets.len()));
        let pool_size = self.config.concurrency.min(targets.len());

        info!(
            "Probing {} hosts for {} with {pool_size} workers",
            targets.len(),
            protocol.name().to_uppercase()
        );

        let ctx = Arc::new(WorkerContext {
            probe: Arc::clone(&self.probe),
            targets: Arc::clone(targets),
            protocol,
            config: self.config,
            cursor: AtomicUsize::new(0),
            aggregator: Arc::clone(&aggregator),
            cancel: self.cancel.clone(),
            on_outcome: self.on_outcome.clone(),
        });

        let mut workers = JoinSet::new();
        for _ in 0..pool_size {
            workers.spawn(run_worker(Arc::clone(&ctx)));
        }
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("Probe worker terminated abnormally: {e}");
            }
        }

        ctx.fill_missing()?;

        let report = aggregator.snapshot()?;
        info!(
            "{} finished in {:.2}s: {}/{} reachable",
            protocol.name().to_uppercase(),
            started.elapsed().as_secs_f64(),
            report.count(ProbeStatus::Success),
            report.len()
        );
        Ok(report)
    }
}

struct WorkerContext {
    probe: Arc<dyn Probe>,
    targets: Arc<TargetSet>,
    protocol: Protocol,
    config: DispatchConfig,
    cursor: AtomicUsize,
    aggregator: Arc<Aggregator>,
    cancel: CancelSignal,
    on_outcome: Option<OutcomeHook>,
}

enum Race {
    Finished(Result<ProbeOutcome, JoinError>),
    Expired,
    Cancelled,
}

async fn run_worker(ctx: Arc<WorkerContext>) {
    loop {
        if ctx.cancel.is_cancelled() {
            break;
        }

        let index = ctx.cursor.fetch_add(1, Ordering::Relaxed);
        let Some(host) = ctx.targets.get(index) else {
            break;
        };

        let outcome = ctx.execute(host.clone()).await;
        ctx.submit(index, outcome);
    }
}

impl WorkerContext {
    async fn execute(&self, host: Host) -> ProbeOutcome {
        let started = Instant::now();
        let probe = Arc::clone(&self.probe);
        let protocol = self.protocol;
        let timeout = self.config.timeout;
        let task_host = host.clone();

        // A separate task keeps a panicking probe from taking the worker down.
        let mut handle =
            tokio::spawn(async move { probe.probe(&task_host, protocol, timeout).await });

        let race = tokio::select! {
            joined = &mut handle => Race::Finished(joined),
            _ = tokio::time::sleep(timeout + ENFORCEMENT_SLACK) => Race::Expired,
            _ = self.cancel.cancelled() => Race::Cancelled,
        };

        match race {
            Race::Finished(joined) => self.settle(host, joined, started),
            Race::Expired => {
                handle.abort();
                ProbeOutcome::new(
                    host,
                    protocol,
                    ProbeStatus::Timeout,
                    format!("no response within {}ms", timeout.as_millis()),
                    started.elapsed(),
                )
            }
            Race::Cancelled => {
                match tokio::time::timeout(self.config.grace_period, &mut handle).await {
                    Ok(joined) => self.settle(host, joined, started),
                    Err(_) => {
                        handle.abort();
                        warn!("Abandoned in-flight probe of {host} after grace period");
                        ProbeOutcome::new(
                            host,
                            protocol,
                            ProbeStatus::Cancelled,
                            "run cancelled, probe abandoned after grace period",
                            started.elapsed(),
                        )
                    }
                }
            }
        }
    }

    fn settle(
        &self,
        host: Host,
        joined: Result<ProbeOutcome, JoinError>,
        started: Instant,
    ) -> ProbeOutcome {
        match joined {
            Ok(outcome) if outcome.host() == &host && outcome.protocol() == self.protocol => outcome,
            Ok(outcome) => ProbeOutcome::new(
                host,
                self.protocol,
                ProbeStatus::Error,
                format!(
                    "probe fault: returned an outcome for {} over {}",
                    outcome.host(),
                    outcome.protocol()
                ),
                started.elapsed(),
            ),
            Err(e) => ProbeOutcome::new(
                host,
                self.protocol,
                ProbeStatus::Error,
                format!("probe fault: {}", fault_message(e)),
                started.elapsed(),
            ),
        }
    }

    fn submit(&self, index: usize, outcome: ProbeOutcome) {
        debug!(
            host = %outcome.host(),
            status = %outcome.status(),
            latency_ms = outcome.latency().as_millis() as u64,
            "{}",
            outcome.detail()
        );
        if let Some(hook) = &self.on_outcome {
            hook(&outcome);
        }
        if let Err(e) = self.aggregator.record(index, outcome) {
            error!("Failed to record outcome: {e}");
        }
    }

    /// Gives every host that never got an outcome a terminal one.
    fn fill_missing(&self) -> Result<(), ReachError> {
        let missing = self.aggregator.missing();
        if missing.is_empty() {
            return Ok(());
        }

        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            warn!(
                "Run cancelled: {} {} hosts were not probed",
                missing.len(),
                self.protocol.name().to_uppercase()
            );
        }

        for index in missing {
            let host = self.targets.get(index).cloned().ok_or(ReachError::SlotOutOfRange {
                index,
                expected: self.targets.len(),
            })?;
            let outcome = if cancelled {
                ProbeOutcome::cancelled(host, self.protocol, "run cancelled before probe started")
            } else {
                ProbeOutcome::new(
                    host,
                    self.protocol,
                    ProbeStatus::Error,
                    "probe fault: worker stopped before recording an outcome",
                    Duration::ZERO,
                )
            };
            self.submit(index, outcome);
        }
        Ok(())
    }
}

fn fault_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
