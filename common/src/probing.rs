//! # Probing Model
//!
//! The [`Probe`] trait is the seam between the dispatcher and whatever
//! actually touches the network. Implementations must report every failure
//! through [`ProbeOutcome`] rather than returning an error, and must be safe
//! to call concurrently for different hosts.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::network::host::Host;
use crate::network::protocol::Protocol;

#[async_trait]
pub trait Probe: Send + Sync {
    /// Checks whether `host` answers on the port bound to `protocol`,
    /// giving up after `timeout`.
    async fn probe(&self, host: &Host, protocol: Protocol, timeout: Duration) -> ProbeOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeStatus {
    Success,
    Unreachable,
    Timeout,
    Error,
    /// The run was cancelled before this host's probe started or finished.
    Cancelled,
}

impl ProbeStatus {
    pub const ALL: [ProbeStatus; 5] = [
        ProbeStatus::Success,
        ProbeStatus::Unreachable,
        ProbeStatus::Timeout,
        ProbeStatus::Error,
        ProbeStatus::Cancelled,
    ];

    pub fn is_success(self) -> bool {
        self == ProbeStatus::Success
    }

    pub fn label(self) -> &'static str {
        match self {
            ProbeStatus::Success => "Success",
            ProbeStatus::Unreachable => "Unreachable",
            ProbeStatus::Timeout => "Timeout",
            ProbeStatus::Error => "Error",
            ProbeStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of a single probe. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    host: Host,
    protocol: Protocol,
    status: ProbeStatus,
    detail: String,
    latency: Duration,
}

impl ProbeOutcome {
    pub fn new(
        host: Host,
        protocol: Protocol,
        status: ProbeStatus,
        detail: impl Into<String>,
        latency: Duration,
    ) -> Self {
        Self {
            host,
            protocol,
            status,
            detail: single_line(&detail.into()),
            latency,
        }
    }

    pub fn cancelled(host: Host, protocol: Protocol, detail: impl Into<String>) -> Self {
        Self::new(host, protocol, ProbeStatus::Cancelled, detail, Duration::ZERO)
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn status(&self) -> ProbeStatus {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

/// Folds line breaks, tabs and other control characters into single spaces.
/// Report artifacts carry exactly one line per host.
pub fn single_line(raw: &str) -> String {
    if !raw.chars().any(|c| c.is_control()) {
        return raw.to_string();
    }
    raw.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Outcomes for one protocol, in target set order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolReport {
    protocol: Protocol,
    outcomes: Vec<ProbeOutcome>,
}

impl ProtocolReport {
    pub fn new(protocol: Protocol, outcomes: Vec<ProbeOutcome>) -> Self {
        Self { protocol, outcomes }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn outcomes(&self) -> &[ProbeOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProbeOutcome> {
        self.outcomes.iter()
    }

    pub fn count(&self, status: ProbeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Per-status counts, in [`ProbeStatus::ALL`] order, skipping zeroes.
    pub fn summary(&self) -> Vec<(ProbeStatus, usize)> {
        ProbeStatus::ALL
            .iter()
            .map(|status| (*status, self.count(*status)))
            .filter(|(_, n)| *n > 0)
            .collect()
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
