//! # Probe Protocols
//!
//! The closed set of protocols a run can check. Each variant carries its
//! well-known port and the strategy used to decide reachability, so adding a
//! protocol means adding a variant here and nothing in the dispatcher.

use std::fmt;
use std::str::FromStr;

use crate::error::ReachError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    Snmp,
    Ssh,
}

/// How a probe establishes that `host:port` answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStrategy {
    /// TCP three-way handshake, optionally followed by reading the server's
    /// greeting line.
    TcpConnect { read_banner: bool },
    /// A single request datagram; any reply counts as reachable.
    UdpRequest,
}

impl Protocol {
    pub const ALL: [Protocol; 2] = [Protocol::Snmp, Protocol::Ssh];

    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Snmp => 161,
            Protocol::Ssh => 22,
        }
    }

    pub fn strategy(self) -> ProbeStrategy {
        match self {
            Protocol::Snmp => ProbeStrategy::UdpRequest,
            Protocol::Ssh => ProbeStrategy::TcpConnect { read_banner: true },
        }
    }

    /// Lowercase identifier, also used as the report artifact name.
    pub fn name(self) -> &'static str {
        match self {
            Protocol::Snmp => "snmp",
            Protocol::Ssh => "ssh",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Protocol {
    type Err = ReachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snmp" => Ok(Protocol::Snmp),
            "ssh" => Ok(Protocol::Ssh),
            _ => Err(ReachError::UnknownProtocol(s.to_string())),
        }
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
