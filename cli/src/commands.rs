pub mod check;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, ensure};
use clap::{ArgAction, Parser};

use reachr_common::config::{self, Config};
use reachr_common::network::protocol::Protocol;
use reachr_common::reporting::ReportFormat;

#[derive(Parser)]
#[command(name = "reachr", version)]
#[command(about = "Checks SNMP and SSH reachability for every host in a CSV inventory.")]
pub struct CommandLine {
    /// Path to the CSV file containing the hosts
    pub file_path: PathBuf,

    /// Name of the column holding IP addresses or hostnames
    pub column_name: String,

    /// Protocols to test
    #[arg(short, long, num_args = 1.., default_values_t = Protocol::ALL.to_vec())]
    pub protocols: Vec<Protocol>,

    /// Seconds to wait for each host before recording a timeout
    #[arg(short, long, value_name = "SECS", default_value_t = 5.0)]
    pub timeout: f64,

    /// Maximum number of probes in flight
    #[arg(short, long, value_name = "N", default_value_t = config::DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Seconds in-flight probes may keep running after the run is cancelled
    #[arg(long, value_name = "SECS", default_value_t = 2.0)]
    pub grace: f64,

    /// Cancel the whole run after this many seconds
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<f64>,

    /// Probe a protocol on a non-standard port, e.g. --port ssh=2222
    #[arg(long = "port", value_name = "PROTO=PORT", value_parser = parse_port_override)]
    pub ports: Vec<(Protocol, u16)>,

    /// SNMP community string
    #[arg(long, default_value = config::DEFAULT_COMMUNITY)]
    pub community: String,

    /// Directory the per-protocol reports are written to
    #[arg(long, env = "REACHR_RESULTS_DIR", default_value = config::DEFAULT_RESULTS_DIR)]
    pub results_dir: PathBuf,

    /// Report format: text or csv
    #[arg(long, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Less output; repeat to also hide headers and summaries
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> anyhow::Result<Config> {
        ensure!(self.concurrency > 0, "--concurrency must be at least 1");

        let deadline = match self.deadline {
            Some(secs) => Some(seconds("--deadline", secs)?),
            None => None,
        };

        Ok(Config {
            timeout: seconds("--timeout", self.timeout)?,
            concurrency: self.concurrency,
            grace_period: Duration::try_from_secs_f64(self.grace)
                .context("--grace must be a non-negative number of seconds")?,
            deadline,
            port_overrides: self.ports.iter().copied().collect::<HashMap<_, _>>(),
            community: self.community.clone(),
            results_dir: self.results_dir.clone(),
            format: self.format,
            quiet: self.quiet,
        })
    }

    /// Selected protocols, duplicates removed, in the order given.
    pub fn protocols(&self) -> Vec<Protocol> {
        let mut selected: Vec<Protocol> = Vec::new();
        for protocol in &self.protocols {
            if !selected.contains(protocol) {
                selected.push(*protocol);
            }
        }
        selected
    }
}

fn seconds(flag: &str, secs: f64) -> anyhow::Result<Duration> {
    ensure!(secs > 0.0, "{flag} must be greater than zero");
    Duration::try_from_secs_f64(secs).with_context(|| format!("{flag} is out of range"))
}

fn parse_port_override(s: &str) -> Result<(Protocol, u16), String> {
    let (name, port) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PROTO=PORT, got '{s}'"))?;
    let protocol: Protocol = name.parse().map_err(|e| format!("{e}"))?;
    let port: u16 = port
        .trim()
        .parse()
        .map_err(|e| format!("invalid port '{port}': {e}"))?;
    if port == 0 {
        return Err("port 0 cannot be probed".to_string());
    }
    Ok((protocol, port))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
