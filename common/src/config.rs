use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::network::protocol::Protocol;
use crate::reporting::ReportFormat;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CONCURRENCY: usize = 20;
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(2);
pub const DEFAULT_RESULTS_DIR: &str = "connectivity_test_results";
pub const DEFAULT_COMMUNITY: &str = "public";

pub struct Config {
    /// Per-probe budget, covering name resolution, connect and greeting.
    pub timeout: Duration,
    /// Upper bound on probes in flight at once.
    pub concurrency: usize,
    /// How long in-flight probes may keep running after cancellation.
    pub grace_period: Duration,
    /// Cancels the whole run once elapsed.
    pub deadline: Option<Duration>,
    /// Replaces a protocol's well-known port.
    pub port_overrides: HashMap<Protocol, u16>,
    /// SNMP community sent by the UDP probe.
    pub community: String,
    pub results_dir: PathBuf,
    pub format: ReportFormat,
    /// 0 prints everything, 1 drops per-host lines, 2 only the final paths.
    pub quiet: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            grace_period: DEFAULT_GRACE_PERIOD,
            deadline: None,
            port_overrides: HashMap::new(),
            community: DEFAULT_COMMUNITY.to_string(),
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            format: ReportFormat::default(),
            quiet: 0,
        }
    }
}
