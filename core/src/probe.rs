//! # Network Probe
//!
//! In-process reachability checks. Each protocol's [`ProbeStrategy`] picks
//! the transport:
//!
//! * [`tcp`]: handshake, then an optional read of the server greeting.
//! * [`udp`]: one SNMP GetRequest, any matching reply counts.
//!
//! No failure leaves this module as an error: resolution problems, refused
//! connections and malformed targets all become a [`ProbeOutcome`].

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use reachr_common::network::host::Host;
use reachr_common::network::protocol::{ProbeStrategy, Protocol};
use reachr_common::probing::{Probe, ProbeOutcome, ProbeStatus};
use reachr_protocols::snmp::DEFAULT_COMMUNITY;

mod tcp;
mod udp;

/// What a single attempt concluded, before timing is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Verdict {
    pub status: ProbeStatus,
    pub detail: String,
}

impl Verdict {
    pub fn new(status: ProbeStatus, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn success(detail: impl Into<String>) -> Self {
        Self::new(ProbeStatus::Success, detail)
    }

    pub fn timeout(budget: Duration) -> Self {
        Self::new(
            ProbeStatus::Timeout,
            format!("no response within {}ms", budget.as_millis()),
        )
    }
}

/// Native probe. Stateless apart from its settings, so one instance serves
/// every worker.
#[derive(Debug, Clone)]
pub struct NetworkProbe {
    port_overrides: HashMap<Protocol, u16>,
    community: String,
}

impl NetworkProbe {
    pub fn new() -> Self {
        Self {
            port_overrides: HashMap::new(),
            community: DEFAULT_COMMUNITY.to_string(),
        }
    }

    pub fn with_port(mut self, protocol: Protocol, port: u16) -> Self {
        self.port_overrides.insert(protocol, port);
        self
    }

    pub fn with_ports(mut self, overrides: &HashMap<Protocol, u16>) -> Self {
        self.port_overrides.extend(overrides);
        self
    }

    /// SNMP community string used by the UDP probe.
    pub fn with_community(mut self, community: impl Into<String>) -> Self {
        self.community = community.into();
        self
    }

    pub fn port_for(&self, protocol: Protocol) -> u16 {
        self.port_overrides
            .get(&protocol)
            .copied()
            .unwrap_or_else(|| protocol.default_port())
    }

    async fn attempt(&self, host: &Host, protocol: Protocol, deadline: Instant) -> Verdict {
        if !host.is_well_formed() {
            return Verdict::new(ProbeStatus::Error, format!("malformed target '{host}'"));
        }

        let port = self.port_for(protocol);
        let addr = match resolve(host, port, deadline).await {
            Ok(addr) => addr,
            Err(verdict) => return verdict,
        };

        match protocol.strategy() {
            ProbeStrategy::TcpConnect { read_banner } => {
                tcp::connect(addr, read_banner, deadline).await
            }
            ProbeStrategy::UdpRequest => udp::snmp_get(addr, &self.community, deadline).await,
        }
    }
}

impl Default for NetworkProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for NetworkProbe {
    async fn probe(&self, host: &Host, protocol: Protocol, timeout: Duration) -> ProbeOutcome {
        let started = Instant::now();
        let deadline = started + timeout;

        let verdict = match tokio::time::timeout_at(deadline, self.attempt(host, protocol, deadline)).await {
            Ok(verdict) => verdict,
            Err(_) => Verdict::timeout(timeout),
        };

        ProbeOutcome::new(
            host.clone(),
            protocol,
            verdict.status,
            verdict.detail,
            started.elapsed(),
        )
    }
}

async fn resolve(host: &Host, port: u16, deadline: Instant) -> Result<SocketAddr, Verdict> {
    if let Some(ip) = host.ip() {
        return Ok(SocketAddr::new(ip, port));
    }

    let lookup = tokio::net::lookup_host((host.as_str(), port));
    match tokio::time::timeout_at(deadline, lookup).await {
        Ok(Ok(mut addrs)) => addrs.next().ok_or_else(|| {
            Verdict::new(
                ProbeStatus::Unreachable,
                format!("DNS resolution failed: no addresses for {host}"),
            )
        }),
        Ok(Err(e)) => Err(Verdict::new(
            ProbeStatus::Unreachable,
            format!("DNS resolution failed: {e}"),
        )),
        Err(_) => Err(Verdict::new(
            ProbeStatus::Timeout,
            format!("DNS resolution for {host} timed out"),
        )),
    }
}

/// Maps a transport error onto an outcome status.
pub(crate) fn classify(err: &io::Error) -> Verdict {
    use io::ErrorKind::*;

    let status = match err.kind() {
        ConnectionRefused | ConnectionReset | ConnectionAborted | HostUnreachable
        | NetworkUnreachable | AddrNotAvailable => ProbeStatus::Unreachable,
        TimedOut => ProbeStatus::Timeout,
        _ => ProbeStatus::Error,
    };

    let detail = match err.kind() {
        ConnectionRefused => "connection refused".to_string(),
        HostUnreachable => "no route to host".to_string(),
        NetworkUnreachable => "network unreachable".to_string(),
        PermissionDenied => format!("permission denied: {err}"),
        _ => err.to_string(),
    };

    Verdict::new(status, detail)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use reachr_protocols::snmp::{GetResponse, Version, parse_request};
    use tokio::io::AsyncWriteExt;
    use tokio::net::{TcpListener, UdpSocket};

    fn host(s: &str) -> Host {
        Host::parse(s).unwrap()
    }

    #[test]
    fn error_kinds_map_to_statuses() {
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert_eq!(classify(&refused).status, ProbeStatus::Unreachable);
        assert_eq!(classify(&refused).detail, "connection refused");

        let timed_out = io::Error::from(io::ErrorKind::TimedOut);
        assert_eq!(classify(&timed_out).status, ProbeStatus::Timeout);

        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        let verdict = classify(&denied);
        assert_eq!(verdict.status, ProbeStatus::Error);
        assert!(verdict.detail.starts_with("permission denied"));

        let other = io::Error::other("boom");
        assert_eq!(classify(&other).status, ProbeStatus::Error);
    }

    #[test]
    fn port_overrides_fall_back_to_defaults() {
        let probe = NetworkProbe::new().with_port(Protocol::Ssh, 2222);
        assert_eq!(probe.port_for(Protocol::Ssh), 2222);
        assert_eq!(probe.port_for(Protocol::Snmp), 161);
    }

    #[tokio::test]
    async fn malformed_target_is_an_error() {
        let outcome = NetworkProbe::new()
            .probe(&host("10.0.0.1 && reboot"), Protocol::Ssh, Duration::from_secs(1))
            .await;
        assert_eq!(outcome.status(), ProbeStatus::Error);
        assert!(outcome.detail().contains("malformed target"));
    }

    #[tokio::test]
    async fn ssh_banner_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(b"SSH-2.0-reachr_test\r\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
        });

        let outcome = NetworkProbe::new()
            .with_port(Protocol::Ssh, port)
            .probe(&host("127.0.0.1"), Protocol::Ssh, Duration::from_secs(2))
            .await;

        assert_eq!(outcome.status(), ProbeStatus::Success);
        assert!(outcome.detail().contains("SSH-2.0-reachr_test"), "{}", outcome.detail());
        assert_eq!(outcome.host().as_str(), "127.0.0.1");
    }

    #[tokio::test]
    async fn closed_tcp_port_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let outcome = NetworkProbe::new()
            .with_port(Protocol::Ssh, port)
            .probe(&host("127.0.0.1"), Protocol::Ssh, Duration::from_secs(2))
            .await;

        assert_eq!(outcome.status(), ProbeStatus::Unreachable);
        assert_eq!(outcome.detail(), "connection refused");
    }

    #[tokio::test]
    async fn ssh_port_without_greeting_still_counts_as_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(1)).await;
        });

        let outcome = NetworkProbe::new()
            .with_port(Protocol::Ssh, port)
            .probe(&host("127.0.0.1"), Protocol::Ssh, Duration::from_millis(300))
            .await;

        assert_eq!(outcome.status(), ProbeStatus::Success);
        assert!(outcome.detail().ends_with("no banner"), "{}", outcome.detail());
    }

    #[tokio::test]
    async fn snmp_agent_reply_is_success() {
        let agent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = agent.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut buf = [0u8; 1500];
            let (n, peer) = agent.recv_from(&mut buf).await.unwrap();
            let request = parse_request(&buf[..n]).unwrap();
            assert_eq!(request.version, Version::V1);
            // A stray datagram first; the probe must skip it.
            agent.send_to(b"noise", peer).await.unwrap();
            let reply = GetResponse {
                request_id: request.request_id,
                error_status: 0,
                sys_descr: Some("Linux edge-rt01 6.1.0".to_string()),
            }
            .encode(request.version, &request.community);
            agent.send_to(&reply, peer).await.unwrap();
        });

        let outcome = NetworkProbe::new()
            .with_port(Protocol::Snmp, port)
            .probe(&host("127.0.0.1"), Protocol::Snmp, Duration::from_secs(2))
            .await;

        assert_eq!(outcome.status(), ProbeStatus::Success);
        assert_eq!(outcome.detail(), "agent responded: Linux edge-rt01 6.1.0");
    }

    #[tokio::test]
    async fn silent_snmp_agent_times_out() {
        let agent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = agent.local_addr().unwrap().port();

        let timeout = Duration::from_millis(300);
        let outcome = NetworkProbe::new()
            .with_port(Protocol::Snmp, port)
            .probe(&host("127.0.0.1"), Protocol::Snmp, timeout)
            .await;

        assert_eq!(outcome.status(), ProbeStatus::Timeout);
        assert!(outcome.latency() < timeout + Duration::from_millis(200));
        drop(agent);
    }

    #[tokio::test]
    async fn closed_udp_port_is_unreachable() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = socket.local_addr().unwrap().port();
        drop(socket);

        let outcome = NetworkProbe::new()
            .with_port(Protocol::Snmp, port)
            .probe(&host("127.0.0.1"), Protocol::Snmp, Duration::from_secs(2))
            .await;

        assert_eq!(outcome.status(), ProbeStatus::Unreachable);
        assert_eq!(outcome.detail(), "port unreachable (ICMP)");
    }

    #[tokio::test]
    #[ignore]
    async fn unresolvable_name_is_unreachable() {
        let outcome = NetworkProbe::new()
            .probe(&host("no-such-host.invalid"), Protocol::Ssh, Duration::from_secs(5))
            .await;
        assert_eq!(outcome.status(), ProbeStatus::Unreachable);
        assert!(outcome.detail().starts_with("DNS resolution failed"));
    }

    #[tokio::test]
    #[ignore]
    async fn blackholed_address_times_out() {
        let timeout = Duration::from_millis(300);
        let outcome = NetworkProbe::new()
            .probe(&host("203.0.113.1"), Protocol::Ssh, timeout)
            .await;
        assert_eq!(outcome.status(), ProbeStatus::Timeout);
        assert!(outcome.latency() < timeout + Duration::from_millis(200));
    }
}
