use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::trace;

use reachr_common::probing::ProbeStatus;
use reachr_protocols::snmp::{self, GetRequest};

use super::{Verdict, classify};

/// Requests sent before giving up; the budget is split evenly between them.
const SNMP_ATTEMPTS: u32 = 2;
const MAX_DATAGRAM: usize = 65_535;

pub(super) async fn snmp_get(addr: SocketAddr, community: &str, deadline: Instant) -> Verdict {
    let started = Instant::now();
    let local: SocketAddr = match addr {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };

    let socket = match UdpSocket::bind(local).await {
        Ok(socket) => socket,
        Err(e) => return classify(&e),
    };
    // Connecting lets ICMP port-unreachable surface as ConnectionRefused.
    if let Err(e) = socket.connect(addr).await {
        return classify(&e);
    }

    let request = GetRequest::new().with_community(community);
    let payload = request.encode();
    let per_attempt = deadline.saturating_duration_since(started) / SNMP_ATTEMPTS;
    let mut buf = vec![0u8; MAX_DATAGRAM];

    for attempt in 1..=SNMP_ATTEMPTS {
        if let Err(e) = socket.send(&payload).await {
            return transport_failure(&e);
        }

        let attempt_deadline = if attempt == SNMP_ATTEMPTS {
            deadline
        } else {
            deadline.min(Instant::now() + per_attempt)
        };

        loop {
            let received = tokio::time::timeout_at(attempt_deadline, socket.recv(&mut buf)).await;
            match received {
                Ok(Ok(n)) => match snmp::parse_response(&buf[..n], request.request_id) {
                    Ok(response) => return Verdict::success(describe(&response)),
                    Err(e) => {
                        trace!("ignoring datagram from {addr}: {e}");
                        continue;
                    }
                },
                Ok(Err(e)) => return transport_failure(&e),
                Err(_) => break,
            }
        }
    }

    Verdict::new(
        ProbeStatus::Timeout,
        format!(
            "no SNMP response from {addr} within {}ms (filtered, agent down or community rejected)",
            deadline.saturating_duration_since(started).as_millis()
        ),
    )
}

fn transport_failure(err: &io::Error) -> Verdict {
    if err.kind() == io::ErrorKind::ConnectionRefused {
        return Verdict::new(ProbeStatus::Unreachable, "port unreachable (ICMP)");
    }
    classify(err)
}

fn describe(response: &snmp::GetResponse) -> String {
    match (&response.sys_descr, response.error_status) {
        (Some(descr), 0) if !descr.is_empty() => format!("agent responded: {descr}"),
        (_, 0) => "agent responded".to_string(),
        (_, status) => format!("agent responded with error-status {status}"),
    }
}
