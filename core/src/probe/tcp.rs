use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::trace;

use reachr_common::probing::ProbeStatus;
use reachr_protocols::ssh;

use super::{Verdict, classify};

/// Upper bound on how long a connected peer gets to send its greeting.
const BANNER_WAIT: Duration = Duration::from_secs(2);

pub(super) async fn connect(addr: SocketAddr, read_banner: bool, deadline: Instant) -> Verdict {
    let connect_started = Instant::now();
    let mut stream = match tokio::time::timeout_at(deadline, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return classify(&e),
        Err(_) => {
            return Verdict::new(
                ProbeStatus::Timeout,
                format!(
                    "no answer from {addr} within {}ms",
                    deadline.saturating_duration_since(connect_started).as_millis()
                ),
            );
        }
    };

    if !read_banner {
        return Verdict::success(format!("connected to {addr}"));
    }

    let banner_deadline = deadline.min(Instant::now() + BANNER_WAIT);
    match tokio::time::timeout_at(banner_deadline, read_identification(&mut stream)).await {
        Ok(Some(line)) => Verdict::success(line),
        Ok(None) | Err(_) => Verdict::success(format!("connected to {addr}, no banner")),
    }
}

/// Reads until an SSH identification line shows up, the peer closes, or the
/// preamble limit is hit.
async fn read_identification(stream: &mut TcpStream) -> Option<String> {
    let mut buf: Vec<u8> = Vec::with_capacity(ssh::MAX_IDENT_LEN);
    let mut chunk = [0u8; 512];

    loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        match ssh::find_identification(&buf) {
            Some(Ok(ident)) => return Some(ident.to_line()),
            Some(Err(e)) => {
                trace!("unusable greeting: {e}");
                return None;
            }
            None => continue,
        }
    }
}
