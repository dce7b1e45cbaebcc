use std::net::SocketAddr;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, UdpSocket};

use reachr_protocols::snmp::{self, GetResponse};

pub const BANNER: &str = "SSH-2.0-OpenSSH_9.6 Ubuntu-3ubuntu13";
pub const SYS_DESCR: &str = "Cisco IOS Software, C2960 Software";

/// Loopback SSH lookalike that greets every connection with [`BANNER`].
pub async fn ssh_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = stream.write_all(format!("{BANNER}\r\n").as_bytes()).await;
                let _ = stream.flush().await;
            });
        }
    });
    addr
}

/// Loopback SNMP agent that answers every GetRequest carrying `community`.
pub async fn snmp_agent(community: &'static str) -> SocketAddr {
    snmp_agent_describing(community, SYS_DESCR).await
}

/// Same as [`snmp_agent`], reporting `sys_descr` verbatim.
pub async fn snmp_agent_describing(community: &'static str, sys_descr: &'static str) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    tokio::spawn(async move {
        let mut buf = [0u8; 1500];
        while let Ok((n, peer)) = socket.recv_from(&mut buf).await {
            let Ok(request) = snmp::parse_request(&buf[..n]) else {
                continue;
            };
            if request.community != community {
                continue;
            }
            let reply = GetResponse {
                request_id: request.request_id,
                error_status: 0,
                sys_descr: Some(sys_descr.to_string()),
            }
            .encode(request.version, &request.community);
            let _ = socket.send_to(&reply, peer).await;
        }
    });
    addr
}

/// A loopback port with nothing listening on it.
pub async fn closed_tcp_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
