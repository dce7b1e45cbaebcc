//! SSH identification string handling (RFC 4253, section 4.2).
//!
//! A server sends `SSH-protoversion-softwareversion [comments]\r\n` right
//! after the TCP handshake. It may precede it with other text lines, which
//! clients must ignore.

use crate::PacketError;

/// Identification lines, CR LF included, are at most this long.
pub const MAX_IDENT_LEN: usize = 255;
/// Stop looking for the identification line after this many bytes.
pub const MAX_PREAMBLE: usize = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    pub proto_version: String,
    pub software: String,
    pub comments: Option<String>,
}

impl Identification {
    pub fn to_line(&self) -> String {
        match &self.comments {
            Some(c) => format!("SSH-{}-{} {}", self.proto_version, self.software, c),
            None => format!("SSH-{}-{}", self.proto_version, self.software),
        }
    }
}

/// Parses one line (without its terminator).
pub fn parse_identification(line: &str) -> Result<Identification, PacketError> {
    let rest = line.strip_prefix("SSH-").ok_or(PacketError::NotSsh)?;
    let (proto_version, tail) = rest.split_once('-').ok_or(PacketError::NotSsh)?;
    if proto_version.is_empty() {
        return Err(PacketError::NotSsh);
    }

    let (software, comments) = match tail.split_once(' ') {
        Some((software, comments)) => (software, Some(comments.trim().to_string())),
        None => (tail, None),
    };
    if software.is_empty() {
        return Err(PacketError::NotSsh);
    }

    Ok(Identification {
        proto_version: proto_version.to_string(),
        software: software.to_string(),
        comments: comments.filter(|c| !c.is_empty()),
    })
}

/// Scans the complete lines in `buf` for an identification line.
///
/// Returns `None` while more data is needed.
pub fn find_identification(buf: &[u8]) -> Option<Result<Identification, PacketError>> {
    let mut start = 0;
    while let Some(offset) = buf[start..].iter().position(|b| *b == b'\n') {
        let raw = &buf[start..start + offset];
        start += offset + 1;

        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches('\r');
        if line.starts_with("SSH-") {
            if raw.len() + 1 > MAX_IDENT_LEN {
                return Some(Err(PacketError::NotSsh));
            }
            return Some(parse_identification(line));
        }
    }

    if buf.len() >= MAX_PREAMBLE {
        return Some(Err(PacketError::NotSsh));
    }
    None
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
