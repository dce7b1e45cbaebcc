//! SNMP GetRequest for `sysDescr.0`.
//!
//! SNMP rides on UDP, so a bare "connect" says nothing about reachability.
//! The probe sends one GetRequest and treats any well-formed response with a
//! matching request id as proof the agent is reachable. A wrong community is
//! silently dropped by most agents and looks like a timeout from the outside.

use tracing::trace;

use crate::PacketError;
use crate::ber::{self, Reader, TAG_NULL, TAG_OCTET_STRING, TAG_OID, TAG_SEQUENCE};

pub const DEFAULT_COMMUNITY: &str = "public";
pub const SYS_DESCR: [u32; 9] = [1, 3, 6, 1, 2, 1, 1, 1, 0];

const PDU_GET_REQUEST: u8 = 0xa0;
const PDU_GET_RESPONSE: u8 = 0xa2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    #[default]
    V1,
    V2c,
}

impl Version {
    fn wire_value(self) -> i32 {
        match self {
            Version::V1 => 0,
            Version::V2c => 1,
        }
    }

    fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(Version::V1),
            1 => Some(Version::V2c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRequest {
    pub version: Version,
    pub community: String,
    pub request_id: i32,
}

impl GetRequest {
    /// v1 request with the `public` community and a random positive id.
    pub fn new() -> Self {
        Self {
            version: Version::default(),
            community: DEFAULT_COMMUNITY.to_string(),
            request_id: rand::random_range(1..i32::MAX),
        }
    }

    pub fn with_community(mut self, community: impl Into<String>) -> Self {
        self.community = community.into();
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut varbind = ber::oid(&SYS_DESCR);
        varbind.extend(ber::tlv(TAG_NULL, &[]));
        let varbind_list = ber::tlv(TAG_SEQUENCE, &ber::tlv(TAG_SEQUENCE, &varbind));

        let mut pdu = ber::integer(self.request_id);
        pdu.extend(ber::integer(0));
        pdu.extend(ber::integer(0));
        pdu.extend(varbind_list);

        let mut message = ber::integer(self.version.wire_value());
        message.extend(ber::tlv(TAG_OCTET_STRING, self.community.as_bytes()));
        message.extend(ber::tlv(PDU_GET_REQUEST, &pdu));

        ber::tlv(TAG_SEQUENCE, &message)
    }
}

impl Default for GetRequest {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetResponse {
    pub request_id: i32,
    pub error_status: i32,
    /// `sysDescr.0` when the agent returned it as an octet string.
    pub sys_descr: Option<String>,
}

impl GetResponse {
    /// Encodes the reply an agent would send, carrying `sys_descr` when set.
    pub fn encode(&self, version: Version, community: &str) -> Vec<u8> {
        let mut varbind = ber::oid(&SYS_DESCR);
        match &self.sys_descr {
            Some(descr) => varbind.extend(ber::tlv(TAG_OCTET_STRING, descr.as_bytes())),
            None => varbind.extend(ber::tlv(TAG_NULL, &[])),
        }
        let varbind_list = ber::tlv(TAG_SEQUENCE, &ber::tlv(TAG_SEQUENCE, &varbind));

        let mut pdu = ber::integer(self.request_id);
        pdu.extend(ber::integer(self.error_status));
        pdu.extend(ber::integer(0));
        pdu.extend(varbind_list);

        let mut message = ber::integer(version.wire_value());
        message.extend(ber::tlv(TAG_OCTET_STRING, community.as_bytes()));
        message.extend(ber::tlv(PDU_GET_RESPONSE, &pdu));

        ber::tlv(TAG_SEQUENCE, &message)
    }
}

/// Parses a GetRequest, as an agent receiving it would.
pub fn parse_request(payload: &[u8]) -> Result<GetRequest, PacketError> {
    let mut outer = Reader::new(payload);
    let mut message = Reader::new(outer.expect(TAG_SEQUENCE)?);

    let raw_version = message.integer()?;
    let version = Version::from_wire(raw_version).ok_or(PacketError::UnsupportedVersion(raw_version))?;
    let community = String::from_utf8_lossy(message.expect(TAG_OCTET_STRING)?).into_owned();
    let mut pdu = Reader::new(message.expect(PDU_GET_REQUEST)?);
    let request_id = pdu.integer()?;

    Ok(GetRequest {
        version,
        community,
        request_id,
    })
}

/// Parses a GetResponse and checks it answers `request_id`.
pub fn parse_response(payload: &[u8], request_id: i32) -> Result<GetResponse, PacketError> {
    let mut outer = Reader::new(payload);
    let mut message = Reader::new(outer.expect(TAG_SEQUENCE)?);

    let _version = message.integer()?;
    let _community = message.expect(TAG_OCTET_STRING)?;
    let mut pdu = Reader::new(message.expect(PDU_GET_RESPONSE)?);

    let got = pdu.integer()?;
    if got != request_id {
        return Err(PacketError::RequestIdMismatch {
            expected: request_id,
            got,
        });
    }
    let error_status = pdu.integer()?;
    let _error_index = pdu.integer()?;

    let sys_descr = first_octet_string(pdu.expect(TAG_SEQUENCE)?);
    trace!(request_id, error_status, "parsed snmp response");

    Ok(GetResponse {
        request_id: got,
        error_status,
        sys_descr,
    })
}

fn first_octet_string(varbind_list: &[u8]) -> Option<String> {
    let mut list = Reader::new(varbind_list);
    let mut varbind = Reader::new(list.expect(TAG_SEQUENCE).ok()?);
    varbind.expect(TAG_OID).ok()?;
    match varbind.any().ok()? {
        (TAG_OCTET_STRING, value) => Some(collapse_whitespace(&String::from_utf8_lossy(value))),
        _ => None,
    }
}

/// Multi-line descriptions (IOS, JunOS) folded onto one line.
fn collapse_whitespace(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
