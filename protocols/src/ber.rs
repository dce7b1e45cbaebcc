//! Just enough ASN.1 BER to build and read SNMP messages.

use crate::PacketError;

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_NULL: u8 = 0x05;
pub const TAG_OID: u8 = 0x06;
pub const TAG_SEQUENCE: u8 = 0x30;

pub fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 4);
    out.push(tag);
    encode_length(content.len(), &mut out);
    out.extend_from_slice(content);
    out
}

fn encode_length(len: usize, out: &mut Vec<u8>) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

/// Minimal two's complement encoding.
pub fn integer(value: i32) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < 3 {
        let redundant_zero = bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0;
        let redundant_ones = bytes[start] == 0xff && bytes[start + 1] & 0x80 != 0;
        if !(redundant_zero || redundant_ones) {
            break;
        }
        start += 1;
    }
    tlv(TAG_INTEGER, &bytes[start..])
}

pub fn oid(arcs: &[u32]) -> Vec<u8> {
    let mut content = Vec::new();
    if let [first, second, rest @ ..] = arcs {
        content.push((first * 40 + second) as u8);
        for arc in rest {
            encode_base128(*arc, &mut content);
        }
    }
    tlv(TAG_OID, &content)
}

fn encode_base128(mut value: u32, out: &mut Vec<u8>) {
    let mut stack = [0u8; 5];
    let mut n = 0;
    loop {
        stack[n] = (value & 0x7f) as u8;
        n += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        out.push(stack[i] | continuation);
    }
}

/// Forward-only reader over a BER buffer.
pub struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Reads any element and returns its tag and content.
    pub fn any(&mut self) -> Result<(u8, &'a [u8]), PacketError> {
        let (&tag, rest) = self
            .buf
            .split_first()
            .ok_or(PacketError::Truncated { needed: 1 })?;
        let (len, rest) = decode_length(rest)?;
        if rest.len() < len {
            return Err(PacketError::Truncated {
                needed: len - rest.len(),
            });
        }
        let (content, remaining) = rest.split_at(len);
        self.buf = remaining;
        Ok((tag, content))
    }

    pub fn expect(&mut self, expected: u8) -> Result<&'a [u8], PacketError> {
        let (found, content) = self.any()?;
        if found != expected {
            return Err(PacketError::UnexpectedTag { expected, found });
        }
        Ok(content)
    }

    pub fn integer(&mut self) -> Result<i32, PacketError> {
        let content = self.expect(TAG_INTEGER)?;
        decode_integer(content)
    }
}

fn decode_length(buf: &[u8]) -> Result<(usize, &[u8]), PacketError> {
    let (&first, rest) = buf
        .split_first()
        .ok_or(PacketError::Truncated { needed: 1 })?;
    if first & 0x80 == 0 {
        return Ok((first as usize, rest));
    }

    let count = (first & 0x7f) as usize;
    if count == 0 || count > std::mem::size_of::<usize>() {
        return Err(PacketError::BadLength);
    }
    if rest.len() < count {
        return Err(PacketError::Truncated {
            needed: count - rest.len(),
        });
    }
    let len = rest[..count]
        .iter()
        .fold(0usize, |acc, b| (acc << 8) | *b as usize);
    Ok((len, &rest[count..]))
}

fn decode_integer(content: &[u8]) -> Result<i32, PacketError> {
    if content.is_empty() {
        return Err(PacketError::Truncated { needed: 1 });
    }
    if content.len() > 4 {
        return Err(PacketError::IntegerOverflow);
    }
    let negative = content[0] & 0x80 != 0;
    let init: i32 = if negative { -1 } else { 0 };
    Ok(content.iter().fold(init, |acc, b| (acc << 8) | *b as i32))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
