//! The DNS record model: a tagged union of the record kinds the repository
//! ever produces or reasons about, plus their wire encode/decode.
//!
//! A closed enum rather than one generic RR struct with an opaque RDATA
//! trait object, since the repository needs to pattern-match on kind when
//! deciding known-answer suppression, additional-record synthesis and NSEC
//! bitmap membership.
use std::collections::BTreeSet;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::{WireError, WireResult};
use crate::names::Labels;
use crate::wire::name::{read_name, Compressor};
use crate::wire::ToFromNetworkOrder;

/// Default TTL for address/SRV/NSEC records: 120s.
pub const SHORT_TTL_MS: u32 = 120_000;
/// Default TTL for PTR/TXT records: 75 minutes.
pub const LONG_TTL_MS: u32 = 4_500_000;

const CLASS_IN: u16 = 1;
const CACHE_FLUSH_BIT: u16 = 0x8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum RRType {
    A = 1,
    Ptr = 12,
    Txt = 16,
    Aaaa = 28,
    Srv = 33,
    Nsec = 47,
    Any = 255,
}

impl RRType {
    pub fn code(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for RRType {
    type Error = WireError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(RRType::A),
            12 => Ok(RRType::Ptr),
            16 => Ok(RRType::Txt),
            28 => Ok(RRType::Aaaa),
            33 => Ok(RRType::Srv),
            47 => Ok(RRType::Nsec),
            255 => Ok(RRType::Any),
            other => Err(WireError::UnknownType(other)),
        }
    }
}

impl fmt::Display for RRType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RRType::A => "A",
            RRType::Ptr => "PTR",
            RRType::Txt => "TXT",
            RRType::Aaaa => "AAAA",
            RRType::Srv => "SRV",
            RRType::Nsec => "NSEC",
            RRType::Any => "ANY",
        };
        write!(f, "{}", s)
    }
}

/// Header fields shared by every record kind.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordHeader {
    pub name: Labels,
    pub cache_flush: bool,
    pub ttl_ms: u32,
    /// Wall-clock time (caller-supplied "now", milliseconds) this record was
    /// received at; 0 for locally-generated records.
    pub receipt_time_ms: u64,
}

impl RecordHeader {
    pub fn local(name: Labels, cache_flush: bool, ttl_ms: u32) -> Self {
        RecordHeader {
            name,
            cache_flush,
            ttl_ms,
            receipt_time_ms: 0,
        }
    }

    /// TTL remaining at `now_ms`, per the half-TTL known-answer-suppression
    /// rule. Locally-generated records (`receipt_time_ms == 0`) are always
    /// considered fully fresh.
    pub fn remaining_ttl_ms(&self, now_ms: u64) -> u32 {
        if self.receipt_time_ms == 0 {
            return self.ttl_ms;
        }
        let elapsed = now_ms.saturating_sub(self.receipt_time_ms);
        self.ttl_ms.saturating_sub(elapsed as u32)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TxtEntry {
    pub key: String,
    /// `None` means the key carries no value at all (distinct from
    /// `Some(vec![])`, a key with a zero-length value).
    pub value: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PtrRecord {
    pub header: RecordHeader,
    pub pointer: Labels,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SrvRecord {
    pub header: RecordHeader,
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: Labels,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TxtRecord {
    pub header: RecordHeader,
    pub entries: Vec<TxtEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ARecord {
    pub header: RecordHeader,
    pub addr: Ipv4Addr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AaaaRecord {
    pub header: RecordHeader,
    pub addr: Ipv6Addr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NsecRecord {
    pub header: RecordHeader,
    pub next_domain: Labels,
    pub types: BTreeSet<RRType>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Ptr(PtrRecord),
    Srv(SrvRecord),
    Txt(TxtRecord),
    A(ARecord),
    Aaaa(AaaaRecord),
    Nsec(NsecRecord),
}

impl Record {
    pub fn header(&self) -> &RecordHeader {
        match self {
            Record::Ptr(r) => &r.header,
            Record::Srv(r) => &r.header,
            Record::Txt(r) => &r.header,
            Record::A(r) => &r.header,
            Record::Aaaa(r) => &r.header,
            Record::Nsec(r) => &r.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut RecordHeader {
        match self {
            Record::Ptr(r) => &mut r.header,
            Record::Srv(r) => &mut r.header,
            Record::Txt(r) => &mut r.header,
            Record::A(r) => &mut r.header,
            Record::Aaaa(r) => &mut r.header,
            Record::Nsec(r) => &mut r.header,
        }
    }

    pub fn name(&self) -> &Labels {
        &self.header().name
    }

    pub fn rtype(&self) -> RRType {
        match self {
            Record::Ptr(_) => RRType::Ptr,
            Record::Srv(_) => RRType::Srv,
            Record::Txt(_) => RRType::Txt,
            Record::A(_) => RRType::A,
            Record::Aaaa(_) => RRType::Aaaa,
            Record::Nsec(_) => RRType::Nsec,
        }
    }

    /// Whether this record satisfies a question of `qtype` at the same
    /// name (name matching is the caller's job).
    pub fn matches_qtype(&self, qtype: RRType) -> bool {
        qtype == RRType::Any || qtype == self.rtype()
    }

    /// Rdata-only equality, ignoring name/ttl/cache-flush/receipt time
    /// (used for known-answer suppression and conflict detection, both of
    /// which compare rdata explicitly and TTL/name separately).
    pub fn rdata_eq(&self, other: &Record) -> bool {
        match (self, other) {
            (Record::Ptr(a), Record::Ptr(b)) => a.pointer == b.pointer,
            (Record::Srv(a), Record::Srv(b)) => {
                a.priority == b.priority
                    && a.weight == b.weight
                    && a.port == b.port
                    && a.target == b.target
            }
            (Record::Txt(a), Record::Txt(b)) => a.entries == b.entries,
            (Record::A(a), Record::A(b)) => a.addr == b.addr,
            (Record::Aaaa(a), Record::Aaaa(b)) => a.addr == b.addr,
            (Record::Nsec(a), Record::Nsec(b)) => {
                a.next_domain == b.next_domain && a.types == b.types
            }
            _ => false,
        }
    }

    /// Encodes this record as a resource record (name + type + class +
    /// ttl + rdlength + rdata), compressing names against `compressor`.
    pub fn to_wire(&self, compressor: &mut Compressor, buffer: &mut Vec<u8>) -> WireResult<()> {
        let header = self.header();
        compressor.write_name(&header.name, buffer)?;
        self.rtype().code().to_network_bytes(buffer)?;

        let class = CLASS_IN | if header.cache_flush { CACHE_FLUSH_BIT } else { 0 };
        class.to_network_bytes(buffer)?;
        (header.ttl_ms / 1000).to_network_bytes(buffer)?;

        let rdlength_pos = buffer.len();
        buffer.push(0);
        buffer.push(0);
        let rdata_start = buffer.len();

        match self {
            Record::Ptr(r) => {
                compressor.write_name(&r.pointer, buffer)?;
            }
            Record::Srv(r) => {
                r.priority.to_network_bytes(buffer)?;
                r.weight.to_network_bytes(buffer)?;
                r.port.to_network_bytes(buffer)?;
                compressor.write_name(&r.target, buffer)?;
            }
            Record::Txt(r) => {
                encode_txt(&r.entries, buffer);
            }
            Record::A(r) => {
                r.addr.to_network_bytes(buffer)?;
            }
            Record::Aaaa(r) => {
                r.addr.to_network_bytes(buffer)?;
            }
            Record::Nsec(r) => {
                compressor.write_name(&r.next_domain, buffer)?;
                let codes: BTreeSet<u16> = r.types.iter().map(|t| t.code()).collect();
                buffer.extend_from_slice(&encode_type_bitmap(&codes));
            }
        }

        let rdlength = (buffer.len() - rdata_start) as u16;
        buffer[rdlength_pos] = (rdlength >> 8) as u8;
        buffer[rdlength_pos + 1] = (rdlength & 0xFF) as u8;
        Ok(())
    }

    /// Decodes a resource record starting at `pos` in the full packet
    /// buffer. Returns the record and the offset immediately past it.
    pub fn from_wire(buffer: &[u8], pos: usize, now_ms: u64) -> WireResult<(Record, usize)> {
        let (name, mut pos) = read_name(buffer, pos)?;
        let rtype = RRType::try_from(read_u16(buffer, pos)?)?;
        pos += 2;
        let class_raw = read_u16(buffer, pos)?;
        pos += 2;
        let cache_flush = class_raw & CACHE_FLUSH_BIT != 0;
        let ttl_secs = read_u32(buffer, pos)?;
        pos += 4;
        let rdlength = read_u16(buffer, pos)? as usize;
        pos += 2;
        if pos + rdlength > buffer.len() {
            return Err(WireError::Truncated);
        }
        let rdata_end = pos + rdlength;

        let header = RecordHeader {
            name,
            cache_flush,
            ttl_ms: ttl_secs.saturating_mul(1000),
            receipt_time_ms: now_ms,
        };

        let record = match rtype {
            RRType::Ptr => {
                let (pointer, _) = read_name(buffer, pos)?;
                Record::Ptr(PtrRecord { header, pointer })
            }
            RRType::Srv => {
                let priority = read_u16(buffer, pos)?;
                let weight = read_u16(buffer, pos + 2)?;
                let port = read_u16(buffer, pos + 4)?;
                let (target, _) = read_name(buffer, pos + 6)?;
                Record::Srv(SrvRecord {
                    header,
                    priority,
                    weight,
                    port,
                    target,
                })
            }
            RRType::Txt => {
                let entries = decode_txt(&buffer[pos..rdata_end])?;
                Record::Txt(TxtRecord { header, entries })
            }
            RRType::A => {
                if rdlength != 4 {
                    return Err(WireError::Truncated);
                }
                let addr = Ipv4Addr::new(
                    buffer[pos],
                    buffer[pos + 1],
                    buffer[pos + 2],
                    buffer[pos + 3],
                );
                Record::A(ARecord { header, addr })
            }
            RRType::Aaaa => {
                if rdlength != 16 {
                    return Err(WireError::Truncated);
                }
                let mut octets = [0u8; 16];
                octets.copy_from_slice(&buffer[pos..pos + 16]);
                Record::Aaaa(AaaaRecord {
                    header,
                    addr: Ipv6Addr::from(octets),
                })
            }
            RRType::Nsec => {
                let (next_domain, name_end) = read_name(buffer, pos)?;
                let types = decode_type_bitmap(&buffer[name_end..rdata_end])?
                    .into_iter()
                    .filter_map(|code| RRType::try_from(code).ok())
                    .collect();
                Record::Nsec(NsecRecord {
                    header,
                    next_domain,
                    types,
                })
            }
            RRType::Any => return Err(WireError::UnknownType(RRType::Any.code())),
        };

        Ok((record, rdata_end))
    }
}

fn read_u16(buffer: &[u8], pos: usize) -> WireResult<u16> {
    if pos + 2 > buffer.len() {
        return Err(WireError::Truncated);
    }
    Ok(u16::from_be_bytes([buffer[pos], buffer[pos + 1]]))
}

fn read_u32(buffer: &[u8], pos: usize) -> WireResult<u32> {
    if pos + 4 > buffer.len() {
        return Err(WireError::Truncated);
    }
    Ok(u32::from_be_bytes([
        buffer[pos],
        buffer[pos + 1],
        buffer[pos + 2],
        buffer[pos + 3],
    ]))
}

fn encode_txt(entries: &[TxtEntry], buffer: &mut Vec<u8>) {
    if entries.is_empty() {
        // An empty TXT record is still one zero-length character-string.
        buffer.push(0);
        return;
    }
    for entry in entries {
        let mut cs = entry.key.clone().into_bytes();
        if let Some(value) = &entry.value {
            cs.push(b'=');
            cs.extend_from_slice(value);
        }
        // RFC 6763 caps each character-string at 255 bytes; callers are
        // expected to keep attribute values well under that.
        buffer.push(cs.len() as u8);
        buffer.extend_from_slice(&cs);
    }
}

fn decode_txt(rdata: &[u8]) -> WireResult<Vec<TxtEntry>> {
    let mut entries = Vec::new();
    let mut seen = BTreeSet::new();
    let mut pos = 0usize;
    while pos < rdata.len() {
        let len = rdata[pos] as usize;
        pos += 1;
        if pos + len > rdata.len() {
            return Err(WireError::Truncated);
        }
        let cs = &rdata[pos..pos + len];
        pos += len;
        if cs.is_empty() {
            continue;
        }
        let (key, value) = match cs.iter().position(|&b| b == b'=') {
            Some(eq) => (
                String::from_utf8_lossy(&cs[..eq]).to_string(),
                Some(cs[eq + 1..].to_vec()),
            ),
            None => (String::from_utf8_lossy(cs).to_string(), None),
        };
        // duplicate keys keep only the first on decode
        let fold_key = key.to_ascii_lowercase();
        if seen.insert(fold_key) {
            entries.push(TxtEntry { key, value });
        }
    }
    Ok(entries)
}

/// RFC 4034 §4.1.2 NSEC type bitmap: windowed, one bit per type code.
fn encode_type_bitmap(types: &BTreeSet<u16>) -> Vec<u8> {
    use std::collections::BTreeMap;
    let mut windows: BTreeMap<u8, [u8; 32]> = BTreeMap::new();
    for &t in types {
        let window = (t / 256) as u8;
        let bit = (t % 256) as usize;
        let entry = windows.entry(window).or_insert([0u8; 32]);
        entry[bit / 8] |= 0x80 >> (bit % 8);
    }

    let mut out = Vec::new();
    for (window, bitmap) in windows {
        let mut len = 32;
        while len > 0 && bitmap[len - 1] == 0 {
            len -= 1;
        }
        if len == 0 {
            continue;
        }
        out.push(window);
        out.push(len as u8);
        out.extend_from_slice(&bitmap[..len]);
    }
    out
}

fn decode_type_bitmap(bytes: &[u8]) -> WireResult<BTreeSet<u16>> {
    let mut types = BTreeSet::new();
    let mut i = 0usize;
    while i < bytes.len() {
        if i + 2 > bytes.len() {
            return Err(WireError::Truncated);
        }
        let window = bytes[i] as u16;
        let len = bytes[i + 1] as usize;
        i += 2;
        if i + len > bytes.len() {
            return Err(WireError::Truncated);
        }
        for (b, &byte) in bytes[i..i + len].iter().enumerate() {
            for bit in 0..8u16 {
                if byte & (0x80 >> bit) != 0 {
                    types.insert(window * 256 + (b as u16) * 8 + bit);
                }
            }
        }
        i += len;
    }
    Ok(types)
}
