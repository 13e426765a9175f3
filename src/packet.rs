//! The mDNS packet model: a 12-byte header plus four sections.
//!
//! Only the handful of header flag bits mDNS actually uses are modeled
//! (query/response and truncated); the four record sections (questions,
//! answers, authority, additional) each hold a plain `Vec`.
use crate::error::{WireError, WireResult};
use crate::names::Labels;
use crate::record::{RRType, Record};
use crate::wire::name::{read_name, Compressor};
use crate::wire::ToFromNetworkOrder;

/// Packet header flags. mDNS only uses QR (response bit), AA (authoritative,
/// set alongside QR on every advertisement) and TC (truncated, used for
/// known-answer continuation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PacketFlags(pub u16);

impl PacketFlags {
    /// A bare query: no bits set (used for probing packets).
    pub const QUERY: PacketFlags = PacketFlags(0);
    /// An authoritative response: `0x8400`.
    pub const RESPONSE: PacketFlags = PacketFlags(0x8400);

    pub fn is_response(self) -> bool {
        self.0 & 0x8000 != 0
    }

    pub fn is_truncated(self) -> bool {
        self.0 & 0x0200 != 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub name: Labels,
    pub qtype: RRType,
    /// The "QU" bit (RFC 6762 §5.4): the querier accepts a unicast reply.
    pub unicast: bool,
}

impl Question {
    pub fn new(name: Labels, qtype: RRType, unicast: bool) -> Self {
        Question {
            name,
            qtype,
            unicast,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MdnsPacket {
    pub transaction_id: u16,
    pub flags: PacketFlags,
    pub questions: Vec<Question>,
    pub answers: Vec<Record>,
    pub authority: Vec<Record>,
    pub additional: Vec<Record>,
}

const CLASS_IN: u16 = 1;
const QU_BIT: u16 = 0x8000;

impl MdnsPacket {
    pub fn to_bytes(&self) -> WireResult<Vec<u8>> {
        let mut buffer = Vec::new();
        self.transaction_id.to_network_bytes(&mut buffer)?;
        self.flags.0.to_network_bytes(&mut buffer)?;
        (self.questions.len() as u16).to_network_bytes(&mut buffer)?;
        (self.answers.len() as u16).to_network_bytes(&mut buffer)?;
        (self.authority.len() as u16).to_network_bytes(&mut buffer)?;
        (self.additional.len() as u16).to_network_bytes(&mut buffer)?;

        let mut compressor = Compressor::new();

        for q in &self.questions {
            compressor.write_name(&q.name, &mut buffer)?;
            q.qtype.code().to_network_bytes(&mut buffer)?;
            let class = CLASS_IN | if q.unicast { QU_BIT } else { 0 };
            class.to_network_bytes(&mut buffer)?;
        }
        for r in &self.answers {
            r.to_wire(&mut compressor, &mut buffer)?;
        }
        for r in &self.authority {
            r.to_wire(&mut compressor, &mut buffer)?;
        }
        for r in &self.additional {
            r.to_wire(&mut compressor, &mut buffer)?;
        }

        Ok(buffer)
    }

    pub fn from_bytes(buffer: &[u8], now_ms: u64) -> WireResult<MdnsPacket> {
        if buffer.len() < 12 {
            return Err(WireError::Truncated);
        }
        let transaction_id = u16::from_be_bytes([buffer[0], buffer[1]]);
        let flags = PacketFlags(u16::from_be_bytes([buffer[2], buffer[3]]));
        let qd_count = u16::from_be_bytes([buffer[4], buffer[5]]) as usize;
        let an_count = u16::from_be_bytes([buffer[6], buffer[7]]) as usize;
        let ns_count = u16::from_be_bytes([buffer[8], buffer[9]]) as usize;
        let ar_count = u16::from_be_bytes([buffer[10], buffer[11]]) as usize;

        let mut pos = 12usize;
        let mut questions = Vec::with_capacity(qd_count);
        for _ in 0..qd_count {
            let (name, next) = read_name(buffer, pos)?;
            if next + 4 > buffer.len() {
                return Err(WireError::Truncated);
            }
            let qtype_raw = u16::from_be_bytes([buffer[next], buffer[next + 1]]);
            let class_raw = u16::from_be_bytes([buffer[next + 2], buffer[next + 3]]);
            let qtype = RRType::try_from(qtype_raw)?;
            questions.push(Question {
                name,
                qtype,
                unicast: class_raw & QU_BIT != 0,
            });
            pos = next + 4;
        }

        let mut read_records = |pos: &mut usize, count: usize| -> WireResult<Vec<Record>> {
            let mut out = Vec::with_capacity(count);
            for _ in 0..count {
                let (record, next) = Record::from_wire(buffer, *pos, now_ms)?;
                out.push(record);
                *pos = next;
            }
            Ok(out)
        };

        let answers = read_records(&mut pos, an_count)?;
        let authority = read_records(&mut pos, ns_count)?;
        let additional = read_records(&mut pos, ar_count)?;

        Ok(MdnsPacket {
            transaction_id,
            flags,
            questions,
            answers,
            authority,
            additional,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ARecord, RecordHeader, SHORT_TTL_MS};

    #[test]
    fn roundtrip_query_with_one_question() {
        let packet = MdnsPacket {
            transaction_id: 0,
            flags: PacketFlags::QUERY,
            questions: vec![Question::new(
                Labels::from_dotted("_testservice._tcp.local"),
                RRType::Ptr,
                false,
            )],
            answers: vec![],
            authority: vec![],
            additional: vec![],
        };
        let bytes = packet.to_bytes().unwrap();
        let decoded = MdnsPacket::from_bytes(&bytes, 0).unwrap();
        assert_eq!(decoded.questions.len(), 1);
        assert_eq!(decoded.questions[0].qtype, RRType::Ptr);
        assert!(!decoded.questions[0].unicast);
    }

    #[test]
    fn roundtrip_response_with_answer() {
        let packet = MdnsPacket {
            transaction_id: 0,
            flags: PacketFlags::RESPONSE,
            questions: vec![],
            answers: vec![Record::A(ARecord {
                header: RecordHeader::local(
                    Labels::from_dotted("host.local"),
                    true,
                    SHORT_TTL_MS,
                ),
                addr: "192.0.2.111".parse().unwrap(),
            })],
            authority: vec![],
            additional: vec![],
        };
        let bytes = packet.to_bytes().unwrap();
        let decoded = MdnsPacket::from_bytes(&bytes, 0).unwrap();
        assert!(decoded.flags.is_response());
        assert_eq!(decoded.answers.len(), 1);
    }
}
