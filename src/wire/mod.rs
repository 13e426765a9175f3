//! Network-order (de)serialization: a single trait implemented per
//! primitive and per structure, rather than a derive-only approach, since
//! names need compression state threaded through encoding that a naive
//! per-field derive can't express (see `wire::name`).
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::WireResult;

pub mod name;

/// Copy structure data to/from a network-order buffer.
///
/// Decoded values are fully owned (no borrowed `'a [u8]` slices) since they
/// must outlive the packet they were parsed from: they live inside
/// long-running service registrations.
pub trait ToFromNetworkOrder {
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> std::io::Result<usize>;
    fn from_network_bytes(&mut self, buffer: &mut Cursor<&[u8]>) -> WireResult<()>;
}

impl ToFromNetworkOrder for u8 {
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> std::io::Result<usize> {
        buffer.write_u8(*self)?;
        Ok(1)
    }

    fn from_network_bytes(&mut self, buffer: &mut Cursor<&[u8]>) -> WireResult<()> {
        *self = buffer.read_u8()?;
        Ok(())
    }
}

impl ToFromNetworkOrder for u16 {
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> std::io::Result<usize> {
        buffer.write_u16::<BigEndian>(*self)?;
        Ok(2)
    }

    fn from_network_bytes(&mut self, buffer: &mut Cursor<&[u8]>) -> WireResult<()> {
        *self = buffer.read_u16::<BigEndian>()?;
        Ok(())
    }
}

impl ToFromNetworkOrder for u32 {
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> std::io::Result<usize> {
        buffer.write_u32::<BigEndian>(*self)?;
        Ok(4)
    }

    fn from_network_bytes(&mut self, buffer: &mut Cursor<&[u8]>) -> WireResult<()> {
        *self = buffer.read_u32::<BigEndian>()?;
        Ok(())
    }
}

impl ToFromNetworkOrder for Ipv4Addr {
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> std::io::Result<usize> {
        buffer.extend_from_slice(&self.octets());
        Ok(4)
    }

    fn from_network_bytes(&mut self, buffer: &mut Cursor<&[u8]>) -> WireResult<()> {
        let mut octets = [0u8; 4];
        for b in octets.iter_mut() {
            *b = buffer.read_u8()?;
        }
        *self = Ipv4Addr::from(octets);
        Ok(())
    }
}

impl ToFromNetworkOrder for Ipv6Addr {
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> std::io::Result<usize> {
        buffer.extend_from_slice(&self.octets());
        Ok(16)
    }

    fn from_network_bytes(&mut self, buffer: &mut Cursor<&[u8]>) -> WireResult<()> {
        let mut octets = [0u8; 16];
        for b in octets.iter_mut() {
            *b = buffer.read_u8()?;
        }
        *self = Ipv6Addr::from(octets);
        Ok(())
    }
}

/// Reads exactly `len` raw bytes (used for RDATA payloads whose shape is
/// decided by the caller from the RR type, e.g. TXT character-strings).
pub fn read_exact(buffer: &mut Cursor<&[u8]>, len: usize) -> WireResult<Vec<u8>> {
    let mut out = vec![0u8; len];
    std::io::Read::read_exact(buffer, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_from_network, test_to_network};

    #[test]
    fn u8_roundtrip() {
        let (buffer, len) = test_to_network!(255u8);
        assert_eq!(buffer, vec![0xFF]);
        assert_eq!(len, 1);
        let v: u8 = test_from_network!(&[0xFF], u8);
        assert_eq!(v, 255);
    }

    #[test]
    fn u16_roundtrip() {
        let (buffer, len) = test_to_network!(0x1234u16);
        assert_eq!(buffer, vec![0x12, 0x34]);
        assert_eq!(len, 2);
    }

    #[test]
    fn u32_roundtrip() {
        let (buffer, _) = test_to_network!(0x12345678u32);
        assert_eq!(buffer, vec![0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn ipv4_roundtrip() {
        let addr: Ipv4Addr = "192.0.2.111".parse().unwrap();
        let (buffer, len) = test_to_network!(addr);
        assert_eq!(buffer, vec![192, 0, 2, 111]);
        assert_eq!(len, 4);
    }
}
