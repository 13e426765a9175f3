//! Compression-aware domain name wire codec.
//!
//! Names are decoded into owned `Labels` rather than borrowed from the
//! input slice, since registrations outlive the packet buffer they were
//! parsed from. The reader follows compression pointers iteratively with a
//! hop counter so a malformed or hostile packet with a pointer cycle can't
//! hang the decoder.
use std::collections::HashMap;

use crate::error::{WireError, WireResult};
use crate::names::{dns_lower_case, Labels, MAX_LABEL_LEN, MAX_NAME_LEN};

const MAX_POINTER_HOPS: u32 = 128;

fn fold_key(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .map(|l| l.chars().map(dns_lower_case).collect())
        .collect()
}

/// Maps a (case-folded) label suffix to the wire offset it was first written
/// at, so later names sharing that suffix can point back to it instead of
/// repeating the labels (RFC 1035 §4.1.4).
#[derive(Default)]
pub struct Compressor {
    offsets: HashMap<Vec<String>, u16>,
}

impl Compressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `labels` into `buffer`, compressing against any suffix
    /// previously written through this compressor.
    pub fn write_name(&mut self, labels: &Labels, buffer: &mut Vec<u8>) -> WireResult<usize> {
        if labels.wire_len() > MAX_NAME_LEN {
            return Err(WireError::NameTooLong);
        }
        let start_len = buffer.len();
        let mut remaining: &[String] = &labels.0;

        loop {
            if remaining.is_empty() {
                buffer.push(0);
                break;
            }

            let key = fold_key(remaining);
            if let Some(&offset) = self.offsets.get(&key) {
                let ptr: u16 = 0xC000 | offset;
                buffer.push((ptr >> 8) as u8);
                buffer.push((ptr & 0xFF) as u8);
                break;
            }

            let offset = buffer.len();
            if offset <= 0x3FFF {
                self.offsets.insert(key, offset as u16);
            }

            let label = &remaining[0];
            if label.len() > MAX_LABEL_LEN {
                return Err(WireError::LabelTooLong);
            }
            buffer.push(label.len() as u8);
            buffer.extend_from_slice(label.as_bytes());
            remaining = &remaining[1..];
        }

        Ok(buffer.len() - start_len)
    }
}

/// Reads a (possibly compressed) name starting at `start` within the full
/// packet `buffer`. Returns the decoded labels and the position immediately
/// after the name *in the original stream* (i.e. after a pointer, not after
/// whatever the pointer jumped to).
pub fn read_name(buffer: &[u8], start: usize) -> WireResult<(Labels, usize)> {
    let mut labels = Vec::new();
    let mut pos = start;
    let mut jumped = false;
    let mut return_pos = start;
    let mut hops = 0u32;

    loop {
        if pos >= buffer.len() {
            return Err(WireError::Truncated);
        }
        let len_byte = buffer[pos];

        if len_byte == 0 {
            pos += 1;
            if !jumped {
                return_pos = pos;
            }
            break;
        } else if len_byte & 0xC0 == 0xC0 {
            if pos + 1 >= buffer.len() {
                return Err(WireError::Truncated);
            }
            let pointer = (((len_byte as u16) & 0x3F) << 8) | (buffer[pos + 1] as u16);
            if !jumped {
                return_pos = pos + 2;
            }
            jumped = true;
            hops += 1;
            if hops > MAX_POINTER_HOPS {
                return Err(WireError::PointerLoop);
            }
            pos = pointer as usize;
            continue;
        } else {
            let label_len = len_byte as usize;
            if label_len > MAX_LABEL_LEN {
                return Err(WireError::LabelTooLong);
            }
            let label_start = pos + 1;
            let label_end = label_start + label_len;
            if label_end > buffer.len() {
                return Err(WireError::Truncated);
            }
            let label = std::str::from_utf8(&buffer[label_start..label_end])?.to_string();
            labels.push(label);
            pos = label_end;
        }
    }

    Ok((Labels(labels), return_pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_no_compression() {
        let labels = Labels::from_dotted("www.example.com");
        let mut buffer = Vec::new();
        let mut compressor = Compressor::new();
        compressor.write_name(&labels, &mut buffer).unwrap();

        let (decoded, end) = read_name(&buffer, 0).unwrap();
        assert_eq!(decoded, labels);
        assert_eq!(end, buffer.len());
    }

    #[test]
    fn compression_points_at_shared_suffix() {
        let a = Labels::from_dotted("MyTestService._testservice._tcp.local");
        let b = Labels::from_dotted("_testservice._tcp.local");

        let mut buffer = Vec::new();
        let mut compressor = Compressor::new();
        compressor.write_name(&a, &mut buffer).unwrap();
        let second_start = buffer.len();
        compressor.write_name(&b, &mut buffer).unwrap();

        // b should compress down to a two-byte pointer since it's a full
        // suffix of a.
        assert_eq!(buffer.len() - second_start, 2);

        let (decoded_a, _) = read_name(&buffer, 0).unwrap();
        assert_eq!(decoded_a, a);
        let (decoded_b, _) = read_name(&buffer, second_start).unwrap();
        assert_eq!(decoded_b, b);
    }

    #[test]
    fn pointer_loop_is_rejected() {
        // A points to itself.
        let buffer = vec![0xC0, 0x00];
        let err = read_name(&buffer, 0).unwrap_err();
        assert!(matches!(err, WireError::PointerLoop));
    }
}
