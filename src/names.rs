//! DNS name encoding and comparison.
//!
//! A [`Labels`] sequence never carries the implicit DNS root; `local.`
//! suffixes, `.arpa` suffixes, etc. are plain trailing labels like any
//! other. Comparisons fold ASCII case only, matching RFC 6762 §1.1's
//! "case insensitive on ASCII characters" rule (non-ASCII code points,
//! including ones that would need a UTF-16 surrogate pair, are left
//! untouched — folding per Unicode scalar value gives the same result
//! as the source's per-UTF-16-code-unit fold, since no surrogate half is
//! ever in the ASCII range).
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

pub const MAX_LABEL_LEN: usize = 63;
pub const MAX_NAME_LEN: usize = 255;

/// An ordered sequence of DNS labels, root-exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Labels(pub Vec<String>);

impl Labels {
    pub fn new(labels: Vec<String>) -> Self {
        Labels(labels)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Splits a dotted presentation name (`"MyService._tcp.local"`) into
    /// labels. A trailing dot, if present, is ignored (it denotes an
    /// already-fully-qualified name in presentation format but carries no
    /// extra label on the wire).
    pub fn from_dotted(s: &str) -> Labels {
        let trimmed = s.strip_suffix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Labels(Vec::new());
        }
        Labels(trimmed.split('.').map(|l| l.to_string()).collect())
    }

    /// Concatenates label sequences, e.g. `instance + type + local`.
    pub fn join(parts: &[&Labels]) -> Labels {
        let mut out = Vec::new();
        for p in parts {
            out.extend(p.0.iter().cloned());
        }
        Labels(out)
    }

    pub fn wire_len(&self) -> usize {
        self.0.iter().map(|l| l.len() + 1).sum::<usize>() + 1
    }

    pub fn suffix(&self, drop_leading: usize) -> Labels {
        Labels(self.0[drop_leading.min(self.0.len())..].to_vec())
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, ".");
        }
        for label in &self.0 {
            write!(f, "{}.", label)?;
        }
        Ok(())
    }
}

/// `ch + 32` when `ch` is an ASCII uppercase letter, unchanged otherwise.
pub fn dns_lower_case(ch: char) -> char {
    if ch.is_ascii_uppercase() {
        ((ch as u8) + 32) as char
    } else {
        ch
    }
}

fn fold_eq(a: &str, b: &str) -> bool {
    let mut ai = a.chars().map(dns_lower_case);
    let mut bi = b.chars().map(dns_lower_case);
    loop {
        match (ai.next(), bi.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if x == y => continue,
            _ => return false,
        }
    }
}

/// Case-insensitive (ASCII-fold) equality between two label sequences.
pub fn labels_equal(a: &Labels, b: &Labels) -> bool {
    a.0.len() == b.0.len() && a.0.iter().zip(b.0.iter()).all(|(x, y)| fold_eq(x, y))
}

/// True iff the trailing labels of `long` equal `short`, under the fold.
pub fn is_suffix(short: &Labels, long: &Labels) -> bool {
    if short.0.len() > long.0.len() {
        return false;
    }
    let offset = long.0.len() - short.0.len();
    short
        .0
        .iter()
        .zip(long.0[offset..].iter())
        .all(|(x, y)| fold_eq(x, y))
}

/// True iff `b` names the same service type as `a`, or is a `_sub`-qualified
/// subtype of `a`: `b.len() == a.len() + 2 && labelsEqual(b[1], "_sub")
/// && isSuffix(a, b[2..])`.
pub fn type_equals_or_is_subtype(a: &Labels, b: &Labels) -> bool {
    if labels_equal(a, b) {
        return true;
    }
    if b.0.len() != a.0.len() + 2 {
        return false;
    }
    if !fold_eq(&b.0[1], "_sub") {
        return false;
    }
    is_suffix(a, &b.suffix(2))
}

/// Builds the reverse-DNS name for an IPv4 address: four octet labels in
/// reverse order, rooted at `in-addr.arpa`.
pub fn reverse_dns_ipv4(addr: &Ipv4Addr) -> Labels {
    let octets = addr.octets();
    let mut labels: Vec<String> = octets.iter().rev().map(|o| o.to_string()).collect();
    labels.push("in-addr".to_string());
    labels.push("arpa".to_string());
    Labels(labels)
}

/// Builds the reverse-DNS name for an IPv6 address: 32 nibble labels
/// (uppercase hex) in reverse order, rooted at `ip6.arpa`.
pub fn reverse_dns_ipv6(addr: &Ipv6Addr) -> Labels {
    let octets = addr.octets();
    let mut nibbles: Vec<String> = Vec::with_capacity(32);
    for byte in octets.iter() {
        let hi = byte >> 4;
        let lo = byte & 0x0f;
        nibbles.push(format!("{:X}", hi));
        nibbles.push(format!("{:X}", lo));
    }
    nibbles.reverse();
    nibbles.push("ip6".to_string());
    nibbles.push("arpa".to_string());
    Labels(nibbles)
}

/// Truncates `s` to at most `max_bytes` UTF-8 bytes without splitting a
/// code point.
pub fn truncate_utf8(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_compare_is_ascii_only() {
        let a = Labels::from_dotted("_TESTSERVICE._TCP.local");
        let b = Labels::from_dotted("_testservice._tcp.local");
        assert!(labels_equal(&a, &b));
    }

    #[test]
    fn suffix_and_subtype() {
        let base = Labels::from_dotted("_testservice._tcp.local");
        let subtype = Labels::from_dotted("_subtype._sub._testservice._tcp.local");
        assert!(type_equals_or_is_subtype(&base, &subtype));
        assert!(type_equals_or_is_subtype(&base, &base));

        let not_subtype = Labels::from_dotted("_other._sub._testservice._tcp.local");
        assert!(type_equals_or_is_subtype(&base, &not_subtype));
        // different base service type entirely is not a match
        let unrelated = Labels::from_dotted("_sub._sub._other._tcp.local");
        assert!(!type_equals_or_is_subtype(&base, &unrelated));
    }

    #[test]
    fn reverse_dns_v6_matches_p9() {
        let addr: Ipv6Addr = "2001:db8::1".parse().unwrap();
        let labels = reverse_dns_ipv6(&addr);
        assert_eq!(
            labels.to_string(),
            "1.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.B.D.0.1.0.0.2.ip6.arpa."
        );
    }

    #[test]
    fn reverse_dns_v4() {
        let addr: Ipv4Addr = "192.0.2.111".parse().unwrap();
        assert_eq!(reverse_dns_ipv4(&addr).to_string(), "111.2.0.192.in-addr.arpa.");
    }

    #[test]
    fn truncate_does_not_split_code_points() {
        // 'é' is 2 bytes in UTF-8
        let s = "aé"; // 3 bytes total
        assert_eq!(truncate_utf8(s, 2), "a");
        assert_eq!(truncate_utf8(s, 3), "aé");
    }
}
