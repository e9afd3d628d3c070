//! `Op`: the eight-case operation algebra (§3, §4.1, §6).

use std::cmp::Ordering;

use crate::hashing;
use crate::merge::Identity;

/// One-byte wire tags for operations (§6 tag table).
pub const TAG_SHA1: u8 = 0x02;
pub const TAG_RIPEMD160: u8 = 0x03;
pub const TAG_SHA256: u8 = 0x08;
pub const TAG_KECCAK256: u8 = 0x67;
pub const TAG_APPEND: u8 = 0xf0;
pub const TAG_PREPEND: u8 = 0xf1;
pub const TAG_REVERSE: u8 = 0xf2;
pub const TAG_HEXLIFY: u8 = 0xf3;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Op {
    Sha1,
    Ripemd160,
    Sha256,
    Keccak256,
    Reverse,
    Hexlify,
    Append(Vec<u8>),
    Prepend(Vec<u8>),
}

impl Op {
    /// The one-byte wire tag for this operation's kind.
    pub fn tag(&self) -> u8 {
        match self {
            Op::Sha1 => TAG_SHA1,
            Op::Ripemd160 => TAG_RIPEMD160,
            Op::Sha256 => TAG_SHA256,
            Op::Keccak256 => TAG_KECCAK256,
            Op::Append(_) => TAG_APPEND,
            Op::Prepend(_) => TAG_PREPEND,
            Op::Reverse => TAG_REVERSE,
            Op::Hexlify => TAG_HEXLIFY,
        }
    }

    /// Applies this operation to message `m`, producing the transformed message.
    pub fn apply(&self, m: &[u8]) -> Vec<u8> {
        match self {
            Op::Sha1 => hashing::sha1(m),
            Op::Ripemd160 => hashing::ripemd160(m),
            Op::Sha256 => hashing::sha256(m),
            Op::Keccak256 => hashing::keccak256(m),
            Op::Reverse => m.iter().rev().copied().collect(),
            Op::Hexlify => hex::encode(m).into_bytes(),
            Op::Append(x) => {
                let mut out = Vec::with_capacity(m.len() + x.len());
                out.extend_from_slice(m);
                out.extend_from_slice(x);
                out
            }
            Op::Prepend(x) => {
                let mut out = Vec::with_capacity(m.len() + x.len());
                out.extend_from_slice(x);
                out.extend_from_slice(m);
                out
            }
        }
    }

    pub fn is_append(&self) -> bool {
        matches!(self, Op::Append(_))
    }

    pub fn is_prepend(&self) -> bool {
        matches!(self, Op::Prepend(_))
    }

    pub fn is_reverse(&self) -> bool {
        matches!(self, Op::Reverse)
    }

    /// Whether this op is a hash or `hexlify` — an opaque segment terminator
    /// for `normalize_ops` (§4.3).
    pub fn is_segment_terminator(&self) -> bool {
        matches!(
            self,
            Op::Sha1 | Op::Ripemd160 | Op::Sha256 | Op::Keccak256 | Op::Hexlify
        )
    }
}

impl PartialOrd for Op {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Op {
    /// Compare by binary tag first, then operand for `append`/`prepend` (§4.1).
    /// Slice `Ord` already implements the length-extended lexicographic
    /// compare the spec calls for (a prefix sorts before its extension).
    fn cmp(&self, other: &Self) -> Ordering {
        self.tag().cmp(&other.tag()).then_with(|| match (self, other) {
            (Op::Append(a), Op::Append(b)) | (Op::Prepend(a), Op::Prepend(b)) => a.cmp(b),
            _ => Ordering::Equal,
        })
    }
}

impl Identity for Op {
    fn identity_key(&self) -> String {
        match self {
            Op::Sha1 => "sha1".to_string(),
            Op::Ripemd160 => "ripemd160".to_string(),
            Op::Sha256 => "sha256".to_string(),
            Op::Keccak256 => "keccak256".to_string(),
            Op::Reverse => "reverse".to_string(),
            Op::Hexlify => "hexlify".to_string(),
            Op::Append(x) => format!("append:{}", hex::encode(x)),
            Op::Prepend(x) => format!("prepend:{}", hex::encode(x)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_prepend_apply_correctly() {
        assert_eq!(Op::Append(vec![1, 2]).apply(&[0]), vec![0, 1, 2]);
        assert_eq!(Op::Prepend(vec![1, 2]).apply(&[0]), vec![1, 2, 0]);
    }

    #[test]
    fn reverse_reverses_bytes() {
        assert_eq!(Op::Reverse.apply(&[1, 2, 3]), vec![3, 2, 1]);
    }

    #[test]
    fn hexlify_lowercases_hex() {
        assert_eq!(Op::Hexlify.apply(&[0xab, 0xcd]), b"abcd".to_vec());
    }

    #[test]
    fn ordering_by_tag_then_operand() {
        assert!(Op::Sha256 < Op::Append(vec![0]));
        assert!(Op::Append(vec![1]) < Op::Append(vec![1, 0]));
        assert!(Op::Append(vec![1]) < Op::Append(vec![2]));
    }

    #[test]
    fn identity_key_distinguishes_operands() {
        assert_ne!(
            Op::Append(vec![1]).identity_key(),
            Op::Append(vec![2]).identity_key()
        );
        assert_ne!(
            Op::Append(vec![1]).identity_key(),
            Op::Prepend(vec![1]).identity_key()
        );
    }
}
