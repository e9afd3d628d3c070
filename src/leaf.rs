//! `Leaf` and `FileHash`: the terminal attestation types (§3, §4.1, §6).

use std::cmp::Ordering;

use url::Url;

use crate::error::{Error, Result};
use crate::merge::Identity;

/// Eight-byte attestation headers (§6).
pub const HEADER_BITCOIN: [u8; 8] = [0x05, 0x88, 0x96, 0x0d, 0x73, 0xd7, 0x19, 0x01];
pub const HEADER_LITECOIN: [u8; 8] = [0x06, 0x86, 0x9a, 0x0d, 0x73, 0xd7, 0x1b, 0x45];
pub const HEADER_ETHEREUM: [u8; 8] = [0x30, 0xfe, 0x80, 0x87, 0xb5, 0xc7, 0xea, 0xd7];
pub const HEADER_PENDING: [u8; 8] = [0x83, 0xdf, 0xe3, 0x0d, 0x2e, 0xf9, 0x0c, 0x8e];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Leaf {
    Bitcoin { height: u64 },
    Litecoin { height: u64 },
    Ethereum { height: u64 },
    Pending { url: CalendarUrl },
    Unknown { header: [u8; 8], payload: Vec<u8> },
}

/// An HTTPS calendar URL with no userinfo, query, or fragment (§4.7),
/// validated at construction so a `Leaf::Pending` can never hold a bad one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CalendarUrl(Url);

impl CalendarUrl {
    pub fn parse(s: &str) -> Result<Self> {
        let url = Url::parse(s).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Self::validate(&url)?;
        Ok(Self(url))
    }

    pub fn from_url(url: Url) -> Result<Self> {
        Self::validate(&url)?;
        Ok(Self(url))
    }

    fn validate(url: &Url) -> Result<()> {
        if url.scheme() != "https" {
            return Err(Error::InvalidUrl(format!(
                "scheme must be https, got {}",
                url.scheme()
            )));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(Error::InvalidUrl("calendar URL must not carry userinfo".into()));
        }
        if url.query().is_some() {
            return Err(Error::InvalidUrl("calendar URL must not carry a query string".into()));
        }
        if url.fragment().is_some() {
            return Err(Error::InvalidUrl("calendar URL must not carry a fragment".into()));
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl std::fmt::Display for CalendarUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Leaf {
    pub fn header(&self) -> [u8; 8] {
        match self {
            Leaf::Bitcoin { .. } => HEADER_BITCOIN,
            Leaf::Litecoin { .. } => HEADER_LITECOIN,
            Leaf::Ethereum { .. } => HEADER_ETHEREUM,
            Leaf::Pending { .. } => HEADER_PENDING,
            Leaf::Unknown { header, .. } => *header,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Leaf::Pending { .. })
    }

    /// The blockchain height for a block-anchored leaf, if any.
    pub fn height(&self) -> Option<u64> {
        match self {
            Leaf::Bitcoin { height } | Leaf::Litecoin { height } | Leaf::Ethereum { height } => {
                Some(*height)
            }
            _ => None,
        }
    }

    pub fn is_chain(&self, chain: Chain) -> bool {
        matches!(
            (self, chain),
            (Leaf::Bitcoin { .. }, Chain::Bitcoin)
                | (Leaf::Litecoin { .. }, Chain::Litecoin)
                | (Leaf::Ethereum { .. }, Chain::Ethereum)
        )
    }
}

/// The blockchains a leaf may attest against (used by `predicates::shrink`/`can_shrink`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    Bitcoin,
    Litecoin,
    Ethereum,
}

impl PartialOrd for Leaf {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Leaf {
    /// Compare 8-byte headers lexicographically, then discriminate by payload (§4.1).
    fn cmp(&self, other: &Self) -> Ordering {
        self.header().cmp(&other.header()).then_with(|| match (self, other) {
            (Leaf::Bitcoin { height: a }, Leaf::Bitcoin { height: b })
            | (Leaf::Litecoin { height: a }, Leaf::Litecoin { height: b })
            | (Leaf::Ethereum { height: a }, Leaf::Ethereum { height: b }) => a.cmp(b),
            (Leaf::Pending { url: a }, Leaf::Pending { url: b }) => a.as_str().cmp(b.as_str()),
            (
                Leaf::Unknown {
                    payload: a,
                    ..
                },
                Leaf::Unknown {
                    payload: b,
                    ..
                },
            ) => a.cmp(b),
            _ => Ordering::Equal,
        })
    }
}

impl Identity for Leaf {
    fn identity_key(&self) -> String {
        match self {
            Leaf::Bitcoin { height } => format!("bitcoin:{height}"),
            Leaf::Litecoin { height } => format!("litecoin:{height}"),
            Leaf::Ethereum { height } => format!("ethereum:{height}"),
            Leaf::Pending { url } => format!("pending:{url}"),
            Leaf::Unknown { header, payload } => {
                format!("unknown:{}:{}", hex::encode(header), hex::encode(payload))
            }
        }
    }
}

/// The hash algorithm + digest identifying the original file (§3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileHash {
    Sha1(Vec<u8>),
    Ripemd160(Vec<u8>),
    Sha256(Vec<u8>),
    Keccak256(Vec<u8>),
}

impl FileHash {
    pub fn algorithm_tag(&self) -> u8 {
        match self {
            FileHash::Sha1(_) => crate::op::TAG_SHA1,
            FileHash::Ripemd160(_) => crate::op::TAG_RIPEMD160,
            FileHash::Sha256(_) => crate::op::TAG_SHA256,
            FileHash::Keccak256(_) => crate::op::TAG_KECCAK256,
        }
    }

    pub fn expected_len(&self) -> usize {
        match self {
            FileHash::Sha1(_) | FileHash::Ripemd160(_) => 20,
            FileHash::Sha256(_) | FileHash::Keccak256(_) => 32,
        }
    }

    pub fn value(&self) -> &[u8] {
        match self {
            FileHash::Sha1(v) | FileHash::Ripemd160(v) | FileHash::Sha256(v) | FileHash::Keccak256(v) => v,
        }
    }

    /// Validates the digest length matches the algorithm (§3 invariant, §4.8).
    pub fn validate(&self) -> Result<()> {
        let got = self.value().len();
        let expected = self.expected_len();
        if got != expected {
            return Err(Error::ExpectedNByteHash { expected, got });
        }
        Ok(())
    }

    pub fn from_tag(tag: u8, value: Vec<u8>) -> Result<Self> {
        let fh = match tag {
            crate::op::TAG_SHA1 => FileHash::Sha1(value),
            crate::op::TAG_RIPEMD160 => FileHash::Ripemd160(value),
            crate::op::TAG_SHA256 => FileHash::Sha256(value),
            crate::op::TAG_KECCAK256 => FileHash::Keccak256(value),
            _ => return Err(Error::UnknownHashingAlgorithm { tag }),
        };
        fh.validate()?;
        Ok(fh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitcoin_sorts_before_litecoin() {
        let bitcoin = Leaf::Bitcoin { height: 123 };
        let litecoin = Leaf::Litecoin { height: 123 };
        assert!(bitcoin < litecoin);
    }

    #[test]
    fn calendar_url_rejects_non_https() {
        assert!(CalendarUrl::parse("http://example.com").is_err());
    }

    #[test]
    fn calendar_url_rejects_userinfo_query_fragment() {
        assert!(CalendarUrl::parse("https://user@example.com").is_err());
        assert!(CalendarUrl::parse("https://example.com?x=1").is_err());
        assert!(CalendarUrl::parse("https://example.com#frag").is_err());
    }

    #[test]
    fn calendar_url_accepts_well_formed_https() {
        assert!(CalendarUrl::parse("https://alice.btc.calendar.opentimestamps.org").is_ok());
    }

    #[test]
    fn file_hash_rejects_wrong_length() {
        assert!(FileHash::from_tag(crate::op::TAG_SHA256, vec![0u8; 20]).is_err());
        assert!(FileHash::from_tag(crate::op::TAG_SHA256, vec![0u8; 32]).is_ok());
    }

    #[test]
    fn file_hash_rejects_unknown_tag() {
        assert!(matches!(
            FileHash::from_tag(0x99, vec![0u8; 32]),
            Err(Error::UnknownHashingAlgorithm { tag: 0x99 })
        ));
    }
}
