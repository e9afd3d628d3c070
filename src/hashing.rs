//! Thin wrappers over the four cryptographic hash functions the proof engine
//! treats as external collaborators (spec.md §1, §9). Keccak-256 uses the
//! pre-NIST-padding Keccak variant, not SHA3-256 — `sha3::Keccak256` provides
//! that, matching the teacher's `crypto/merkle_proofs.rs` dispatch pattern.

use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::Sha256;
use sha3::{Digest, Keccak256};

pub fn sha1(data: &[u8]) -> Vec<u8> {
    Sha1::digest(data).to_vec()
}

pub fn ripemd160(data: &[u8]) -> Vec<u8> {
    Ripemd160::digest(data).to_vec()
}

pub fn sha256(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}

pub fn keccak256(data: &[u8]) -> Vec<u8> {
    Keccak256::digest(data).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_empty_string_is_well_known() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
    }

    #[test]
    fn hash_lengths_match_algorithm() {
        assert_eq!(sha1(b"x").len(), 20);
        assert_eq!(ripemd160(b"x").len(), 20);
        assert_eq!(sha256(b"x").len(), 32);
        assert_eq!(keccak256(b"x").len(), 32);
    }
}
