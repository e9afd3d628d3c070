//! Single error type for the proof engine. Orchestration (verify/upgrade/submit)
//! captures these per-endpoint instead of propagating them through `?`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // --- Framing (§7) ---
    #[error("unexpected EOF at byte {pos}")]
    UnexpectedEof { pos: usize },

    #[error("garbage at EOF: {remaining} byte(s) remaining starting at {pos}")]
    GarbageAtEof { pos: usize, remaining: usize },

    #[error("garbage at end of {context} payload at byte {pos}")]
    GarbageAtEndOfPayload { context: &'static str, pos: usize },

    #[error("literal mismatch at byte {pos}: expected {expected}, found {found}")]
    LiteralMismatch {
        pos: usize,
        expected: String,
        found: String,
    },

    // --- Value (§7) ---
    #[error("expected safe non-negative value, got {value}")]
    ExpectedSafeNonNegative { value: i64 },

    #[error("unrecognized version: {version}")]
    UnrecognizedVersion { version: u64 },

    #[error("unknown hashing algorithm tag 0x{tag:02x}")]
    UnknownHashingAlgorithm { tag: u8 },

    #[error("unknown operation tag 0x{tag:02x}")]
    UnknownOperation { tag: u8 },

    #[error("hex value of odd length")]
    OddLengthHex,

    #[error("malformed hex string: {0}")]
    MalformedHex(String),

    // --- Structural validation (§4.8, §7) ---
    #[error("expected non-null object")]
    ExpectedNonNullObject,

    #[error("expected key {0}")]
    ExpectedKey(&'static str),

    #[error("expected one of [{0}]")]
    ExpectedOneOf(String),

    #[error("expected {expected} byte hash, got {got}")]
    ExpectedNByteHash { expected: usize, got: usize },

    #[error("expected 8 byte header, got {0}")]
    Expected8ByteHeader(usize),

    // --- URL (§4.7) ---
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    // --- Orchestration (§4.6, §7) ---
    #[error("error retrieving response body: {0}")]
    ResponseBody(String),

    #[error("merkle root mismatch: expected {expected}, found {found}")]
    MerkleRootMismatch { expected: String, found: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("malformed block hash: {0}")]
    MalformedBlockHash(String),

    #[error("http error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e.to_string())
    }
}
