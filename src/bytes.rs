//! Length-prefixed byte strings, hex/base64 helpers, and fixed-literal matching (§4.1).

use crate::error::{Error, Result};
use crate::varint::{read_vlq, write_vlq};

/// Reads a VLQ length prefix followed by that many raw bytes.
pub fn read_bytes<'a>(buf: &'a [u8], pos: &mut usize) -> Result<&'a [u8]> {
    let len = read_vlq(buf, pos)? as usize;
    let start = *pos;
    let end = start
        .checked_add(len)
        .filter(|&e| e <= buf.len())
        .ok_or(Error::UnexpectedEof { pos: start })?;
    *pos = end;
    Ok(&buf[start..end])
}

/// Writes a VLQ length prefix followed by `data`.
pub fn write_bytes(data: &[u8], out: &mut Vec<u8>) -> Result<()> {
    write_vlq(data.len() as u64, out)?;
    out.extend_from_slice(data);
    Ok(())
}

/// Reads exactly `literal.len()` bytes and fails unless they match.
pub fn read_literal(buf: &[u8], pos: &mut usize, literal: &[u8]) -> Result<()> {
    let start = *pos;
    let end = start
        .checked_add(literal.len())
        .filter(|&e| e <= buf.len())
        .ok_or(Error::UnexpectedEof { pos: start })?;
    let found = &buf[start..end];
    if found != literal {
        return Err(Error::LiteralMismatch {
            pos: start,
            expected: hex::encode(literal),
            found: hex::encode(found),
        });
    }
    *pos = end;
    Ok(())
}

/// Reads a fixed number of raw bytes with no comparison, erroring on EOF.
pub fn read_fixed<'a>(buf: &'a [u8], pos: &mut usize, n: usize) -> Result<&'a [u8]> {
    let start = *pos;
    let end = start
        .checked_add(n)
        .filter(|&e| e <= buf.len())
        .ok_or(Error::UnexpectedEof { pos: start })?;
    *pos = end;
    Ok(&buf[start..end])
}

/// Lowercase hex decode, rejecting odd length and non-hex characters.
pub fn from_hex(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        return Err(Error::OddLengthHex);
    }
    hex::decode(s).map_err(|e| Error::MalformedHex(e.to_string()))
}

pub fn to_hex(data: &[u8]) -> String {
    hex::encode(data)
}

pub fn from_base64(s: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(s)
        .map_err(|e| Error::MalformedHex(e.to_string()))
}

pub fn to_base64(data: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(data)
}
