//! The canonical binary OTS codec: magic, version, file hash, and tree
//! framing (§4.4). Decoalesces on read, coalesces on write (§4.3, §4.4).

mod tree;

use crate::bytes::{read_fixed, read_literal};
use crate::error::{Error, Result};
use crate::leaf::FileHash;
use crate::normalize::{coalesce_operations, decoalesce_operations, normalize_timestamp};
use crate::timestamp::{Timestamp, SUPPORTED_VERSION};
use crate::tree::Tree;
use crate::varint::{read_vlq, write_vlq};

/// The 31-byte `"OpenTimestamps\0\0Proof\0"` + 8-byte suffix literal every
/// serialized timestamp begins with (§4.4).
pub const MAGIC: [u8; 31] = [
    0x00, 0x4f, 0x70, 0x65, 0x6e, 0x54, 0x69, 0x6d, 0x65, 0x73, 0x74, 0x61, 0x6d, 0x70, 0x73, 0x00,
    0x00, 0x50, 0x72, 0x6f, 0x6f, 0x66, 0x00, 0xbf, 0x89, 0xe2, 0xe8, 0x84, 0xe8, 0x92, 0x94,
];

/// Parses a full `.ots` byte string: magic, version, file hash, tree.
pub fn read(buf: &[u8]) -> Result<Timestamp> {
    log::debug!("codec::read: parsing {} byte(s)", buf.len());
    let mut pos = 0usize;
    read_literal(buf, &mut pos, &MAGIC)?;
    let version = read_vlq(buf, &mut pos)?;
    if version != SUPPORTED_VERSION as u64 {
        return Err(Error::UnrecognizedVersion { version });
    }
    let file_hash = read_file_hash(buf, &mut pos)?;
    let parsed_tree = tree::read_tree(buf, &mut pos)?;
    if pos != buf.len() {
        return Err(Error::GarbageAtEof {
            pos,
            remaining: buf.len() - pos,
        });
    }
    log::debug!("codec::read: parsed version {version} at byte {pos}");
    Ok(Timestamp::new(file_hash, decoalesce_operations(parsed_tree)))
}

/// Serializes a timestamp to its canonical byte form. The tree is normalized
/// (dropping any barren edge, since the wire format has no way to frame an
/// empty subtree under an edge) and then coalesced before writing (§4.4).
pub fn write(ts: &Timestamp) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(64);
    out.extend_from_slice(&MAGIC);
    write_vlq(ts.version as u64, &mut out)?;
    write_file_hash(&ts.file_hash, &mut out);
    let normalized = normalize_timestamp(&ts.tree).unwrap_or_default();
    let canonical = coalesce_operations(normalized);
    tree::write_tree(&canonical, &mut out)?;
    log::debug!("codec::write: wrote {} byte(s)", out.len());
    Ok(out)
}

/// Parses a calendar fragment: a bare tree with no magic/version/file-hash
/// prefix (§4.6, §6).
pub fn read_fragment(buf: &[u8]) -> Result<Tree> {
    let mut pos = 0usize;
    let parsed = tree::read_tree(buf, &mut pos)?;
    if pos != buf.len() {
        return Err(Error::GarbageAtEndOfPayload {
            context: "calendar response",
            pos,
        });
    }
    Ok(decoalesce_operations(parsed))
}

/// Serializes a bare tree fragment, e.g. for a calendar submission response.
pub fn write_fragment(fragment: &Tree) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let normalized = normalize_timestamp(fragment).unwrap_or_default();
    let canonical = coalesce_operations(normalized);
    tree::write_tree(&canonical, &mut out)?;
    Ok(out)
}

fn read_file_hash(buf: &[u8], pos: &mut usize) -> Result<FileHash> {
    let tag = read_fixed(buf, pos, 1)?[0];
    let len = match tag {
        crate::op::TAG_SHA1 | crate::op::TAG_RIPEMD160 => 20,
        crate::op::TAG_SHA256 | crate::op::TAG_KECCAK256 => 32,
        _ => return Err(Error::UnknownHashingAlgorithm { tag }),
    };
    let value = read_fixed(buf, pos, len)?.to_vec();
    FileHash::from_tag(tag, value)
}

fn write_file_hash(fh: &FileHash, out: &mut Vec<u8>) {
    out.push(fh.algorithm_tag());
    out.extend_from_slice(fh.value());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::Leaf;
    use crate::op::Op;

    #[test]
    fn scenario_empty_tree_timestamp() {
        let file_hash = FileHash::Sha256(
            hex::decode("0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef").unwrap(),
        );
        let ts = Timestamp::new(file_hash, Tree::new());
        let bytes = write(&ts).unwrap();
        let expected = hex::decode(concat!(
            "004f70656e54696d657374616d7073000050726f6f6600bf89e2e884e89294",
            "01",
            "08",
            "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef",
        ))
        .unwrap();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn scenario_single_bitcoin_leaf() {
        let mut tree = Tree::new();
        tree.insert_leaf(Leaf::Bitcoin { height: 123 });
        let mut out = Vec::new();
        super::tree::write_tree(&tree, &mut out).unwrap();
        assert_eq!(out, hex::decode("000588960d73d71901017b").unwrap());
    }

    #[test]
    fn scenario_pending_leaf_double_length_prefix() {
        let mut tree = Tree::new();
        tree.insert_leaf(Leaf::Pending {
            url: crate::leaf::CalendarUrl::from_url(
                "https://alice.btc.calendar.opentimestamps.org"
                    .parse()
                    .unwrap(),
            )
            .unwrap(),
        });
        // Use the spec's literal http example to check framing shape only;
        // build it directly against the writer's own URL to avoid asserting
        // on a URL our validator would reject (https-only, §4.7).
        let mut out = Vec::new();
        super::tree::write_tree(&tree, &mut out).unwrap();
        assert_eq!(out[0], 0x00);
        assert_eq!(&out[1..9], &crate::leaf::HEADER_PENDING);
        // outer length, inner length, then the URL bytes themselves.
        let url_len = "https://alice.btc.calendar.opentimestamps.org".len();
        assert_eq!(out[9] as usize, url_len + 1);
        assert_eq!(out[10] as usize, url_len);
    }

    #[test]
    fn scenario_two_leaf_canonical_order() {
        let mut tree = Tree::new();
        tree.insert_leaf(Leaf::Bitcoin { height: 123 });
        tree.insert_leaf(Leaf::Litecoin { height: 123 });
        let mut out = Vec::new();
        super::tree::write_tree(&tree, &mut out).unwrap();
        assert_eq!(
            out,
            hex::decode("ff000588960d73d71901017b0006869a0d73d71b45017b").unwrap()
        );
    }

    #[test]
    fn round_trip_parse_then_write_is_stable() {
        let file_hash = FileHash::Sha256(vec![0xab; 32]);
        let mut tree = Tree::new();
        tree.insert_edge(
            Op::Append(vec![1, 2, 3]),
            Tree::from_paths(vec![crate::tree::Path::new(
                vec![],
                Leaf::Bitcoin { height: 42 },
            )]),
        );
        let ts = Timestamp::new(file_hash, tree).normalize();
        let bytes = write(&ts).unwrap();
        let parsed = read(&bytes).unwrap().normalize();
        let mut a = ts.tree.to_paths();
        let mut b = parsed.tree.to_paths();
        a.sort_by_key(|p| format!("{:?}", p));
        b.sort_by_key(|p| format!("{:?}", p));
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_unrecognized_version() {
        let mut buf = MAGIC.to_vec();
        write_vlq(2, &mut buf).unwrap();
        assert!(matches!(
            read(&buf),
            Err(Error::UnrecognizedVersion { version: 2 })
        ));
    }

    #[test]
    fn rejects_trailing_garbage() {
        let file_hash = FileHash::Sha256(vec![0u8; 32]);
        let ts = Timestamp::new(file_hash, Tree::new());
        let mut bytes = write(&ts).unwrap();
        bytes.push(0xaa);
        assert!(matches!(read(&bytes), Err(Error::GarbageAtEof { .. })));
    }

    #[test]
    fn empty_input_is_unexpected_eof_at_zero() {
        assert!(matches!(
            read(&[]),
            Err(Error::UnexpectedEof { pos: 0 })
        ));
    }
}
