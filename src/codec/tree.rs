//! Item-level (leaf/edge) binary framing inside a tree (§4.4, §6).

use crate::bytes::{read_bytes, read_fixed, write_bytes};
use crate::error::{Error, Result};
use crate::leaf::{
    CalendarUrl, Leaf, HEADER_BITCOIN, HEADER_ETHEREUM, HEADER_LITECOIN, HEADER_PENDING,
};
use crate::op::{
    Op, TAG_APPEND, TAG_HEXLIFY, TAG_KECCAK256, TAG_PREPEND, TAG_REVERSE, TAG_RIPEMD160, TAG_SHA1,
    TAG_SHA256,
};
use crate::tree::Tree;
use crate::varint::{read_vlq, write_vlq};

const TAG_LEAF: u8 = 0x00;
const NON_FINAL_MARKER: u8 = 0xff;

/// Reads a tree's item list. An exhausted buffer at the start of a node is
/// the empty tree (legal at the top level per §4.4). `codec::write` normalizes
/// away barren edges before coalescing, so an embedded child subtree is never
/// empty in canonical bytes; this function still treats clean exhaustion
/// uniformly rather than assuming that invariant on arbitrary untrusted input.
pub fn read_tree(buf: &[u8], pos: &mut usize) -> Result<Tree> {
    if *pos >= buf.len() {
        return Ok(Tree::new());
    }
    let mut tree = Tree::new();
    loop {
        let had_marker = *pos < buf.len() && buf[*pos] == NON_FINAL_MARKER;
        if had_marker {
            *pos += 1;
        }
        read_item(buf, pos, &mut tree)?;
        if !had_marker {
            break;
        }
    }
    Ok(tree)
}

fn read_item(buf: &[u8], pos: &mut usize, tree: &mut Tree) -> Result<()> {
    let tag = read_fixed(buf, pos, 1)?[0];
    match tag {
        TAG_LEAF => {
            let leaf = read_leaf_body(buf, pos)?;
            tree.insert_leaf(leaf);
        }
        TAG_SHA1 => tree.insert_edge(Op::Sha1, read_tree(buf, pos)?),
        TAG_RIPEMD160 => tree.insert_edge(Op::Ripemd160, read_tree(buf, pos)?),
        TAG_SHA256 => tree.insert_edge(Op::Sha256, read_tree(buf, pos)?),
        TAG_KECCAK256 => tree.insert_edge(Op::Keccak256, read_tree(buf, pos)?),
        TAG_REVERSE => tree.insert_edge(Op::Reverse, read_tree(buf, pos)?),
        TAG_HEXLIFY => tree.insert_edge(Op::Hexlify, read_tree(buf, pos)?),
        TAG_APPEND => {
            let operand = read_bytes(buf, pos)?.to_vec();
            let sub = read_tree(buf, pos)?;
            tree.insert_edge(Op::Append(operand), sub);
        }
        TAG_PREPEND => {
            let operand = read_bytes(buf, pos)?.to_vec();
            let sub = read_tree(buf, pos)?;
            tree.insert_edge(Op::Prepend(operand), sub);
        }
        _ => return Err(Error::UnknownOperation { tag }),
    }
    Ok(())
}

fn read_leaf_body(buf: &[u8], pos: &mut usize) -> Result<Leaf> {
    let header: [u8; 8] = read_fixed(buf, pos, 8)?.try_into().expect("read_fixed(8)");
    let payload = read_bytes(buf, pos)?.to_vec();
    match header {
        HEADER_BITCOIN => Ok(Leaf::Bitcoin {
            height: read_height_payload(&payload)?,
        }),
        HEADER_LITECOIN => Ok(Leaf::Litecoin {
            height: read_height_payload(&payload)?,
        }),
        HEADER_ETHEREUM => Ok(Leaf::Ethereum {
            height: read_height_payload(&payload)?,
        }),
        HEADER_PENDING => Ok(Leaf::Pending {
            url: read_pending_payload(&payload)?,
        }),
        other => Ok(Leaf::Unknown {
            header: other,
            payload,
        }),
    }
}

fn read_height_payload(payload: &[u8]) -> Result<u64> {
    let mut p = 0usize;
    let height = read_vlq(payload, &mut p)?;
    if p != payload.len() {
        return Err(Error::GarbageAtEndOfPayload {
            context: "attestation",
            pos: p,
        });
    }
    Ok(height)
}

fn read_pending_payload(payload: &[u8]) -> Result<CalendarUrl> {
    let mut p = 0usize;
    let url_bytes = read_bytes(payload, &mut p)?.to_vec();
    if p != payload.len() {
        return Err(Error::GarbageAtEndOfPayload {
            context: "pending attestation",
            pos: p,
        });
    }
    let s = String::from_utf8(url_bytes)
        .map_err(|_| Error::InvalidUrl("pending URL is not valid UTF-8".into()))?;
    CalendarUrl::parse(&s)
}

/// Writes a tree's item list in canonical order: sorted leaves, then sorted
/// edges, with `0xff` separating all but the last item (§4.4).
pub fn write_tree(tree: &Tree, out: &mut Vec<u8>) -> Result<()> {
    let leaves = tree.sorted_leaves();
    let edges = tree.sorted_edges();
    let total = leaves.len() + edges.len();
    if total == 0 {
        return Ok(());
    }
    let mut written = 0usize;
    for leaf in leaves {
        written += 1;
        if written < total {
            out.push(NON_FINAL_MARKER);
        }
        write_leaf(leaf, out)?;
    }
    for (op, sub) in edges {
        written += 1;
        if written < total {
            out.push(NON_FINAL_MARKER);
        }
        write_edge(op, sub, out)?;
    }
    Ok(())
}

fn write_leaf(leaf: &Leaf, out: &mut Vec<u8>) -> Result<()> {
    out.push(TAG_LEAF);
    out.extend_from_slice(&leaf.header());
    match leaf {
        Leaf::Bitcoin { height } | Leaf::Litecoin { height } | Leaf::Ethereum { height } => {
            let mut payload = Vec::new();
            write_vlq(*height, &mut payload)?;
            write_bytes(&payload, out)?;
        }
        Leaf::Pending { url } => {
            let mut inner = Vec::new();
            write_bytes(url.as_str().as_bytes(), &mut inner)?;
            write_bytes(&inner, out)?;
        }
        Leaf::Unknown { payload, .. } => {
            write_bytes(payload, out)?;
        }
    }
    Ok(())
}

fn write_edge(op: &Op, sub: &Tree, out: &mut Vec<u8>) -> Result<()> {
    out.push(op.tag());
    match op {
        Op::Append(x) | Op::Prepend(x) => write_bytes(x, out)?,
        _ => {}
    }
    write_tree(sub, out)
}
