//! Tree predicates and single-path minimization (§4.5).

use crate::leaf::{Chain, Leaf};
use crate::normalize::normalize_ops;
use crate::timestamp::Timestamp;
use crate::tree::{Path, Tree};

/// The tree has at least two paths and at least one terminates on `chain`.
pub fn can_shrink(ts: &Timestamp, chain: Chain) -> bool {
    let paths = ts.tree.to_paths();
    paths.len() >= 2 && paths.iter().any(|p| p.leaf.is_chain(chain))
}

/// Some path ends in a `pending` leaf.
pub fn can_upgrade(ts: &Timestamp) -> bool {
    ts.tree.to_paths().iter().any(|p| p.leaf.is_pending())
}

/// Some path ends in a non-`pending` leaf.
pub fn can_verify(ts: &Timestamp) -> bool {
    ts.tree.to_paths().iter().any(|p| !p.leaf.is_pending())
}

/// Rebuilds the timestamp from the single path on `chain` with minimum
/// height. Ties break on the leftmost path in canonical (sorted) order — see
/// DESIGN.md's Open Question decision. Returns `ts` unchanged if no path
/// terminates on `chain`.
pub fn shrink(ts: &Timestamp, chain: Chain) -> Timestamp {
    let mut candidates: Vec<Path> = ts
        .tree
        .to_paths()
        .into_iter()
        .filter(|p| p.leaf.is_chain(chain))
        .collect();
    if candidates.is_empty() {
        return ts.clone();
    }
    candidates.sort_by(|a, b| {
        a.leaf
            .height()
            .cmp(&b.leaf.height())
            .then_with(|| a.ops.cmp(&b.ops))
    });
    let chosen = candidates.into_iter().next().expect("non-empty");
    let normalized_ops = normalize_ops(&chosen.ops);
    let tree = Tree::from_paths(vec![Path::new(normalized_ops, chosen.leaf)]);
    Timestamp::new(ts.file_hash.clone(), tree).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::FileHash;
    use crate::op::Op;

    fn fixture() -> Timestamp {
        let mut tree = Tree::new();
        tree.insert_edge(
            Op::Append(vec![1]),
            Tree::from_paths(vec![Path::new(vec![], Leaf::Bitcoin { height: 200 })]),
        );
        tree.insert_edge(
            Op::Append(vec![2]),
            Tree::from_paths(vec![Path::new(vec![], Leaf::Bitcoin { height: 100 })]),
        );
        Timestamp::new(FileHash::Sha256(vec![0u8; 32]), tree)
    }

    #[test]
    fn can_shrink_requires_multiple_paths_on_chain() {
        let ts = fixture();
        assert!(can_shrink(&ts, Chain::Bitcoin));
        assert!(!can_shrink(&ts, Chain::Litecoin));
    }

    #[test]
    fn can_upgrade_detects_pending_leaf() {
        let mut tree = Tree::new();
        tree.insert_leaf(Leaf::Pending {
            url: crate::leaf::CalendarUrl::parse("https://example.org").unwrap(),
        });
        let ts = Timestamp::new(FileHash::Sha256(vec![0u8; 32]), tree);
        assert!(can_upgrade(&ts));
        assert!(!can_verify(&ts));
    }

    #[test]
    fn shrink_picks_minimum_height() {
        let ts = fixture();
        let shrunk = shrink(&ts, Chain::Bitcoin);
        let paths = shrunk.tree.to_paths();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].leaf.height(), Some(100));
    }

    #[test]
    fn shrink_is_noop_when_chain_absent() {
        let ts = fixture();
        let shrunk = shrink(&ts, Chain::Ethereum);
        assert_eq!(shrunk.tree.to_paths().len(), ts.tree.to_paths().len());
    }
}
