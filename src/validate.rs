//! Structural validation of a hand-constructed `Timestamp` (§4.8). The
//! parser can only ever produce valid structures; this exists for values
//! built directly via public constructors (`Timestamp::new`, `Tree::new`,
//! etc.) bypassing the wire format.

use crate::error::{Error, Result};
use crate::leaf::Leaf;
use crate::timestamp::{Timestamp, SUPPORTED_VERSION};
use crate::tree::Tree;
use crate::varint::MAX_SAFE_INTEGER;

/// Total predicate: true iff `assert_valid` would succeed.
pub fn is(ts: &Timestamp) -> bool {
    assert_valid(ts).is_ok()
}

/// Raises a descriptive error on the first structural problem found.
pub fn assert_valid(ts: &Timestamp) -> Result<()> {
    if ts.version != SUPPORTED_VERSION {
        return Err(Error::UnrecognizedVersion {
            version: ts.version as u64,
        });
    }
    ts.file_hash.validate()?;
    validate_tree(&ts.tree)
}

/// Raises on failure; returns a validated clone on success (§4.8 `validate`).
pub fn validate(ts: &Timestamp) -> Result<Timestamp> {
    assert_valid(ts)?;
    Ok(ts.clone())
}

fn validate_tree(tree: &Tree) -> Result<()> {
    if !tree.has_any_leaf() {
        return Err(Error::ExpectedNonNullObject);
    }
    validate_node(tree)
}

fn validate_node(tree: &Tree) -> Result<()> {
    for leaf in tree.leaves.iter() {
        validate_leaf(leaf)?;
    }
    for (op, sub) in tree.edges.iter() {
        if let crate::op::Op::Append(x) | crate::op::Op::Prepend(x) = op {
            if x.is_empty() {
                return Err(Error::ExpectedOneOf(
                    "non-empty append/prepend operand".into(),
                ));
            }
        }
        validate_node(sub)?;
    }
    Ok(())
}

fn validate_leaf(leaf: &Leaf) -> Result<()> {
    match leaf {
        Leaf::Bitcoin { height } | Leaf::Litecoin { height } | Leaf::Ethereum { height } => {
            if *height > MAX_SAFE_INTEGER {
                return Err(Error::ExpectedSafeNonNegative {
                    value: *height as i64,
                });
            }
            Ok(())
        }
        Leaf::Pending { .. } | Leaf::Unknown { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::FileHash;
    use crate::op::Op;

    #[test]
    fn rejects_empty_tree() {
        let ts = Timestamp::new(FileHash::Sha256(vec![0u8; 32]), Tree::new());
        assert!(!is(&ts));
    }

    #[test]
    fn accepts_well_formed_timestamp() {
        let mut tree = Tree::new();
        tree.insert_leaf(Leaf::Bitcoin { height: 100 });
        let ts = Timestamp::new(FileHash::Sha256(vec![0u8; 32]), tree);
        assert!(is(&ts));
        assert!(validate(&ts).is_ok());
    }

    #[test]
    fn rejects_empty_operand() {
        let mut tree = Tree::new();
        let mut leaf_tree = Tree::new();
        leaf_tree.insert_leaf(Leaf::Bitcoin { height: 1 });
        tree.insert_edge(Op::Append(vec![]), leaf_tree);
        let ts = Timestamp::new(FileHash::Sha256(vec![0u8; 32]), tree);
        assert!(matches!(assert_valid(&ts), Err(Error::ExpectedOneOf(_))));
    }

    #[test]
    fn rejects_mismatched_file_hash_length() {
        let mut tree = Tree::new();
        tree.insert_leaf(Leaf::Bitcoin { height: 1 });
        let ts = Timestamp::new(FileHash::Sha256(vec![0u8; 20]), tree);
        assert!(matches!(
            assert_valid(&ts),
            Err(Error::ExpectedNByteHash { .. })
        ));
    }
}
