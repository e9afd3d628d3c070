//! `Timestamp`: the triple `(version, fileHash, tree)` (§3).

use crate::leaf::FileHash;
use crate::normalize::normalize_timestamp;
use crate::tree::Tree;

pub const SUPPORTED_VERSION: u8 = 1;

/// A parsed or freshly constructed proof. Never mutated after construction;
/// transformations (`shrink`, `upgrade`, `normalize`) return new values (§3).
#[derive(Debug, Clone)]
pub struct Timestamp {
    pub version: u8,
    pub file_hash: FileHash,
    pub tree: Tree,
}

impl Timestamp {
    pub fn new(file_hash: FileHash, tree: Tree) -> Self {
        Self {
            version: SUPPORTED_VERSION,
            file_hash,
            tree,
        }
    }

    /// Bottom-up tree normalization (§4.3); the file hash and version are
    /// unaffected. Collapses to an empty tree if every branch is barren.
    pub fn normalize(&self) -> Timestamp {
        let tree = normalize_timestamp(&self.tree).unwrap_or_default();
        Timestamp {
            version: self.version,
            file_hash: self.file_hash.clone(),
            tree,
        }
    }
}
