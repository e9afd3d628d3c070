//! `upgrade()`: resolve every pending leaf against its calendar, merging the
//! returned fragment in place (§4.6).

use std::collections::HashMap;

use crate::calendar::CalendarClient;
use crate::error::Error;
use crate::leaf::{CalendarUrl, Leaf};
use crate::op::Op;
use crate::timestamp::Timestamp;
use crate::tree::{Path, Tree};

/// The joined result of an upgrade fan-out: the (possibly unchanged)
/// timestamp, and any per-calendar errors encountered along the way. A
/// pending leaf whose fetch failed remains pending (§4.6).
#[derive(Debug)]
pub struct UpgradeReport {
    pub timestamp: Timestamp,
    pub errors: HashMap<String, Vec<Error>>,
}

/// Fetches every pending leaf's calendar fragment concurrently, merges
/// resolved fragments into the tree in place, and re-normalizes at the end
/// (§4.6, §5).
pub async fn upgrade(ts: &Timestamp, client: &CalendarClient) -> UpgradeReport {
    let pending_paths: Vec<Path> = ts
        .tree
        .to_paths()
        .into_iter()
        .filter(|p| p.leaf.is_pending())
        .collect();

    let fetches = pending_paths.iter().map(|path| {
        let url = match &path.leaf {
            Leaf::Pending { url } => url.clone(),
            _ => unreachable!("filtered to pending leaves"),
        };
        let message = path.apply(ts.file_hash.value());
        fetch_one(client, url, message)
    });
    let outcomes = futures::future::join_all(fetches).await;

    let mut errors: HashMap<String, Vec<Error>> = HashMap::new();
    let mut replacement_edges: Vec<(Path, Tree)> = Vec::new();
    for (path, outcome) in pending_paths.into_iter().zip(outcomes) {
        let url_str = match &path.leaf {
            Leaf::Pending { url } => url.as_str().to_string(),
            _ => unreachable!(),
        };
        match outcome {
            Ok(fragment) => {
                log::info!("upgraded pending leaf at {url_str}");
                replacement_edges.push((path, fragment));
            }
            Err(e) => {
                log::warn!("upgrade fetch from {url_str} failed: {e}");
                errors.entry(url_str).or_default().push(e);
            }
        }
    }

    let mut new_tree = ts.tree.clone();
    for (path, fragment) in replacement_edges {
        graft(&mut new_tree, &path.ops, &path.leaf, fragment);
    }
    let normalized = Timestamp::new(ts.file_hash.clone(), new_tree).normalize();

    UpgradeReport {
        timestamp: normalized,
        errors,
    }
}

async fn fetch_one(
    client: &CalendarClient,
    url: CalendarUrl,
    message: Vec<u8>,
) -> crate::error::Result<Tree> {
    client.fetch_timestamp(&url, &message).await
}

/// Replaces the pending leaf reached by `ops` with `fragment`'s paths,
/// walking the existing op prefix (mirroring `Tree::insert_path`).
fn graft(tree: &mut Tree, ops: &[Op], pending_leaf: &Leaf, fragment: Tree) {
    match ops.split_first() {
        None => {
            tree.leaves.remove(pending_leaf);
            for leaf in fragment.leaves.into_values() {
                tree.insert_leaf(leaf);
            }
            for (op, sub) in fragment.edges.into_iter_owned() {
                tree.insert_edge(op, sub);
            }
        }
        Some((op, rest)) => {
            if let Some(sub) = tree.edges.get_mut(op) {
                graft(sub, rest, pending_leaf, fragment);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::FileHash;

    #[test]
    fn graft_replaces_pending_leaf_with_fragment_contents() {
        let pending = Leaf::Pending {
            url: CalendarUrl::parse("https://example.org").unwrap(),
        };
        let mut tree = Tree::new();
        tree.insert_edge(
            Op::Append(vec![1]),
            Tree::from_paths(vec![Path::new(vec![], pending.clone())]),
        );

        let mut fragment = Tree::new();
        fragment.insert_leaf(Leaf::Bitcoin { height: 42 });

        graft(&mut tree, &[Op::Append(vec![1])], &pending, fragment);

        let ts = Timestamp::new(FileHash::Sha256(vec![0u8; 32]), tree).normalize();
        let paths = ts.tree.to_paths();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].leaf, Leaf::Bitcoin { height: 42 });
    }
}
