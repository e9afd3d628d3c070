//! The prefix-sharing attestation tree and path⇄tree conversions (§3, §4.3).

use crate::leaf::Leaf;
use crate::merge::{MergeMap, MergeSet};
use crate::op::Op;

/// An ordered operation sequence terminating in a leaf (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub ops: Vec<Op>,
    pub leaf: Leaf,
}

impl Path {
    pub fn new(ops: Vec<Op>, leaf: Leaf) -> Self {
        Self { ops, leaf }
    }

    /// Applies every operation in order to `message`, returning the terminal
    /// message the leaf commits to.
    pub fn apply(&self, message: &[u8]) -> Vec<u8> {
        let mut m = message.to_vec();
        for op in &self.ops {
            m = op.apply(&m);
        }
        m
    }
}

/// A rose-tree node: a leaf set plus an edge map to child nodes (§3).
#[derive(Debug, Clone, Default)]
pub struct Tree {
    pub leaves: MergeSet<Leaf>,
    pub edges: MergeMap<Op, Tree>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty() && self.edges.is_empty()
    }

    pub fn insert_leaf(&mut self, leaf: Leaf) {
        self.leaves.insert(leaf);
    }

    /// Inserts an edge, merging with an existing child sub-tree of the same op.
    pub fn insert_edge(&mut self, op: Op, sub: Tree) {
        self.edges.insert_with(op, sub, |a, b| a.incorporate(b));
    }

    /// Merges `other` into `self` in place: the result's paths are the union
    /// of both trees' paths, leaf-duplicates collapsed (§4.2 "incorporateTreeToTree").
    /// Commutative and associative by construction (§5).
    pub fn incorporate(mut self, other: Tree) -> Tree {
        for leaf in other.leaves.into_values() {
            self.leaves.insert(leaf);
        }
        for (op, sub) in other.edges.into_iter_owned() {
            self.insert_edge(op, sub);
        }
        self
    }

    /// Folds a list of `(ops, leaf)` paths into a tree, creating edges on
    /// demand while walking each operation prefix (§4.3 "pathsToTree").
    pub fn from_paths(paths: impl IntoIterator<Item = Path>) -> Tree {
        let mut root = Tree::new();
        for path in paths {
            root.insert_path(&path.ops, path.leaf);
        }
        root
    }

    fn insert_path(&mut self, ops: &[Op], leaf: Leaf) {
        match ops.split_first() {
            None => self.insert_leaf(leaf),
            Some((op, rest)) => {
                let mut sub = self.edges.remove(op).unwrap_or_default();
                sub.insert_path(rest, leaf);
                self.insert_edge(op.clone(), sub);
            }
        }
    }

    /// Recursively enumerates every `(ops, leaf)` pair reachable from this
    /// node. Barren subtrees (no leaves reachable) yield no paths (§4.3).
    pub fn to_paths(&self) -> Vec<Path> {
        let mut out = Vec::new();
        self.collect_paths(&mut Vec::new(), &mut out);
        out
    }

    fn collect_paths(&self, prefix: &mut Vec<Op>, out: &mut Vec<Path>) {
        for leaf in self.leaves.iter() {
            out.push(Path::new(prefix.clone(), leaf.clone()));
        }
        for (op, sub) in self.edges.iter() {
            prefix.push(op.clone());
            sub.collect_paths(prefix, out);
            prefix.pop();
        }
    }

    /// True if some path reaches a leaf (this node or any descendant is not barren).
    pub fn has_any_leaf(&self) -> bool {
        if !self.leaves.is_empty() {
            return true;
        }
        self.edges.iter().any(|(_, sub)| sub.has_any_leaf())
    }

    /// Leaves and edges in canonical order (§4.1, §4.4): leaves first by
    /// `Leaf::cmp`, then edges by `Op::cmp`.
    pub fn sorted_leaves(&self) -> Vec<&Leaf> {
        let mut leaves: Vec<&Leaf> = self.leaves.iter().collect();
        leaves.sort();
        leaves
    }

    pub fn sorted_edges(&self) -> Vec<(&Op, &Tree)> {
        let mut edges: Vec<(&Op, &Tree)> = self.edges.iter().collect();
        edges.sort_by(|a, b| a.0.cmp(b.0));
        edges
    }
}
