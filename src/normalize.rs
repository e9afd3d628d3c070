//! The operation algebra: linear-sequence normalization (§4.3 `normalizeOps`),
//! tree-level coalesce/decoalesce, and bottom-up timestamp normalization.

use crate::merge::MergeMap;
use crate::op::Op;
use crate::tree::Tree;

/// Rewrites a linear operation sequence into its canonical equivalent (§4.3).
///
/// Implemented as a single forward pass per segment (a maximal run of
/// `reverse`/`append`/`prepend` bounded by hash/`hexlify` terminators or the
/// ends of the list), tracking an accumulated `(prefix, suffix, reversed)`
/// triple. This is the iterative pipeline the redesign hint in spec.md §9
/// calls for rather than a recursive rewrite loop.
pub fn normalize_ops(ops: &[Op]) -> Vec<Op> {
    let mut out = Vec::new();
    let mut prefix: Vec<u8> = Vec::new();
    let mut suffix: Vec<u8> = Vec::new();
    let mut pending_reverse = false;

    let flush = |prefix: &mut Vec<u8>, suffix: &mut Vec<u8>, pending_reverse: &mut bool, out: &mut Vec<Op>| {
        for byte in prefix.iter().rev() {
            out.push(Op::Prepend(vec![*byte]));
        }
        for byte in suffix.iter() {
            out.push(Op::Append(vec![*byte]));
        }
        if *pending_reverse {
            out.push(Op::Reverse);
        }
        prefix.clear();
        suffix.clear();
        *pending_reverse = false;
    };

    for op in ops {
        match op {
            Op::Reverse => pending_reverse = !pending_reverse,
            Op::Append(x) => {
                if pending_reverse {
                    let rx: Vec<u8> = x.iter().rev().copied().collect();
                    prefix = [rx, prefix].concat();
                } else {
                    suffix.extend_from_slice(x);
                }
            }
            Op::Prepend(x) => {
                if pending_reverse {
                    let rx: Vec<u8> = x.iter().rev().copied().collect();
                    suffix.extend_from_slice(&rx);
                } else {
                    prefix = [x.clone(), prefix].concat();
                }
            }
            terminator => {
                flush(&mut prefix, &mut suffix, &mut pending_reverse, &mut out);
                out.push(terminator.clone());
            }
        }
    }
    flush(&mut prefix, &mut suffix, &mut pending_reverse, &mut out);
    out
}

/// Collapses unique-child append/append or prepend/prepend chains into a
/// single combined-operand edge, recursively (§4.3). Used before serializing.
pub fn coalesce_operations(tree: Tree) -> Tree {
    let leaves = tree.leaves;
    let mut edges = MergeMap::new();
    for (op, sub) in tree.edges.into_iter_owned() {
        let sub = coalesce_operations(sub);
        edges.insert_with(op, sub, |a, b| a.incorporate(b));
    }
    let mut node = Tree { leaves, edges };

    loop {
        if node.edges.len() != 1 {
            break;
        }
        let (op, sub) = node
            .edges
            .iter()
            .next()
            .map(|(o, s)| (o.clone(), s.clone()))
            .expect("len == 1");
        if !sub.leaves.is_empty() || sub.edges.len() != 1 {
            break;
        }
        let (subop, subsub) = sub
            .edges
            .iter()
            .next()
            .map(|(o, s)| (o.clone(), s.clone()))
            .expect("len == 1");
        let merged = match (&op, &subop) {
            (Op::Append(x), Op::Append(y)) => Some(Op::Append([x.as_slice(), y.as_slice()].concat())),
            (Op::Prepend(x), Op::Prepend(y)) => Some(Op::Prepend([y.as_slice(), x.as_slice()].concat())),
            _ => None,
        };
        match merged {
            Some(new_op) => {
                let mut new_node = Tree {
                    leaves: node.leaves,
                    edges: MergeMap::new(),
                };
                new_node.insert_edge(new_op, subsub);
                node = new_node;
            }
            None => break,
        }
    }
    node
}

/// The inverse of `coalesce_operations`: pushes a single-byte parent operand
/// into every child of a multi-child same-kind node, recursively (§4.3).
/// Used right after parsing.
pub fn decoalesce_operations(tree: Tree) -> Tree {
    let leaves = tree.leaves;
    let mut new_edges = MergeMap::new();
    for (op, sub) in tree.edges.into_iter_owned() {
        for (eop, esub) in try_expand(op, sub) {
            let esub = decoalesce_operations(esub);
            new_edges.insert_with(eop, esub, |a, b| a.incorporate(b));
        }
    }
    Tree {
        leaves,
        edges: new_edges,
    }
}

fn try_expand(op: Op, sub: Tree) -> Vec<(Op, Tree)> {
    let (is_append, x1): (bool, u8) = match &op {
        Op::Append(x) if x.len() == 1 => (true, x[0]),
        Op::Prepend(x) if x.len() == 1 => (false, x[0]),
        _ => return vec![(op, sub)],
    };
    if !(sub.leaves.is_empty() && sub.edges.len() >= 2) {
        return vec![(op, sub)];
    }
    let all_same_kind = sub.edges.iter().all(|(o, _)| match o {
        Op::Append(_) => is_append,
        Op::Prepend(_) => !is_append,
        _ => false,
    });
    if !all_same_kind {
        return vec![(op, sub)];
    }
    sub.edges
        .into_iter_owned()
        .map(|(yop, grandchild)| {
            let new_op = match yop {
                Op::Append(y) if is_append => Op::Append([&[x1][..], &y[..]].concat()),
                Op::Prepend(y) if !is_append => Op::Prepend([&y[..], &[x1][..]].concat()),
                _ => unreachable!("all_same_kind checked above"),
            };
            (new_op, grandchild)
        })
        .collect()
}

/// Walks the tree bottom-up, dropping barren edges and fusing an edge with
/// its unique no-leaf child per the rewrite table in §4.3. Returns `None`
/// when the resulting node has no leaves and no edges.
pub fn normalize_timestamp(tree: &Tree) -> Option<Tree> {
    let mut leaves = crate::merge::MergeSet::new();
    for leaf in tree.leaves.iter() {
        leaves.insert(leaf.clone());
    }
    let mut edges = MergeMap::new();
    for (op, sub) in tree.edges.iter() {
        if let Some(n_sub) = normalize_timestamp(sub) {
            let (final_op, final_sub) = fuse(op.clone(), n_sub);
            edges.insert_with(final_op, final_sub, |a, b| a.incorporate(b));
        }
    }
    let node = Tree { leaves, edges };
    if node.leaves.is_empty() && node.edges.is_empty() {
        None
    } else {
        Some(node)
    }
}

/// Applies the `op ∘ subOp` rewrite table when `sub` has exactly one edge and
/// no leaves; otherwise reattaches `(op, sub)` unchanged.
fn fuse(op: Op, sub: Tree) -> (Op, Tree) {
    if !sub.leaves.is_empty() || sub.edges.len() != 1 {
        return (op, sub);
    }
    let (sub_op, sub_sub) = sub
        .edges
        .iter()
        .next()
        .map(|(o, s)| (o.clone(), s.clone()))
        .expect("len == 1");

    match (&op, &sub_op) {
        // reverse ∘ reverse is the identity: lift sub_sub's own edge up one level.
        (Op::Reverse, Op::Reverse) => fuse_reverse_reverse(sub_sub),
        (Op::Append(a), Op::Append(b)) => (
            Op::Append([a.as_slice(), b.as_slice()].concat()),
            sub_sub,
        ),
        (Op::Prepend(a), Op::Prepend(b)) => (
            Op::Prepend([b.as_slice(), a.as_slice()].concat()),
            sub_sub,
        ),
        (Op::Reverse, Op::Append(b)) => {
            let rb: Vec<u8> = b.iter().rev().copied().collect();
            let mut wrapper = Tree::new();
            wrapper.insert_edge(Op::Reverse, sub_sub);
            (Op::Prepend(rb), wrapper)
        }
        (Op::Reverse, Op::Prepend(b)) => {
            let rb: Vec<u8> = b.iter().rev().copied().collect();
            let mut wrapper = Tree::new();
            wrapper.insert_edge(Op::Reverse, sub_sub);
            (Op::Append(rb), wrapper)
        }
        (Op::Prepend(a), Op::Append(b)) => {
            let mut wrapper = Tree::new();
            wrapper.insert_edge(Op::Prepend(a.clone()), sub_sub);
            (Op::Append(b.clone()), wrapper)
        }
        _ => {
            let mut reattached = Tree::new();
            reattached.insert_edge(sub_op, sub_sub);
            (op, reattached)
        }
    }
}

/// Lifts `inner`'s own single edge up one level, since `reverse ∘ reverse`
/// is the identity. `Tree` has no no-op edge to stand for a bare identity, so
/// when `inner` carries leaves or more than one edge, falls back to a
/// `Reverse` wrapper around it — still correct since the path/`apply()`
/// result is unchanged, just not maximally reduced.
fn fuse_reverse_reverse(inner: Tree) -> (Op, Tree) {
    if inner.leaves.is_empty() && inner.edges.len() == 1 {
        return inner
            .edges
            .iter()
            .next()
            .map(|(o, s)| (o.clone(), s.clone()))
            .expect("len == 1");
    }
    let mut wrapper = Tree::new();
    wrapper.insert_edge(Op::Reverse, inner);
    (Op::Reverse, wrapper)
}
