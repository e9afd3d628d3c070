//! `verify()`: fan out over paths × verifiers, aggregate order-independently
//! (§4.6, §5).

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Error;
use crate::leaf::Leaf;
use crate::timestamp::Timestamp;

/// A verifier confirms (or rejects) a single leaf's attestation against an
/// external source of truth (a block explorer, typically). Returns `Some`
/// with the attestation's Unix time on success, `None` when this verifier
/// does not handle the leaf's kind, or an error on malformed/mismatched
/// responses (§4.6, §6).
#[async_trait]
pub trait Verifier: Send + Sync {
    fn name(&self) -> &str;
    async fn verify(&self, message: &[u8], leaf: &Leaf) -> crate::error::Result<Option<u32>>;
}

/// The joined result of a verify fan-out (§5): which verifiers confirmed
/// which Unix times, and which verifiers/paths produced errors.
#[derive(Debug, Default)]
pub struct VerifyReport {
    pub attestations: HashMap<u32, Vec<String>>,
    pub errors: HashMap<String, Vec<Error>>,
}

/// Computes every path's terminal message and invokes every verifier on it,
/// issuing all path × verifier calls concurrently and awaiting the joined
/// result (§5 "issue in parallel, await all").
pub async fn verify(ts: &Timestamp, verifiers: &[Box<dyn Verifier>]) -> VerifyReport {
    let paths = ts.tree.to_paths();
    let mut calls = Vec::with_capacity(paths.len() * verifiers.len());
    for path in &paths {
        let message = path.apply(ts.file_hash.value());
        for verifier in verifiers {
            calls.push(run_one(verifier.as_ref(), message.clone(), path.leaf.clone()));
        }
    }
    let results = futures::future::join_all(calls).await;

    let mut report = VerifyReport::default();
    for (name, outcome) in results {
        match outcome {
            Ok(Some(timestamp)) => report
                .attestations
                .entry(timestamp)
                .or_default()
                .push(name),
            Ok(None) => {}
            Err(e) => {
                log::warn!("verifier {name} failed: {e}");
                report.errors.entry(name).or_default().push(e);
            }
        }
    }
    report
}

async fn run_one(
    verifier: &dyn Verifier,
    message: Vec<u8>,
    leaf: Leaf,
) -> (String, crate::error::Result<Option<u32>>) {
    (verifier.name().to_string(), verifier.verify(&message, &leaf).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::FileHash;
    use crate::op::Op;
    use crate::tree::{Path, Tree};

    struct AlwaysMatches;

    #[async_trait]
    impl Verifier for AlwaysMatches {
        fn name(&self) -> &str {
            "always-matches"
        }
        async fn verify(&self, _message: &[u8], leaf: &Leaf) -> crate::error::Result<Option<u32>> {
            match leaf {
                Leaf::Bitcoin { height } => Ok(Some(*height as u32)),
                _ => Ok(None),
            }
        }
    }

    struct AlwaysErrors;

    #[async_trait]
    impl Verifier for AlwaysErrors {
        fn name(&self) -> &str {
            "always-errors"
        }
        async fn verify(&self, _message: &[u8], _leaf: &Leaf) -> crate::error::Result<Option<u32>> {
            Err(Error::MerkleRootMismatch {
                expected: "a".into(),
                found: "b".into(),
            })
        }
    }

    #[tokio::test]
    async fn aggregates_attestations_and_errors_independently() {
        let mut tree = Tree::new();
        tree.insert_edge(
            Op::Append(vec![1]),
            Tree::from_paths(vec![Path::new(vec![], Leaf::Bitcoin { height: 555 })]),
        );
        let ts = Timestamp::new(FileHash::Sha256(vec![0u8; 32]), tree);

        let verifiers: Vec<Box<dyn Verifier>> = vec![Box::new(AlwaysMatches), Box::new(AlwaysErrors)];
        let report = verify(&ts, &verifiers).await;

        assert_eq!(
            report.attestations.get(&555),
            Some(&vec!["always-matches".to_string()])
        );
        assert_eq!(report.errors.get("always-errors").map(Vec::len), Some(1));
    }
}
