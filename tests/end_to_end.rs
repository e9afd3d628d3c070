//! End-to-end scenarios spanning the public API: write → parse → normalize →
//! shrink → verify, exercised the way a caller of this crate would (§8).

use async_trait::async_trait;

use opentimestamps::{
    can_shrink, can_verify, codec, shrink, verify, Chain, FileHash, Leaf, Op, Path, Timestamp,
    Tree, Verifier,
};

struct HeightEchoVerifier;

#[async_trait]
impl Verifier for HeightEchoVerifier {
    fn name(&self) -> &str {
        "height-echo"
    }

    async fn verify(
        &self,
        _message: &[u8],
        leaf: &Leaf,
    ) -> opentimestamps::Result<Option<u32>> {
        match leaf {
            Leaf::Bitcoin { height } => Ok(Some(*height as u32)),
            _ => Ok(None),
        }
    }
}

fn bitcoin_and_litecoin_timestamp() -> Timestamp {
    let mut tree = Tree::new();
    tree.insert_edge(
        Op::Append(vec![1]),
        Tree::from_paths(vec![Path::new(vec![], Leaf::Bitcoin { height: 500_000 })]),
    );
    tree.insert_edge(
        Op::Append(vec![2]),
        Tree::from_paths(vec![Path::new(vec![], Leaf::Bitcoin { height: 100 })]),
    );
    tree.insert_edge(
        Op::Append(vec![3]),
        Tree::from_paths(vec![Path::new(vec![], Leaf::Litecoin { height: 1 })]),
    );
    Timestamp::new(FileHash::Sha256(vec![0xaa; 32]), tree).normalize()
}

#[test]
fn write_then_parse_preserves_paths() {
    let _ = env_logger::try_init();
    let ts = bitcoin_and_litecoin_timestamp();
    let bytes = codec::write(&ts).expect("serializes");
    assert_eq!(&bytes[..31], &codec::MAGIC);
    assert_eq!(bytes[31], 0x01, "version byte sits right after the magic");

    let parsed = codec::read(&bytes).expect("parses").normalize();
    let mut original_paths = ts.tree.to_paths();
    let mut parsed_paths = parsed.tree.to_paths();
    original_paths.sort_by_key(|p| format!("{p:?}"));
    parsed_paths.sort_by_key(|p| format!("{p:?}"));
    assert_eq!(original_paths, parsed_paths);
}

#[test]
fn shrink_then_verify_yields_single_confirmed_attestation() {
    let ts = bitcoin_and_litecoin_timestamp();
    assert!(can_shrink(&ts, Chain::Bitcoin));

    let shrunk = shrink(&ts, Chain::Bitcoin);
    let paths = shrunk.tree.to_paths();
    assert_eq!(paths.len(), 1, "shrink reduces to a single path on the chain");
    assert_eq!(paths[0].leaf.height(), Some(100), "keeps the minimum height");
    assert!(can_verify(&shrunk));
}

#[tokio::test]
async fn verify_reports_matching_attestation_and_ignores_other_chains() {
    let _ = env_logger::try_init();
    let ts = bitcoin_and_litecoin_timestamp();
    let verifiers: Vec<Box<dyn Verifier>> = vec![Box::new(HeightEchoVerifier)];
    let report = verify(&ts, &verifiers).await;

    assert_eq!(
        report.attestations.get(&500_000),
        Some(&vec!["height-echo".to_string()])
    );
    assert_eq!(
        report.attestations.get(&100),
        Some(&vec!["height-echo".to_string()])
    );
    assert!(report.errors.is_empty());
}

#[test]
fn empty_input_reports_unexpected_eof() {
    let err = codec::read(&[]).unwrap_err();
    assert!(matches!(err, opentimestamps::Error::UnexpectedEof { pos: 0 }));
}
