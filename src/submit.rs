//! `submit()`: build a brand-new timestamp from a file hash by POSTing to a
//! set of calendars, optionally wrapped in a fudge nonce (§4.6).

use std::collections::HashMap;

use rand::RngCore;

use crate::calendar::CalendarClient;
use crate::error::Error;
use crate::leaf::{CalendarUrl, FileHash};
use crate::op::Op;
use crate::timestamp::Timestamp;
use crate::tree::Tree;

/// The joined result of a submit fan-out: the constructed timestamp (empty
/// tree if every calendar failed) and any per-calendar errors.
#[derive(Debug)]
pub struct SubmitReport {
    pub timestamp: Timestamp,
    pub errors: HashMap<String, Vec<Error>>,
}

/// Generates a fresh random fudge nonce of `len` bytes (mirrors the
/// teacher's use of `rand` for nonce generation).
pub fn random_fudge(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

/// Wraps `file_hash_value` in `append(fudge) → sha256 → {...}` when `fudge`
/// is non-empty, POSTs the resulting message to every calendar concurrently,
/// and merges the returned fragments into a fresh timestamp (§4.6).
pub async fn submit(
    file_hash: FileHash,
    fudge: &[u8],
    calendars: &[CalendarUrl],
    client: &CalendarClient,
) -> SubmitReport {
    let message = if fudge.is_empty() {
        file_hash.value().to_vec()
    } else {
        Op::Append(fudge.to_vec()).apply(file_hash.value())
    };
    let digest = if fudge.is_empty() {
        message.clone()
    } else {
        crate::hashing::sha256(&message)
    };

    let fetches = calendars
        .iter()
        .map(|url| submit_one(client, url.clone(), digest.clone()));
    let outcomes = futures::future::join_all(fetches).await;

    let mut errors: HashMap<String, Vec<Error>> = HashMap::new();
    let mut merged = Tree::new();
    for (url, outcome) in calendars.iter().zip(outcomes) {
        match outcome {
            Ok(fragment) => {
                log::info!("submitted to {}", url.as_str());
                merged = merged.incorporate(fragment);
            }
            Err(e) => {
                log::warn!("submit to {} failed: {e}", url.as_str());
                errors.entry(url.as_str().to_string()).or_default().push(e);
            }
        }
    }

    let tree = if fudge.is_empty() {
        merged
    } else {
        let mut sha_node = Tree::new();
        sha_node.insert_edge(Op::Sha256, merged);
        let mut root = Tree::new();
        root.insert_edge(Op::Append(fudge.to_vec()), sha_node);
        root
    };

    let timestamp = Timestamp::new(file_hash, tree).normalize();
    SubmitReport { timestamp, errors }
}

async fn submit_one(
    client: &CalendarClient,
    url: CalendarUrl,
    digest: Vec<u8>,
) -> crate::error::Result<Tree> {
    client.submit_digest(&url, &digest).await
}
