//! A Bitcoin block-explorer verifier against a Blockstream-shaped REST API
//! (§6 scenario 6). Grounded in the teacher's `reqwest::Client` +
//! JSON-response pattern (`api/handlers.rs::verify_transaction_on_blockchain`).

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::leaf::Leaf;
use crate::verify::Verifier;

const DEFAULT_BASE_URL: &str = "https://blockstream.info/api";

#[derive(Debug, Deserialize)]
struct BlockSummary {
    merkle_root: String,
    timestamp: u32,
}

/// Confirms a `bitcoin` leaf by fetching the block at its height and
/// checking `reverse(message) == merkle_root` (Bitcoin's little-endian
/// display convention, §6).
#[derive(Debug, Clone)]
pub struct BitcoinExplorer {
    http: reqwest::Client,
    base_url: String,
}

impl Default for BitcoinExplorer {
    fn default() -> Self {
        Self::new()
    }
}

impl BitcoinExplorer {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn block_hash_at(&self, height: u64) -> Result<String> {
        let url = format!("{}/block-height/{}", self.base_url, height);
        let resp = self.http.get(&url).send().await?;
        resp.text()
            .await
            .map_err(|e| Error::ResponseBody(e.to_string()))
    }

    async fn block_summary(&self, block_hash: &str) -> Result<BlockSummary> {
        let url = format!("{}/block/{}", self.base_url, block_hash);
        let resp = self.http.get(&url).send().await?;
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::ResponseBody(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| Error::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl Verifier for BitcoinExplorer {
    fn name(&self) -> &str {
        "bitcoin-explorer"
    }

    async fn verify(&self, message: &[u8], leaf: &Leaf) -> Result<Option<u32>> {
        let height = match leaf {
            Leaf::Bitcoin { height } => *height,
            _ => return Ok(None),
        };
        let block_hash = self.block_hash_at(height).await?;
        let summary = self.block_summary(&block_hash).await?;

        let expected: Vec<u8> = message.iter().rev().copied().collect();
        let expected_hex = hex::encode(&expected);
        if summary.merkle_root.to_lowercase() != expected_hex {
            return Err(Error::MerkleRootMismatch {
                expected: expected_hex,
                found: summary.merkle_root,
            });
        }
        Ok(Some(summary.timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_stable() {
        assert_eq!(BitcoinExplorer::new().name(), "bitcoin-explorer");
    }

    #[tokio::test]
    async fn non_bitcoin_leaf_is_not_handled() {
        let explorer = BitcoinExplorer::new();
        let result = explorer
            .verify(b"whatever", &Leaf::Litecoin { height: 1 })
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
