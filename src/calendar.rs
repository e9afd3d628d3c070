//! Calendar HTTP collaborator: fetch/submit against an OpenTimestamps
//! calendar server (§4.6, §6). Grounded in the teacher's
//! `reqwest::Client::new().post(...).send().await` pattern for talking to an
//! external HTTP collaborator.

use crate::codec;
use crate::config::CalendarConfig;
use crate::error::{Error, Result};
use crate::leaf::CalendarUrl;
use crate::tree::Tree;

/// The public calendar aggregator's default servers (§6).
pub fn default_calendars() -> Vec<CalendarUrl> {
    [
        "https://alice.btc.calendar.opentimestamps.org",
        "https://bob.btc.calendar.opentimestamps.org",
        "https://finney.calendar.eternitywall.com",
        "https://btc.calendar.catallaxy.com",
    ]
    .iter()
    .map(|s| CalendarUrl::parse(s).expect("hardcoded default calendar URLs are well-formed"))
    .collect()
}

/// Thin wrapper over a `reqwest::Client` for the two calendar routes.
#[derive(Debug, Clone, Default)]
pub struct CalendarClient {
    http: reqwest::Client,
}

impl CalendarClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Builds a client honoring `config`'s per-request timeout (§10.3).
    pub fn from_config(config: &CalendarConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(config.timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// GET `{calendar}/timestamp/{hex(message)}` — a tree fragment rooted at
    /// `message` (§4.6 `upgrade`).
    pub async fn fetch_timestamp(&self, calendar: &CalendarUrl, message: &[u8]) -> Result<Tree> {
        let url = format!("{}/timestamp/{}", trim_trailing_slash(calendar.as_str()), hex::encode(message));
        let resp = self.http.get(&url).send().await?;
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::ResponseBody(e.to_string()))?;
        codec::read_fragment(&body)
    }

    /// POST `{calendar}/digest` with `message` as the raw body (§4.6 `submit`).
    pub async fn submit_digest(&self, calendar: &CalendarUrl, message: &[u8]) -> Result<Tree> {
        let url = format!("{}/digest", trim_trailing_slash(calendar.as_str()));
        let resp = self
            .http
            .post(&url)
            .body(message.to_vec())
            .send()
            .await?;
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::ResponseBody(e.to_string()))?;
        codec::read_fragment(&body)
    }
}

fn trim_trailing_slash(s: &str) -> &str {
    s.trim_end_matches('/')
}
