//! WBI query signing
//!
//! Two keys are published by the nav endpoint as the file stems of two image
//! URLs. They are shuffled into a 32-character mixin key, and the signature
//! is the MD5 of the sorted, percent-encoded query followed by that key.

use crate::signing::{Params, RequestSigner};
use crate::SigningError;
use async_trait::async_trait;
use md5::{Digest, Md5};
use reqwest::header::{REFERER, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// Keys are rotated by the platform roughly daily
const KEY_TTL: Duration = Duration::from_secs(2 * 60 * 60);

const MIXIN_KEY_ENC_TAB: [usize; 64] = [
    46, 47, 18, 2, 53, 8, 23, 32, 15, 50, 10, 31, 58, 3, 45, 35, 27, 43, 5, 49, 33, 9, 42, 19, 29,
    28, 14, 39, 12, 38, 41, 13, 37, 48, 7, 16, 24, 55, 40, 61, 26, 17, 0, 1, 60, 51, 30, 4, 22, 25,
    54, 21, 56, 59, 6, 63, 57, 62, 11, 36, 20, 34, 44, 52,
];

/// The key pair published by the nav endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WbiKeys {
    pub img_key: String,
    pub sub_key: String,
}

impl WbiKeys {
    pub fn new(img_key: impl Into<String>, sub_key: impl Into<String>) -> Self {
        Self {
            img_key: img_key.into(),
            sub_key: sub_key.into(),
        }
    }

    /// Shuffles the concatenated keys into the 32-character mixin key
    pub fn mixin_key(&self) -> String {
        let orig: Vec<char> = format!("{}{}", self.img_key, self.sub_key).chars().collect();
        MIXIN_KEY_ENC_TAB
            .iter()
            .filter_map(|&i| orig.get(i))
            .take(32)
            .collect()
    }
}

#[derive(Deserialize)]
struct NavResponse {
    data: Option<NavData>,
}

#[derive(Deserialize)]
struct NavData {
    wbi_img: Option<WbiImg>,
}

#[derive(Deserialize)]
struct WbiImg {
    img_url: String,
    sub_url: String,
}

enum KeySource {
    Fixed(WbiKeys),
    Nav {
        client: Client,
        url: String,
        user_agent: String,
        referer: String,
        cached: Mutex<Option<(WbiKeys, Instant)>>,
    },
}

/// Signs search requests with the platform's WBI scheme
pub struct WbiSigner {
    source: KeySource,
}

impl WbiSigner {
    /// Creates a signer that fetches (and caches) keys from the nav endpoint
    pub fn new(
        client: Client,
        nav_url: impl Into<String>,
        user_agent: impl Into<String>,
        referer: impl Into<String>,
    ) -> Self {
        Self {
            source: KeySource::Nav {
                client,
                url: nav_url.into(),
                user_agent: user_agent.into(),
                referer: referer.into(),
                cached: Mutex::new(None),
            },
        }
    }

    /// Creates a signer with fixed keys; no network access is performed
    pub fn with_keys(keys: WbiKeys) -> Self {
        Self {
            source: KeySource::Fixed(keys),
        }
    }

    /// Returns the current keys, fetching them when absent or stale
    pub async fn keys(&self) -> Result<WbiKeys, SigningError> {
        match &self.source {
            KeySource::Fixed(keys) => Ok(keys.clone()),
            KeySource::Nav {
                client,
                url,
                user_agent,
                referer,
                cached,
            } => {
                // Holding the lock across the fetch keeps refreshes single-flight.
                let mut guard = cached.lock().await;
                if let Some((keys, fetched_at)) = guard.as_ref() {
                    if fetched_at.elapsed() < KEY_TTL {
                        return Ok(keys.clone());
                    }
                }

                tracing::debug!("Fetching WBI keys from {}", url);
                let keys = fetch_keys(client, url, user_agent, referer).await?;
                *guard = Some((keys.clone(), Instant::now()));
                Ok(keys)
            }
        }
    }
}

#[async_trait]
impl RequestSigner for WbiSigner {
    async fn sign(&self, params: Params) -> Result<Params, SigningError> {
        let keys = self.keys().await?;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| SigningError::Clock)?
            .as_secs();
        Ok(sign_with(params, &keys, timestamp))
    }
}

/// Signs `params` with the given keys and timestamp
///
/// The returned list is sorted by name, with `wts` included, and ends with
/// `w_rid`.
pub fn sign_with(params: Params, keys: &WbiKeys, timestamp: u64) -> Params {
    let mut params: Params = params
        .into_iter()
        .map(|(k, v)| (k, strip_reserved(&v)))
        .collect();
    params.push(("wts".to_string(), timestamp.to_string()));
    params.sort_by(|a, b| a.0.cmp(&b.0));

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", url_encode(k), url_encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Md5::new();
    hasher.update(query.as_bytes());
    hasher.update(keys.mixin_key().as_bytes());
    let w_rid = hex::encode(hasher.finalize());

    params.push(("w_rid".to_string(), w_rid));
    params
}

/// Removes the characters the platform drops before hashing
fn strip_reserved(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '!' | '\'' | '(' | ')' | '*'))
        .collect()
}

fn url_encode(s: &str) -> String {
    let mut encoded = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '~' => encoded.push(c),
            _ => {
                let mut buf = [0; 4];
                for b in c.encode_utf8(&mut buf).bytes() {
                    encoded.push_str(&format!("%{:02X}", b));
                }
            }
        }
    }
    encoded
}

/// Extracts the key from an image URL: the file name without extension
fn take_filename(url: &str) -> Option<String> {
    url.rsplit_once('/')
        .and_then(|(_, s)| s.rsplit_once('.'))
        .map(|(s, _)| s.to_string())
        .filter(|s| !s.is_empty())
}

async fn fetch_keys(
    client: &Client,
    url: &str,
    user_agent: &str,
    referer: &str,
) -> Result<WbiKeys, SigningError> {
    let mut request = client.get(url).header(USER_AGENT, user_agent);
    if !referer.is_empty() {
        request = request.header(REFERER, referer);
    }

    // The nav endpoint answers with a non-zero code for anonymous sessions
    // but still publishes the keys, so only the payload is checked.
    let body = request.send().await?.error_for_status()?.text().await?;
    let nav: NavResponse = serde_json::from_str(&body)
        .map_err(|e| SigningError::Envelope(format!("nav response is not JSON: {}", e)))?;

    let img = nav
        .data
        .and_then(|d| d.wbi_img)
        .ok_or_else(|| SigningError::Envelope("missing data.wbi_img".to_string()))?;

    let img_key = take_filename(&img.img_url)
        .ok_or_else(|| SigningError::Envelope(format!("bad img_url '{}'", img.img_url)))?;
    let sub_key = take_filename(&img.sub_url)
        .ok_or_else(|| SigningError::Envelope(format!("bad sub_url '{}'", img.sub_url)))?;

    Ok(WbiKeys::new(img_key, sub_key))
}
