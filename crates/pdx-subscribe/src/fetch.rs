//! Subscription fetching and mixed-content ingestion.
//!
//! A subscription body is either a newline list of URIs or a base64 blob
//! decoding to one, and frequently links *other* subscriptions. Fetching
//! follows those nested links exactly one level deep, sequentially; a
//! failed nested fetch is logged and skipped, never fatal for the outer
//! operation.

use crate::extract::extract_uris;
use crate::parse::parse_all;
use crate::SubsError;
use pdx_types::RawConfig;
use std::time::Duration;
use tracing::{debug, info, warn};

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);
const USER_AGENT: &str = concat!("proxydex/", env!("CARGO_PKG_VERSION"));

/// Result of scanning mixed input text.
#[derive(Debug, Default)]
pub struct MixedContent {
    pub subscriptions: Vec<String>,
    pub configs: Vec<RawConfig>,
}

/// Fetch one subscription URL and parse its body. Fatal on fetch failure or
/// an empty result — a direct sync with nothing behind it is an error the
/// caller must see.
pub async fn fetch_subscription(url: &str) -> Result<Vec<RawConfig>, SubsError> {
    info!(%url, "fetching subscription");

    let body = fetch_with_retry(url).await?;
    let text = try_decode_body(&body);

    let uris = extract_uris(&text);
    if uris.is_empty() {
        return Err(SubsError::Parse("no configs found in subscription".into()));
    }
    debug!(count = uris.len(), "extracted URIs");

    let mut configs = parse_all(&uris);
    for cfg in &mut configs {
        cfg.source = format!("subscription:{url}");
    }
    Ok(configs)
}

/// Ingest any source: a URL is fetched first, everything else is treated as
/// mixed text. Nested subscription URLs found in the content are fetched
/// one level deep.
pub async fn ingest_source(source: &str) -> Result<Vec<RawConfig>, SubsError> {
    let text = if source.starts_with("http://") || source.starts_with("https://") {
        let body = fetch_with_retry(source).await?;
        try_decode_body(&body)
    } else {
        // Pasted text may itself be a base64 blob of links.
        try_decode_body(source)
    };

    let mixed = scan_mixed(&text);
    info!(
        direct = mixed.configs.len(),
        nested = mixed.subscriptions.len(),
        "mixed content scanned"
    );

    let mut configs = mixed.configs;
    for sub_url in &mixed.subscriptions {
        if sub_url == source {
            continue;
        }
        info!(url = %sub_url, "fetching nested subscription");
        match fetch_with_retry(sub_url).await {
            Ok(body) => {
                let text = try_decode_body(&body);
                let uris = extract_uris(&text);
                let mut nested = parse_all(&uris);
                for cfg in &mut nested {
                    cfg.source = format!("subscription:{sub_url}");
                }
                configs.append(&mut nested);
            }
            Err(err) => {
                warn!(url = %sub_url, %err, "nested subscription fetch failed");
            }
        }
    }

    Ok(configs)
}

/// Split mixed text into nested subscription URLs and directly parsable
/// configs.
pub fn scan_mixed(text: &str) -> MixedContent {
    let mut out = MixedContent::default();

    let mut seen = std::collections::HashSet::new();
    for line in text.lines() {
        let line = line.trim();
        if is_subscription_url(line) && seen.insert(line.to_string()) {
            out.subscriptions.push(line.to_string());
        }
    }

    let uris = extract_uris(text);
    out.configs = parse_all(&uris);
    out
}

/// Heuristic: an HTTP(S) URL that looks like a subscription endpoint and
/// does not itself embed a proxy scheme.
pub fn is_subscription_url(s: &str) -> bool {
    let s = s.trim().to_ascii_lowercase();

    if !s.starts_with("http://") && !s.starts_with("https://") {
        return false;
    }
    if ["vless://", "vmess://", "ss://", "trojan://"]
        .iter()
        .any(|scheme| s.contains(scheme))
    {
        return false;
    }

    [
        "raw.githubusercontent.com",
        "gist.githubusercontent.com",
        "/sub",
        "/subscription",
        "/config",
        ".txt",
        "/raw/",
    ]
    .iter()
    .any(|indicator| s.contains(indicator))
}

/// Single GET with retry. Non-200 statuses and transport errors both count
/// as failed attempts; the body is capped at 10 MiB.
pub async fn fetch_with_retry(url: &str) -> Result<String, SubsError> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SubsError::Fetch(format!("client: {e}")))?;

    let mut last_err = String::new();
    for attempt in 1..=MAX_ATTEMPTS {
        if attempt > 1 {
            debug!(attempt, max = MAX_ATTEMPTS, "retrying fetch");
            tokio::time::sleep(RETRY_DELAY).await;
        }

        let resp = match client.get(url).header("Accept", "*/*").send().await {
            Ok(resp) => resp,
            Err(err) => {
                warn!(attempt, %err, "fetch attempt failed");
                last_err = err.to_string();
                continue;
            }
        };

        if resp.status() != reqwest::StatusCode::OK {
            warn!(attempt, status = %resp.status(), "fetch attempt failed");
            last_err = format!("HTTP {}", resp.status().as_u16());
            continue;
        }

        match read_capped(resp).await {
            Ok(body) => return Ok(body),
            Err(err) => last_err = err,
        }
    }

    Err(SubsError::Fetch(format!(
        "fetch failed after {MAX_ATTEMPTS} attempts: {last_err}"
    )))
}

async fn read_capped(mut resp: reqwest::Response) -> Result<String, String> {
    let mut body: Vec<u8> = Vec::new();
    loop {
        match resp.chunk().await {
            Ok(Some(chunk)) => {
                let room = MAX_BODY_BYTES - body.len();
                body.extend_from_slice(&chunk[..chunk.len().min(room)]);
                if body.len() >= MAX_BODY_BYTES {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => return Err(err.to_string()),
        }
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Subscription bodies are frequently base64-wrapped; if the whole trimmed
/// body decodes under any alphabet to non-empty text, use the plaintext.
pub fn try_decode_body(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(decoded) = crate::parse::decode_base64_any(trimmed) {
        if !decoded.is_empty() {
            if let Ok(text) = String::from_utf8(decoded) {
                return text;
            }
        }
    }
    body.to_string()
}
