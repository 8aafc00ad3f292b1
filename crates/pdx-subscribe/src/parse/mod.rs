//! Per-scheme URI parsers.
//!
//! Dispatch is a compile-time match on the scheme prefix; there is no
//! runtime registry. Each parser turns one URI into a [`RawConfig`] or a
//! [`SubsError::Parse`] naming what was wrong. Batch parsing drops bad
//! items with a WARN and keeps going.

mod shadowsocks;
mod socks;
mod trojan;
mod vless;
mod vmess;

use crate::SubsError;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use pdx_types::{Protocol, RawConfig};
use tracing::{debug, warn};

/// Detect the protocol from a literal scheme prefix.
///
/// `socks4://` and `socks5://` both map to the socks parser.
pub fn detect_protocol(uri: &str) -> Option<Protocol> {
    if uri.starts_with("vless://") {
        Some(Protocol::Vless)
    } else if uri.starts_with("vmess://") {
        Some(Protocol::Vmess)
    } else if uri.starts_with("ss://") {
        Some(Protocol::Shadowsocks)
    } else if uri.starts_with("trojan://") {
        Some(Protocol::Trojan)
    } else if uri.starts_with("socks5://") || uri.starts_with("socks4://") || uri.starts_with("socks://")
    {
        Some(Protocol::Socks)
    } else {
        None
    }
}

/// Parse a single URI into a raw config.
pub fn parse_uri(uri: &str) -> Result<RawConfig, SubsError> {
    let uri = uri.trim();
    match detect_protocol(uri).ok_or(SubsError::UnknownScheme)? {
        Protocol::Vless => vless::parse(uri),
        Protocol::Vmess => vmess::parse(uri),
        Protocol::Shadowsocks => shadowsocks::parse(uri),
        Protocol::Trojan => trojan::parse(uri),
        Protocol::Socks => socks::parse(uri),
    }
}

/// Parse a batch of URIs, keeping successes and logging failures.
pub fn parse_all<S: AsRef<str>>(uris: &[S]) -> Vec<RawConfig> {
    let mut configs = Vec::with_capacity(uris.len());

    for (i, uri) in uris.iter().enumerate() {
        let uri = uri.as_ref();
        match parse_uri(uri) {
            Ok(mut cfg) => {
                cfg.source = uri.to_string();
                debug!(
                    index = i,
                    protocol = %cfg.protocol.map(|p| p.as_str()).unwrap_or("?"),
                    server = %cfg.server,
                    port = cfg.port,
                    "parsed config"
                );
                configs.push(cfg);
            }
            Err(err) => {
                warn!(index = i, uri = %truncate(uri, 60), %err, "skipping unparsable uri");
            }
        }
    }

    debug!(parsed = configs.len(), total = uris.len(), "parse batch done");
    configs
}

/// Try standard, URL-safe, and both no-padding base64 alphabets in order.
pub(crate) fn decode_base64_any(s: &str) -> Result<Vec<u8>, SubsError> {
    let s = s.trim();
    for engine in [&STANDARD, &URL_SAFE, &STANDARD_NO_PAD, &URL_SAFE_NO_PAD] {
        if let Ok(bytes) = engine.decode(s) {
            return Ok(bytes);
        }
    }
    Err(SubsError::Parse("all base64 variants failed".into()))
}

/// URL-decode a fragment name; decode failure is non-fatal.
pub(crate) fn decode_name(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(s) => s.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Split `rest#fragment`; the fragment search runs right-to-left so names
/// containing `#` keep their tail.
pub(crate) fn split_fragment(s: &str) -> (&str, &str) {
    match s.rfind('#') {
        Some(i) => (&s[..i], &s[i + 1..]),
        None => (s, ""),
    }
}

pub(crate) fn split_query(s: &str) -> (&str, &str) {
    match s.find('?') {
        Some(i) => (&s[..i], &s[i + 1..]),
        None => (s, ""),
    }
}

/// Split `host:port` with IPv6 literals in brackets.
pub(crate) fn split_host_port(s: &str) -> Result<(String, Option<&str>), SubsError> {
    if let Some(rest) = s.strip_prefix('[') {
        let close = rest
            .find(']')
            .ok_or_else(|| SubsError::Parse("malformed IPv6 address".into()))?;
        let host = rest[..close].to_string();
        let after = &rest[close + 1..];
        return match after.strip_prefix(':') {
            Some(port) => Ok((host, Some(port))),
            None if after.is_empty() => Ok((host, None)),
            None => Err(SubsError::Parse("malformed IPv6 address".into())),
        };
    }

    match s.rsplit_once(':') {
        Some((host, port)) => Ok((host.to_string(), Some(port))),
        None => Ok((s.to_string(), None)),
    }
}

pub(crate) fn parse_port(port: Option<&str>, default: u16) -> Result<u16, SubsError> {
    match port {
        None => Ok(default),
        Some("") => Ok(default),
        Some(p) => p
            .parse::<u16>()
            .map_err(|_| SubsError::Parse(format!("invalid port: {p}"))),
    }
}

/// Split a query string into decoded key/value pairs, preserving order.
pub(crate) fn parse_query(query: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for part in query.split('&') {
        if let Some((key, value)) = part.split_once('=') {
            if key.is_empty() {
                continue;
            }
            pairs.push((key.to_string(), decode_name(value)));
        }
    }
    pairs
}

fn truncate(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
