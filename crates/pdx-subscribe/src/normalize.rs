//! Validation, defaulting, and deduplication of raw configs.

use crate::names::clean_name;
use crate::SubsError;
use once_cell::sync::Lazy;
use pdx_types::{Config, Protocol, RawConfig, Security, Transport};
use regex::Regex;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::{debug, warn};

static DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("domain pattern")
});

// Canonical 8-4-4-4-12 only; simple/braced/urn forms are rejected.
static UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid pattern")
});

const SS_METHODS: [&str; 6] = [
    "aes-128-gcm",
    "aes-256-gcm",
    "chacha20-ietf-poly1305",
    "xchacha20-ietf-poly1305",
    "2022-blake3-aes-128-gcm",
    "2022-blake3-aes-256-gcm",
];

/// Validate, default, and dedup a batch. Invalid configs are dropped with a
/// WARN; duplicates are dropped silently, first occurrence wins.
pub fn normalize_all(raw: Vec<RawConfig>) -> Vec<Config> {
    let total = raw.len();
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(total);

    for (i, r) in raw.into_iter().enumerate() {
        let cfg = match normalize_one(&r) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(index = i, %err, server = %r.server, "skipping invalid config");
                continue;
            }
        };

        if !seen.insert(cfg.dedup_key()) {
            debug!(index = i, name = %cfg.name, "duplicate config, skipping");
            continue;
        }
        out.push(cfg);
    }

    debug!(normalized = out.len(), total, "normalize batch done");
    out
}

/// Validate and default a single raw config.
pub fn normalize_one(raw: &RawConfig) -> Result<Config, SubsError> {
    let protocol = validate(raw)?;

    let transport = match raw.transport.as_deref() {
        Some(t) if !t.is_empty() => t
            .parse::<Transport>()
            .map_err(|e| SubsError::Invalid(e))?,
        _ => default_transport(protocol),
    };
    let security = match raw.security.as_deref() {
        Some(s) if !s.is_empty() => s.parse::<Security>().map_err(|e| SubsError::Invalid(e))?,
        _ => default_security(protocol),
    };

    let mut name = clean_name(&raw.name);
    if name.is_empty() {
        name = format!("{}-{}", protocol, raw.server);
    }

    Ok(Config {
        name,
        protocol,
        server: raw.server.clone(),
        port: raw.port,
        uuid: raw.uuid.clone(),
        password: raw.password.clone(),
        method: raw.method.clone(),
        transport,
        security,
        extra: raw.extra.clone(),
        source: raw.source.clone(),
    })
}

fn validate(raw: &RawConfig) -> Result<Protocol, SubsError> {
    let protocol = raw
        .protocol
        .ok_or_else(|| SubsError::Invalid("missing protocol".into()))?;

    if raw.server.is_empty() {
        return Err(SubsError::Invalid("missing server".into()));
    }
    if !is_valid_server(&raw.server) {
        return Err(SubsError::Invalid(format!("invalid server: {}", raw.server)));
    }
    if raw.port == 0 {
        return Err(SubsError::Invalid("invalid port: 0".into()));
    }

    match protocol {
        Protocol::Vless | Protocol::Vmess => {
            let uuid = raw
                .uuid
                .as_deref()
                .filter(|u| !u.is_empty())
                .ok_or_else(|| SubsError::Invalid(format!("missing UUID for {protocol}")))?;
            if !UUID.is_match(uuid) {
                return Err(SubsError::Invalid(format!("invalid UUID format: {uuid}")));
            }
        }
        Protocol::Trojan => {
            if raw.password.as_deref().unwrap_or("").is_empty() {
                return Err(SubsError::Invalid("missing password for trojan".into()));
            }
        }
        Protocol::Shadowsocks => {
            if raw.password.as_deref().unwrap_or("").is_empty() {
                return Err(SubsError::Invalid("missing password for shadowsocks".into()));
            }
            let method = raw
                .method
                .as_deref()
                .filter(|m| !m.is_empty())
                .ok_or_else(|| SubsError::Invalid("missing method for shadowsocks".into()))?;
            if !SS_METHODS.contains(&method.to_ascii_lowercase().as_str()) {
                return Err(SubsError::Invalid(format!(
                    "unsupported shadowsocks method: {method}"
                )));
            }
        }
        Protocol::Socks => {}
    }

    Ok(protocol)
}

fn default_transport(protocol: Protocol) -> Transport {
    match protocol {
        Protocol::Shadowsocks => Transport::Udp,
        _ => Transport::Tcp,
    }
}

fn default_security(protocol: Protocol) -> Security {
    match protocol {
        Protocol::Trojan => Security::Tls,
        _ => Security::None,
    }
}

fn is_valid_server(server: &str) -> bool {
    if let Ok(ip) = server.parse::<IpAddr>() {
        return !is_private_ip(ip);
    }

    if server.len() > 253 || !server.contains('.') {
        return false;
    }
    DOMAIN.is_match(server)
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => is_private_v6(v6),
    }
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    let [a, b, _, _] = ip.octets();
    // 10/8, 172.16/12, 192.168/16, 127/8, 169.254/16
    a == 10
        || (a == 172 && (16..=31).contains(&b))
        || (a == 192 && b == 168)
        || a == 127
        || (a == 169 && b == 254)
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    let seg = ip.segments()[0];
    ip.is_loopback() || (seg & 0xffc0) == 0xfe80 || (seg & 0xfe00) == 0xfc00
}
