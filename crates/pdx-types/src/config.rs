//! Endpoint descriptor types: protocol/transport/security tags plus the raw
//! and normalized config shapes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Proxy protocol tag.
///
/// The wire form (`ss` for Shadowsocks) doubles as the storage form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Vless,
    Vmess,
    #[serde(rename = "ss")]
    Shadowsocks,
    Trojan,
    Socks,
}

impl Protocol {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vless => "vless",
            Self::Vmess => "vmess",
            Self::Shadowsocks => "ss",
            Self::Trojan => "trojan",
            Self::Socks => "socks",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vless" => Ok(Self::Vless),
            "vmess" => Ok(Self::Vmess),
            "ss" | "shadowsocks" => Ok(Self::Shadowsocks),
            "trojan" => Ok(Self::Trojan),
            "socks" | "socks4" | "socks5" => Ok(Self::Socks),
            other => Err(format!("unknown protocol: {other}")),
        }
    }
}

/// Transport tag carried by a normalized config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Tcp,
    Udp,
    Ws,
    H2,
    Grpc,
}

impl Transport {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Ws => "ws",
            Self::H2 => "h2",
            Self::Grpc => "grpc",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            "ws" => Ok(Self::Ws),
            "h2" => Ok(Self::H2),
            "grpc" => Ok(Self::Grpc),
            other => Err(format!("unknown transport: {other}")),
        }
    }
}

/// Security layer expected in front of the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    None,
    Tls,
    Reality,
}

impl Security {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Tls => "tls",
            Self::Reality => "reality",
        }
    }

    /// Whether a probe must complete a TLS client handshake.
    pub const fn needs_tls(self) -> bool {
        matches!(self, Self::Tls | Self::Reality)
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Security {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(Self::None),
            "tls" => Ok(Self::Tls),
            "reality" => Ok(Self::Reality),
            other => Err(format!("unknown security: {other}")),
        }
    }
}

/// Parser output for a single URI, before validation.
///
/// Transport and security stay free-form here: the normalizer owns the
/// allowed-set check, so a parser never has to reject a config for a field
/// it merely passes through. Exactly one credential shape is populated,
/// consistent with the protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    pub protocol: Option<Protocol>,
    pub name: String,
    pub server: String,
    pub port: u16,
    pub uuid: Option<String>,
    pub password: Option<String>,
    pub method: Option<String>,
    pub transport: Option<String>,
    pub security: Option<String>,
    pub extra: BTreeMap<String, String>,
    /// Originating source string (URI, `subscription:<url>`, file path...).
    pub source: String,
}

/// Validated, defaulted, deduplicated endpoint descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub name: String,
    pub protocol: Protocol,
    pub server: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub transport: Transport,
    pub security: Security,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
    #[serde(default)]
    pub source: String,
}

impl Config {
    /// `server:port` in dialable form; IPv6 literals are bracketed.
    pub fn endpoint(&self) -> String {
        if self.server.contains(':') {
            format!("[{}]:{}", self.server, self.port)
        } else {
            format!("{}:{}", self.server, self.port)
        }
    }

    /// SNI used for the probe handshake: explicit `sni` extra, else server.
    pub fn sni(&self) -> &str {
        match self.extra.get("sni") {
            Some(s) if !s.is_empty() => s,
            _ => &self.server,
        }
    }

    /// Protocol-dependent identity for idempotent ingestion.
    ///
    /// vless/vmess key on the UUID and transport, shadowsocks on the
    /// credential pair, trojan on password and transport; anything else on
    /// the bare endpoint.
    pub fn dedup_key(&self) -> String {
        match self.protocol {
            Protocol::Vless | Protocol::Vmess => format!(
                "{}|{}|{}|{}|{}",
                self.protocol,
                self.server,
                self.port,
                self.uuid.as_deref().unwrap_or_default(),
                self.transport,
            ),
            Protocol::Shadowsocks => format!(
                "{}|{}|{}|{}|{}",
                self.protocol,
                self.server,
                self.port,
                self.password.as_deref().unwrap_or_default(),
                self.method.as_deref().unwrap_or_default(),
            ),
            Protocol::Trojan => format!(
                "{}|{}|{}|{}|{}",
                self.protocol,
                self.server,
                self.port,
                self.password.as_deref().unwrap_or_default(),
                self.transport,
            ),
            Protocol::Socks => {
                format!("{}|{}|{}", self.protocol, self.server, self.port)
            }
        }
    }
}
