//! Shadowsocks share links: SIP002 first, then the legacy whole-base64 form.
//!
//! SIP002:  `ss://base64(method:password)@host:port#name`
//! Legacy:  `ss://base64(method:password@host:port)#name`

use super::{decode_base64_any, decode_name, parse_port, split_fragment, split_host_port, split_query};
use crate::SubsError;
use pdx_types::{Protocol, RawConfig};
use tracing::debug;

const DEFAULT_PORT: u16 = 8388;

pub(super) fn parse(uri: &str) -> Result<RawConfig, SubsError> {
    match parse_sip002(uri) {
        Ok(cfg) => Ok(cfg),
        Err(sip_err) => {
            debug!(%sip_err, "SIP002 parse failed, trying legacy format");
            parse_legacy(uri).map_err(|legacy_err| {
                SubsError::Parse(format!(
                    "ss parse failed (sip002: {sip_err}; legacy: {legacy_err})"
                ))
            })
        }
    }
}

fn parse_sip002(uri: &str) -> Result<RawConfig, SubsError> {
    let rest = strip_scheme(uri)?;
    let (rest, fragment) = split_fragment(rest);
    // Plugin parameters are not carried into the config.
    let (rest, _query) = split_query(rest);

    let (userinfo, host_port) = rest
        .split_once('@')
        .ok_or_else(|| SubsError::Parse("missing userinfo".into()))?;

    let decoded = decode_base64_any(userinfo)?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| SubsError::Parse("userinfo is not UTF-8".into()))?;
    let (method, password) = split_method_password(&decoded)?;

    let (server, port) = split_host_port(host_port)?;
    if server.is_empty() {
        return Err(SubsError::Parse("missing server host".into()));
    }
    let port = parse_port(port, DEFAULT_PORT)?;

    Ok(build(fragment, server, port, method, password))
}

fn parse_legacy(uri: &str) -> Result<RawConfig, SubsError> {
    let rest = strip_scheme(uri)?;
    let (rest, fragment) = split_fragment(rest);

    let decoded = decode_base64_any(rest)?;
    let content = String::from_utf8(decoded)
        .map_err(|_| SubsError::Parse("payload is not UTF-8".into()))?;

    // The password may itself contain '@'; the host part cannot.
    let at = content
        .rfind('@')
        .ok_or_else(|| SubsError::Parse("missing @ in legacy payload".into()))?;
    let (method, password) = split_method_password(&content[..at])?;

    let (server, port) = split_host_port(&content[at + 1..])?;
    if server.is_empty() {
        return Err(SubsError::Parse("missing server host".into()));
    }
    let port = parse_port(port, DEFAULT_PORT)?;

    Ok(build(fragment, server, port, method, password))
}

fn strip_scheme(uri: &str) -> Result<&str, SubsError> {
    uri.strip_prefix("ss://")
        .ok_or_else(|| SubsError::Parse("expected ss scheme".into()))
}

fn split_method_password(s: &str) -> Result<(&str, &str), SubsError> {
    s.split_once(':')
        .ok_or_else(|| SubsError::Parse("missing method:password separator".into()))
}

fn build(fragment: &str, server: String, port: u16, method: &str, password: &str) -> RawConfig {
    RawConfig {
        protocol: Some(Protocol::Shadowsocks),
        name: decode_name(fragment),
        server,
        port,
        password: Some(password.to_string()),
        method: Some(method.to_string()),
        ..RawConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
    use base64::Engine;

    #[test]
    fn parses_sip002() {
        // base64("aes-256-gcm:test")
        let cfg = parse("ss://YWVzLTI1Ni1nY206dGVzdA==@1.2.3.4:8388#Node").unwrap();
        assert_eq!(cfg.protocol, Some(Protocol::Shadowsocks));
        assert_eq!(cfg.server, "1.2.3.4");
        assert_eq!(cfg.port, 8388);
        assert_eq!(cfg.method.as_deref(), Some("aes-256-gcm"));
        assert_eq!(cfg.password.as_deref(), Some("test"));
        assert_eq!(cfg.name, "Node");
    }

    #[test]
    fn sip002_password_keeps_embedded_colons() {
        let userinfo = STANDARD.encode("chacha20-ietf-poly1305:pass:with:colons");
        let cfg = parse(&format!("ss://{userinfo}@h.example.net:9000")).unwrap();
        assert_eq!(cfg.method.as_deref(), Some("chacha20-ietf-poly1305"));
        assert_eq!(cfg.password.as_deref(), Some("pass:with:colons"));
    }

    #[test]
    fn parses_legacy_with_at_in_password() {
        let payload = URL_SAFE_NO_PAD.encode("aes-128-gcm:p@ss@9.8.7.6:4443");
        let cfg = parse(&format!("ss://{payload}#Old")).unwrap();
        assert_eq!(cfg.method.as_deref(), Some("aes-128-gcm"));
        assert_eq!(cfg.password.as_deref(), Some("p@ss"));
        assert_eq!(cfg.server, "9.8.7.6");
        assert_eq!(cfg.port, 4443);
        assert_eq!(cfg.name, "Old");
    }

    #[test]
    fn legacy_handles_ipv6_brackets() {
        let payload = STANDARD.encode("aes-256-gcm:pw@[2001:db8::2]:8388");
        let cfg = parse(&format!("ss://{payload}")).unwrap();
        assert_eq!(cfg.server, "2001:db8::2");
        assert_eq!(cfg.port, 8388);
    }

    #[test]
    fn port_defaults_when_absent() {
        let payload = STANDARD.encode("aes-256-gcm:pw@host.example.com");
        let cfg = parse(&format!("ss://{payload}")).unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("ss://%%%%").is_err());
        let payload = STANDARD.encode("no-separator");
        assert!(parse(&format!("ss://{payload}")).is_err());
    }
}
