//! `vless://UUID@host:port?query#name`

use super::{decode_name, parse_port, parse_query, split_fragment, split_host_port, split_query};
use crate::SubsError;
use pdx_types::{Protocol, RawConfig};
use std::collections::BTreeMap;

pub(super) fn parse(uri: &str) -> Result<RawConfig, SubsError> {
    let rest = uri
        .strip_prefix("vless://")
        .ok_or_else(|| SubsError::Parse("expected vless scheme".into()))?;

    let (rest, fragment) = split_fragment(rest);
    let (addr, query) = split_query(rest);

    let (uuid, host_port) = addr
        .split_once('@')
        .ok_or_else(|| SubsError::Parse("missing UUID in vless URI".into()))?;
    if uuid.is_empty() {
        return Err(SubsError::Parse("missing UUID in vless URI".into()));
    }

    let (server, port) = split_host_port(host_port)?;
    if server.is_empty() {
        return Err(SubsError::Parse("missing server host in vless URI".into()));
    }
    let port = parse_port(port, 443)?;

    let mut transport = None;
    let mut security = None;
    let mut extra = BTreeMap::new();
    for (key, value) in parse_query(query) {
        match key.as_str() {
            "type" if !value.is_empty() => transport = Some(value),
            "security" if !value.is_empty() => security = Some(value),
            "type" | "security" => {}
            _ => {
                extra.insert(key, value);
            }
        }
    }

    Ok(RawConfig {
        protocol: Some(Protocol::Vless),
        name: decode_name(fragment),
        server,
        port,
        uuid: Some(uuid.to_string()),
        transport,
        security,
        extra,
        ..RawConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_uri() {
        let cfg = parse(
            "vless://550e8400-e29b-41d4-a716-446655440000@vpn.example.com:443?type=tcp&security=tls&sni=cdn.example.org#Srv",
        )
        .unwrap();
        assert_eq!(cfg.protocol, Some(Protocol::Vless));
        assert_eq!(cfg.uuid.as_deref(), Some("550e8400-e29b-41d4-a716-446655440000"));
        assert_eq!(cfg.server, "vpn.example.com");
        assert_eq!(cfg.port, 443);
        assert_eq!(cfg.transport.as_deref(), Some("tcp"));
        assert_eq!(cfg.security.as_deref(), Some("tls"));
        assert_eq!(cfg.extra.get("sni").map(String::as_str), Some("cdn.example.org"));
        assert_eq!(cfg.name, "Srv");
    }

    #[test]
    fn port_defaults_to_443() {
        let cfg = parse("vless://u-u-i-d@host.example.com#X").unwrap();
        assert_eq!(cfg.port, 443);
    }

    #[test]
    fn rejects_missing_uuid_and_bad_port() {
        assert!(parse("vless://host.example.com:443").is_err());
        assert!(parse("vless://@host.example.com:443").is_err());
        assert!(parse("vless://uuid@host.example.com:notaport").is_err());
    }

    #[test]
    fn name_is_url_decoded() {
        let cfg = parse("vless://uuid@host.example.com:443#My%20Server").unwrap();
        assert_eq!(cfg.name, "My Server");
    }

    #[test]
    fn unknown_query_keys_go_to_extra() {
        let cfg = parse(
            "vless://uuid@h.example.com:443?type=grpc&serviceName=svc&fp=chrome&pbkey=k&sid=1#N",
        )
        .unwrap();
        assert_eq!(cfg.transport.as_deref(), Some("grpc"));
        assert_eq!(cfg.extra.get("serviceName").map(String::as_str), Some("svc"));
        assert_eq!(cfg.extra.get("fp").map(String::as_str), Some("chrome"));
        assert_eq!(cfg.extra.get("pbkey").map(String::as_str), Some("k"));
        assert_eq!(cfg.extra.get("sid").map(String::as_str), Some("1"));
    }
}
