//! `trojan://password@host:port?type=&security=#name`

use super::{decode_name, parse_port, parse_query, split_fragment, split_host_port, split_query};
use crate::SubsError;
use pdx_types::{Protocol, RawConfig};
use std::collections::BTreeMap;

pub(super) fn parse(uri: &str) -> Result<RawConfig, SubsError> {
    let rest = uri
        .strip_prefix("trojan://")
        .ok_or_else(|| SubsError::Parse("expected trojan scheme".into()))?;

    let (rest, fragment) = split_fragment(rest);
    let (addr, query) = split_query(rest);

    let (password, host_port) = addr
        .split_once('@')
        .ok_or_else(|| SubsError::Parse("missing password".into()))?;
    if password.is_empty() {
        return Err(SubsError::Parse("missing password".into()));
    }
    let password = urlencoding::decode(password)
        .map_err(|e| SubsError::Parse(format!("password decode: {e}")))?
        .into_owned();

    let (server, port) = split_host_port(host_port)?;
    if server.is_empty() {
        return Err(SubsError::Parse("missing server host".into()));
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
        protocol: Some(Protocol::Trojan),
        name: decode_name(fragment),
        server,
        port,
        password: Some(password),
        transport,
        security,
        extra,
        ..RawConfig::default()
    })
}
