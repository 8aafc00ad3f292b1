//! `vmess://BASE64(JSON)` — the V2RayN share format.

use super::{decode_base64_any, decode_name};
use crate::SubsError;
use pdx_types::{Protocol, RawConfig};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// The share-link JSON payload. Fields the manager does not use (`v`,
/// `alpn`, ...) are ignored on decode.
#[derive(Debug, Deserialize)]
struct VmessPayload {
    #[serde(default)]
    ps: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    aid: Option<Value>,
    #[serde(default)]
    scy: String,
    #[serde(default)]
    add: String,
    #[serde(default)]
    port: Option<Value>,
    #[serde(default)]
    net: String,
    #[serde(default, rename = "type")]
    camouflage: String,
    #[serde(default)]
    tls: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    host: String,
}

pub(super) fn parse(uri: &str) -> Result<RawConfig, SubsError> {
    let raw = uri
        .strip_prefix("vmess://")
        .ok_or_else(|| SubsError::Parse("expected vmess scheme".into()))?
        .trim();

    let decoded = decode_base64_any(raw)?;
    let payload: VmessPayload = serde_json::from_slice(&decoded)
        .map_err(|e| SubsError::Parse(format!("vmess JSON: {e}")))?;

    if payload.add.is_empty() {
        return Err(SubsError::Parse("missing server (add)".into()));
    }

    let port = flex_port(payload.port.as_ref())?;
    let transport = map_network(&payload.net);

    let mut extra = BTreeMap::new();
    if let Some(aid) = payload.aid.as_ref().map(value_to_string) {
        if !aid.is_empty() && aid != "0" {
            extra.insert("aid".into(), aid);
        }
    }
    if !payload.camouflage.is_empty() && payload.camouflage != "none" {
        extra.insert("camouflage".into(), payload.camouflage);
    }
    if !payload.path.is_empty() {
        extra.insert("path".into(), payload.path);
    }
    if !payload.host.is_empty() {
        extra.insert("host".into(), payload.host);
    }
    if !payload.scy.is_empty() {
        extra.insert("encryption".into(), payload.scy);
    }

    Ok(RawConfig {
        protocol: Some(Protocol::Vmess),
        name: decode_name(&payload.ps),
        server: payload.add,
        port,
        uuid: Some(payload.id),
        transport: Some(transport.to_string()),
        security: if payload.tls.is_empty() {
            None
        } else {
            Some(payload.tls)
        },
        extra,
        ..RawConfig::default()
    })
}

/// Port may arrive as an integer, a numeric string, or be absent.
fn flex_port(port: Option<&Value>) -> Result<u16, SubsError> {
    match port {
        None | Some(Value::Null) => Ok(443),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u16::try_from(v).ok())
            .ok_or_else(|| SubsError::Parse(format!("invalid port: {n}"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u16>()
            .map_err(|_| SubsError::Parse(format!("invalid port: {s}"))),
        Some(other) => Err(SubsError::Parse(format!("unexpected port value: {other}"))),
    }
}

fn map_network(net: &str) -> &'static str {
    match net.to_ascii_lowercase().as_str() {
        "ws" => "ws",
        "h2" => "h2",
        "grpc" => "grpc",
        "udp" | "kcp" => "udp",
        _ => "tcp",
    }
}

fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}
