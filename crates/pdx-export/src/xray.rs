//! xray-shaped client document: local SOCKS/HTTP inbounds, the selected
//! config as the single proxy outbound, optional stats API.

use crate::ExportError;
use pdx_store::ConfigRow;
use pdx_types::{Protocol, Security, Transport};
use serde_json::{json, Map, Value};

const SOCKS_PORT: u16 = 10808;
const HTTP_PORT: u16 = 10809;
const STATS_PORT: u16 = 10085;

/// Render the first row as an xray client config. The row order is the
/// caller's ranking; only the best endpoint becomes the outbound.
pub fn to_xray(rows: &[ConfigRow], enable_stats: bool) -> Result<String, ExportError> {
    let selected = rows.first().ok_or(ExportError::Empty)?;

    let mut inbounds = vec![
        json!({
            "tag": "socks-in",
            "port": SOCKS_PORT,
            "listen": "127.0.0.1",
            "protocol": "socks",
            "settings": { "udp": true }
        }),
        json!({
            "tag": "http-in",
            "port": HTTP_PORT,
            "listen": "127.0.0.1",
            "protocol": "http",
            "settings": {}
        }),
    ];

    let mut doc = Map::new();
    doc.insert("log".into(), json!({ "loglevel": "warning" }));
    doc.insert(
        "outbounds".into(),
        json!([
            build_outbound(selected),
            { "tag": "direct", "protocol": "freedom", "settings": {} },
            { "tag": "block", "protocol": "blackhole", "settings": {} }
        ]),
    );
    doc.insert(
        "routing".into(),
        json!({
            "rules": [{
                "type": "field",
                "inboundTag": ["socks-in", "http-in"],
                "outboundTag": "proxy"
            }]
        }),
    );

    if enable_stats {
        doc.insert("stats".into(), json!({}));
        doc.insert(
            "api".into(),
            json!({ "tag": "api", "services": ["StatsService"] }),
        );
        doc.insert(
            "policy".into(),
            json!({
                "system": {
                    "statsInboundUplink": true,
                    "statsInboundDownlink": true,
                    "statsOutboundUplink": true,
                    "statsOutboundDownlink": true
                }
            }),
        );
        inbounds.push(json!({
            "tag": "api",
            "port": STATS_PORT,
            "listen": "127.0.0.1",
            "protocol": "dokodemo-door",
            "settings": { "address": "127.0.0.1" }
        }));
    }

    doc.insert("inbounds".into(), Value::Array(inbounds));
    Ok(serde_json::to_string_pretty(&Value::Object(doc))?)
}

fn build_outbound(row: &ConfigRow) -> Value {
    let settings = match row.protocol {
        Protocol::Vless => json!({
            "vnext": [{
                "address": row.server,
                "port": row.port,
                "users": [{ "id": row.uuid, "encryption": "none" }]
            }]
        }),
        Protocol::Vmess => json!({
            "vnext": [{
                "address": row.server,
                "port": row.port,
                "users": [{ "id": row.uuid, "alterId": 0, "security": "auto" }]
            }]
        }),
        Protocol::Trojan => json!({
            "servers": [{ "address": row.server, "port": row.port, "password": row.password }]
        }),
        Protocol::Shadowsocks => json!({
            "servers": [{
                "address": row.server,
                "port": row.port,
                "method": row.method,
                "password": row.password
            }]
        }),
        Protocol::Socks => json!({
            "servers": [{ "address": row.server, "port": row.port }]
        }),
    };

    json!({
        "tag": "proxy",
        "protocol": protocol_name(row.protocol),
        "settings": settings,
        "streamSettings": stream_settings(row)
    })
}

fn protocol_name(protocol: Protocol) -> &'static str {
    match protocol {
        // xray spells shadowsocks out in full.
        Protocol::Shadowsocks => "shadowsocks",
        other => other.as_str(),
    }
}

fn stream_settings(row: &ConfigRow) -> Value {
    let mut stream = Map::new();
    stream.insert("network".into(), json!(row.transport.as_str()));

    if matches!(row.security, Security::Tls | Security::Reality) {
        stream.insert("security".into(), json!("tls"));
        stream.insert(
            "tlsSettings".into(),
            json!({ "allowInsecure": true, "serverName": row.server }),
        );
    }

    let path = row.extra.get("path").cloned().unwrap_or_default();
    let host = row.extra.get("host").cloned().unwrap_or_default();

    match row.transport {
        Transport::Ws => {
            let mut ws = Map::new();
            ws.insert(
                "path".into(),
                json!(if path.is_empty() { "/" } else { &path }),
            );
            if !host.is_empty() {
                ws.insert("headers".into(), json!({ "Host": host }));
            }
            stream.insert("wsSettings".into(), Value::Object(ws));
        }
        Transport::Grpc => {
            let service = row.extra.get("serviceName").cloned().unwrap_or_default();
            stream.insert("grpcSettings".into(), json!({ "serviceName": service }));
        }
        Transport::H2 => {
            let mut http = Map::new();
            http.insert(
                "path".into(),
                json!(if path.is_empty() { "/" } else { &path }),
            );
            if !host.is_empty() {
                http.insert("host".into(), json!([host]));
            }
            stream.insert("httpSettings".into(), Value::Object(http));
        }
        Transport::Tcp | Transport::Udp => {}
    }

    Value::Object(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn row(protocol: Protocol, transport: Transport) -> ConfigRow {
        ConfigRow {
            id: 1,
            profile_id: 1,
            name: "n".into(),
            protocol,
            server: "vpn.example.com".into(),
            port: 443,
            uuid: "550e8400-e29b-41d4-a716-446655440000".into(),
            password: "pw".into(),
            method: "aes-256-gcm".into(),
            transport,
            security: Security::Tls,
            extra: BTreeMap::from([
                ("path".to_string(), "/tunnel".to_string()),
                ("host".to_string(), "cdn.example.org".to_string()),
                ("serviceName".to_string(), "svc".to_string()),
            ]),
            source: "manual".into(),
            last_ping: -1,
            is_alive: false,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn parse(rows: &[ConfigRow], stats: bool) -> Value {
        serde_json::from_str(&to_xray(rows, stats).unwrap()).unwrap()
    }

    #[test]
    fn builds_local_inbounds_and_three_outbounds() {
        let doc = parse(&[row(Protocol::Vless, Transport::Tcp)], false);

        let inbounds = doc["inbounds"].as_array().unwrap();
        assert_eq!(inbounds.len(), 2);
        assert_eq!(inbounds[0]["port"], 10808);
        assert_eq!(inbounds[0]["protocol"], "socks");
        assert_eq!(inbounds[1]["port"], 10809);
        assert_eq!(inbounds[1]["protocol"], "http");

        let outbounds = doc["outbounds"].as_array().unwrap();
        assert_eq!(outbounds.len(), 3);
        assert_eq!(outbounds[0]["tag"], "proxy");
        assert_eq!(outbounds[1]["protocol"], "freedom");
        assert_eq!(outbounds[2]["protocol"], "blackhole");

        assert_eq!(doc["routing"]["rules"][0]["outboundTag"], "proxy");
    }

    #[test]
    fn stats_adds_api_inbound_and_policy() {
        let doc = parse(&[row(Protocol::Vless, Transport::Tcp)], true);
        let inbounds = doc["inbounds"].as_array().unwrap();
        assert_eq!(inbounds.len(), 3);
        assert_eq!(inbounds[2]["port"], 10085);
        assert_eq!(inbounds[2]["protocol"], "dokodemo-door");
        assert_eq!(doc["api"]["services"][0], "StatsService");
        assert_eq!(doc["policy"]["system"]["statsInboundUplink"], true);
    }

    #[test]
    fn ws_stream_settings_come_from_extras() {
        let doc = parse(&[row(Protocol::Vmess, Transport::Ws)], false);
        let stream = &doc["outbounds"][0]["streamSettings"];
        assert_eq!(stream["network"], "ws");
        assert_eq!(stream["wsSettings"]["path"], "/tunnel");
        assert_eq!(stream["wsSettings"]["headers"]["Host"], "cdn.example.org");
        assert_eq!(stream["security"], "tls");
        assert_eq!(stream["tlsSettings"]["allowInsecure"], true);
    }

    #[test]
    fn grpc_and_h2_settings_map_their_extras() {
        let doc = parse(&[row(Protocol::Vless, Transport::Grpc)], false);
        assert_eq!(
            doc["outbounds"][0]["streamSettings"]["grpcSettings"]["serviceName"],
            "svc"
        );

        let doc = parse(&[row(Protocol::Vless, Transport::H2)], false);
        let http = &doc["outbounds"][0]["streamSettings"]["httpSettings"];
        assert_eq!(http["path"], "/tunnel");
        assert_eq!(http["host"][0], "cdn.example.org");
    }

    #[test]
    fn shadowsocks_settings_carry_method_and_password() {
        let doc = parse(&[row(Protocol::Shadowsocks, Transport::Tcp)], false);
        let server = &doc["outbounds"][0]["settings"]["servers"][0];
        assert_eq!(doc["outbounds"][0]["protocol"], "shadowsocks");
        assert_eq!(server["method"], "aes-256-gcm");
        assert_eq!(server["password"], "pw");
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(to_xray(&[], false), Err(ExportError::Empty)));
    }
}
