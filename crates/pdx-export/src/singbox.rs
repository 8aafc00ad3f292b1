//! sing-box-shaped document: one outbound per config plus a terminal
//! `direct`, and a single route rule pointing at the best entry.

use crate::ExportError;
use pdx_store::ConfigRow;
use pdx_types::{Protocol, Security};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Document {
    outbounds: Vec<Outbound>,
    route: Route,
}

#[derive(Debug, Serialize)]
struct Outbound {
    #[serde(rename = "type")]
    kind: &'static str,
    tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    server: Option<String>,
    #[serde(rename = "server_port", skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tls: Option<Tls>,
}

#[derive(Debug, Serialize)]
struct Tls {
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    server_name: Option<String>,
    insecure: bool,
}

#[derive(Debug, Serialize)]
struct Route {
    rules: Vec<Rule>,
}

#[derive(Debug, Serialize)]
struct Rule {
    outbound: String,
}

/// Render the ordered rows as a sing-box config. Rows the format cannot
/// express (socks) are skipped; an all-skipped input is an error.
pub fn to_singbox(rows: &[ConfigRow]) -> Result<String, ExportError> {
    let mut outbounds: Vec<Outbound> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| row_to_outbound(row, format!("proxy-{}", i + 1)))
        .collect();

    if outbounds.is_empty() {
        return Err(ExportError::Empty);
    }

    outbounds.push(Outbound {
        kind: "direct",
        tag: "direct".to_string(),
        server: None,
        port: None,
        uuid: None,
        password: None,
        method: None,
        network: None,
        tls: None,
    });

    let doc = Document {
        outbounds,
        route: Route {
            rules: vec![Rule {
                outbound: "proxy-1".to_string(),
            }],
        },
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

fn row_to_outbound(row: &ConfigRow, tag: String) -> Option<Outbound> {
    let mut out = Outbound {
        kind: "",
        tag,
        server: Some(row.server.clone()),
        port: Some(row.port),
        uuid: None,
        password: None,
        method: None,
        network: None,
        tls: None,
    };

    let mut has_tls = matches!(row.security, Security::Tls | Security::Reality);

    match row.protocol {
        Protocol::Vless => {
            out.kind = "vless";
            out.uuid = Some(row.uuid.clone());
            out.network = Some(row.transport.as_str().to_string());
        }
        Protocol::Vmess => {
            out.kind = "vmess";
            out.uuid = Some(row.uuid.clone());
            out.network = Some(row.transport.as_str().to_string());
        }
        Protocol::Shadowsocks => {
            out.kind = "shadowsocks";
            out.method = Some(row.method.clone());
            out.password = Some(row.password.clone());
        }
        Protocol::Trojan => {
            out.kind = "trojan";
            out.password = Some(row.password.clone());
            has_tls = true;
        }
        Protocol::Socks => return None,
    }

    if has_tls {
        out.tls = Some(Tls {
            enabled: true,
            server_name: Some(row.server.clone()),
            insecure: true,
        });
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdx_types::Transport;
    use std::collections::BTreeMap;

    fn row(protocol: Protocol, security: Security) -> ConfigRow {
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
            transport: Transport::Tcp,
            security,
            extra: BTreeMap::new(),
            source: "manual".into(),
            last_ping: -1,
            is_alive: false,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn vless_outbound_carries_uuid_network_and_tls() {
        let text = to_singbox(&[row(Protocol::Vless, Security::Tls)]).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();

        let out = &doc["outbounds"][0];
        assert_eq!(out["type"], "vless");
        assert_eq!(out["tag"], "proxy-1");
        assert_eq!(out["server"], "vpn.example.com");
        assert_eq!(out["server_port"], 443);
        assert_eq!(out["uuid"], "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(out["network"], "tcp");
        assert_eq!(out["tls"]["enabled"], true);
        assert_eq!(out["tls"]["insecure"], true);
        assert_eq!(out["tls"]["server_name"], "vpn.example.com");

        // Terminal direct outbound and the single route rule.
        let outs = doc["outbounds"].as_array().unwrap();
        assert_eq!(outs.last().unwrap()["type"], "direct");
        assert_eq!(doc["route"]["rules"][0]["outbound"], "proxy-1");
    }

    #[test]
    fn reality_also_enables_tls_block() {
        let text = to_singbox(&[row(Protocol::Vless, Security::Reality)]).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["outbounds"][0]["tls"]["enabled"], true);
    }

    #[test]
    fn shadowsocks_has_method_password_and_no_tls() {
        let text = to_singbox(&[row(Protocol::Shadowsocks, Security::None)]).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        let out = &doc["outbounds"][0];
        assert_eq!(out["type"], "shadowsocks");
        assert_eq!(out["method"], "aes-256-gcm");
        assert_eq!(out["password"], "pw");
        assert!(out.get("tls").is_none());
        assert!(out.get("uuid").is_none());
    }

    #[test]
    fn trojan_forces_tls() {
        let text = to_singbox(&[row(Protocol::Trojan, Security::None)]).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["outbounds"][0]["tls"]["enabled"], true);
    }

    #[test]
    fn socks_rows_are_skipped_and_empty_input_errors() {
        assert!(matches!(
            to_singbox(&[row(Protocol::Socks, Security::None)]),
            Err(ExportError::Empty)
        ));
        assert!(matches!(to_singbox(&[]), Err(ExportError::Empty)));
    }

    #[test]
    fn output_is_two_space_indented() {
        let text = to_singbox(&[row(Protocol::Trojan, Security::Tls)]).unwrap();
        assert!(text.starts_with("{\n  \"outbounds\""));
    }
}
