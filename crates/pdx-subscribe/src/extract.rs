//! URI extraction from arbitrary text blobs.
//!
//! Subscription pages and chat dumps wrap links in HTML entities, emoji and
//! trailing punctuation; the extractor sanitizes first, then matches a
//! deliberately permissive scheme regex and filters out fragments that
//! cannot be real links. The exact rule set is load-bearing: dedup hashes
//! and the extractor idempotence property depend on it.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static URI_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:vless|vmess|ss|trojan|socks[45]?)://[A-Za-z0-9+/=_\-@:.?&#%\[\]]+")
        .expect("uri pattern")
});

/// Extract an ordered list of unique proxy URIs from `text`.
pub fn extract_uris(text: &str) -> Vec<String> {
    let text = sanitize(text);

    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for m in URI_PATTERN.find_iter(&text) {
        let uri = trim_trailing(m.as_str());
        if !is_usable(uri) {
            continue;
        }
        if seen.insert(uri.to_string()) {
            out.push(uri.to_string());
        }
    }

    out
}

fn sanitize(s: &str) -> String {
    let s = s
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    s.chars()
        .filter(|&c| !is_zero_width(c) && !is_emoji(c))
        .collect()
}

fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}')
}

fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F300..=0x1F6FF
            | 0x1F900..=0x1FAFF
            | 0x2600..=0x27BF
            | 0xFE00..=0xFE0F
            | 0x1F1E6..=0x1F1FF
    )
}

fn trim_trailing(uri: &str) -> &str {
    // Anything after an embedded '<' is markup, not link.
    let uri = match uri.find('<') {
        Some(i) => &uri[..i],
        None => uri,
    };
    uri.trim_end_matches(|c| ".,;:!?)}]\"'»›*_~`".contains(c))
}

fn is_usable(uri: &str) -> bool {
    if uri.len() < 10 || uri.ends_with("...") {
        return false;
    }

    let Some(idx) = uri.find("://") else {
        return false;
    };
    let payload = &uri[idx + 3..];
    if payload.is_empty() {
        return false;
    }

    payload.contains('@') || looks_base64(payload)
}

fn looks_base64(s: &str) -> bool {
    if s.len() < 8 {
        return false;
    }
    let good = s
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || "+/=-_".contains(*c))
        .count();
    good as f64 / s.chars().count() as f64 > 0.7
}

#[cfg(test)]
mod tests {
    use super::*;

    const VLESS: &str =
        "vless://550e8400-e29b-41d4-a716-446655440000@vpn.example.com:443?type=tcp&security=tls#Srv";

    #[test]
    fn extracts_from_plain_text() {
        let text = format!("try this one: {VLESS} it works");
        assert_eq!(extract_uris(&text), vec![VLESS.to_string()]);
    }

    #[test]
    fn dedups_and_trims_trailing_punctuation() {
        let text = format!("{VLESS}\nsecond mention: {VLESS}.");
        assert_eq!(extract_uris(&text), vec![VLESS.to_string()]);
    }

    #[test]
    fn decodes_html_entities() {
        let text = VLESS.replace('&', "&amp;");
        assert_eq!(extract_uris(&text), vec![VLESS.to_string()]);
    }

    #[test]
    fn strips_zero_width_and_emoji() {
        let text = format!("🔥\u{200b}{VLESS}\u{feff}🚀");
        assert_eq!(extract_uris(&text), vec![VLESS.to_string()]);
    }

    #[test]
    fn rejects_short_and_implausible_matches() {
        assert!(extract_uris("ss://ab").is_empty());
        // No '@' and mostly non-base64 payload.
        assert!(extract_uris("vmess://???:???:???").is_empty());
    }

    #[test]
    fn accepts_base64_payload_without_at() {
        let uri = "vmess://eyJhZGQiOiJzLnRlc3QiLCJpZCI6ImFhYWEifQ==";
        assert_eq!(extract_uris(uri), vec![uri.to_string()]);
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = format!(
            "junk {VLESS} more junk\ntrojan://pw@host.example.net:443#X.\nss://YWVzLTI1Ni1nY206dGVzdA==@1.2.3.4:8388"
        );
        let first = extract_uris(&text);
        let second = extract_uris(&first.join("\n"));
        assert_eq!(first, second);
    }
}
