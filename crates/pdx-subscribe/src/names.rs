//! Display-name cleanup and profile-name derivation.
//!
//! Subscription names come soaked in emoji, flag prefixes and bracket
//! decorations; cleaning strips all of it down to the part a table column
//! can show.

use once_cell::sync::Lazy;
use regex::Regex;

static BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[«»‹›「」【】〔〕（）()\[\]{}⟨⟩]+").expect("bracket pattern"));

static EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        "[\u{1F1E6}-\u{1F1FF}\u{1F300}-\u{1F5FF}\u{1F600}-\u{1F64F}\u{1F680}-\u{1F6FF}\u{1F900}-\u{1F9FF}\u{1FA70}-\u{1FAFF}\u{2600}-\u{26FF}\u{2700}-\u{27BF}]+",
    )
    .expect("emoji pattern")
});

// "42-", "US-3-" style numbering left over once flags are gone.
static LOCATION_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+\s*[-–—]\s*|^[A-Z]{2}[-–—]\d+\s*[-–—]\s*").expect("location pattern")
});

static FORMAT_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new("[\u{FE0E}\u{FE0F}\u{E0100}-\u{E01EF}\\p{Cf}]+").expect("format-char pattern")
});

static LEADING_SYMBOLS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{P}\p{S}]+").expect("leading-symbol pattern"));

static DASH_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-–—\s]{2,}").expect("dash pattern"));

/// Strip decorations from a display name. Returns an empty string when
/// nothing presentable is left; the caller substitutes a default.
pub fn clean_name(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    let name = match urlencoding::decode(name) {
        Ok(s) => s.into_owned(),
        Err(_) => name.to_string(),
    };

    let name = BRACKETS.replace_all(&name, " ");
    let name = EMOJI.replace_all(&name, "");
    let name = LOCATION_PREFIX.replace(&name, "");
    let name = FORMAT_CHARS.replace_all(&name, "");
    let name = LEADING_SYMBOLS.replace(&name, "");
    let name = DASH_RUNS.replace_all(&name, " ");

    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derive a profile name from a source string.
///
/// URLs prefer the fragment, then the last meaningful path segment with any
/// config extension stripped, then the domain's first label. Everything else
/// falls back to `"Configs"`.
pub fn profile_name_from_source(source: &str) -> String {
    let source = source.trim();

    if source.starts_with("http") {
        if let Some(name) = fragment_name(source) {
            return name;
        }

        let rest = source.split("://").nth(1).unwrap_or(source);
        let rest = rest.split('#').next().unwrap_or(rest);
        let mut parts = rest.split('/');
        let domain = parts.next().unwrap_or("");
        let segments: Vec<&str> = parts.collect();

        for part in segments.iter().rev() {
            if part.is_empty() || *part == "raw" || *part == "main" {
                continue;
            }
            let mut part = *part;
            for ext in [".txt", ".conf", ".config", ".json"] {
                part = part.strip_suffix(ext).unwrap_or(part);
            }
            let cleaned = clean_name(part);
            if cleaned.len() > 2 {
                return title_case(&cleaned);
            }
        }

        if let Some(label) = domain.split('.').next() {
            let cleaned = clean_name(label);
            if !cleaned.is_empty() {
                return title_case(&cleaned);
            }
        }
    } else if source.contains("://") {
        if let Some(name) = fragment_name(source) {
            return name;
        }
    }

    "Configs".to_string()
}

fn fragment_name(source: &str) -> Option<String> {
    let idx = source.rfind('#')?;
    let fragment = &source[idx + 1..];
    if fragment.is_empty() {
        return None;
    }
    let cleaned = clean_name(fragment);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_emoji_and_brackets() {
        assert_eq!(clean_name("🔥【Fast】 Server ⚡"), "Fast Server");
        assert_eq!(clean_name("«Node» (EU)"), "Node EU");
    }

    #[test]
    fn strips_flag_number_prefix() {
        assert_eq!(clean_name("🇺🇸42- Dallas"), "Dallas");
        assert_eq!(clean_name("7 — Tokyo"), "Tokyo");
    }

    #[test]
    fn collapses_dash_runs_and_whitespace() {
        assert_eq!(clean_name("a --- b   c"), "a b c");
    }

    #[test]
    fn url_decodes_before_cleaning() {
        assert_eq!(clean_name("My%20Server"), "My Server");
    }

    #[test]
    fn pure_decoration_becomes_empty() {
        assert_eq!(clean_name("🔥🔥🔥"), "");
        assert_eq!(clean_name("***"), "");
    }

    #[test]
    fn profile_name_prefers_fragment_then_path() {
        assert_eq!(
            profile_name_from_source("https://example.com/subs/main.txt#My%20Subs"),
            "My Subs"
        );
        assert_eq!(
            profile_name_from_source("https://raw.githubusercontent.com/u/repo/main/iran-configs.txt"),
            "Iran-configs"
        );
        assert_eq!(profile_name_from_source("https://mirror.example.net/"), "Mirror");
        assert_eq!(profile_name_from_source("some random text"), "Configs");
    }
}
