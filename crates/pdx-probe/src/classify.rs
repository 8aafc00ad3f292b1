//! Failure classification by substring match on the rendered error.

use pdx_types::FailureTag;

/// Map a dial error's rendered message to a failure tag.
///
/// The substrings follow the classic Go net error vocabulary plus the forms
/// the Rust standard library renders ("timed out", "lookup").
pub fn tag_error_message(msg: &str) -> FailureTag {
    let m = msg.to_ascii_lowercase();

    if m.contains("timeout") || m.contains("timed out") {
        FailureTag::Timeout
    } else if m.contains("refused") {
        FailureTag::Refused
    } else if m.contains("no route") {
        FailureTag::NoRoute
    } else if m.contains("no such host") || m.contains("dns") || m.contains("lookup") {
        FailureTag::DnsFail
    } else if m.contains("reset") || m.contains("broken pipe") {
        FailureTag::DpiReset
    } else {
        FailureTag::NetworkFail
    }
}

pub(crate) fn tag_io_error(err: &std::io::Error) -> FailureTag {
    tag_error_message(&err.to_string())
}

/// Most frequent tag; ties broken by first occurrence.
pub fn mode_tag(tags: &[FailureTag]) -> Option<FailureTag> {
    let mut best: Option<(FailureTag, usize)> = None;
    for (i, &tag) in tags.iter().enumerate() {
        if tags[..i].contains(&tag) {
            continue;
        }
        let count = tags.iter().filter(|&&t| t == tag).count();
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((tag, count));
        }
    }
    best.map(|(tag, _)| tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_table() {
        assert_eq!(tag_error_message("i/o timeout"), FailureTag::Timeout);
        assert_eq!(tag_error_message("connection timed out"), FailureTag::Timeout);
        assert_eq!(tag_error_message("connection refused"), FailureTag::Refused);
        assert_eq!(tag_error_message("no route to host"), FailureTag::NoRoute);
        assert_eq!(tag_error_message("no such host"), FailureTag::DnsFail);
        assert_eq!(
            tag_error_message("failed to lookup address information"),
            FailureTag::DnsFail
        );
        assert_eq!(tag_error_message("connection reset by peer"), FailureTag::DpiReset);
        assert_eq!(tag_error_message("broken pipe"), FailureTag::DpiReset);
        assert_eq!(tag_error_message("something odd"), FailureTag::NetworkFail);
    }

    #[test]
    fn mode_picks_most_frequent() {
        let tags = [FailureTag::Refused, FailureTag::Timeout, FailureTag::Timeout];
        assert_eq!(mode_tag(&tags), Some(FailureTag::Timeout));
    }

    #[test]
    fn mode_breaks_ties_by_first_occurrence() {
        let tags = [
            FailureTag::Refused,
            FailureTag::Timeout,
            FailureTag::Timeout,
            FailureTag::Refused,
        ];
        assert_eq!(mode_tag(&tags), Some(FailureTag::Refused));
        assert_eq!(mode_tag(&[]), None);
    }
}
