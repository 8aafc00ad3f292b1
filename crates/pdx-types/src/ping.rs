//! Probe outcome types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Symbolic classification of why a probe failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureTag {
    Timeout,
    Refused,
    NoRoute,
    DnsFail,
    DpiReset,
    TlsFail,
    NetworkFail,
    /// Low-latency endpoint that could not sustain minimal throughput.
    FakePing,
    /// Reachable in the main round but below the stability threshold.
    Unstable,
}

impl FailureTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Refused => "refused",
            Self::NoRoute => "no-route",
            Self::DnsFail => "dns-fail",
            Self::DpiReset => "dpi-reset",
            Self::TlsFail => "tls-fail",
            Self::NetworkFail => "network-fail",
            Self::FakePing => "fake-ping",
            Self::Unstable => "unstable",
        }
    }
}

impl fmt::Display for FailureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailureTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timeout" => Ok(Self::Timeout),
            "refused" => Ok(Self::Refused),
            "no-route" => Ok(Self::NoRoute),
            "dns-fail" => Ok(Self::DnsFail),
            "dpi-reset" => Ok(Self::DpiReset),
            "tls-fail" => Ok(Self::TlsFail),
            "network-fail" => Ok(Self::NetworkFail),
            "fake-ping" => Ok(Self::FakePing),
            "unstable" => Ok(Self::Unstable),
            other => Err(format!("unknown failure tag: {other}")),
        }
    }
}

/// Aggregated result of one probe round against a single endpoint.
///
/// Latency statistics cover successful attempts only. A result with zero
/// successes always reports `reachable = false` and carries a failure tag
/// only when tagging was enabled for the round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PingResult {
    pub reachable: bool,
    pub attempts: u32,
    pub successes: u32,
    pub loss_percent: u32,
    pub avg_ms: i64,
    pub min_ms: i64,
    pub max_ms: i64,
    /// Fraction of follow-up probes that succeeded, in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_tag: Option<FailureTag>,
}

impl PingResult {
    /// Result for an endpoint that was never dialed.
    pub fn unreachable(attempts: u32) -> Self {
        Self {
            reachable: false,
            attempts,
            successes: 0,
            loss_percent: if attempts > 0 { 100 } else { 0 },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_in_kebab_case() {
        for tag in [
            FailureTag::Timeout,
            FailureTag::Refused,
            FailureTag::NoRoute,
            FailureTag::DnsFail,
            FailureTag::DpiReset,
            FailureTag::TlsFail,
            FailureTag::NetworkFail,
            FailureTag::FakePing,
            FailureTag::Unstable,
        ] {
            assert_eq!(tag.as_str().parse::<FailureTag>().unwrap(), tag);
        }
    }

    #[test]
    fn unreachable_has_zero_stats() {
        let r = PingResult::unreachable(3);
        assert!(!r.reachable);
        assert_eq!(r.successes, 0);
        assert_eq!(r.loss_percent, 100);
        assert_eq!(r.avg_ms, 0);

        let none = PingResult::unreachable(0);
        assert_eq!(none.loss_percent, 0);
    }
}
