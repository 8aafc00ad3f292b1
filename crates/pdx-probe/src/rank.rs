//! In-memory ranking of probe results.

use pdx_types::PingResult;
use std::cmp::Ordering;

/// Quality ordering: reachable first, then loss ascending, then average
/// latency ascending. Unreachable results compare equal among themselves,
/// so a stable sort keeps their original order.
pub fn rank_ordering(a: &PingResult, b: &PingResult) -> Ordering {
    match b.reachable.cmp(&a.reachable) {
        Ordering::Equal if a.reachable => a
            .loss_percent
            .cmp(&b.loss_percent)
            .then(a.avg_ms.cmp(&b.avg_ms)),
        other => other,
    }
}

/// Stable-sort `(item, result)` pairs best-first.
pub fn sort_ranked<T>(entries: &mut [(T, PingResult)]) {
    entries.sort_by(|a, b| rank_ordering(&a.1, &b.1));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(reachable: bool, loss: u32, avg: i64) -> PingResult {
        PingResult {
            reachable,
            attempts: 3,
            successes: if reachable { 3 } else { 0 },
            loss_percent: loss,
            avg_ms: avg,
            ..PingResult::default()
        }
    }

    #[test]
    fn reachable_sorts_before_dead_then_by_loss_and_latency() {
        let mut entries = vec![
            ("dead", result(false, 100, 0)),
            ("slow", result(true, 0, 250)),
            ("lossy", result(true, 33, 40)),
            ("fast", result(true, 0, 12)),
        ];
        sort_ranked(&mut entries);
        let order: Vec<&str> = entries.iter().map(|(n, _)| *n).collect();
        assert_eq!(order, ["fast", "slow", "lossy", "dead"]);
    }
}
