use std::time::Duration;

/// Knobs for one probe round.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Dial attempts per endpoint. Zero produces an unreachable result with
    /// zero statistics and no network traffic.
    pub attempts: u32,
    /// Upper bound on one TCP connect plus TLS handshake.
    pub timeout: Duration,
    /// Simultaneously in-flight dials across a batch.
    pub concurrency: usize,
    /// Gap between successive attempts on the same endpoint.
    pub attempt_delay: Duration,
    /// When non-zero, follow-up probes at a fixed cadence compute a
    /// stability score over this window (measured from the start of the
    /// main round).
    pub stability_window: Duration,
    /// Re-validate endpoints whose average latency is implausibly low.
    pub fake_ping_check: bool,
    /// Attach a failure tag to fully-failed results.
    pub failure_tagging: bool,
    /// Throughput floor for the fake-ping check, in KiB/s.
    pub min_throughput_kbps: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            timeout: Duration::from_secs(5),
            concurrency: 10,
            attempt_delay: Duration::from_millis(100),
            stability_window: Duration::ZERO,
            fake_ping_check: false,
            failure_tagging: false,
            min_throughput_kbps: 100,
        }
    }
}
