//! The prober itself: scheduling, per-attempt dialing, aggregation.

use crate::classify::{mode_tag, tag_io_error};
use crate::config::ProbeConfig;
use crate::{fake, tls};
use pdx_types::{Config, FailureTag, PingResult};
use rustls::pki_types::ServerName;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_rustls::TlsConnector;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const FAKE_PING_THRESHOLD_MS: i64 = 10;
const STABILITY_CADENCE: Duration = Duration::from_secs(5);
const STABILITY_FLOOR: f64 = 0.5;

/// Bounded-concurrency endpoint prober.
///
/// One permit covers one dial (connect + handshake); attempts for the same
/// endpoint run sequentially, different endpoints in parallel up to
/// `concurrency`.
#[derive(Clone)]
pub struct Prober {
    cfg: ProbeConfig,
    sem: Arc<Semaphore>,
    tls: TlsConnector,
}

impl Prober {
    pub fn new(cfg: ProbeConfig) -> Self {
        let permits = cfg.concurrency.max(1);
        Self {
            cfg,
            sem: Arc::new(Semaphore::new(permits)),
            tls: tls::insecure_connector(),
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.cfg
    }

    /// Probe a single endpoint.
    pub async fn probe(&self, config: &Config) -> PingResult {
        self.probe_cancellable(config, &CancellationToken::new())
            .await
    }

    /// Probe a batch. The result at index `i` belongs to `configs[i]`
    /// regardless of completion order.
    pub async fn probe_all(&self, configs: &[Config]) -> Vec<PingResult> {
        self.probe_all_cancellable(configs, &CancellationToken::new())
            .await
    }

    pub async fn probe_all_cancellable(
        &self,
        configs: &[Config],
        cancel: &CancellationToken,
    ) -> Vec<PingResult> {
        debug!(
            count = configs.len(),
            concurrency = self.cfg.concurrency,
            attempts = self.cfg.attempts,
            "probing batch"
        );

        let mut results = vec![PingResult::unreachable(self.cfg.attempts); configs.len()];
        let mut tasks = JoinSet::new();

        for (index, config) in configs.iter().enumerate() {
            let prober = self.clone();
            let config = config.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let result = prober.probe_cancellable(&config, &cancel).await;
                (index, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Ok((index, result)) = joined {
                results[index] = result;
            }
        }
        results
    }

    /// Probe one endpoint under an external cancellation signal. A
    /// cancelled dial reports as `timeout`.
    pub async fn probe_cancellable(
        &self,
        config: &Config,
        cancel: &CancellationToken,
    ) -> PingResult {
        let round_started = Instant::now();
        if self.cfg.attempts == 0 {
            return PingResult::unreachable(0);
        }

        let mut latencies: Vec<i64> = Vec::with_capacity(self.cfg.attempts as usize);
        let mut tags: Vec<FailureTag> = Vec::new();

        for attempt in 0..self.cfg.attempts {
            if attempt > 0 && !self.cfg.attempt_delay.is_zero() {
                tokio::select! {
                    () = tokio::time::sleep(self.cfg.attempt_delay) => {}
                    () = cancel.cancelled() => {}
                }
            }
            if cancel.is_cancelled() {
                tags.push(FailureTag::Timeout);
                continue;
            }

            match self
                .dial_once(config, cancel, config.security.needs_tls())
                .await
            {
                Ok(ms) => {
                    debug!(name = %config.name, attempt, ms, "attempt ok");
                    latencies.push(ms);
                }
                Err(tag) => {
                    debug!(name = %config.name, attempt, %tag, "attempt failed");
                    tags.push(tag);
                }
            }
        }

        let mut result = self.aggregate(&latencies, &tags);

        if result.reachable && self.cfg.fake_ping_check && result.avg_ms < FAKE_PING_THRESHOLD_MS {
            let kbps = fake::measure_kbps(&config.endpoint()).await;
            if kbps < self.cfg.min_throughput_kbps {
                warn!(
                    name = %config.name,
                    kbps,
                    floor = self.cfg.min_throughput_kbps,
                    "fake ping detected, demoting"
                );
                result.reachable = false;
                result.successes = 0;
                result.loss_percent = 100;
                result.failure_tag = Some(FailureTag::FakePing);
            }
        }

        if result.reachable && !self.cfg.stability_window.is_zero() {
            let score = self.stability_score(config, round_started, cancel).await;
            result.stability = Some(score);
            if score < STABILITY_FLOOR {
                warn!(name = %config.name, score, "unstable endpoint, demoting");
                result.reachable = false;
                result.failure_tag = Some(FailureTag::Unstable);
            }
        }

        result
    }

    fn aggregate(&self, latencies: &[i64], tags: &[FailureTag]) -> PingResult {
        let attempts = self.cfg.attempts;
        let successes = latencies.len() as u32;

        let mut result = PingResult {
            reachable: successes > 0,
            attempts,
            successes,
            loss_percent: (attempts - successes) * 100 / attempts,
            ..PingResult::default()
        };

        if let (Some(&min), Some(&max)) = (latencies.iter().min(), latencies.iter().max()) {
            result.min_ms = min;
            result.max_ms = max;
            result.avg_ms = latencies.iter().sum::<i64>() / latencies.len() as i64;
        }

        if self.cfg.failure_tagging && successes == 0 {
            result.failure_tag = mode_tag(tags);
        }
        result
    }

    /// One dial under one semaphore permit and one deadline.
    async fn dial_once(
        &self,
        config: &Config,
        cancel: &CancellationToken,
        with_tls: bool,
    ) -> Result<i64, FailureTag> {
        let _permit = match self.sem.acquire().await {
            Ok(permit) => permit,
            Err(_) => return Err(FailureTag::Timeout),
        };

        let started = Instant::now();
        let outcome = tokio::select! {
            dialed = tokio::time::timeout(self.cfg.timeout, self.connect(config, with_tls)) => {
                match dialed {
                    Ok(inner) => inner,
                    Err(_) => Err(FailureTag::Timeout),
                }
            }
            () = cancel.cancelled() => Err(FailureTag::Timeout),
        };

        outcome.map(|()| started.elapsed().as_millis() as i64)
    }

    async fn connect(&self, config: &Config, with_tls: bool) -> Result<(), FailureTag> {
        let stream = TcpStream::connect((config.server.as_str(), config.port))
            .await
            .map_err(|e| tag_io_error(&e))?;

        if with_tls {
            let server_name = ServerName::try_from(config.sni().to_string())
                .map_err(|_| FailureTag::TlsFail)?;
            self.tls
                .connect(server_name, stream)
                .await
                .map_err(|_| FailureTag::TlsFail)?;
        }
        Ok(())
    }

    /// Follow-up phase: one plain TCP dial per cadence tick until the
    /// window (measured from the start of the main round) elapses. A window
    /// shorter than the cadence yields zero probes and thus score 0.
    async fn stability_score(
        &self,
        config: &Config,
        round_started: Instant,
        cancel: &CancellationToken,
    ) -> f64 {
        let mut total = 0u32;
        let mut ok = 0u32;

        loop {
            if round_started.elapsed() + STABILITY_CADENCE > self.cfg.stability_window {
                break;
            }
            tokio::select! {
                () = tokio::time::sleep(STABILITY_CADENCE) => {}
                () = cancel.cancelled() => break,
            }

            total += 1;
            if self.dial_once(config, cancel, false).await.is_ok() {
                ok += 1;
            }
        }

        debug!(name = %config.name, ok, total, "stability window done");
        if total == 0 {
            0.0
        } else {
            f64::from(ok) / f64::from(total)
        }
    }
}
