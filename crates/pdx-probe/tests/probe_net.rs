//! Probe behavior against loopback listeners and blackholed addresses.

use pdx_probe::{CancellationToken, ProbeConfig, Prober};
use pdx_types::{Config, FailureTag, Protocol, Security, Transport};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::net::TcpListener;

fn config_for(server: &str, port: u16) -> Config {
    Config {
        name: format!("{server}:{port}"),
        protocol: Protocol::Trojan,
        server: server.to_string(),
        port,
        uuid: None,
        password: Some("pw".into()),
        method: None,
        transport: Transport::Tcp,
        security: Security::None,
        extra: BTreeMap::new(),
        source: String::new(),
    }
}

/// Accepts connections and immediately drops them.
async fn accept_then_close_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    (listener, port)
}

fn spawn_accept_loop(listener: TcpListener) {
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => drop(stream),
                Err(_) => break,
            }
        }
    });
}

#[tokio::test(flavor = "multi_thread")]
async fn local_listener_is_reachable_with_zero_loss() {
    let (listener, port) = accept_then_close_listener().await;
    spawn_accept_loop(listener);

    let prober = Prober::new(ProbeConfig {
        attempts: 5,
        timeout: Duration::from_secs(2),
        attempt_delay: Duration::from_millis(1),
        ..ProbeConfig::default()
    });

    let result = prober.probe(&config_for("127.0.0.1", port)).await;
    assert!(result.reachable);
    assert_eq!(result.attempts, 5);
    assert_eq!(result.successes, 5);
    assert_eq!(result.loss_percent, 0);
    assert!(result.avg_ms <= 50, "loopback avg was {} ms", result.avg_ms);
    assert!(result.min_ms <= result.avg_ms && result.avg_ms <= result.max_ms);
    assert!(result.failure_tag.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn blackholed_address_is_unreachable_and_tagged() {
    let prober = Prober::new(ProbeConfig {
        attempts: 2,
        timeout: Duration::from_millis(500),
        attempt_delay: Duration::from_millis(1),
        failure_tagging: true,
        ..ProbeConfig::default()
    });

    // TEST-NET-1 never answers.
    let result = prober.probe(&config_for("192.0.2.1", 12345)).await;
    assert!(!result.reachable);
    assert_eq!(result.successes, 0);
    assert_eq!(result.loss_percent, 100);
    assert!(matches!(
        result.failure_tag,
        Some(FailureTag::Timeout | FailureTag::NoRoute | FailureTag::NetworkFail)
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn tagging_disabled_leaves_failed_results_untagged() {
    let prober = Prober::new(ProbeConfig {
        attempts: 1,
        timeout: Duration::from_millis(300),
        ..ProbeConfig::default()
    });
    let result = prober.probe(&config_for("192.0.2.1", 12345)).await;
    assert!(!result.reachable);
    assert!(result.failure_tag.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn refused_port_gets_refused_tag() {
    // Bind then drop so the port is very likely closed.
    let (listener, port) = accept_then_close_listener().await;
    drop(listener);

    let prober = Prober::new(ProbeConfig {
        attempts: 2,
        timeout: Duration::from_secs(1),
        attempt_delay: Duration::from_millis(1),
        failure_tagging: true,
        ..ProbeConfig::default()
    });
    let result = prober.probe(&config_for("127.0.0.1", port)).await;
    assert!(!result.reachable);
    assert_eq!(result.failure_tag, Some(FailureTag::Refused));
}

#[tokio::test(flavor = "multi_thread")]
async fn batch_preserves_input_order() {
    let (a, port_a) = accept_then_close_listener().await;
    let (b, port_b) = accept_then_close_listener().await;
    spawn_accept_loop(a);
    spawn_accept_loop(b);

    let configs = vec![
        config_for("127.0.0.1", port_a),
        config_for("192.0.2.1", 12345),
        config_for("127.0.0.1", port_b),
    ];

    let prober = Prober::new(ProbeConfig {
        attempts: 2,
        timeout: Duration::from_millis(500),
        attempt_delay: Duration::from_millis(1),
        concurrency: 3,
        ..ProbeConfig::default()
    });

    let results = prober.probe_all(&configs).await;
    assert_eq!(results.len(), 3);
    assert!(results[0].reachable);
    assert!(!results[1].reachable);
    assert!(results[2].reachable);
}

#[tokio::test(flavor = "multi_thread")]
async fn zero_attempts_probe_nothing() {
    let prober = Prober::new(ProbeConfig {
        attempts: 0,
        ..ProbeConfig::default()
    });
    let result = prober.probe(&config_for("127.0.0.1", 1)).await;
    assert!(!result.reachable);
    assert_eq!(result.attempts, 0);
    assert_eq!(result.successes, 0);
    assert_eq!(result.loss_percent, 0);
    assert_eq!(result.avg_ms, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn fake_ping_demotes_silent_fast_listener() {
    let (listener, port) = accept_then_close_listener().await;
    spawn_accept_loop(listener);

    let prober = Prober::new(ProbeConfig {
        attempts: 3,
        timeout: Duration::from_secs(1),
        attempt_delay: Duration::from_millis(1),
        fake_ping_check: true,
        min_throughput_kbps: 100,
        ..ProbeConfig::default()
    });

    // Loopback accept-then-close: a few-ms ping and zero throughput.
    let result = prober.probe(&config_for("127.0.0.1", port)).await;
    assert!(!result.reachable);
    assert_eq!(result.successes, 0);
    assert_eq!(result.loss_percent, 100);
    assert_eq!(result.failure_tag, Some(FailureTag::FakePing));
}

#[tokio::test(flavor = "multi_thread")]
async fn short_stability_window_demotes_to_unstable() {
    let (listener, port) = accept_then_close_listener().await;
    spawn_accept_loop(listener);

    let prober = Prober::new(ProbeConfig {
        attempts: 1,
        timeout: Duration::from_secs(1),
        stability_window: Duration::from_secs(1),
        ..ProbeConfig::default()
    });

    // Window < cadence: zero follow-up probes, score 0, demoted.
    let result = prober.probe(&config_for("127.0.0.1", port)).await;
    assert!(!result.reachable);
    assert_eq!(result.stability, Some(0.0));
    assert_eq!(result.failure_tag, Some(FailureTag::Unstable));
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelled_batch_reports_timeouts() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let prober = Prober::new(ProbeConfig {
        attempts: 2,
        timeout: Duration::from_secs(5),
        failure_tagging: true,
        ..ProbeConfig::default()
    });

    let configs = vec![config_for("192.0.2.1", 443)];
    let results = prober.probe_all_cancellable(&configs, &cancel).await;
    assert_eq!(results.len(), 1);
    assert!(!results[0].reachable);
    assert_eq!(results[0].failure_tag, Some(FailureTag::Timeout));
}
