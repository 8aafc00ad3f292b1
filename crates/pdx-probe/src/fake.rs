//! Fake-ping re-validation.
//!
//! DPI middleboxes and captive ISP proxies often accept TCP instantly and
//! go silent, which shows up as a 1–2 ms "ping". The check opens a fresh
//! TCP connection to the endpoint, writes a plain HTTP request for a
//! 204-responding origin, and measures how many bytes come back per second.
//! No proxy handshake is involved; a real TCP peer relays or at least
//! answers, a black hole produces ~0 KiB/s.

use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const PROBE_HOST: &str = "www.gstatic.com";
const PROBE_PATH: &str = "/generate_204";
const OVERALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Measure raw throughput through `endpoint` in KiB/s. Any failure counts
/// as zero.
pub(crate) async fn measure_kbps(endpoint: &str) -> u64 {
    let started = Instant::now();

    let bytes = match tokio::time::timeout(OVERALL_TIMEOUT, transfer(endpoint)).await {
        Ok(n) => n,
        Err(_) => {
            debug!(%endpoint, "throughput check timed out");
            return 0;
        }
    };

    let secs = started.elapsed().as_secs_f64();
    if secs <= 0.0 {
        return 0;
    }
    (bytes as f64 / 1024.0 / secs) as u64
}

async fn transfer(endpoint: &str) -> u64 {
    let mut stream = match TcpStream::connect(endpoint).await {
        Ok(s) => s,
        Err(_) => return 0,
    };

    let request = format!(
        "GET {PROBE_PATH} HTTP/1.1\r\nHost: {PROBE_HOST}\r\nAccept: */*\r\nConnection: close\r\n\r\n"
    );
    if stream.write_all(request.as_bytes()).await.is_err() {
        return 0;
    }

    let mut total = 0u64;
    let mut buf = [0u8; 8192];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => total += n as u64,
        }
    }
    total
}
