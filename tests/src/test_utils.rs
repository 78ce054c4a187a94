//! Test utility functions for integration tests

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing_subscriber::{fmt, EnvFilter};

use ransim_gnb::{AmfState, SimulationContext};
use ransim_ue::UeSnapshot;

use crate::test_fixtures::gnb_config;

/// Result type for integration tests
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Initialize logging for tests
///
/// Uses RUST_LOG environment variable if set, otherwise defaults to "info"
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
}

/// Wait for a condition to become true with timeout
///
/// # Arguments
/// * `condition` - Async function that returns true when condition is met
/// * `timeout_duration` - Maximum time to wait
/// * `poll_interval` - How often to check the condition
pub async fn wait_for_condition<F, Fut>(
    mut condition: F,
    timeout_duration: Duration,
    poll_interval: Duration,
) -> TestResult
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let result = timeout(timeout_duration, async {
        loop {
            if condition().await {
                return;
            }
            sleep(poll_interval).await;
        }
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(_) => Err("Condition not met within timeout".into()),
    }
}

/// Default timeout for test operations
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default poll interval for condition checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A loopback TCP port with no listener behind it.
pub async fn unused_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

/// Starts a simulation whose gNB has completed NG Setup with the AMF at `amf`.
pub async fn start_simulation(amf: SocketAddr) -> TestResult<SimulationContext> {
    let mut sim = SimulationContext::new();
    sim.start_gnb(gnb_config(amf)).await?;
    let sim_ref = &sim;
    wait_for_condition(
        move || async move {
            sim_ref
                .gnb_snapshot()
                .await
                .is_some_and(|gnb| gnb.amf_state == AmfState::Ready)
        },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await?;
    Ok(sim)
}

/// Waits until the snapshot of `ue_id` satisfies `predicate`.
pub async fn wait_for_ue<F>(sim: &SimulationContext, ue_id: u32, predicate: F) -> TestResult
where
    F: Fn(&UeSnapshot) -> bool,
{
    let predicate = &predicate;
    wait_for_condition(
        move || async move { sim.ue_snapshot(ue_id).await.is_some_and(|ue| predicate(&ue)) },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_wait_for_condition_success() {
        let flag = Arc::new(AtomicBool::new(false));
        let flag_clone = flag.clone();

        tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            flag_clone.store(true, Ordering::SeqCst);
        });

        let result = wait_for_condition(
            || async { flag.load(Ordering::SeqCst) },
            Duration::from_secs(1),
            Duration::from_millis(10),
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_wait_for_condition_timeout() {
        let result = wait_for_condition(
            || async { false },
            Duration::from_millis(100),
            Duration::from_millis(10),
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unused_port_refuses() {
        let port = unused_port().await;
        assert!(tokio::net::TcpStream::connect(("127.0.0.1", port)).await.is_err());
    }
}
