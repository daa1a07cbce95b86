//! Artificial round-trip delay for the mock backend.

use std::time::Duration;

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(200);

pub async fn simulate(latency: Duration) {
    if latency.is_zero() {
        return;
    }
    tokio::time::sleep(latency).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn waits_for_the_configured_latency() {
        let started = tokio::time::Instant::now();
        simulate(Duration::from_millis(400)).await;
        assert!(started.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn zero_latency_returns_immediately() {
        simulate(Duration::ZERO).await;
    }
}
