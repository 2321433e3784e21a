//! Network shim
//!
//! Optional stage in front of the submission paths that models transport:
//! a drop probability, a base latency, and symmetric jitter, all sampled
//! from a seeded stream. A dropped call never touches the wrapped action —
//! the façade maps it to `service_unavailable`.

use determinism::SimRng;
use std::time::Duration;

/// Shim knobs.
#[derive(Debug, Clone)]
pub struct ShimConfig {
    pub base_latency_ms: f64,
    /// Symmetric jitter: the sampled delay is `base ± jitter`.
    pub jitter_ms: f64,
    /// Drop probability in `[0, 1]`.
    pub packet_loss_rate: f64,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            base_latency_ms: 20.0,
            jitter_ms: 5.0,
            packet_loss_rate: 0.0,
        }
    }
}

/// Outcome of one shimmed call.
#[derive(Debug, Clone, PartialEq)]
pub struct ShimOutcome<T> {
    pub delivered: bool,
    /// Simulated latency actually slept, milliseconds.
    pub latency_ms: f64,
    pub result: Option<T>,
}

/// Latency/jitter/drop stage with its own derived random stream.
#[derive(Debug)]
pub struct NetworkShim {
    config: ShimConfig,
    rng: SimRng,
}

impl NetworkShim {
    pub fn new(config: ShimConfig, rng: &SimRng) -> Self {
        Self {
            config,
            rng: rng.derive("net-shim"),
        }
    }

    pub fn config(&self) -> &ShimConfig {
        &self.config
    }

    /// Sample a drop; if delivered, sleep the sampled latency and invoke.
    pub async fn call<T>(&mut self, action: impl FnOnce() -> T) -> ShimOutcome<T> {
        if self.rng.next_bool(self.config.packet_loss_rate) {
            tracing::debug!("shim dropped a call");
            return ShimOutcome {
                delivered: false,
                latency_ms: 0.0,
                result: None,
            };
        }

        let jitter = self
            .rng
            .range_f64(-self.config.jitter_ms, self.config.jitter_ms);
        let latency_ms = (self.config.base_latency_ms + jitter).max(0.0);
        tokio::time::sleep(Duration::from_secs_f64(latency_ms / 1_000.0)).await;

        ShimOutcome {
            delivered: true,
            latency_ms,
            result: Some(action()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shim(loss: f64, base: f64, jitter: f64) -> NetworkShim {
        NetworkShim::new(
            ShimConfig {
                base_latency_ms: base,
                jitter_ms: jitter,
                packet_loss_rate: loss,
            },
            &SimRng::new(42),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivery_invokes_action() {
        let mut shim = shim(0.0, 10.0, 0.0);
        let outcome = shim.call(|| 7).await;
        assert!(outcome.delivered);
        assert_eq!(outcome.result, Some(7));
        assert_eq!(outcome.latency_ms, 10.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_loss_never_invokes() {
        let mut shim = shim(1.0, 10.0, 0.0);
        for _ in 0..50 {
            let outcome = shim.call(|| 7).await;
            assert!(!outcome.delivered);
            assert!(outcome.result.is_none());
            assert_eq!(outcome.latency_ms, 0.0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_within_jitter_bounds() {
        let mut shim = shim(0.0, 20.0, 5.0);
        for _ in 0..100 {
            let outcome = shim.call(|| ()).await;
            assert!(outcome.latency_ms >= 15.0 && outcome.latency_ms < 25.0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_clamped_at_zero() {
        let mut shim = shim(0.0, 1.0, 10.0);
        for _ in 0..100 {
            let outcome = shim.call(|| ()).await;
            assert!(outcome.latency_ms >= 0.0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_seed_same_drop_pattern() {
        let mut a = shim(0.5, 1.0, 0.0);
        let mut b = shim(0.5, 1.0, 0.0);
        for _ in 0..50 {
            let ra = a.call(|| ()).await;
            let rb = b.call(|| ()).await;
            assert_eq!(ra.delivered, rb.delivered);
        }
    }
}
