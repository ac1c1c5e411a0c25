//! Configurable latency and failure injection for demo and test flows.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::InjectedFailure;

/// Default failure rate used by the demo flows.
pub const DEFAULT_FAILURE_RATE: f64 = 0.1;

/// Sleeps for a fixed latency and then fails with a configured probability.
///
/// Clones share one random source so a seeded injector stays deterministic
/// across every service that holds it.
#[derive(Clone)]
pub struct FaultInjector {
    failure_rate: f64,
    latency: Duration,
    rng: Arc<Mutex<StdRng>>,
}

impl std::fmt::Debug for FaultInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultInjector")
            .field("failure_rate", &self.failure_rate)
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::with_rate(DEFAULT_FAILURE_RATE)
    }
}

impl FaultInjector {
    fn build(failure_rate: f64, rng: StdRng) -> Self {
        Self {
            failure_rate: if failure_rate.is_finite() {
                failure_rate.clamp(0.0, 1.0)
            } else {
                0.0
            },
            latency: Duration::ZERO,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    #[must_use]
    pub fn never() -> Self {
        Self::build(0.0, StdRng::seed_from_u64(0))
    }

    #[must_use]
    pub fn always() -> Self {
        Self::build(1.0, StdRng::seed_from_u64(0))
    }

    /// Rate is clamped to `0.0..=1.0`; NaN and infinities disable failures.
    #[must_use]
    pub fn with_rate(failure_rate: f64) -> Self {
        Self::build(failure_rate, StdRng::from_os_rng())
    }

    #[must_use]
    pub fn seeded(failure_rate: f64, seed: u64) -> Self {
        Self::build(failure_rate, StdRng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    #[must_use]
    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    #[must_use]
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Waits out the configured latency without rolling for failure.
    pub async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn roll(&self) -> bool {
        if self.failure_rate <= 0.0 {
            return false;
        }
        if self.failure_rate >= 1.0 {
            return true;
        }
        self.rng
            .lock()
            .map(|mut rng| rng.random_bool(self.failure_rate))
            .unwrap_or(false)
    }

    /// Simulates one remote call named `operation`.
    ///
    /// # Errors
    ///
    /// Returns `InjectedFailure` with probability `failure_rate`.
    pub async fn run(&self, operation: &'static str) -> Result<(), InjectedFailure> {
        self.delay().await;
        if self.roll() {
            tracing::warn!(operation, "injected failure");
            return Err(InjectedFailure { operation });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn never_and_always() {
        assert!(FaultInjector::never().run("op").await.is_ok());
        let err = FaultInjector::always().run("save").await.unwrap_err();
        assert_eq!(err, InjectedFailure { operation: "save" });
    }

    #[tokio::test]
    async fn seeded_injectors_are_reproducible() {
        let a = FaultInjector::seeded(0.5, 42);
        let b = FaultInjector::seeded(0.5, 42);
        for _ in 0..32 {
            assert_eq!(a.run("op").await.is_ok(), b.run("op").await.is_ok());
        }
    }

    #[test]
    fn rate_is_clamped() {
        assert_eq!(FaultInjector::with_rate(7.0).failure_rate(), 1.0);
        assert_eq!(FaultInjector::with_rate(-1.0).failure_rate(), 0.0);
        assert_eq!(FaultInjector::default().failure_rate(), DEFAULT_FAILURE_RATE);
    }

    #[tokio::test]
    async fn non_finite_rates_never_fail() {
        for rate in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let faults = FaultInjector::seeded(rate, 7);
            assert_eq!(faults.failure_rate(), 0.0);
            assert!(faults.run("op").await.is_ok());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn latency_is_applied() {
        let faults = FaultInjector::never().with_latency(Duration::from_millis(400));
        let started = tokio::time::Instant::now();
        faults.run("op").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(400));
    }
}
