//! Elastic scaler: applies recommended replica counts.
//!
//! The scaler never talks to the managed cluster itself. The actual
//! resize is performed by a callback supplied by the daemon.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use hotspot_core::config::AutoscaleConfig;

/// A scaling decision for the managed cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleDecision {
    /// Resize to the specified replica count.
    ScaleTo(u32),
    /// No change needed.
    NoChange,
}

pub type BoxFuture = std::pin::Pin<
    Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send>,
>;

/// Callback type for performing scaling actions.
///
/// Called with the target replica count.
pub type ScaleCallback = Box<dyn Fn(u32) -> BoxFuture + Send + Sync>;

pub struct ElasticScaler {
    min_replicas: u32,
    max_replicas: u32,
    cooldown: Duration,
    /// Replica count last applied successfully.
    current: Option<u32>,
    /// Time of the last scaling attempt, successful or not.
    last_attempt: Option<Instant>,
    scale_fn: Option<ScaleCallback>,
}

impl ElasticScaler {
    pub fn new(config: &AutoscaleConfig) -> Self {
        let min_replicas = config.min_replicas;
        Self {
            min_replicas,
            max_replicas: config.max_replicas.max(min_replicas),
            cooldown: config.cooldown(),
            current: None,
            last_attempt: None,
            scale_fn: None,
        }
    }

    /// Set the callback used to perform scaling.
    pub fn with_scale_fn(mut self, f: ScaleCallback) -> Self {
        self.scale_fn = Some(f);
        self
    }

    pub fn current_replicas(&self) -> Option<u32> {
        self.current
    }

    /// Clamp a recommendation into the configured bounds. Negative
    /// recommendations count as zero.
    pub fn clamp(&self, recommended: i32) -> u32 {
        let wanted = u32::try_from(recommended).unwrap_or(0);
        wanted.clamp(self.min_replicas, self.max_replicas)
    }

    /// Decide what to do with `recommended` at time `now`.
    pub fn evaluate(&self, recommended: i32, now: Instant) -> ScaleDecision {
        let target = self.clamp(recommended);

        if self.current == Some(target) {
            debug!(replicas = target, "replica count unchanged");
            return ScaleDecision::NoChange;
        }

        if let Some(last) = self.last_attempt
            && now.saturating_duration_since(last) < self.cooldown
        {
            debug!(
                target,
                cooldown_secs = self.cooldown.as_secs(),
                "scaling suppressed by cooldown"
            );
            return ScaleDecision::NoChange;
        }

        ScaleDecision::ScaleTo(target)
    }

    /// Evaluate `recommended` and run the scale callback if a change is due.
    ///
    /// Callback failures are logged; the next attempt waits out the
    /// cooldown like any other.
    pub async fn apply(&mut self, recommended: i32) -> ScaleDecision {
        let now = Instant::now();
        let decision = self.evaluate(recommended, now);

        let ScaleDecision::ScaleTo(target) = decision else {
            return decision;
        };
        self.last_attempt = Some(now);

        match &self.scale_fn {
            Some(scale_fn) => match scale_fn(target).await {
                Ok(()) => {
                    info!(from = ?self.current, to = target, recommended, "cluster scaled");
                    self.current = Some(target);
                }
                Err(e) => {
                    warn!(target, error = %e, "scaling action failed");
                }
            },
            None => {
                info!(to = target, recommended, "no scale callback configured, recording target");
                self.current = Some(target);
            }
        }

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn config(min: u32, max: u32, cooldown: &str) -> AutoscaleConfig {
        AutoscaleConfig {
            min_replicas: min,
            max_replicas: max,
            cooldown: cooldown.to_string(),
        }
    }

    fn recording_callback(seen: Arc<AtomicU32>) -> ScaleCallback {
        Box::new(move |n| {
            let seen = seen.clone();
            Box::pin(async move {
                seen.store(n, Ordering::SeqCst);
                Ok(())
            })
        })
    }

    #[test]
    fn clamps_to_bounds() {
        let scaler = ElasticScaler::new(&config(2, 8, "0s"));
        assert_eq!(scaler.clamp(5), 5);
        assert_eq!(scaler.clamp(1), 2);
        assert_eq!(scaler.clamp(100), 8);
        assert_eq!(scaler.clamp(-3), 2);
    }

    #[test]
    fn inverted_bounds_collapse_to_min() {
        let scaler = ElasticScaler::new(&config(4, 2, "0s"));
        assert_eq!(scaler.clamp(10), 4);
    }

    #[test]
    fn first_recommendation_scales() {
        let scaler = ElasticScaler::new(&config(1, 16, "5m"));
        assert_eq!(scaler.evaluate(3, Instant::now()), ScaleDecision::ScaleTo(3));
    }

    #[tokio::test]
    async fn applies_through_callback() {
        let seen = Arc::new(AtomicU32::new(0));
        let mut scaler =
            ElasticScaler::new(&config(1, 16, "0s")).with_scale_fn(recording_callback(seen.clone()));

        assert_eq!(scaler.apply(6).await, ScaleDecision::ScaleTo(6));
        assert_eq!(seen.load(Ordering::SeqCst), 6);
        assert_eq!(scaler.current_replicas(), Some(6));
    }

    #[tokio::test]
    async fn unchanged_count_is_no_change() {
        let mut scaler = ElasticScaler::new(&config(1, 16, "0s"));
        scaler.apply(4).await;
        assert_eq!(scaler.apply(4).await, ScaleDecision::NoChange);
        // Clamped to the same value.
        scaler.apply(16).await;
        assert_eq!(scaler.apply(40).await, ScaleDecision::NoChange);
    }

    #[tokio::test(start_paused = true)]
    async fn cooldown_suppresses_rapid_changes() {
        let mut scaler = ElasticScaler::new(&config(1, 16, "60s"));
        assert_eq!(scaler.apply(4).await, ScaleDecision::ScaleTo(4));
        assert_eq!(scaler.apply(8).await, ScaleDecision::NoChange);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(scaler.apply(8).await, ScaleDecision::ScaleTo(8));
    }

    #[tokio::test]
    async fn callback_failure_is_not_recorded() {
        let failing: ScaleCallback =
            Box::new(|_| Box::pin(async { Err(anyhow::anyhow!("api unavailable")) }));
        let mut scaler = ElasticScaler::new(&config(1, 16, "0s")).with_scale_fn(failing);

        assert_eq!(scaler.apply(5).await, ScaleDecision::ScaleTo(5));
        assert_eq!(scaler.current_replicas(), None);
        // Retried on the next recommendation.
        assert_eq!(scaler.apply(5).await, ScaleDecision::ScaleTo(5));
    }
}
