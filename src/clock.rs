//! Time abstraction for cache expiry and fetch pacing
//!
//! The snapshot cache needs two time operations: a monotonic "now" to judge
//! snapshot age, and a pause between successive provider calls. Both go
//! through this trait so tests can drive expiry and observe pacing without
//! real sleeps.
//!
//! Author: AI-Generated
//! Created: 2026-07-30

use async_trait::async_trait;
use std::time::{Duration, Instant};

#[async_trait]
pub trait Clock: Send + Sync {
    /// Current monotonic instant.
    fn now(&self) -> Instant;

    /// Pause the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Real clock for production use: `Instant::now` plus `tokio::time::sleep`.
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_system_clock_advances() {
        let clock = SystemClock;
        let t1 = clock.now();
        clock.sleep(Duration::from_millis(10)).await;
        let t2 = clock.now();
        assert!(t2.duration_since(t1) >= Duration::from_millis(9));
    }
}
