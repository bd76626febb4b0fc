// ABOUTME: models the artificial latency ranges used by the translator and mock collaborators.
// ABOUTME: serialized as a two-element [min, max] millisecond array in the config file.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange(pub u64, pub u64);

impl DelayRange {
    pub const NONE: DelayRange = DelayRange(0, 0);

    pub fn fixed(ms: u64) -> Self {
        DelayRange(ms, ms)
    }

    pub fn pick(&self) -> Duration {
        let (lo, hi) = if self.0 <= self.1 { (self.0, self.1) } else { (self.1, self.0) };
        if lo == hi {
            return Duration::from_millis(lo);
        }
        Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
    }

    pub async fn sleep(&self) {
        let wait = self.pick();
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}
