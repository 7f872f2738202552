//! Periodic garbage collection of the one-time-code ledger.
//!
//! Consumed and expired rows never match a verification query, so the sweep
//! is storage hygiene only. It runs on a fixed cadence and a failed pass is
//! logged and retried on the next tick.

use sqlx::PgPool;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

use crate::api::handlers::stepup::ledger;

pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 3600;

#[derive(Clone, Copy, Debug)]
pub struct SweepConfig {
    interval: Duration,
}

impl SweepConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECONDS),
        }
    }

    #[must_use]
    pub fn with_interval_seconds(mut self, seconds: u64) -> Self {
        self.interval = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn normalize(self) -> Self {
        let interval = if self.interval.is_zero() {
            Duration::from_secs(1)
        } else {
            self.interval
        };
        Self { interval }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub fn spawn_sweep_worker(pool: PgPool, config: SweepConfig) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let config = config.normalize();
        let interval = config.interval();

        loop {
            match ledger::sweep(&pool).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "swept one-time codes"),
                Err(err) => error!("one-time code sweep failed: {err}"),
            }

            sleep(interval).await;
        }
    })
}
