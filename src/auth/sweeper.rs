// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Registry Sweeper
//!
//! Background task that periodically removes expired refresh token records
//! from the registry. This is a memory bound, not a correctness mechanism:
//! expiry is enforced at consume time whether or not the sweep has run.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown, spawned
//! alongside the HTTP server and cancelled when it stops.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::registry::RefreshTokenRegistry;

/// Default interval between sweeps (one hour).
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Background sweeper for expired refresh token records.
pub struct RegistrySweeper {
    registry: Arc<RefreshTokenRegistry>,
    interval: Duration,
}

impl RegistrySweeper {
    pub fn new(registry: Arc<RefreshTokenRegistry>) -> Self {
        Self {
            registry,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Refresh token sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Refresh token sweeper shutting down");
                    return;
                }
            }

            self.sweep_step();
        }
    }

    /// Execute one sweep. Never panics out of the serving process; the
    /// registry operation is infallible and the result is only logged.
    fn sweep_step(&self) {
        let removed = self.registry.sweep();
        if removed > 0 {
            info!(removed, remaining = self.registry.len(), "Swept expired refresh tokens");
        } else {
            debug!("Sweep found no expired refresh tokens");
        }
    }
}
