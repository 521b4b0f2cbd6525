// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Interval polling raced against a timeout

use super::error::{ContainerError, ContainerResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

/// How often and how long to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSettings {
    /// Delay between probes
    pub interval: Duration,
    /// Overall deadline
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(300),
        }
    }
}

impl PollSettings {
    /// Settings from millisecond values
    #[must_use]
    pub fn from_millis(interval_ms: u64, timeout_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

/// Run `probe` immediately and then once per interval until it yields a
/// value. `None` means "not ready yet". Probes never overlap.
///
/// The deadline is the only error: `ContainerError::Timeout`.
pub async fn poll_until<T, F, Fut>(settings: PollSettings, mut probe: F) -> ContainerResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let polling = async {
        let mut ticker = time::interval(settings.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Some(value) = probe().await {
                return value;
            }
        }
    };

    time::timeout(settings.timeout, polling)
        .await
        .map_err(|_| ContainerError::Timeout(settings.timeout))
}
