//! Fixed-delay reconnection with a ceiling on consecutive closures.

use std::time::Duration;

use backon::{BackoffBuilder, ConstantBackoff, ConstantBuilder};

/// Configuration for stream reconnection.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    /// Delay before each reconnection attempt.
    pub delay: Duration,
    /// Consecutive closures after which the stream is given up.
    pub max_consecutive_closures: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(5),
            max_consecutive_closures: 10,
        }
    }
}

impl ReconnectPolicy {
    /// One delay per closure that is still allowed to reconnect.
    fn backoff(&self) -> ConstantBackoff {
        ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.max_consecutive_closures.saturating_sub(1) as usize)
            .build()
    }
}

/// Tracks consecutive closures and hands out reconnect delays.
#[derive(Debug)]
pub struct ReconnectState {
    policy: ReconnectPolicy,
    backoff: ConstantBackoff,
    closures: u32,
}

impl ReconnectState {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            backoff: policy.backoff(),
            policy,
            closures: 0,
        }
    }

    /// Record a closure. Returns the delay before reconnecting, or None
    /// once the ceiling is reached.
    pub fn on_closed(&mut self) -> Option<Duration> {
        self.closures = self.closures.saturating_add(1);
        self.backoff.next()
    }

    /// Reset state after a successful open.
    pub fn reset(&mut self) {
        self.closures = 0;
        self.backoff = self.policy.backoff();
    }

    /// Consecutive closures since the last successful open.
    pub fn closures(&self) -> u32 {
        self.closures
    }
}
