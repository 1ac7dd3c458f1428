//! Routing state shared by both forwarding directions.
//!
//! The bound destination is the only mutable state in the bridge. It is
//! read by every forwarding decision and written by admin commands, from
//! two different tasks, so every access goes through the mutex. The lock is
//! never held across an `.await`.

use std::sync::{Mutex, PoisonError};

use crate::common::DestinationId;

/// Which Telegram chat (if any) mirrors the Gitter room.
#[derive(Debug, Default)]
pub struct RoutingState {
    bound: Mutex<Option<DestinationId>>,
}

impl RoutingState {
    pub fn new(initial: Option<DestinationId>) -> Self {
        Self {
            bound: Mutex::new(initial),
        }
    }

    /// Current binding.
    pub fn bound(&self) -> Option<DestinationId> {
        *self.bound.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind `destination`, returning the previous binding.
    pub fn bind(&self, destination: DestinationId) -> Option<DestinationId> {
        self.bound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(destination)
    }

    /// Clear the binding, returning the previous one.
    pub fn unbind(&self) -> Option<DestinationId> {
        self.bound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
