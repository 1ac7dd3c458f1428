//! Lifecycle of the Gitter stream.
//!
//! ```text
//! Connecting -> Open -> Closed -> Connecting ...
//!                          \-> Exhausted (terminal)
//! ```
//!
//! The supervisor runs on its own task, so reconnect sleeps never block the
//! loop that consumes its events.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::bridge::platform::SourcePlatform;
use crate::common::reconnect::{ReconnectPolicy, ReconnectState};
use crate::common::{StreamEvent, StreamStatus};

/// One live (or pending) subscription to the Gitter room.
#[derive(Debug, Clone)]
pub struct StreamConnection {
    pub room_id: String,
    /// Consecutive closures since the last successful open.
    pub retry_count: u32,
    pub status: StreamStatus,
}

/// Supervises the Gitter stream for one room.
pub struct StreamSupervisor<S> {
    source: Arc<S>,
    connection: StreamConnection,
    reconnect: ReconnectState,
    status_tx: watch::Sender<StreamStatus>,
}

impl<S> StreamSupervisor<S>
where
    S: SourcePlatform + 'static,
{
    /// Create a supervisor and the receiver for its status.
    pub fn new(
        source: Arc<S>,
        room_id: impl Into<String>,
        policy: ReconnectPolicy,
    ) -> (Self, watch::Receiver<StreamStatus>) {
        let (status_tx, status_rx) = watch::channel(StreamStatus::Connecting);
        let supervisor = Self {
            source,
            connection: StreamConnection {
                room_id: room_id.into(),
                retry_count: 0,
                status: StreamStatus::Connecting,
            },
            reconnect: ReconnectState::new(policy),
            status_tx,
        };
        (supervisor, status_rx)
    }

    /// Run on a new task. Events arrive in order on the returned receiver,
    /// which closes once the stream is exhausted.
    pub fn spawn(self) -> (JoinHandle<()>, mpsc::UnboundedReceiver<StreamEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(self.run(events_tx));
        (handle, events_rx)
    }

    fn transition(&mut self, status: StreamStatus) {
        self.connection.status = status;
        self.connection.retry_count = self.reconnect.closures();
        debug!(
            status = %self.connection.status,
            retry_count = self.connection.retry_count,
            "Gitter stream state changed"
        );
        // Receivers may have gone away during shutdown.
        self.status_tx.send_replace(status);
    }

    async fn run(mut self, events: mpsc::UnboundedSender<StreamEvent>) {
        let room_id = self.connection.room_id.clone();

        loop {
            self.transition(StreamStatus::Connecting);
            info!(room_id = %room_id, "Connecting to Gitter stream...");

            match self.source.open_stream(&room_id).await {
                Ok(mut stream) => {
                    self.reconnect.reset();
                    self.transition(StreamStatus::Open);
                    info!(room_id = %room_id, "Gitter stream open");

                    while let Some(message) = stream.next().await {
                        if events.send(StreamEvent::MessageReceived(message)).is_err() {
                            debug!("Stream event receiver dropped, stopping supervisor");
                            return;
                        }
                    }
                }
                Err(e) => {
                    warn!(room_id = %room_id, "Failed to open Gitter stream: {}", e);
                }
            }

            let retry_in = self.reconnect.on_closed();
            self.transition(StreamStatus::Closed);
            let closures = self.connection.retry_count;
            warn!(room_id = %room_id, closures, "Gitter connection was closed");

            if events
                .send(StreamEvent::ConnectionClosed { closures, retry_in })
                .is_err()
            {
                debug!("Stream event receiver dropped, stopping supervisor");
                return;
            }

            match retry_in {
                Some(delay) => {
                    info!("Reconnecting in {:.1} seconds...", delay.as_secs_f64());
                    tokio::time::sleep(delay).await;
                }
                None => {
                    self.transition(StreamStatus::Exhausted);
                    error!(
                        room_id = %room_id,
                        closures, "Gitter reconnect attempts exhausted, giving up"
                    );
                    return;
                }
            }
        }
    }
}
