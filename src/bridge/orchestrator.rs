//! Bridge orchestrator that ties Gitter and Telegram together.
//!
//! Authenticates both platforms, starts the stream supervisor and the
//! Telegram update feed, and runs one forwarding loop per direction.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::bridge::platform::{DestPlatform, SourcePlatform};
use crate::bridge::rehost::Rehoster;
use crate::bridge::router::{DestAction, RelayRouter, RouterConfig, SourceAction};
use crate::bridge::supervisor::StreamSupervisor;
use crate::common::error::AppError;
use crate::common::reconnect::ReconnectPolicy;
use crate::common::{DestinationId, Platform, StreamEvent};

/// Startup settings for a bridge.
#[derive(Debug, Clone, Default)]
pub struct BridgeSettings {
    pub room_id: String,
    pub admins: Vec<String>,
    pub initial_binding: Option<DestinationId>,
    pub reconnect: ReconnectPolicy,
}

/// The main bridge between one Gitter room and one Telegram chat.
pub struct Bridge<S, D> {
    source: Arc<S>,
    dest: Arc<D>,
    settings: BridgeSettings,
    rehoster: Option<Rehoster>,
}

impl<S, D> Bridge<S, D>
where
    S: SourcePlatform + 'static,
    D: DestPlatform + 'static,
{
    pub fn new(
        source: Arc<S>,
        dest: Arc<D>,
        settings: BridgeSettings,
        rehoster: Option<Rehoster>,
    ) -> Self {
        Self {
            source,
            dest,
            settings,
            rehoster,
        }
    }

    /// Run until `shutdown` resolves or the Telegram feed ends.
    ///
    /// Only authentication failures are returned. Everything after startup
    /// is logged and contained.
    pub async fn run<F>(self, shutdown: F) -> Result<(), AppError>
    where
        F: Future<Output = ()>,
    {
        let source_identity = self.source.authenticate().await.map_err(|source| {
            AppError::Authentication {
                platform: Platform::Gitter,
                source,
            }
        })?;
        info!(
            "[Gitter] Authorized on user {} ({})",
            source_identity.username, source_identity.id
        );
        info!("[Gitter] RoomId: {}", self.settings.room_id);

        let dest_identity = self.dest.authenticate().await.map_err(|source| {
            AppError::Authentication {
                platform: Platform::Telegram,
                source,
            }
        })?;
        info!(
            "[Telegram] Authorized on account {} ({})",
            dest_identity.username, dest_identity.id
        );
        match self.settings.initial_binding {
            Some(chat) => info!("[Telegram] GroupId: {}", chat),
            None => info!("[Telegram] No chat bound, an admin must send /start"),
        }

        let (supervisor, status_rx) = StreamSupervisor::new(
            Arc::clone(&self.source),
            self.settings.room_id.clone(),
            self.settings.reconnect,
        );

        let router = Arc::new(RelayRouter::new(
            RouterConfig {
                admins: self.settings.admins.clone(),
                initial_binding: self.settings.initial_binding,
                source_username: source_identity.username,
                bot_username: Some(dest_identity.username),
            },
            status_rx,
            self.rehoster,
        ));

        let (supervisor_task, events) = supervisor.spawn();

        let source_task = tokio::spawn(forward_source_events(
            Arc::clone(&router),
            Arc::clone(&self.dest),
            events,
        ));

        let mut dest_task = tokio::spawn(forward_dest_updates(
            router,
            Arc::clone(&self.source),
            Arc::clone(&self.dest),
            self.settings.room_id,
        ));

        tokio::select! {
            _ = shutdown => info!("Shutdown requested, stopping bridge..."),
            result = &mut dest_task => match result {
                Ok(()) => warn!("Telegram update feed ended, stopping bridge"),
                Err(e) => warn!("Telegram forwarding task failed: {}", e),
            },
        }

        dest_task.abort();
        source_task.abort();
        supervisor_task.abort();

        info!("Bridge stopped");
        Ok(())
    }
}

/// Text of the notice sent to the bound chat when the Gitter stream closes.
pub fn closure_notice(closures: u32, retry_in: Option<Duration>) -> String {
    match retry_in {
        Some(delay) => format!(
            "[Gitter] connection was closed ({}), reconnecting in {}s",
            closures,
            delay.as_secs()
        ),
        None => format!("[Gitter] connection was closed ({}), giving up", closures),
    }
}

/// Gitter -> Telegram.
async fn forward_source_events<D>(
    router: Arc<RelayRouter>,
    dest: Arc<D>,
    mut events: mpsc::UnboundedReceiver<StreamEvent>,
) where
    D: DestPlatform + ?Sized,
{
    while let Some(event) = events.recv().await {
        match event {
            StreamEvent::MessageReceived(message) => {
                match router.route_from_source(&message) {
                    SourceAction::Forward { chat, text } => {
                        info!(chat = %chat, "[Gitter] <{}> {}", message.sender_name, text);
                        if let Err(e) = dest.send(chat, &text).await {
                            warn!(chat = %chat, "Failed to forward Gitter message to Telegram: {}", e);
                        }
                    }
                    SourceAction::Echo => {
                        debug!("Skipping our own Gitter message");
                    }
                    SourceAction::Unbound => {
                        debug!(
                            sender = %message.sender_name,
                            "No Telegram chat bound, dropping Gitter message"
                        );
                    }
                }
            }
            StreamEvent::ConnectionClosed { closures, retry_in } => {
                let Some(chat) = router.bound() else {
                    continue;
                };
                let notice = closure_notice(closures, retry_in);
                if let Err(e) = dest.send(chat, &notice).await {
                    debug!(chat = %chat, "Failed to send closure notice: {}", e);
                }
            }
        }
    }
    info!("Gitter -> Telegram forwarding ended");
}

/// Telegram -> Gitter, plus admin commands.
async fn forward_dest_updates<S, D>(
    router: Arc<RelayRouter>,
    source: Arc<S>,
    dest: Arc<D>,
    room_id: String,
) where
    S: SourcePlatform + ?Sized,
    D: DestPlatform + ?Sized,
{
    let mut updates = dest.updates();

    while let Some(update) = updates.next().await {
        let Some(message) = update.message else {
            warn!(update_id = update.id, "[Telegram] Update without a usable message");
            continue;
        };

        match router.handle_dest(dest.as_ref(), &message).await {
            DestAction::Forward { text } => {
                info!("[Telegram] <{}> {}", message.sender_name, text);
                if let Err(e) = source.send(&room_id, &text).await {
                    warn!(room_id = %room_id, "Failed to forward Telegram message to Gitter: {}", e);
                }
            }
            DestAction::Status { user, reply } => {
                if let Err(e) = dest.send_private(user, &reply).await {
                    warn!(user = %user, "Failed to send status reply: {}", e);
                }
            }
            DestAction::Unrouted => {
                info!(
                    sender = %message.sender_name,
                    "[Telegram] No chat bound, use /start to bind a chat"
                );
            }
            DestAction::Bound { chat, previous } => {
                debug!(chat = %chat, ?previous, "Gitter messages now go to the new chat");
            }
            DestAction::Unbound { previous } => {
                debug!(?previous, "Gitter messages are no longer forwarded");
            }
            DestAction::IgnoredCommand(name) => {
                debug!(command = %name, "No action for admin command");
            }
            DestAction::Drop => {}
        }
    }
    info!("Telegram -> Gitter forwarding ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::testing::*;

    fn settings(initial: Option<DestinationId>) -> BridgeSettings {
        BridgeSettings {
            room_id: ROOM.to_string(),
            admins: vec!["alice".to_string()],
            initial_binding: initial,
            reconnect: ReconnectPolicy {
                delay: Duration::ZERO,
                max_consecutive_closures: 10,
            },
        }
    }

    /// Poll `check` until it holds, yielding to the bridge tasks in between.
    async fn eventually(check: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !check() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    fn spawn_bridge(
        source: Arc<FakeSource>,
        dest: Arc<FakeDest>,
        initial: Option<DestinationId>,
    ) -> tokio::sync::oneshot::Sender<()> {
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let bridge = Bridge::new(source, dest, settings(initial), None);
        tokio::spawn(async move {
            bridge
                .run(async {
                    let _ = stop_rx.await;
                })
                .await
                .unwrap();
        });
        stop_tx
    }

    #[test]
    fn test_closure_notice_text() {
        assert_eq!(
            closure_notice(3, Some(Duration::from_secs(5))),
            "[Gitter] connection was closed (3), reconnecting in 5s"
        );
        assert_eq!(
            closure_notice(10, None),
            "[Gitter] connection was closed (10), giving up"
        );
    }

    #[tokio::test]
    async fn test_gitter_message_reaches_bound_chat() {
        let source = Arc::new(FakeSource::new(vec![
            Connection::Messages(vec![
                gitter_message("gitgram-bot", "echo"),
                gitter_message(
                    "carol",
                    "[test.exe](https://files.gitter.im/x64dbg/x64dbg/ROVJ/test.exe)",
                ),
            ]),
            Connection::Hang,
        ]));
        let dest = Arc::new(FakeDest::new());
        let _stop = spawn_bridge(source.clone(), dest.clone(), Some(GROUP));

        eventually(|| dest.sent().len() == 2).await;

        let sent = dest.sent();
        assert_eq!(
            sent[0],
            (
                GROUP,
                "https://files.gitter.im/x64dbg/x64dbg/ROVJ/test.exe".to_string()
            )
        );
        // The echo is dropped, and the first closure is announced.
        assert_eq!(
            sent[1..],
            [(
                GROUP,
                "[Gitter] connection was closed (1), reconnecting in 0s".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_nothing_sent_while_unbound() {
        let source = Arc::new(FakeSource::new(vec![
            Connection::Messages(vec![gitter_message("carol", "hi")]),
            Connection::Hang,
        ]));
        let dest = Arc::new(FakeDest::new());
        let _stop = spawn_bridge(source.clone(), dest.clone(), None);

        eventually(|| source.opens() == 2).await;
        dest.push(1, Some(telegram_message(GROUP, "carol", "hello")));
        dest.push(2, None);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(dest.sent().is_empty());
        assert!(source.sent().is_empty());
    }

    #[tokio::test]
    async fn test_admin_binds_then_messages_flow() {
        let source = Arc::new(FakeSource::new(vec![Connection::Hang]));
        let dest = Arc::new(FakeDest::new());
        let _stop = spawn_bridge(source.clone(), dest.clone(), None);

        dest.push(1, Some(telegram_message(GROUP, "alice", "/start")));
        dest.push(2, Some(telegram_message(GROUP, "carol", "hello gitter")));
        eventually(|| !source.sent().is_empty()).await;
        eventually(|| source.opens() == 1).await;

        dest.push(3, Some(telegram_message(GROUP, "alice", "/status")));

        eventually(|| !dest.private().is_empty()).await;

        assert_eq!(
            source.sent(),
            vec![(ROOM.to_string(), "hello gitter".to_string())]
        );
        assert_eq!(
            dest.private(),
            vec![(
                DestinationId(4242),
                "groupId: -1001\ngitter stream: open".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_exhaustion_announced_and_bridge_keeps_running() {
        let source = Arc::new(FakeSource::new(Vec::new()));
        let dest = Arc::new(FakeDest::new());
        let _stop = spawn_bridge(source.clone(), dest.clone(), Some(GROUP));

        eventually(|| dest.sent().len() == 10).await;
        let sent = dest.sent();
        assert_eq!(sent[9].1, "[Gitter] connection was closed (10), giving up");
        assert_eq!(source.opens(), 10);

        // Telegram -> Gitter still works after exhaustion.
        dest.push(1, Some(telegram_message(GROUP, "carol", "still here")));
        eventually(|| !source.sent().is_empty()).await;
    }

    #[tokio::test]
    async fn test_shutdown_returns_ok() {
        let source = Arc::new(FakeSource::new(vec![Connection::Hang]));
        let dest = Arc::new(FakeDest::new());
        let bridge = Bridge::new(source, dest, settings(Some(GROUP)), None);

        let result = tokio::time::timeout(Duration::from_secs(5), bridge.run(async {})).await;
        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_authentication_failures() {
        let bridge = Bridge::new(
            Arc::new(FakeSource::failing_auth()),
            Arc::new(FakeDest::new()),
            settings(None),
            None,
        );
        match bridge.run(std::future::pending()).await {
            Err(AppError::Authentication { platform, .. }) => assert_eq!(platform, Platform::Gitter),
            other => panic!("unexpected result {:?}", other),
        }

        let mut dest = FakeDest::new();
        dest.auth_fails = true;
        let source = Arc::new(FakeSource::new(Vec::new()));
        let bridge = Bridge::new(source.clone(), Arc::new(dest), settings(None), None);
        match bridge.run(std::future::pending()).await {
            Err(AppError::Authentication { platform, .. }) => assert_eq!(platform, Platform::Telegram),
            other => panic!("unexpected result {:?}", other),
        }
        // The stream is never opened when startup fails.
        assert_eq!(source.opens(), 0);
    }
}
