//! Per-message relay decisions.
//!
//! The router owns the routing state and decides, for every inbound message,
//! whether it crosses the bridge, in what form, and whether it changes the
//! binding. Sending is left to the orchestrator.

use std::collections::HashSet;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::bridge::commands::{AdminCommand, COMMAND_PREFIX};
use crate::bridge::normalize::normalize;
use crate::bridge::platform::DestPlatform;
use crate::bridge::rehost::Rehoster;
use crate::bridge::state::RoutingState;
use crate::common::{DestinationId, InboundMessage, Origin, StreamStatus};

/// What to do with a Gitter message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceAction {
    /// Send `text` to the bound Telegram chat.
    Forward { chat: DestinationId, text: String },
    /// Our own message coming back.
    Echo,
    /// No chat is bound.
    Unbound,
}

/// What to do with a Telegram message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestAction {
    /// Nothing to forward.
    Drop,
    /// An admin bound `chat`.
    Bound {
        chat: DestinationId,
        previous: Option<DestinationId>,
    },
    /// An admin cleared the binding.
    Unbound { previous: Option<DestinationId> },
    /// Send `reply` privately to `user`.
    Status { user: DestinationId, reply: String },
    /// Admin command we do not know.
    IgnoredCommand(String),
    /// Send `text` to the Gitter room.
    Forward { text: String },
    /// Ordinary message while no chat is bound.
    Unrouted,
}

/// Static router settings.
#[derive(Debug, Clone, Default)]
pub struct RouterConfig {
    /// Telegram usernames allowed to run admin commands.
    pub admins: Vec<String>,
    pub initial_binding: Option<DestinationId>,
    /// Bridge's own Gitter username.
    pub source_username: String,
    /// Bridge's own Telegram username, for `/command@bot`.
    pub bot_username: Option<String>,
}

/// Relay router shared by both forwarding loops.
pub struct RelayRouter {
    admins: HashSet<String>,
    state: RoutingState,
    source_username: String,
    bot_username: Option<String>,
    stream_status: watch::Receiver<StreamStatus>,
    rehoster: Option<Rehoster>,
}

impl RelayRouter {
    pub fn new(
        config: RouterConfig,
        stream_status: watch::Receiver<StreamStatus>,
        rehoster: Option<Rehoster>,
    ) -> Self {
        Self {
            admins: config.admins.into_iter().collect(),
            state: RoutingState::new(config.initial_binding),
            source_username: config.source_username,
            bot_username: config.bot_username,
            stream_status,
            rehoster,
        }
    }

    /// Currently bound Telegram chat.
    pub fn bound(&self) -> Option<DestinationId> {
        self.state.bound()
    }

    pub fn is_admin(&self, sender_id: &str) -> bool {
        self.admins.contains(sender_id)
    }

    /// Decide on a message from the Gitter stream.
    pub fn route_from_source(&self, message: &InboundMessage) -> SourceAction {
        if message.sender_id == self.source_username {
            return SourceAction::Echo;
        }
        match self.state.bound() {
            Some(chat) => SourceAction::Forward {
                chat,
                text: normalize(&message.text),
            },
            None => SourceAction::Unbound,
        }
    }

    /// Text to relay for a Telegram message: the caption or text, with the
    /// rehosted attachment link appended when rehosting succeeds.
    pub async fn compose_text<D>(&self, dest: &D, message: &InboundMessage) -> String
    where
        D: DestPlatform + ?Sized,
    {
        let (Some(rehoster), Some(attachment)) = (&self.rehoster, message.attachments.last()) else {
            return message.text.clone();
        };

        match rehoster.rehost(dest, attachment).await {
            Ok(link) if message.text.is_empty() => link,
            Ok(link) => format!("{} {}", message.text, link),
            Err(e) => {
                warn!(
                    sender = %message.sender_name,
                    file_id = %attachment.file_id,
                    "Attachment rehosting failed, relaying caption only: {}",
                    e
                );
                message.text.clone()
            }
        }
    }

    /// Compose and route a Telegram message.
    pub async fn handle_dest<D>(&self, dest: &D, message: &InboundMessage) -> DestAction
    where
        D: DestPlatform + ?Sized,
    {
        let text = self.compose_text(dest, message).await;
        self.route_from_dest(message, &text)
    }

    /// Decide on a Telegram message whose relay text is `text`.
    pub fn route_from_dest(&self, message: &InboundMessage, text: &str) -> DestAction {
        let Origin::Telegram { chat, user } = message.origin else {
            debug!(platform = %message.platform(), "Ignoring message on the Telegram side");
            return DestAction::Drop;
        };

        if text.is_empty() {
            return DestAction::Drop;
        }

        if self.is_admin(&message.sender_id) && text.starts_with(COMMAND_PREFIX) {
            let command = AdminCommand::parse(text, self.bot_username.as_deref())
                .unwrap_or_else(|| AdminCommand::Unknown(String::new()));
            return self.run_command(command, &message.sender_id, chat, user);
        }

        if self.state.bound().is_some() {
            DestAction::Forward {
                text: text.to_string(),
            }
        } else {
            DestAction::Unrouted
        }
    }

    fn run_command(
        &self,
        command: AdminCommand,
        admin: &str,
        chat: DestinationId,
        user: DestinationId,
    ) -> DestAction {
        match command {
            AdminCommand::Bind => {
                let previous = self.state.bind(chat);
                info!(admin, %chat, ?previous, "Bound Telegram chat");
                DestAction::Bound { chat, previous }
            }
            AdminCommand::Unbind => {
                let previous = self.state.unbind();
                info!(admin, ?previous, "Cleared Telegram binding");
                DestAction::Unbound { previous }
            }
            AdminCommand::Status => {
                info!(admin, "Status requested");
                DestAction::Status {
                    user,
                    reply: self.status_report(),
                }
            }
            AdminCommand::Unknown(name) => {
                debug!(admin, command = %name, "Ignoring unknown admin command");
                DestAction::IgnoredCommand(name)
            }
        }
    }

    fn status_report(&self) -> String {
        let bound = self
            .state
            .bound()
            .map_or_else(|| "none".to_string(), |chat| chat.to_string());
        let stream = *self.stream_status.borrow();
        format!("groupId: {}\ngitter stream: {}", bound, stream)
    }
}
