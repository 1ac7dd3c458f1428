//! Gitter REST and streaming client.

use std::io;

use async_trait::async_trait;
use futures::future;
use futures::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;
use tracing::{debug, warn};

use crate::bridge::platform::SourcePlatform;
use crate::common::error::PlatformResult;
use crate::common::{Identity, InboundMessage, Origin};

pub const API_URL: &str = "https://api.gitter.im/v1";
pub const STREAM_URL: &str = "https://stream.gitter.im/v1";

/// Longest stream line accepted before the stream is treated as broken.
const MAX_LINE_LENGTH: usize = 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GitterUser {
    id: String,
    username: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// One chat message as sent on the room stream.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GitterMessage {
    #[serde(default)]
    text: String,
    from_user: GitterUser,
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    text: &'a str,
}

impl GitterMessage {
    fn into_inbound(self, room_id: &str) -> InboundMessage {
        let sender_name = self
            .from_user
            .display_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.from_user.username.clone());
        InboundMessage {
            origin: Origin::Gitter {
                room_id: room_id.to_string(),
            },
            sender_id: self.from_user.username,
            sender_name,
            text: self.text,
            attachments: Vec::new(),
        }
    }
}

/// Decode one line of the room stream. Blank lines are heartbeats.
fn parse_line(room_id: &str, line: &str) -> Option<InboundMessage> {
    if line.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<GitterMessage>(line) {
        Ok(message) => Some(message.into_inbound(room_id)),
        Err(e) => {
            warn!(room_id, "[Gitter] Skipping undecodable stream line: {}", e);
            None
        }
    }
}

/// Gitter client authenticated with a personal access token.
#[derive(Debug, Clone)]
pub struct GitterClient {
    http: reqwest::Client,
    token: String,
    api_url: String,
    stream_url: String,
}

impl GitterClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_urls(token, API_URL, STREAM_URL)
    }

    pub fn with_base_urls(
        token: impl Into<String>,
        api_url: impl Into<String>,
        stream_url: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            api_url: api_url.into(),
            stream_url: stream_url.into(),
        }
    }

    fn messages_path(base: &str, room_id: &str) -> String {
        format!("{}/rooms/{}/chatMessages", base, room_id)
    }
}

#[async_trait]
impl SourcePlatform for GitterClient {
    async fn authenticate(&self) -> PlatformResult<Identity> {
        let user: GitterUser = self
            .http
            .get(format!("{}/user/me", self.api_url))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Identity {
            id: user.id,
            username: user.username,
        })
    }

    async fn open_stream(&self, room_id: &str) -> PlatformResult<BoxStream<'static, InboundMessage>> {
        let response = self
            .http
            .get(Self::messages_path(&self.stream_url, room_id))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes_stream().map(|chunk| chunk.map_err(io::Error::other));
        let lines = FramedRead::new(
            StreamReader::new(body),
            LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
        );

        let room_id = room_id.to_string();
        let messages = lines
            .take_while(|line| {
                if let Err(e) = line {
                    debug!("[Gitter] Stream read failed: {}", e);
                }
                future::ready(line.is_ok())
            })
            .filter_map(move |line| {
                future::ready(line.ok().and_then(|line| parse_line(&room_id, &line)))
            })
            .boxed();

        Ok(messages)
    }

    async fn send(&self, room_id: &str, text: &str) -> PlatformResult<()> {
        self.http
            .post(Self::messages_path(&self.api_url, room_id))
            .bearer_auth(&self.token)
            .json(&OutgoingMessage { text })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
