//! The Discord implementation of the chat-platform client.

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use gabble_platform::{
    ChannelInfo, ChannelKind, ChatPlatform, ErrorKind, Invocation,
    MessageHandle, PlatformError, RawMessage, ThreadHandle,
};
use serenity::builder::{CreateThread, GetMessages};
use serenity::http::{Http, HttpError};
use serenity::model::channel::{Channel, ChannelType, Message};
use serenity::model::id::{ChannelId, InteractionId, UserId};

const ANNOUNCEMENT_COLOR: u32 = 0x4CAF50;

/// Error type for [`DiscordPlatform`].
#[derive(Debug)]
pub enum Error {
    /// The Discord API call failed.
    Api(serenity::Error),
    /// An identifier was not a valid Discord snowflake.
    InvalidId(String),
    /// The channel exists but is not a guild channel.
    NotAGuildChannel,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Api(err) => write!(f, "discord api error: {err}"),
            Error::InvalidId(id) => write!(f, "invalid snowflake: {id:?}"),
            Error::NotAGuildChannel => write!(f, "not a guild channel"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl PlatformError for Error {
    fn kind(&self) -> ErrorKind {
        let Error::Api(serenity::Error::Http(err)) = self else {
            return ErrorKind::Other;
        };
        let HttpError::UnsuccessfulRequest(resp) = err else {
            return ErrorKind::Other;
        };
        match resp.status_code.as_u16() {
            404 => ErrorKind::NotFound,
            429 => ErrorKind::RateLimited,
            _ => ErrorKind::Other,
        }
    }
}

impl From<serenity::Error> for Error {
    fn from(err: serenity::Error) -> Self {
        Error::Api(err)
    }
}

/// A [`ChatPlatform`] over the Discord REST API.
#[derive(Clone)]
pub struct DiscordPlatform {
    http: Arc<Http>,
}

impl DiscordPlatform {
    /// Creates a platform client over the given HTTP handle.
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

fn parse_id(id: &str) -> Result<u64, Error> {
    id.parse().map_err(|_| Error::InvalidId(id.to_owned()))
}

fn raw_message(msg: &Message) -> RawMessage {
    RawMessage {
        id: msg.id.to_string(),
        author_id: msg.author.id.to_string(),
        content: msg.content.clone(),
        embed_text: msg.embeds.first().and_then(|e| e.description.clone()),
        referenced: msg
            .referenced_message
            .as_deref()
            .map(|referenced| Box::new(raw_message(referenced))),
        timestamp_ms: msg.timestamp.unix_timestamp() * 1000,
    }
}

fn channel_info(channel: Channel) -> Result<ChannelInfo, Error> {
    let Channel::Guild(channel) = channel else {
        return Err(Error::NotAGuildChannel);
    };
    let kind = match channel.kind {
        ChannelType::Text => ChannelKind::Text,
        ChannelType::PublicThread
        | ChannelType::PrivateThread
        | ChannelType::NewsThread => ChannelKind::Thread,
        _ => ChannelKind::Other,
    };
    let (archived, locked) = channel
        .thread_metadata
        .map(|m| (m.archived, m.locked))
        .unwrap_or((false, false));
    Ok(ChannelInfo {
        kind,
        owner_id: channel.owner_id.map(|id| id.to_string()),
        archived,
        locked,
    })
}

impl ChatPlatform for DiscordPlatform {
    type Error = Error;

    async fn channel(
        &self,
        channel_id: &str,
    ) -> Result<ChannelInfo, Self::Error> {
        let channel_id = ChannelId::new(parse_id(channel_id)?);
        let channel = self.http.get_channel(channel_id).await?;
        channel_info(channel)
    }

    async fn thread_messages(
        &self,
        thread_id: &str,
        limit: u8,
    ) -> Result<Vec<RawMessage>, Self::Error> {
        let thread_id = ChannelId::new(parse_id(thread_id)?);
        let messages = thread_id
            .messages(&self.http, GetMessages::new().limit(limit))
            .await?;
        Ok(messages.iter().map(raw_message).collect())
    }

    async fn send_message(
        &self,
        channel_id: &str,
        text: &str,
    ) -> Result<(), Self::Error> {
        let channel_id = ChannelId::new(parse_id(channel_id)?);
        channel_id.say(&self.http, text).await?;
        Ok(())
    }

    async fn announce_activity(
        &self,
        channel_id: &str,
    ) -> Result<(), Self::Error> {
        let channel_id = ChannelId::new(parse_id(channel_id)?);
        channel_id.broadcast_typing(&self.http).await?;
        Ok(())
    }

    async fn display_name(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> Result<String, Self::Error> {
        let guild_id = parse_id(guild_id)?;
        let user_id = UserId::new(parse_id(user_id)?);
        let member = self.http.get_member(guild_id.into(), user_id).await?;
        Ok(member.display_name().to_owned())
    }

    async fn post_announcement(
        &self,
        invocation: &Invocation,
        text: &str,
    ) -> Result<MessageHandle, Self::Error> {
        let interaction_id = InteractionId::new(parse_id(&invocation.id)?);
        // Responding to the interaction posts the announcement embed in
        // the original channel.
        let response = serde_json::json!({
            "type": 4,
            "data": {
                "embeds": [{
                    "description": text,
                    "color": ANNOUNCEMENT_COLOR,
                }],
                "allowed_mentions": { "parse": ["users"] },
            },
        });
        self.http
            .create_interaction_response(
                interaction_id,
                &invocation.token,
                &response,
                vec![],
            )
            .await?;

        let message = self
            .http
            .get_original_interaction_response(&invocation.token)
            .await?;
        Ok(MessageHandle {
            id: message.id.to_string(),
        })
    }

    async fn create_thread(
        &self,
        channel_id: &str,
        anchor: &MessageHandle,
        name: &str,
    ) -> Result<ThreadHandle, Self::Error> {
        let channel_id = ChannelId::new(parse_id(channel_id)?);
        let anchor_id = parse_id(&anchor.id)?;
        let thread = channel_id
            .create_thread_from_message(
                &self.http,
                anchor_id,
                CreateThread::new(name)
                    .kind(ChannelType::PublicThread)
                    .auto_archive_duration(
                        serenity::model::channel::AutoArchiveDuration::OneHour,
                    )
                    .rate_limit_per_user(10)
                    .invitable(false),
            )
            .await?;
        Ok(ThreadHandle {
            id: thread.id.to_string(),
        })
    }
}
