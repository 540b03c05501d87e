use serde::{Deserialize, Serialize};

/// A platform message as retrieved from a thread's history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawMessage {
    /// The message identifier.
    pub id: String,
    /// The identity of the message author.
    pub author_id: String,
    /// The raw text content.
    pub content: String,
    /// Rendered rich content attached to the message, if any. For
    /// Discord this is the first embed's description.
    pub embed_text: Option<String>,
    /// The message this one replies to, if any.
    pub referenced: Option<Box<RawMessage>>,
    /// The send time in milliseconds since the Unix epoch. Used as the
    /// explicit chronological ordering key.
    pub timestamp_ms: i64,
}

/// Classification of a channel, as far as the bot cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// A plain guild text channel.
    Text,
    /// A thread anchored to a message.
    Thread,
    /// Anything else (voice, DM, forum, ...).
    Other,
}

/// The subset of channel state the bot needs for routing decisions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelInfo {
    /// What kind of channel this is.
    pub kind: ChannelKind,
    /// For threads, the identity of the thread creator.
    pub owner_id: Option<String>,
    /// Whether the thread has been archived.
    pub archived: bool,
    /// Whether the thread has been locked.
    pub locked: bool,
}

impl ChannelInfo {
    /// Returns whether this is a thread that is still open for
    /// conversation and was created by `owner_id`.
    #[inline]
    pub fn is_active_thread_of(&self, owner_id: &str) -> bool {
        self.kind == ChannelKind::Thread
            && !self.archived
            && !self.locked
            && self.owner_id.as_deref() == Some(owner_id)
    }
}

/// A slash-command invocation, already parsed out of the platform's
/// interaction event.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Invocation {
    /// The interaction identifier.
    pub id: String,
    /// The interaction token used to respond.
    pub token: String,
    /// The channel the command was invoked in.
    pub channel_id: String,
    /// The guild the command was invoked in.
    pub guild_id: String,
    /// The invoking user.
    pub user_id: String,
    /// The prompt text the user supplied.
    pub prompt: String,
}

/// A handle to a posted message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    /// The message identifier.
    pub id: String,
}

/// A handle to a created thread.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ThreadHandle {
    /// The thread's channel identifier.
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_thread_check() {
        let mut info = ChannelInfo {
            kind: ChannelKind::Thread,
            owner_id: Some("42".to_owned()),
            archived: false,
            locked: false,
        };
        assert!(info.is_active_thread_of("42"));
        assert!(!info.is_active_thread_of("43"));

        info.archived = true;
        assert!(!info.is_active_thread_of("42"));
        info.archived = false;
        info.locked = true;
        assert!(!info.is_active_thread_of("42"));

        let text = ChannelInfo {
            kind: ChannelKind::Text,
            owner_id: Some("42".to_owned()),
            archived: false,
            locked: false,
        };
        assert!(!text.is_active_thread_of("42"));
    }
}
