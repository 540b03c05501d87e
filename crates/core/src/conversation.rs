//! Conversation assembly.
//!
//! Turns the raw message history of a thread into an ordered,
//! role-tagged conversation for the completion provider.

use std::error::Error as StdError;
use std::fmt::{self, Display};

use gabble_model::ChatTurn;
use gabble_platform::{
    ChatPlatform, PlatformError, RawMessage, decode_prompt_announcement,
};

/// The substitution slot in the system-prompt suffix template.
const NAME_SLOT: &str = "{name}";

/// An ordered sequence of chat turns, oldest first.
///
/// Built once per completion request and consumed immediately; the
/// platform's message history is the system of record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
}

impl Conversation {
    /// Returns the turns of this conversation, oldest first.
    #[inline]
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Consumes the conversation and returns its turns.
    #[inline]
    pub fn into_turns(self) -> Vec<ChatTurn> {
        self.turns
    }
}

/// The error type for [`assemble`].
#[derive(Debug)]
pub enum AssembleError<E> {
    /// A message references an announcement whose rendered content does
    /// not decode as a prompt announcement. The conversation is in an
    /// un-parseable state and no partial result is produced.
    PromptMarkerMissing,
    /// A platform call (display-name resolution) failed.
    Platform(E),
}

impl<E: PlatformError> Display for AssembleError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssembleError::PromptMarkerMissing => {
                write!(f, "prompt marker not found in referenced announcement")
            }
            AssembleError::Platform(err) => {
                write!(f, "platform error: {err}")
            }
        }
    }
}

impl<E: PlatformError> StdError for AssembleError<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            AssembleError::PromptMarkerMissing => None,
            AssembleError::Platform(err) => Some(err),
        }
    }
}

/// Assembles the raw history of a thread into a [`Conversation`].
///
/// `messages` may arrive in any order (history retrieval typically
/// delivers newest first); the result is always oldest first, ordered
/// by [`RawMessage::timestamp_ms`].
///
/// Role assignment, per message:
/// - authored by the bot and replying to a prompt announcement: a
///   system turn carrying the decoded prompt plus the suffix template,
///   with its `{name}` slot filled by the invoker's display name;
/// - authored by the bot otherwise: an assistant turn, verbatim;
/// - anyone else: a human turn, prefixed with the author's display name
///   so the model can tell thread participants apart.
///
/// Display-name resolution failures abort assembly; names are
/// load-bearing for multi-user attribution and are never defaulted.
pub async fn assemble<P: ChatPlatform>(
    platform: &P,
    self_id: &str,
    guild_id: &str,
    mut messages: Vec<RawMessage>,
    system_prompt_suffix: &str,
) -> Result<Conversation, AssembleError<P::Error>> {
    // Reverse the expected newest-first delivery before the stable
    // sort, so messages with equal timestamps keep chronological order.
    messages.reverse();
    messages.sort_by_key(|m| m.timestamp_ms);

    let mut turns = Vec::with_capacity(messages.len());
    for message in &messages {
        let turn = assign_turn(
            platform,
            self_id,
            guild_id,
            message,
            system_prompt_suffix,
        )
        .await?;
        turns.push(turn);
    }
    Ok(Conversation { turns })
}

async fn assign_turn<P: ChatPlatform>(
    platform: &P,
    self_id: &str,
    guild_id: &str,
    message: &RawMessage,
    system_prompt_suffix: &str,
) -> Result<ChatTurn, AssembleError<P::Error>> {
    if message.author_id == self_id {
        let referenced_embed = message
            .referenced
            .as_ref()
            .and_then(|referenced| referenced.embed_text.as_deref());
        if let Some(embed_text) = referenced_embed {
            let announcement = decode_prompt_announcement(embed_text)
                .ok_or(AssembleError::PromptMarkerMissing)?;
            let invoker_name = platform
                .display_name(guild_id, &announcement.invoker_id)
                .await
                .map_err(AssembleError::Platform)?;
            let suffix =
                system_prompt_suffix.replace(NAME_SLOT, &invoker_name);
            return Ok(ChatTurn::System(format!(
                "{}\n{suffix}",
                announcement.prompt
            )));
        }
        return Ok(ChatTurn::Assistant(message.content.clone()));
    }

    let name = platform
        .display_name(guild_id, &message.author_id)
        .await
        .map_err(AssembleError::Platform)?;
    Ok(ChatTurn::Human(format!("({name}) {}", message.content)))
}

#[cfg(test)]
mod tests {
    use gabble_platform::encode_prompt_announcement;
    use gabble_test_platform::TestPlatform;

    use super::*;

    const SELF_ID: &str = "bot";
    const GUILD_ID: &str = "guild";
    const SUFFIX: &str = "Your name is {name}, reply back to the user.";

    fn message(id: &str, author: &str, content: &str, ts: i64) -> RawMessage {
        RawMessage {
            id: id.to_owned(),
            author_id: author.to_owned(),
            content: content.to_owned(),
            embed_text: None,
            referenced: None,
            timestamp_ms: ts,
        }
    }

    fn announcement_reply(id: &str, invoker: &str, prompt: &str) -> RawMessage {
        let mut announcement = message("a0", SELF_ID, "", 0);
        announcement.embed_text =
            Some(encode_prompt_announcement(invoker, prompt));
        let mut reply = message(id, SELF_ID, "", 1);
        reply.referenced = Some(Box::new(announcement));
        reply
    }

    fn platform_with_members() -> TestPlatform {
        let platform = TestPlatform::default();
        platform.add_member(GUILD_ID, "alice", "Alice");
        platform.add_member(GUILD_ID, "bob", "Bob");
        platform
    }

    #[tokio::test]
    async fn test_newest_first_becomes_oldest_first() {
        let platform = platform_with_members();
        // Delivery order: newest first, as the platform sends it.
        let messages = vec![
            message("m3", SELF_ID, "hello", 3),
            message("m2", "alice", "hi", 2),
            message("m1", "bob", "hey", 1),
        ];

        let conversation =
            assemble(&platform, SELF_ID, GUILD_ID, messages, SUFFIX)
                .await
                .unwrap();
        assert_eq!(
            conversation.turns(),
            &[
                ChatTurn::Human("(Bob) hey".to_owned()),
                ChatTurn::Human("(Alice) hi".to_owned()),
                ChatTurn::Assistant("hello".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn test_shuffled_delivery_is_sorted_by_timestamp() {
        let platform = platform_with_members();
        let messages = vec![
            message("m2", "alice", "second", 2),
            message("m1", "alice", "first", 1),
            message("m3", "alice", "third", 3),
        ];

        let conversation =
            assemble(&platform, SELF_ID, GUILD_ID, messages, SUFFIX)
                .await
                .unwrap();
        let contents: Vec<_> = conversation
            .turns()
            .iter()
            .map(|turn| turn.content())
            .collect();
        assert_eq!(
            contents,
            ["(Alice) first", "(Alice) second", "(Alice) third"]
        );
    }

    #[tokio::test]
    async fn test_system_turn_from_announcement_reply() {
        let platform = platform_with_members();
        let messages =
            vec![announcement_reply("m1", "alice", "talk like a pirate")];

        let conversation =
            assemble(&platform, SELF_ID, GUILD_ID, messages, SUFFIX)
                .await
                .unwrap();
        assert_eq!(
            conversation.turns(),
            &[ChatTurn::System(
                "talk like a pirate\n\
                 Your name is Alice, reply back to the user."
                    .to_owned()
            )]
        );
    }

    #[tokio::test]
    async fn test_bot_reply_without_reference_is_assistant() {
        let platform = platform_with_members();
        let messages = vec![message("m1", SELF_ID, "sure thing", 1)];

        let conversation =
            assemble(&platform, SELF_ID, GUILD_ID, messages, SUFFIX)
                .await
                .unwrap();
        assert_eq!(
            conversation.turns(),
            &[ChatTurn::Assistant("sure thing".to_owned())]
        );
    }

    #[tokio::test]
    async fn test_missing_marker_aborts_assembly() {
        let platform = platform_with_members();
        let mut announcement = message("a0", SELF_ID, "", 0);
        announcement.embed_text = Some("a plain embed".to_owned());
        let mut reply = message("m1", SELF_ID, "", 1);
        reply.referenced = Some(Box::new(announcement));
        let messages = vec![message("m2", "alice", "hi", 2), reply];

        let err = assemble(&platform, SELF_ID, GUILD_ID, messages, SUFFIX)
            .await
            .unwrap_err();
        assert!(matches!(err, AssembleError::PromptMarkerMissing));
    }

    #[tokio::test]
    async fn test_unresolvable_name_aborts_assembly() {
        let platform = TestPlatform::default();
        let messages = vec![message("m1", "stranger", "hi", 1)];

        let err = assemble(&platform, SELF_ID, GUILD_ID, messages, SUFFIX)
            .await
            .unwrap_err();
        assert!(matches!(err, AssembleError::Platform(_)));
    }

    #[tokio::test]
    async fn test_end_to_end_three_messages() {
        let platform = platform_with_members();
        // Delivered newest first: assistant reply, human message, and
        // the bot's reply to the prompt announcement.
        let messages = vec![
            message("m3", SELF_ID, "hello", 3),
            message("m2", "alice", "hi", 2),
            announcement_reply("m1", "alice", "greet everyone"),
        ];

        let conversation =
            assemble(&platform, SELF_ID, GUILD_ID, messages, SUFFIX)
                .await
                .unwrap();
        assert_eq!(
            conversation.turns(),
            &[
                ChatTurn::System(
                    "greet everyone\n\
                     Your name is Alice, reply back to the user."
                        .to_owned()
                ),
                ChatTurn::Human("(Alice) hi".to_owned()),
                ChatTurn::Assistant("hello".to_owned()),
            ]
        );
    }
}
