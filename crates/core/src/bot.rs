//! Event routing.
//!
//! [`Bot`] is the explicitly constructed service object that owns the
//! platform client and the completion provider; platform event handlers
//! are thin shims that translate events and call into it.

use std::time::Duration;

use gabble_model::CompletionProvider;
use gabble_platform::{ChatPlatform, Invocation};
use tokio::time::timeout;

use crate::bootstrap::bootstrap;
use crate::completion::{CompletionOptions, complete};
use crate::conversation::assemble;

/// Configuration of the bot service.
#[derive(Clone, Debug)]
pub struct BotConfig {
    /// The bot's own user identity, used for echo suppression, thread
    /// ownership checks and role assignment.
    pub self_id: String,
    /// The thread-name suffix appended after the invoker's name.
    pub thread_name: String,
    /// The system-prompt suffix template with a single `{name}` slot.
    pub system_prompt_suffix: String,
    /// The maximum number of history messages fetched per request.
    pub max_history: u8,
    /// The deadline for one completion request.
    pub completion_timeout: Duration,
    /// The deadline for handling one command invocation.
    pub bootstrap_timeout: Duration,
}

impl BotConfig {
    /// Creates a configuration with the defaults, for the given bot
    /// identity.
    pub fn new(self_id: impl Into<String>) -> Self {
        Self {
            self_id: self_id.into(),
            thread_name: "GPT Chat Thread".to_owned(),
            system_prompt_suffix:
                "Your name is {name}, reply back to the user.".to_owned(),
            max_history: 100,
            completion_timeout: Duration::from_secs(10 * 60),
            bootstrap_timeout: Duration::from_secs(30),
        }
    }
}

/// A message event, already reduced to the fields routing needs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MessageEvent {
    /// The channel the message was posted in.
    pub channel_id: String,
    /// The guild the channel belongs to.
    pub guild_id: String,
    /// The message author.
    pub author_id: String,
}

/// The bot service: routes platform events through conversation
/// assembly and completion orchestration.
///
/// Holds no per-conversation state, so one instance serves concurrent
/// conversations in different threads independently.
pub struct Bot<P, M> {
    platform: P,
    provider: M,
    config: BotConfig,
}

impl<P, M> Bot<P, M>
where
    P: ChatPlatform,
    M: CompletionProvider,
{
    /// Creates a bot service from its collaborators.
    pub fn new(platform: P, provider: M, config: BotConfig) -> Self {
        Self {
            platform,
            provider,
            config,
        }
    }

    /// Handles a message event.
    ///
    /// Only messages by other users inside an active thread owned by
    /// the bot produce a reply. Every failure is logged and the event
    /// dropped; the user sees no error message and can retry by
    /// sending another message.
    pub async fn handle_message(&self, event: &MessageEvent) {
        if event.author_id == self.config.self_id {
            return;
        }

        let channel = match self.platform.channel(&event.channel_id).await {
            Ok(channel) => channel,
            Err(err) => {
                error!("error fetching channel: {err}");
                return;
            }
        };
        if !channel.is_active_thread_of(&self.config.self_id) {
            return;
        }

        let messages = match self
            .platform
            .thread_messages(&event.channel_id, self.config.max_history)
            .await
        {
            Ok(messages) => messages,
            Err(err) => {
                error!("error fetching messages: {err}");
                return;
            }
        };

        let conversation = match assemble(
            &self.platform,
            &self.config.self_id,
            &event.guild_id,
            messages,
            &self.config.system_prompt_suffix,
        )
        .await
        {
            Ok(conversation) => conversation,
            Err(err) => {
                error!("error assembling conversation: {err}");
                return;
            }
        };

        let options = CompletionOptions {
            timeout: self.config.completion_timeout,
            ..Default::default()
        };
        let reply = match complete(
            &self.platform,
            &self.provider,
            &event.channel_id,
            conversation,
            &options,
        )
        .await
        {
            Ok(reply) => reply,
            Err(err) => {
                error!("error handling completion: {err}");
                return;
            }
        };

        if let Err(err) =
            self.platform.send_message(&event.channel_id, &reply).await
        {
            error!("error sending message: {err}");
        }
    }

    /// Handles a slash-command invocation by bootstrapping a new
    /// conversation thread. Failures are logged and dropped.
    pub async fn handle_invocation(&self, invocation: &Invocation) {
        let bootstrapped = timeout(
            self.config.bootstrap_timeout,
            bootstrap(&self.platform, invocation, &self.config.thread_name),
        )
        .await;
        match bootstrapped {
            Ok(Ok(Some(request))) => {
                info!(
                    thread_id = %request.thread.id,
                    invoker = %request.invoker_name,
                    "opened chat thread"
                );
            }
            Ok(Ok(None)) => {}
            Ok(Err(err)) => {
                error!("error bootstrapping thread: {err}");
            }
            Err(_) => {
                error!("bootstrap deadline exceeded");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use gabble_platform::{
        ChannelInfo, ChannelKind, RawMessage, encode_prompt_announcement,
    };
    use gabble_test_model::TestProvider;
    use gabble_test_platform::TestPlatform;

    use super::*;

    const SELF_ID: &str = "bot";

    fn active_thread(owner: &str) -> ChannelInfo {
        ChannelInfo {
            kind: ChannelKind::Thread,
            owner_id: Some(owner.to_owned()),
            archived: false,
            locked: false,
        }
    }

    fn event() -> MessageEvent {
        MessageEvent {
            channel_id: "t1".to_owned(),
            guild_id: "g1".to_owned(),
            author_id: "alice".to_owned(),
        }
    }

    fn history() -> Vec<RawMessage> {
        // Newest first, the way the platform delivers it.
        vec![
            RawMessage {
                id: "m2".to_owned(),
                author_id: "alice".to_owned(),
                content: "hi".to_owned(),
                embed_text: None,
                referenced: None,
                timestamp_ms: 2,
            },
            RawMessage {
                id: "m1".to_owned(),
                author_id: SELF_ID.to_owned(),
                content: String::new(),
                embed_text: None,
                referenced: Some(Box::new(RawMessage {
                    id: "a0".to_owned(),
                    author_id: SELF_ID.to_owned(),
                    content: String::new(),
                    embed_text: Some(encode_prompt_announcement(
                        "alice",
                        "be helpful",
                    )),
                    referenced: None,
                    timestamp_ms: 0,
                })),
                timestamp_ms: 1,
            },
        ]
    }

    fn bot(
        platform: &TestPlatform,
        provider: &TestProvider,
    ) -> Bot<TestPlatform, TestProvider> {
        Bot::new(platform.clone(), provider.clone(), BotConfig::new(SELF_ID))
    }

    #[tokio::test]
    async fn test_reply_posted_to_thread() {
        let platform = TestPlatform::default();
        platform.add_channel("t1", active_thread(SELF_ID));
        platform.add_member("g1", "alice", "Alice");
        platform.set_history("t1", history());

        let provider = TestProvider::default();
        provider.add_reply("hello there");

        bot(&platform, &provider).handle_message(&event()).await;

        assert_eq!(
            platform.sent_messages(),
            vec![("t1".to_owned(), "hello there".to_owned())]
        );
        // The provider saw the assembled conversation, oldest first.
        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].turns.len(), 2);
    }

    #[tokio::test]
    async fn test_own_messages_are_ignored() {
        let platform = TestPlatform::default();
        platform.add_channel("t1", active_thread(SELF_ID));
        let provider = TestProvider::default();

        let mut echo = event();
        echo.author_id = SELF_ID.to_owned();
        bot(&platform, &provider).handle_message(&echo).await;

        assert!(platform.sent_messages().is_empty());
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_and_inactive_threads_are_ignored() {
        let platform = TestPlatform::default();
        let provider = TestProvider::default();
        let bot = bot(&platform, &provider);

        // A thread owned by somebody else.
        platform.add_channel("t1", active_thread("someone-else"));
        bot.handle_message(&event()).await;

        // An archived thread of our own.
        let mut archived = active_thread(SELF_ID);
        archived.archived = true;
        platform.add_channel("t1", archived);
        bot.handle_message(&event()).await;

        // A plain text channel.
        platform.add_channel(
            "t1",
            ChannelInfo {
                kind: ChannelKind::Text,
                owner_id: None,
                archived: false,
                locked: false,
            },
        );
        bot.handle_message(&event()).await;

        assert!(platform.sent_messages().is_empty());
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_assembly_failure_sends_nothing() {
        let platform = TestPlatform::default();
        platform.add_channel("t1", active_thread(SELF_ID));
        // "alice" is not registered, so name resolution fails.
        platform.set_history("t1", history());

        let provider = TestProvider::default();
        provider.add_reply("never sent");

        bot(&platform, &provider).handle_message(&event()).await;

        assert!(platform.sent_messages().is_empty());
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_invocation_routed_to_bootstrap() {
        let platform = TestPlatform::default();
        platform.add_channel(
            "c1",
            ChannelInfo {
                kind: ChannelKind::Text,
                owner_id: None,
                archived: false,
                locked: false,
            },
        );
        platform.add_member("g1", "alice", "Alice");
        let provider = TestProvider::default();

        let invocation = Invocation {
            id: "i1".to_owned(),
            token: "tok".to_owned(),
            channel_id: "c1".to_owned(),
            guild_id: "g1".to_owned(),
            user_id: "alice".to_owned(),
            prompt: "be brief".to_owned(),
        };
        bot(&platform, &provider).handle_invocation(&invocation).await;

        assert_eq!(platform.created_threads().len(), 1);
    }
}
