use crate::error::PlatformError;
use crate::message::{
    ChannelInfo, Invocation, MessageHandle, RawMessage, ThreadHandle,
};

/// A client for the chat platform.
///
/// Implementations are thin wrappers over the platform's REST surface
/// and hold no conversation state; the platform's own message history
/// is the system of record. All methods borrow `self`, so a single
/// client instance can serve concurrent conversations.
pub trait ChatPlatform: Send + Sync {
    /// The error type that may be returned by the client.
    type Error: PlatformError;

    /// Looks up the routing-relevant state of a channel.
    fn channel(
        &self,
        channel_id: &str,
    ) -> impl Future<Output = Result<ChannelInfo, Self::Error>> + Send;

    /// Fetches up to `limit` most recent messages of a thread.
    ///
    /// The platform typically delivers these newest first, but callers
    /// must not rely on any particular order; [`RawMessage::timestamp_ms`]
    /// is the ordering contract.
    fn thread_messages(
        &self,
        thread_id: &str,
        limit: u8,
    ) -> impl Future<Output = Result<Vec<RawMessage>, Self::Error>> + Send;

    /// Sends a plain text message to a channel.
    fn send_message(
        &self,
        channel_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Signals that the bot is working on a reply (typing indicator).
    /// Best-effort; failures are never critical to callers.
    fn announce_activity(
        &self,
        channel_id: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Resolves the display name of a guild member.
    fn display_name(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Responds to a command invocation with an announcement carrying
    /// `text` as rendered rich content, and returns a handle to the
    /// posted message.
    fn post_announcement(
        &self,
        invocation: &Invocation,
        text: &str,
    ) -> impl Future<Output = Result<MessageHandle, Self::Error>> + Send;

    /// Opens a new public thread anchored to `anchor` in the given
    /// channel.
    fn create_thread(
        &self,
        channel_id: &str,
        anchor: &MessageHandle,
        name: &str,
    ) -> impl Future<Output = Result<ThreadHandle, Self::Error>> + Send;
}
