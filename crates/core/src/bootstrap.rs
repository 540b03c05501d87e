//! Thread bootstrapping.
//!
//! Handles the initiating slash command: posts the prompt announcement
//! and opens the discussion thread anchored to it.

use gabble_platform::{
    ChannelKind, ChatPlatform, Invocation, ThreadHandle,
    encode_prompt_announcement,
};

/// The result of bootstrapping a conversation thread.
///
/// Consumed right after creation; the thread itself lives on the
/// platform and is not tracked further.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ThreadRequest {
    /// The original prompt, verbatim.
    pub prompt: String,
    /// The invoking user's resolved display name.
    pub invoker_name: String,
    /// The created thread.
    pub thread: ThreadHandle,
}

/// Handles a `/chat` invocation: posts an announcement carrying the
/// prompt and opens a public thread anchored to it.
///
/// Returns `Ok(None)` when the invocation did not happen in a plain
/// text channel; that is a policy decline, not a failure. There is no
/// rollback if thread creation fails after the announcement was posted;
/// the orphaned announcement stays visible.
pub async fn bootstrap<P: ChatPlatform>(
    platform: &P,
    invocation: &Invocation,
    thread_name_suffix: &str,
) -> Result<Option<ThreadRequest>, P::Error> {
    let channel = platform.channel(&invocation.channel_id).await?;
    if channel.kind != ChannelKind::Text {
        debug!(
            channel_id = %invocation.channel_id,
            "ignoring invocation outside a text channel"
        );
        return Ok(None);
    }

    let invoker_name = platform
        .display_name(&invocation.guild_id, &invocation.user_id)
        .await?;

    let announcement =
        encode_prompt_announcement(&invocation.user_id, &invocation.prompt);
    let anchor = platform.post_announcement(invocation, &announcement).await?;

    let thread = platform
        .create_thread(
            &invocation.channel_id,
            &anchor,
            &format!("({invoker_name}) {thread_name_suffix}"),
        )
        .await?;

    Ok(Some(ThreadRequest {
        prompt: invocation.prompt.clone(),
        invoker_name,
        thread,
    }))
}
