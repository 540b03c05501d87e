//! The prompt-announcement text format.
//!
//! When a conversation is bootstrapped, the bot posts an announcement
//! whose rendered content embeds the original prompt. Later, the
//! conversation assembler recovers that prompt by parsing the rendered
//! content back. Both halves live here so the format can only change
//! in one place; treat any change as a format version bump, since
//! announcements already posted to the platform keep the old shape.

/// The literal marker that precedes the prompt in an announcement.
pub const PROMPT_MARKER: &str = "Prompt: ";

/// A decoded prompt announcement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PromptAnnouncement {
    /// The user that invoked the command.
    pub invoker_id: String,
    /// The original prompt, verbatim.
    pub prompt: String,
}

/// Renders the announcement content for the given invoker and prompt.
pub fn encode_prompt_announcement(invoker_id: &str, prompt: &str) -> String {
    format!("<@{invoker_id}> wants to chat!\n {PROMPT_MARKER}{prompt}")
}

/// Parses announcement content rendered by [`encode_prompt_announcement`].
///
/// Returns `None` when the content does not carry the prompt marker or
/// the invoker mention, which means the referenced message is not a
/// (current-format) prompt announcement.
pub fn decode_prompt_announcement(text: &str) -> Option<PromptAnnouncement> {
    // The prompt itself may contain the marker, so only the first
    // occurrence belongs to the format.
    let marker_at = text.find(PROMPT_MARKER)?;
    let prompt = &text[marker_at + PROMPT_MARKER.len()..];

    let (invoker_id, _) = text.strip_prefix("<@")?.split_once('>')?;

    Some(PromptAnnouncement {
        invoker_id: invoker_id.to_owned(),
        prompt: prompt.to_owned(),
    })
}
