//! Completion orchestration.
//!
//! Drives one completion call bounded by a deadline while keeping a
//! best-effort activity signal (typing indicator) alive on the side.

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::time::Duration;

use gabble_model::{
    CompletionProvider, CompletionProviderError, CompletionRequest,
};
use gabble_platform::ChatPlatform;
use tokio::select;
use tokio::time::{interval, timeout};

use crate::conversation::Conversation;

/// How often the activity signal is emitted while a completion call is
/// outstanding. Deliberately not configurable.
const ACTIVITY_SIGNAL_PERIOD: Duration = Duration::from_secs(5);

/// Options for a single completion request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompletionOptions {
    /// The sampling temperature.
    pub temperature: f64,
    /// The deadline for the whole request. Local backends can be slow
    /// with long conversations, so the default is generous.
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            timeout: Duration::from_secs(10 * 60),
        }
    }
}

/// The error type for [`complete`].
#[derive(Debug)]
pub enum CompleteError<E> {
    /// The deadline expired before the provider resolved.
    TimedOut,
    /// The provider call failed.
    Provider(E),
}

impl<E: CompletionProviderError> Display for CompleteError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompleteError::TimedOut => {
                write!(f, "completion deadline exceeded")
            }
            CompleteError::Provider(err) => {
                write!(f, "error creating chat completion: {err}")
            }
        }
    }
}

impl<E: CompletionProviderError> StdError for CompleteError<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CompleteError::TimedOut => None,
            CompleteError::Provider(err) => Some(err),
        }
    }
}

/// Requests one completion for `conversation`, announcing activity in
/// `channel_id` every few seconds until the call resolves.
///
/// Exactly one provider call is made and nothing is retried. The
/// activity loop runs in the same scope as the call, joined by
/// `select!`, so it is dropped on every exit path (success, provider
/// error, deadline) and can never outlive the call. A failed activity
/// tick is logged and has no effect on the in-flight completion.
pub async fn complete<P, M>(
    platform: &P,
    provider: &M,
    channel_id: &str,
    conversation: Conversation,
    options: &CompletionOptions,
) -> Result<String, CompleteError<M::Error>>
where
    P: ChatPlatform,
    M: CompletionProvider,
{
    let request = CompletionRequest {
        turns: conversation.into_turns(),
        temperature: Some(options.temperature),
    };
    let bounded_call = timeout(options.timeout, provider.complete(&request));

    let activity = async {
        let mut ticks = interval(ACTIVITY_SIGNAL_PERIOD);
        loop {
            ticks.tick().await;
            if let Err(err) = platform.announce_activity(channel_id).await {
                // Best-effort only; the completion call is unaffected.
                warn!("error announcing activity: {err}");
            }
        }
    };

    select! {
        result = bounded_call => match result {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(err)) => Err(CompleteError::Provider(err)),
            Err(_) => Err(CompleteError::TimedOut),
        },
        () = activity => unreachable!("activity loop never completes"),
    }
}

#[cfg(test)]
mod tests {
    use gabble_model::ErrorKind;
    use gabble_test_model::TestProvider;
    use gabble_test_platform::TestPlatform;
    use tokio::time::{advance, sleep};

    use super::*;

    async fn run_complete(
        platform: &TestPlatform,
        provider: &TestProvider,
        options: &CompletionOptions,
    ) -> Result<String, CompleteError<gabble_test_model::Error>> {
        complete(platform, provider, "thread", Conversation::default(), options)
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_stops_after_success() {
        let platform = TestPlatform::default();
        let provider = TestProvider::default();
        provider.add_reply("done");
        provider.set_delay(Duration::from_secs(12));

        let options = CompletionOptions::default();
        let text = run_complete(&platform, &provider, &options).await.unwrap();
        assert_eq!(text, "done");

        // Ticks at 0s, 5s and 10s while the call was pending.
        let ticks = platform.activity_count();
        assert_eq!(ticks, 3);

        // No stray ticker may survive the call.
        sleep(Duration::from_secs(60)).await;
        assert_eq!(platform.activity_count(), ticks);
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_stops_after_deadline() {
        let platform = TestPlatform::default();
        let provider = TestProvider::default();
        provider.add_reply("too late");
        provider.set_delay(Duration::from_secs(120));

        let options = CompletionOptions {
            timeout: Duration::from_secs(30),
            ..Default::default()
        };
        let err =
            run_complete(&platform, &provider, &options).await.unwrap_err();
        assert!(matches!(err, CompleteError::TimedOut));

        let ticks = platform.activity_count();
        assert!(ticks > 0);
        advance(Duration::from_secs(60)).await;
        assert_eq!(platform.activity_count(), ticks);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let platform = TestPlatform::default();
        let provider = TestProvider::default();
        provider.add_failure(ErrorKind::Other);

        let options = CompletionOptions::default();
        let err =
            run_complete(&platform, &provider, &options).await.unwrap_err();
        assert!(matches!(err, CompleteError::Provider(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_activity_does_not_cancel_completion() {
        let platform = TestPlatform::default();
        platform.fail_activity();
        let provider = TestProvider::default();
        provider.add_reply("still fine");
        provider.set_delay(Duration::from_secs(8));

        let options = CompletionOptions::default();
        let text = run_complete(&platform, &provider, &options).await.unwrap();
        assert_eq!(text, "still fine");
        assert!(platform.activity_count() > 0);
    }

    #[tokio::test]
    async fn test_temperature_is_forwarded() {
        let platform = TestPlatform::default();
        let provider = TestProvider::default();
        provider.add_reply("ok");

        let options = CompletionOptions::default();
        run_complete(&platform, &provider, &options).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, Some(0.7));
        assert!(requests[0].turns.is_empty());
    }
}
