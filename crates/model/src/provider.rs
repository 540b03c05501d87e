use std::error::Error;

use crate::error::ErrorKind;
use crate::request::CompletionRequest;

/// The error type for a completion provider.
pub trait CompletionProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that can produce chat completions.
///
/// Once the provider is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it,
/// and the provider should be prepared for being dropped anytime.
///
/// A provider performs exactly one request per [`complete`] call and
/// resolves with the full reply text. There is no partial delivery:
/// callers either get the whole reply or an error.
///
/// [`complete`]: CompletionProvider::complete
pub trait CompletionProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: CompletionProviderError;

    /// Requests a completion for the given conversation.
    fn complete(
        &self,
        req: &CompletionRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static;
}
