//! A local fake completion provider for testing purpose.

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gabble_model::{
    CompletionProvider, CompletionProviderError, CompletionRequest, ErrorKind,
};
use tokio::time::sleep;

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl CompletionProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// The scripted outcome for one completion call.
#[derive(Clone, Debug)]
pub enum PresetOutcome {
    /// The call resolves with this reply text.
    Reply(String),
    /// The call fails with an error of this kind.
    Failure(ErrorKind),
}

#[derive(Default)]
struct Inner {
    script: Mutex<VecDeque<PresetOutcome>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Mutex<Option<Duration>>,
}

/// A local fake completion provider.
///
/// Before sending requests, you need to setup the script, which is how
/// the provider should respond to each call in order. If there are no
/// enough steps in the script, an error will be returned.
///
/// Every received request is recorded and can be inspected afterwards.
#[derive(Clone, Default)]
pub struct TestProvider {
    inner: Arc<Inner>,
}

impl TestProvider {
    /// Appends a successful reply to the script.
    #[inline]
    pub fn add_reply(&self, text: impl Into<String>) {
        self.inner
            .script
            .lock()
            .unwrap()
            .push_back(PresetOutcome::Reply(text.into()));
    }

    /// Appends a failure to the script.
    #[inline]
    pub fn add_failure(&self, kind: ErrorKind) {
        self.inner
            .script
            .lock()
            .unwrap()
            .push_back(PresetOutcome::Failure(kind));
    }

    /// Makes every call resolve only after `duration` has elapsed.
    #[inline]
    pub fn set_delay(&self, duration: Duration) {
        *self.inner.delay.lock().unwrap() = Some(duration);
    }

    /// Returns the requests received so far.
    #[inline]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.inner.requests.lock().unwrap().clone()
    }
}

impl CompletionProvider for TestProvider {
    type Error = Error;

    fn complete(
        &self,
        req: &CompletionRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static
    {
        let inner = Arc::clone(&self.inner);
        let req = req.clone();
        async move {
            inner.requests.lock().unwrap().push(req);

            let delay = *inner.delay.lock().unwrap();
            if let Some(delay) = delay {
                sleep(delay).await;
            }

            let outcome = inner.script.lock().unwrap().pop_front();
            match outcome {
                Some(PresetOutcome::Reply(text)) => Ok(text),
                Some(PresetOutcome::Failure(kind)) => Err(Error {
                    message: "scripted failure",
                    kind,
                }),
                None => Err(Error {
                    message: "no enough steps",
                    kind: ErrorKind::RateLimitExceeded,
                }),
            }
        }
    }
}
