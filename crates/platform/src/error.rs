use std::error::Error;

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The requested entity (channel, member, message) does not exist.
    NotFound,
    /// The platform is rate limited.
    RateLimited,
    /// Any other errors.
    Other,
}

/// The error type for a chat platform client.
pub trait PlatformError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}
