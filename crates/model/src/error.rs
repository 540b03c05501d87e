/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The provider is rate limited.
    RateLimitExceeded,
    /// The provider returned a response that could not be decoded.
    Decode,
    /// Any other errors.
    Other,
}
