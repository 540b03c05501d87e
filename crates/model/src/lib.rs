//! An abstraction layer for chat-completion backends.
//!
//! This crate establishes an unified protocol for the bot to request
//! completions from various supported LLM endpoints, so that the rest
//! of the codebase never depends on a concrete backend.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;

pub use error::*;
pub use provider::*;
pub use request::*;
