//! An abstraction layer for the chat platform.
//!
//! This crate establishes an unified protocol for the bot to talk to a
//! group-chat platform: fetching thread history, sending messages,
//! resolving display names, responding to command invocations and
//! opening threads. The concrete platform (Discord) lives in its own
//! crate; the core logic only sees the traits and types defined here.
//!
//! The crate also owns the prompt-announcement text format, so that the
//! component that posts announcements and the component that parses
//! them back share a single encode/decode pair.

#![deny(missing_docs)]

mod announcement;
mod client;
mod error;
mod message;

pub use announcement::*;
pub use client::*;
pub use error::*;
pub use message::*;
