//! Core logic: conversation assembly, completion orchestration, thread
//! bootstrapping and event routing.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod bootstrap;
mod bot;
mod completion;
pub mod conversation;

pub use bootstrap::{ThreadRequest, bootstrap};
pub use bot::{Bot, BotConfig, MessageEvent};
pub use completion::{CompleteError, CompletionOptions, complete};
