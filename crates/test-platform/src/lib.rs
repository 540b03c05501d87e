//! A local fake chat platform for testing purpose.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gabble_platform::{
    ChannelInfo, ChatPlatform, ErrorKind, Invocation, MessageHandle,
    PlatformError, RawMessage, ThreadHandle,
};

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Error {
    fn not_found(message: &'static str) -> Self {
        Self {
            message,
            kind: ErrorKind::NotFound,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl PlatformError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Inner {
    channels: Mutex<HashMap<String, ChannelInfo>>,
    members: Mutex<HashMap<(String, String), String>>,
    histories: Mutex<HashMap<String, Vec<RawMessage>>>,
    sent: Mutex<Vec<(String, String)>>,
    announcements: Mutex<Vec<(Invocation, String)>>,
    threads: Mutex<Vec<CreatedThread>>,
    activity_count: AtomicUsize,
    fail_activity: AtomicBool,
    next_id: AtomicUsize,
}

/// A record of a thread created through the fake platform.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CreatedThread {
    /// The thread's channel identifier.
    pub id: String,
    /// The channel the thread was created in.
    pub channel_id: String,
    /// The message the thread is anchored to.
    pub anchor_id: String,
    /// The thread name.
    pub name: String,
}

/// A local fake chat platform.
///
/// Channels, guild members and thread histories are preloaded through
/// the setup methods; every mutating call (sent message, announcement,
/// created thread, activity signal) is recorded and can be inspected
/// afterwards.
#[derive(Clone, Default)]
pub struct TestPlatform {
    inner: Arc<Inner>,
}

impl TestPlatform {
    /// Registers a channel.
    #[inline]
    pub fn add_channel(&self, id: impl Into<String>, info: ChannelInfo) {
        self.inner.channels.lock().unwrap().insert(id.into(), info);
    }

    /// Registers a guild member with the given display name.
    #[inline]
    pub fn add_member(
        &self,
        guild_id: impl Into<String>,
        user_id: impl Into<String>,
        display_name: impl Into<String>,
    ) {
        self.inner
            .members
            .lock()
            .unwrap()
            .insert((guild_id.into(), user_id.into()), display_name.into());
    }

    /// Preloads the message history of a thread.
    #[inline]
    pub fn set_history(
        &self,
        thread_id: impl Into<String>,
        messages: Vec<RawMessage>,
    ) {
        self.inner
            .histories
            .lock()
            .unwrap()
            .insert(thread_id.into(), messages);
    }

    /// Makes every activity announcement fail from now on.
    #[inline]
    pub fn fail_activity(&self) {
        self.inner.fail_activity.store(true, Ordering::Relaxed);
    }

    /// Returns how many activity announcements have been attempted.
    #[inline]
    pub fn activity_count(&self) -> usize {
        self.inner.activity_count.load(Ordering::Relaxed)
    }

    /// Returns the `(channel_id, text)` pairs sent so far.
    #[inline]
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.inner.sent.lock().unwrap().clone()
    }

    /// Returns the announcements posted so far.
    #[inline]
    pub fn announcements(&self) -> Vec<(Invocation, String)> {
        self.inner.announcements.lock().unwrap().clone()
    }

    /// Returns the threads created so far.
    #[inline]
    pub fn created_threads(&self) -> Vec<CreatedThread> {
        self.inner.threads.lock().unwrap().clone()
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let n = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}{n}")
    }
}

impl ChatPlatform for TestPlatform {
    type Error = Error;

    async fn channel(
        &self,
        channel_id: &str,
    ) -> Result<ChannelInfo, Self::Error> {
        self.inner
            .channels
            .lock()
            .unwrap()
            .get(channel_id)
            .cloned()
            .ok_or_else(|| Error::not_found("unknown channel"))
    }

    async fn thread_messages(
        &self,
        thread_id: &str,
        limit: u8,
    ) -> Result<Vec<RawMessage>, Self::Error> {
        let mut messages = self
            .inner
            .histories
            .lock()
            .unwrap()
            .get(thread_id)
            .cloned()
            .ok_or_else(|| Error::not_found("unknown thread"))?;
        messages.truncate(limit as usize);
        Ok(messages)
    }

    async fn send_message(
        &self,
        channel_id: &str,
        text: &str,
    ) -> Result<(), Self::Error> {
        self.inner
            .sent
            .lock()
            .unwrap()
            .push((channel_id.to_owned(), text.to_owned()));
        Ok(())
    }

    async fn announce_activity(
        &self,
        _channel_id: &str,
    ) -> Result<(), Self::Error> {
        self.inner.activity_count.fetch_add(1, Ordering::Relaxed);
        if self.inner.fail_activity.load(Ordering::Relaxed) {
            return Err(Error {
                message: "activity rejected",
                kind: ErrorKind::RateLimited,
            });
        }
        Ok(())
    }

    async fn display_name(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> Result<String, Self::Error> {
        self.inner
            .members
            .lock()
            .unwrap()
            .get(&(guild_id.to_owned(), user_id.to_owned()))
            .cloned()
            .ok_or_else(|| Error::not_found("unknown member"))
    }

    async fn post_announcement(
        &self,
        invocation: &Invocation,
        text: &str,
    ) -> Result<MessageHandle, Self::Error> {
        self.inner
            .announcements
            .lock()
            .unwrap()
            .push((invocation.clone(), text.to_owned()));
        Ok(MessageHandle {
            id: self.fresh_id("m"),
        })
    }

    async fn create_thread(
        &self,
        channel_id: &str,
        anchor: &MessageHandle,
        name: &str,
    ) -> Result<ThreadHandle, Self::Error> {
        let id = self.fresh_id("t");
        self.inner.threads.lock().unwrap().push(CreatedThread {
            id: id.clone(),
            channel_id: channel_id.to_owned(),
            anchor_id: anchor.id.clone(),
            name: name.to_owned(),
        });
        Ok(ThreadHandle { id })
    }
}
