// SPDX-License-Identifier: GPL-3.0-only

//! Asynchronous work returned by `update` and the loop that drives it
//!
//! A [`Task`] is a bundle of futures/streams that each produce messages.
//! The [`Runtime`] polls them on the current thread and feeds every message
//! back into the widget, which may in turn return more tasks.

use super::state::{CameraWidget, Message};
use futures::stream::{BoxStream, SelectAll};
use futures::{FutureExt, Stream, StreamExt};
use std::future::Future;
use std::time::Duration;

/// Work that eventually produces messages
#[must_use]
pub struct Task {
    streams: Vec<BoxStream<'static, Message>>,
}

impl Task {
    /// No work
    pub fn none() -> Self {
        Self {
            streams: Vec::new(),
        }
    }

    /// Resolve `future` and map its output to a message
    pub fn perform<F, T>(future: F, map: impl FnOnce(T) -> Message + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        T: 'static,
    {
        let stream = futures::stream::once(future.map(map)).boxed();
        Self {
            streams: vec![stream],
        }
    }

    /// Forward every item of `stream` as a message
    pub fn run<S>(stream: S, map: impl FnMut(S::Item) -> Message + Send + 'static) -> Self
    where
        S: Stream + Send + 'static,
    {
        Self {
            streams: vec![stream.map(map).boxed()],
        }
    }

    /// Combine several tasks
    pub fn batch(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            streams: tasks.into_iter().flat_map(|t| t.streams).collect(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.streams.is_empty()
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("streams", &self.streams.len())
            .finish()
    }
}

/// Single-threaded message loop
pub struct Runtime {
    pending: SelectAll<BoxStream<'static, Message>>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            pending: SelectAll::new(),
        }
    }

    pub fn spawn(&mut self, task: Task) {
        for stream in task.streams {
            self.pending.push(stream);
        }
    }

    /// No task left to poll
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of tasks still producing messages
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Dispatch one message and queue the work it returns
    pub fn dispatch(&mut self, widget: &mut CameraWidget, message: Message) {
        let task = widget.update(message);
        self.spawn(task);
    }

    /// Handle every message that is ready right now, without waiting
    ///
    /// Returns the number of messages handled.
    pub fn run_until_stalled(&mut self, widget: &mut CameraWidget) -> usize {
        let mut handled = 0;
        while let Some(Some(message)) = self.pending.next().now_or_never() {
            self.dispatch(widget, message);
            handled += 1;
        }
        handled
    }

    /// Handle messages until every task has finished
    pub async fn run(&mut self, widget: &mut CameraWidget) {
        while let Some(message) = self.pending.next().await {
            self.dispatch(widget, message);
        }
    }

    /// Handle messages until `done` holds or `limit` elapses
    ///
    /// Returns whether `done` was reached.
    pub async fn run_until(
        &mut self,
        widget: &mut CameraWidget,
        limit: Duration,
        done: impl Fn(&CameraWidget) -> bool,
    ) -> bool {
        let deadline = tokio::time::Instant::now() + limit;
        loop {
            if done(widget) {
                return true;
            }
            match tokio::time::timeout_at(deadline, self.pending.next()).await {
                Ok(Some(message)) => self.dispatch(widget, message),
                Ok(None) => return done(widget),
                Err(_) => return false,
            }
        }
    }

    /// Handle messages for `duration`, idling when nothing is pending
    pub async fn run_for(&mut self, widget: &mut CameraWidget, duration: Duration) {
        let deadline = tokio::time::Instant::now() + duration;
        loop {
            match tokio::time::timeout_at(deadline, self.pending.next()).await {
                Ok(Some(message)) => self.dispatch(widget, message),
                Ok(None) => {
                    tokio::time::sleep_until(deadline).await;
                    return;
                }
                Err(_) => return,
            }
        }
    }
}
