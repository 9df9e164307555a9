// src/select.rs

//! Waiting on the first ready value among several channels.
//!
//! [`try_select`] is the non-blocking half: an ordered scan that receives
//! from the first channel holding a value. [`select`] falls back to
//! registering one shared operation in every channel's receiver queue;
//! whichever channel pairs with it first settles the future with the value
//! and that channel's position. The losing registrations are removed the
//! instant the future settles (or when it is dropped unsettled), and any
//! entry that slips through is discarded by the channels' own queue scans.

use crate::async_result::{AsyncResult, Settler};
use crate::channel::Channel;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Scans `channels` in order and receives from the first one with an
/// immediately available value (buffered, or held by a parked sender).
///
/// Returns the value paired with that channel's index, or `None` when no
/// channel is ready. Channels that are not chosen are left untouched.
pub fn try_select<T>(channels: &[Channel<T>]) -> Option<(T, usize)> {
  for (index, channel) in channels.iter().enumerate() {
    if let Ok(value) = channel.try_recv() {
      return Some((value, index));
    }
  }
  None
}

/// Waits for the first value to arrive on any of `channels`.
///
/// Resolves to `(Some(value), index)` for the channel that produced the
/// value, or `(None, index)` when channel `index` closed while the select
/// waited. If a channel is ready up front, the returned future is already
/// settled.
///
/// An empty `channels` slice never settles.
pub fn select<T>(channels: &[Channel<T>]) -> SelectFuture<T> {
  if let Some((value, index)) = try_select(channels) {
    return SelectFuture {
      result: AsyncResult::fulfilled((Some(value), index)),
      channels: Vec::new(),
      registration: None,
    };
  }

  let (result, op) = AsyncResult::pending();
  for (index, channel) in channels.iter().enumerate() {
    channel.register_select(op.clone(), index);
  }
  SelectFuture {
    result,
    channels: channels.to_vec(),
    registration: Some(op),
  }
}

/// Future returned by [`select`].
///
/// Besides carrying the shared result, this future owns the cancellation
/// handle for its registrations: settling or dropping it removes the
/// entries that did not win from their channels.
#[must_use = "futures do nothing unless you .await or poll them"]
pub struct SelectFuture<T> {
  result: AsyncResult<(Option<T>, usize)>,
  channels: Vec<Channel<T>>,
  registration: Option<Settler<(Option<T>, usize)>>,
}

impl<T> SelectFuture<T> {
  /// Whether the select has settled.
  pub fn is_settled(&self) -> bool {
    !self.result.is_pending()
  }

  fn deregister(&mut self) {
    if let Some(op) = self.registration.take() {
      for channel in &self.channels {
        channel.deregister_select(&op);
      }
    }
  }
}

impl<T> Future for SelectFuture<T> {
  type Output = (Option<T>, usize);

  fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = &mut *self;
    match Pin::new(&mut this.result).poll(cx) {
      Poll::Ready(outcome) => {
        this.deregister();
        Poll::Ready(outcome)
      }
      Poll::Pending => Poll::Pending,
    }
  }
}

impl<T> Drop for SelectFuture<T> {
  fn drop(&mut self) {
    self.deregister();
  }
}

impl<T> fmt::Debug for SelectFuture<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SelectFuture")
      .field("result", &self.result)
      .field("registered", &self.registration.is_some())
      .finish()
  }
}
