// src/channel/mod.rs

//! The rendezvous channel primitive.
//!
//! A [`Channel`] connects senders and receivers by direct pairing: each
//! operation either completes on the spot against a waiting partner (or a
//! free buffer slot) and returns an already-settled [`AsyncResult`], or it
//! parks and returns a future that settles when a partner arrives or the
//! channel closes. A capacity of zero makes the channel a pure rendezvous
//! point; a positive capacity adds a FIFO buffer that absorbs sends until
//! it is full.
//!
//! A `Channel` is a single cloneable handle; any holder may send, receive,
//! or close. The channel lives for as long as any handle does, and closing
//! is the only way to force-settle parked operations.
//!
//! ```
//! use weft::Channel;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let chan = Channel::rendezvous();
//!
//! let receive = chan.recv();          // parks: nothing to pair with yet
//! let send = chan.send(5);            // pairs with the parked receive
//!
//! // Both futures settled at the instant the send executed.
//! assert!(receive.is_fulfilled());
//! assert!(send.is_fulfilled());
//! assert_eq!(receive.await, Some(5));
//! # });
//! ```

mod core;

pub(crate) use self::core::ChannelShared;

use crate::async_result::{AsyncResult, Settler};
use crate::error::{CloseError, SendError, TryRecvError, TrySendError};
use crate::policy::PairPolicy;

use futures_core::Stream;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// A CSP-style channel: rendezvous pairing of sends and receives, with an
/// optional bounded buffer.
pub struct Channel<T> {
  shared: Arc<ChannelShared<T>>,
}

impl<T> Channel<T> {
  /// Creates a channel with a bounded buffer.
  ///
  /// A `capacity` of `0` creates a rendezvous channel: every send waits for
  /// a receive and vice versa.
  pub fn bounded(capacity: usize) -> Self {
    Self::with_policy(capacity, PairPolicy::default())
  }

  /// Creates a pure rendezvous channel (capacity 0).
  pub fn rendezvous() -> Self {
    Self::bounded(0)
  }

  /// Creates a channel with an explicit waiter selection policy.
  pub fn with_policy(capacity: usize, policy: PairPolicy) -> Self {
    Channel {
      shared: Arc::new(ChannelShared::new(capacity, policy)),
    }
  }

  /// Sends a value into the channel.
  ///
  /// The returned result is already fulfilled if the value was handed to a
  /// waiting receiver or buffered; otherwise the send parks and the result
  /// fulfills when a later receive drains it, or rejects with
  /// [`SendError::Closed`] if the channel closes first. Sending on a closed
  /// channel returns an already-rejected result.
  pub fn send(&self, value: T) -> AsyncResult<Result<(), SendError>> {
    self.shared.send_core(value)
  }

  /// Receives the next value from the channel.
  ///
  /// `None` is the end-of-stream marker: the channel closed and everything
  /// sent before the close has been drained. A receive never rejects.
  pub fn recv(&self) -> AsyncResult<Option<T>> {
    self.shared.recv_core()
  }

  /// Attempts to send without parking.
  pub fn try_send(&self, item: T) -> Result<(), TrySendError<T>> {
    self.shared.try_send_core(item)
  }

  /// Attempts to receive without parking.
  pub fn try_recv(&self) -> Result<T, TryRecvError> {
    self.shared.try_recv_core()
  }

  /// Closes the channel.
  ///
  /// The first effective close rejects every parked send with
  /// [`SendError::Closed`], settles every parked receive with the
  /// end-of-stream marker, and leaves buffered values in place for later
  /// receives to drain. Close is a one-way latch: repeat calls return
  /// `Err(CloseError)` and change nothing; futures settled by the first
  /// close keep their outcome.
  pub fn close(&self) -> Result<(), CloseError> {
    if self.shared.close_core() {
      Ok(())
    } else {
      Err(CloseError)
    }
  }

  /// Generator-protocol adapter: a step without a value receives, a step
  /// with a value sends. A thin wrapper over [`recv`](Channel::recv) and
  /// [`send`](Channel::send), not a third primitive.
  pub fn step(&self, value: Option<T>) -> Step<T> {
    match value {
      None => Step::Receive(self.recv()),
      Some(value) => Step::Send(self.send(value)),
    }
  }

  /// `true` once the channel has been closed.
  pub fn is_closed(&self) -> bool {
    self.shared.is_closed()
  }

  /// The buffer capacity this channel was created with. `0` means pure
  /// rendezvous.
  pub fn capacity(&self) -> usize {
    self.shared.capacity
  }

  /// Number of values currently buffered.
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  /// `true` when no values are buffered.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// A [`Stream`] view of this channel: yields values until end of stream.
  pub fn stream(&self) -> ChannelStream<T> {
    ChannelStream {
      channel: self.clone(),
      in_flight: None,
    }
  }

  pub(crate) fn register_select(&self, op: Settler<(Option<T>, usize)>, index: usize) {
    self.shared.register_select(op, index);
  }

  pub(crate) fn deregister_select(&self, op: &Settler<(Option<T>, usize)>) {
    self.shared.deregister_select(op);
  }
}

impl<T> Clone for Channel<T> {
  /// Clones the handle. Both handles refer to the same channel.
  fn clone(&self) -> Self {
    Channel {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<T> fmt::Debug for Channel<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Channel")
      .field("capacity", &self.shared.capacity)
      .field("closed", &self.is_closed())
      .finish_non_exhaustive()
  }
}

/// Outcome of the [`step`](Channel::step) adapter.
#[derive(Debug)]
pub enum Step<T> {
  /// The step carried no value and became a receive.
  Receive(AsyncResult<Option<T>>),
  /// The step carried a value and became a send.
  Send(AsyncResult<Result<(), SendError>>),
}

/// A [`Stream`] over a channel, created by [`Channel::stream`].
///
/// Keeps at most one receive in flight across polls, so a pending
/// `poll_next` does not pile up parked receivers.
#[derive(Debug)]
pub struct ChannelStream<T> {
  channel: Channel<T>,
  in_flight: Option<AsyncResult<Option<T>>>,
}

impl<T> Stream for ChannelStream<T> {
  type Item = T;

  fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
    let this = &mut *self;
    let in_flight = this.in_flight.get_or_insert_with(|| this.channel.recv());
    match Pin::new(in_flight).poll(cx) {
      Poll::Ready(item) => {
        this.in_flight = None;
        Poll::Ready(item)
      }
      Poll::Pending => Poll::Pending,
    }
  }
}
