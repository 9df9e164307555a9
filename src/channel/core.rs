// src/channel/core.rs

//! The shared state and pairing logic behind every channel operation.
//!
//! ### Design Principles:
//!
//! 1.  **Central Mutex**: a `parking_lot::Mutex` guards the buffer and both
//!     waiter queues, so `send`, `receive`, `close`, and the select paths
//!     each execute as one atomic step with respect to the others. By the
//!     time an operation returns its future, the channel's state transition
//!     has already happened.
//! 2.  **Pairing Priority**: a send hands its value to a parked receiver
//!     first, buffers second, and parks last; a receive drains the buffer
//!     first (moving a parked sender's item into the freed slot), takes a
//!     rendezvous hand-off second, and parks last. The two queues are
//!     therefore never both non-empty.
//! 3.  **Stale registrations**: a multi-channel select leaves one entry in
//!     every channel it registered with, and only one of them wins. Settled
//!     entries are skipped and discarded wherever a queue is scanned, and
//!     the select future deregisters its losers the moment it settles.

use crate::async_result::{AsyncResult, Settler};
use crate::error::{SendError, TryRecvError, TrySendError};
use crate::policy::PairPolicy;
use crate::telemetry;

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::mem;

const LOC_CORE: &str = "channel::core";
const EVT_CLOSE_LATCHED: &str = "Close:Latched";
const CTR_SENDS_PARKED: &str = "SendsParked";
const CTR_RECVS_PARKED: &str = "RecvsParked";
const CTR_STALE_PRUNED: &str = "StaleSelectEntriesPruned";

// --- Waiter Structs ---

/// A parked sender: the offered item plus the capability that settles its
/// send future. The item slot is emptied exactly once, on hand-off.
pub(crate) struct SendWaiter<T> {
  pub(crate) item: Option<T>,
  pub(crate) op: Settler<Result<(), SendError>>,
}

impl<T> SendWaiter<T> {
  /// Takes the offered item. A waiter still in a queue always carries one;
  /// every hand-off removes the waiter along with it.
  fn take_item(&mut self) -> T {
    match self.item.take() {
      Some(item) => item,
      None => unreachable!("parked sender drained twice"),
    }
  }
}

impl<T> fmt::Debug for SendWaiter<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SendWaiter")
      .field("has_item", &self.item.is_some())
      .field("op", &self.op)
      .finish()
  }
}

/// A parked receiver: either a plain receive, or one registration of a
/// multi-channel select tagged with the registering channel's index.
pub(crate) enum RecvWaiter<T> {
  Recv(Settler<Option<T>>),
  Select {
    op: Settler<(Option<T>, usize)>,
    index: usize,
  },
}

impl<T> RecvWaiter<T> {
  /// Whether the underlying future already settled, as happens to a select
  /// registration that won through another channel. Such entries are dead
  /// weight.
  fn is_settled(&self) -> bool {
    match self {
      RecvWaiter::Recv(op) => op.is_settled(),
      RecvWaiter::Select { op, .. } => op.is_settled(),
    }
  }

  /// Hands `value` to the waiter. On a lost settle race the value comes
  /// back so the next candidate can take it.
  fn offer(self, value: T) -> Result<(), T> {
    match self {
      RecvWaiter::Recv(op) => match op.fulfill(Some(value)) {
        Ok(()) => Ok(()),
        Err(Some(value)) => Err(value),
        Err(None) => unreachable!("offer always carries a value"),
      },
      RecvWaiter::Select { op, index } => match op.fulfill((Some(value), index)) {
        Ok(()) => Ok(()),
        Err((Some(value), _)) => Err(value),
        Err((None, _)) => unreachable!("offer always carries a value"),
      },
    }
  }

  /// Settles the waiter with the end-of-stream marker. Entries that already
  /// settled through another channel are ignored.
  fn close_notify(self) {
    match self {
      RecvWaiter::Recv(op) => {
        op.fulfill(None).ok();
      }
      RecvWaiter::Select { op, index } => {
        op.fulfill((None, index)).ok();
      }
    }
  }
}

impl<T> fmt::Debug for RecvWaiter<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RecvWaiter::Recv(op) => f.debug_tuple("RecvWaiter::Recv").field(op).finish(),
      RecvWaiter::Select { index, .. } => {
        f.debug_struct("RecvWaiter::Select").field("index", index).finish()
      }
    }
  }
}

// --- Channel State ---

#[derive(Debug)]
pub(crate) struct ChannelState<T> {
  /// One-way latch; flipped exactly once by the first effective close.
  pub(crate) done: bool,
  /// Values sent but not yet received. FIFO; `len() <= capacity` always.
  pub(crate) buffer: VecDeque<T>,
  /// Senders parked because the buffer is full and no receiver is waiting.
  pub(crate) pending_senders: VecDeque<SendWaiter<T>>,
  /// Receivers parked because nothing is buffered and no sender is waiting.
  pub(crate) pending_receivers: VecDeque<RecvWaiter<T>>,
}

impl<T> ChannelState<T> {
  /// Draws one live receiver waiter, discarding settled select entries on
  /// the way.
  fn draw_receiver(&mut self, policy: PairPolicy) -> Option<RecvWaiter<T>> {
    while !self.pending_receivers.is_empty() {
      let idx = policy.pick(self.pending_receivers.len());
      let waiter = self.pending_receivers.remove(idx)?;
      if waiter.is_settled() {
        telemetry::increment_counter(LOC_CORE, CTR_STALE_PRUNED);
        continue;
      }
      return Some(waiter);
    }
    None
  }

  fn draw_sender(&mut self, policy: PairPolicy) -> Option<SendWaiter<T>> {
    if self.pending_senders.is_empty() {
      return None;
    }
    let idx = policy.pick(self.pending_senders.len());
    self.pending_senders.remove(idx)
  }

  /// Hands `value` to a parked receiver or buffers it. `Err(value)` when
  /// the buffer is full and nobody is waiting.
  fn place(&mut self, capacity: usize, policy: PairPolicy, mut value: T) -> Result<(), T> {
    while let Some(waiter) = self.draw_receiver(policy) {
      match waiter.offer(value) {
        Ok(()) => return Ok(()),
        // The waiter settled through another channel while it sat in our
        // queue; the value comes back and the next candidate gets it.
        Err(back) => value = back,
      }
    }
    if self.buffer.len() < capacity {
      self.buffer.push_back(value);
      return Ok(());
    }
    Err(value)
  }

  /// Takes the next available value without parking: the oldest buffered
  /// item (then moves one parked sender's item into the freed slot), or a
  /// direct hand-off from a parked sender when nothing is buffered.
  fn pop_value(&mut self, policy: PairPolicy) -> Option<T> {
    if let Some(value) = self.buffer.pop_front() {
      self.refill_from_parked(policy);
      return Some(value);
    }
    let mut waiter = self.draw_sender(policy)?;
    let value = waiter.take_item();
    waiter.op.fulfill(Ok(())).ok();
    Some(value)
  }

  /// Moves one parked sender's item into the buffer and completes that
  /// sender's future. Called right after a buffered value was taken out.
  fn refill_from_parked(&mut self, policy: PairPolicy) {
    if let Some(mut waiter) = self.draw_sender(policy) {
      let item = waiter.take_item();
      self.buffer.push_back(item);
      waiter.op.fulfill(Ok(())).ok();
    }
  }
}

// --- Shared Core ---

/// The shared owner of a channel's state, wrapped in an `Arc` by the public
/// handle.
#[derive(Debug)]
pub(crate) struct ChannelShared<T> {
  pub(crate) state: Mutex<ChannelState<T>>,
  pub(crate) capacity: usize,
  pub(crate) policy: PairPolicy,
}

impl<T> ChannelShared<T> {
  pub(crate) fn new(capacity: usize, policy: PairPolicy) -> Self {
    ChannelShared {
      state: Mutex::new(ChannelState {
        done: false,
        buffer: VecDeque::with_capacity(capacity.min(32)),
        pending_senders: VecDeque::new(),
        pending_receivers: VecDeque::new(),
      }),
      capacity,
      policy,
    }
  }

  pub(crate) fn send_core(&self, value: T) -> AsyncResult<Result<(), SendError>> {
    let mut state = self.state.lock();

    if state.done {
      return AsyncResult::rejected(Err(SendError::Closed));
    }

    match state.place(self.capacity, self.policy, value) {
      Ok(()) => AsyncResult::fulfilled(Ok(())),
      Err(value) => {
        let (result, op) = AsyncResult::pending();
        state.pending_senders.push_back(SendWaiter {
          item: Some(value),
          op,
        });
        telemetry::increment_counter(LOC_CORE, CTR_SENDS_PARKED);
        result
      }
    }
  }

  pub(crate) fn try_send_core(&self, item: T) -> Result<(), TrySendError<T>> {
    let mut state = self.state.lock();

    if state.done {
      return Err(TrySendError::Closed(item));
    }

    state
      .place(self.capacity, self.policy, item)
      .map_err(TrySendError::Full)
  }

  pub(crate) fn recv_core(&self) -> AsyncResult<Option<T>> {
    let mut state = self.state.lock();

    if let Some(value) = state.pop_value(self.policy) {
      return AsyncResult::fulfilled(Some(value));
    }
    if state.done {
      // Closed and fully drained: end of stream.
      return AsyncResult::fulfilled(None);
    }

    let (result, op) = AsyncResult::pending();
    state.pending_receivers.push_back(RecvWaiter::Recv(op));
    telemetry::increment_counter(LOC_CORE, CTR_RECVS_PARKED);
    result
  }

  pub(crate) fn try_recv_core(&self) -> Result<T, TryRecvError> {
    let mut state = self.state.lock();

    match state.pop_value(self.policy) {
      Some(value) => Ok(value),
      None if state.done => Err(TryRecvError::Closed),
      None => Err(TryRecvError::Empty),
    }
  }

  /// Latches `done`. Returns `false` when the channel was already closed,
  /// in which case nothing is touched.
  pub(crate) fn close_core(&self) -> bool {
    let senders;
    let receivers;
    {
      let mut state = self.state.lock();
      if state.done {
        return false;
      }
      state.done = true;
      senders = mem::take(&mut state.pending_senders);
      receivers = mem::take(&mut state.pending_receivers);
      // The buffer stays: values sent before the close remain receivable.
    }

    telemetry::log_event(None, LOC_CORE, EVT_CLOSE_LATCHED, None);

    // Settle the evicted waiters outside the lock.
    for waiter in senders {
      waiter.op.reject(Err(SendError::Closed)).ok();
    }
    for waiter in receivers {
      waiter.close_notify();
    }
    true
  }

  /// Enters one registration of a multi-channel select.
  ///
  /// If a value became available between the caller's ready-scan and this
  /// call, it is handed to the select on the spot; side effects are only
  /// committed if this registration wins the settle race against a sibling
  /// on another channel. A closed, drained channel ends the select
  /// immediately, the same way a bare receive observes end of stream.
  pub(crate) fn register_select(&self, op: Settler<(Option<T>, usize)>, index: usize) {
    let mut state = self.state.lock();

    if let Some(value) = state.buffer.pop_front() {
      match op.fulfill((Some(value), index)) {
        Ok(()) => state.refill_from_parked(self.policy),
        Err((back, _)) => {
          if let Some(value) = back {
            // A sibling registration settled first; the value goes back
            // where it came from.
            state.buffer.push_front(value);
          }
        }
      }
      return;
    }

    if let Some(mut waiter) = state.draw_sender(self.policy) {
      let item = waiter.take_item();
      match op.fulfill((Some(item), index)) {
        Ok(()) => {
          waiter.op.fulfill(Ok(())).ok();
        }
        Err((back, _)) => {
          if let Some(item) = back {
            waiter.item = Some(item);
            state.pending_senders.push_front(waiter);
          }
        }
      }
      return;
    }

    if state.done {
      drop(state);
      op.fulfill((None, index)).ok();
      return;
    }

    state.pending_receivers.push_back(RecvWaiter::Select { op, index });
  }

  /// Removes a select registration that lost. Settled entries left behind
  /// are also caught lazily by `draw_receiver`, but eager removal keeps the
  /// queue from growing under bursty selects.
  pub(crate) fn deregister_select(&self, op: &Settler<(Option<T>, usize)>) {
    let mut state = self.state.lock();
    state.pending_receivers.retain(|waiter| match waiter {
      RecvWaiter::Select { op: registered, .. } => !registered.ptr_eq(op),
      RecvWaiter::Recv(_) => true,
    });
  }

  pub(crate) fn is_closed(&self) -> bool {
    self.state.lock().done
  }

  pub(crate) fn len(&self) -> usize {
    self.state.lock().buffer.len()
  }
}
