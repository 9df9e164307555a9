// src/async_result.rs

//! The single-settlement result primitive behind every channel operation.
//!
//! An [`AsyncResult`] settles exactly once, to either a value (fulfilled) or
//! an error (rejected), and its state can be inspected without polling. The
//! producing half is the crate-internal [`Settler`]: whichever operation
//! completes a pairing invokes it, and only the first settlement wins.
//!
//! Operations that complete synchronously hand out a result that is already
//! settled, so the caller can observe the outcome without ever touching an
//! executor.

use crate::async_util::AtomicWaker;

use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Externally observable state of an [`AsyncResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpState {
  /// Not settled yet.
  Pending,
  /// Settled with a value.
  Fulfilled,
  /// Settled with an error.
  Rejected,
}

enum Slot<T> {
  Pending,
  // The payload sits here until the owning future polls it out; the
  // disposition stays behind so state inspection outlives consumption.
  Ready(Option<T>, OpState),
}

struct OpCore<T> {
  slot: Mutex<Slot<T>>,
  waker: AtomicWaker,
}

impl<T> OpCore<T> {
  fn settle(&self, value: T, disposition: OpState) -> Result<(), T> {
    {
      let mut slot = self.slot.lock();
      match &*slot {
        Slot::Pending => *slot = Slot::Ready(Some(value), disposition),
        Slot::Ready(..) => return Err(value),
      }
    }
    // Wake after the slot lock is released.
    self.waker.wake();
    Ok(())
  }

  fn state(&self) -> OpState {
    match &*self.slot.lock() {
      Slot::Pending => OpState::Pending,
      Slot::Ready(_, disposition) => *disposition,
    }
  }

  fn take(&self) -> Option<T> {
    match &mut *self.slot.lock() {
      Slot::Ready(value, _) => value.take(),
      Slot::Pending => None,
    }
  }
}

/// A future for the outcome of a channel operation.
///
/// Settles exactly once; [`state`](AsyncResult::state) reports whether it is
/// still pending and, once settled, whether it was fulfilled or rejected.
/// `AsyncResult` implements [`Future`], so the full set of `futures`
/// combinators applies for continuation and error handling.
///
/// Polling again after the future has completed returns `Poll::Pending`; the
/// payload is gone but the settled state remains inspectable.
#[must_use = "futures do nothing unless you .await or poll them"]
pub struct AsyncResult<T> {
  core: Arc<OpCore<T>>,
}

impl<T> AsyncResult<T> {
  /// Creates an unsettled result together with the capability that settles it.
  pub(crate) fn pending() -> (Self, Settler<T>) {
    let core = Arc::new(OpCore {
      slot: Mutex::new(Slot::Pending),
      waker: AtomicWaker::new(),
    });
    (
      AsyncResult {
        core: Arc::clone(&core),
      },
      Settler { core },
    )
  }

  /// Creates a result that is already fulfilled with `value`.
  pub(crate) fn fulfilled(value: T) -> Self {
    AsyncResult {
      core: Arc::new(OpCore {
        slot: Mutex::new(Slot::Ready(Some(value), OpState::Fulfilled)),
        waker: AtomicWaker::new(),
      }),
    }
  }

  /// Creates a result that is already rejected with `value`.
  pub(crate) fn rejected(value: T) -> Self {
    AsyncResult {
      core: Arc::new(OpCore {
        slot: Mutex::new(Slot::Ready(Some(value), OpState::Rejected)),
        waker: AtomicWaker::new(),
      }),
    }
  }

  /// Current settlement state.
  pub fn state(&self) -> OpState {
    self.core.state()
  }

  /// `true` while the result has not settled.
  pub fn is_pending(&self) -> bool {
    self.state() == OpState::Pending
  }

  /// `true` once the result has settled with a value.
  pub fn is_fulfilled(&self) -> bool {
    self.state() == OpState::Fulfilled
  }

  /// `true` once the result has settled with an error.
  pub fn is_rejected(&self) -> bool {
    self.state() == OpState::Rejected
  }
}

impl<T> fmt::Debug for AsyncResult<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AsyncResult").field("state", &self.state()).finish()
  }
}

impl<T> Future for AsyncResult<T> {
  type Output = T;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
    // Fast path: already settled.
    if let Some(value) = self.core.take() {
      return Poll::Ready(value);
    }

    self.core.waker.register(cx.waker());

    // Re-check after registering: a settlement may have slipped in between
    // the first check and the registration.
    match self.core.take() {
      Some(value) => Poll::Ready(value),
      None => Poll::Pending,
    }
  }
}

/// The producing capability of an [`AsyncResult`].
///
/// Held by the channel queues while an operation is parked. `fulfill` and
/// `reject` each hand the payload back if some other holder settled the
/// result first, which is how a lost race stays lossless.
pub(crate) struct Settler<T> {
  core: Arc<OpCore<T>>,
}

impl<T> Settler<T> {
  pub(crate) fn fulfill(&self, value: T) -> Result<(), T> {
    self.core.settle(value, OpState::Fulfilled)
  }

  pub(crate) fn reject(&self, value: T) -> Result<(), T> {
    self.core.settle(value, OpState::Rejected)
  }

  /// `true` once the underlying result has settled, through any holder.
  pub(crate) fn is_settled(&self) -> bool {
    self.core.state() != OpState::Pending
  }

  /// Whether `self` and `other` settle the same result.
  pub(crate) fn ptr_eq(&self, other: &Settler<T>) -> bool {
    Arc::ptr_eq(&self.core, &other.core)
  }
}

impl<T> Clone for Settler<T> {
  fn clone(&self) -> Self {
    Settler {
      core: Arc::clone(&self.core),
    }
  }
}

impl<T> fmt::Debug for Settler<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Settler").field("state", &self.core.state()).finish()
  }
}
