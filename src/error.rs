// src/error.rs

use core::fmt;

/// Error returned by `try_send` when the operation could not be completed
/// immediately. The item being sent is handed back.
#[derive(PartialEq, Eq, Clone)]
pub enum TrySendError<T> {
  /// The buffer is full and no receiver is waiting to pair with.
  /// The item being sent is returned.
  Full(T),
  /// The channel has been closed.
  /// The item being sent is returned.
  Closed(T),
}

impl<T> TrySendError<T> {
  /// Consumes the error, returning the item that failed to send.
  #[inline]
  pub fn into_inner(self) -> T {
    match self {
      TrySendError::Full(v) => v,
      TrySendError::Closed(v) => v,
    }
  }
}

impl<T> fmt::Debug for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Full(_) => write!(f, "TrySendError::Full(..)"),
      TrySendError::Closed(_) => write!(f, "TrySendError::Closed(..)"),
    }
  }
}

impl<T> fmt::Display for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Full(_) => f.write_str("channel full"),
      TrySendError::Closed(_) => f.write_str("send on closed channel"),
    }
  }
}

impl<T: fmt::Debug> std::error::Error for TrySendError<T> {}

/// Error a `send` future rejects with.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SendError {
  /// The channel was closed, either before the send or while the parked
  /// send was waiting for a partner.
  Closed,
}

impl std::error::Error for SendError {}
impl fmt::Display for SendError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SendError::Closed => write!(f, "send on closed channel"),
    }
  }
}

/// Error returned by `try_recv` when no value could be taken immediately.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TryRecvError {
  /// No value is buffered and no sender is parked; the channel is still open.
  Empty,
  /// The channel is closed and fully drained.
  Closed,
}

impl std::error::Error for TryRecvError {}
impl fmt::Display for TryRecvError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TryRecvError::Empty => write!(f, "channel empty"),
      TryRecvError::Closed => write!(f, "channel closed and drained"),
    }
  }
}

/// Error returned when attempting to close an already closed channel.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CloseError;
impl std::error::Error for CloseError {}
impl fmt::Display for CloseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "channel is already closed")
  }
}
