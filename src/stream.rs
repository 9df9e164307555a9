// src/stream.rs

//! Stream-style combinators over channels.
//!
//! Everything here is plain composition over `send` and `recv`: each
//! combinator hands back its output (a new channel, or a future of an
//! accumulator) together with a driver future that moves the values. The
//! drivers are runtime-agnostic: spawn them on whatever executor hosts the
//! rest of the program.
//!
//! Termination is silent by design: a driver stops forwarding as soon as
//! its source reaches end of stream or its output channel is closed, and no
//! error is surfaced either way. When a driver stops because its source is
//! exhausted, it closes its output channel so downstream consumers observe
//! end of stream.
//!
//! ```
//! use weft::Channel;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let numbers = Channel::rendezvous();
//!
//! let (doubled, driver) = numbers.map(|n: i32| n * 2);
//! tokio::spawn(driver);
//!
//! tokio::spawn({
//!     let numbers = numbers.clone();
//!     async move {
//!         for n in 1..=3 {
//!             numbers.send(n).await.ok();
//!         }
//!         numbers.close().ok();
//!     }
//! });
//!
//! assert_eq!(doubled.recv().await, Some(2));
//! assert_eq!(doubled.recv().await, Some(4));
//! assert_eq!(doubled.recv().await, Some(6));
//! assert_eq!(doubled.recv().await, None);
//! # });
//! ```

use crate::channel::Channel;

use std::future::Future;

impl<T> Channel<T> {
  /// Builds a channel of transformed values.
  ///
  /// The driver repeatedly receives from `self`, applies `transform`, and
  /// sends the result into the returned channel. It stops silently once
  /// either channel closes.
  pub fn map<U, F>(&self, mut transform: F) -> (Channel<U>, impl Future<Output = ()>)
  where
    F: FnMut(T) -> U,
  {
    let source = self.clone();
    let output = Channel::rendezvous();
    let sink = output.clone();
    let driver = async move {
      loop {
        let value = match source.recv().await {
          Some(value) => value,
          None => break,
        };
        if sink.send(transform(value)).await.is_err() {
          return;
        }
      }
      sink.close().ok();
    };
    (output, driver)
  }

  /// Builds a channel carrying only the values that satisfy `predicate`.
  ///
  /// Discarded values are dropped without any effect on the output channel.
  /// The driver stops silently once either channel closes.
  pub fn filter<F>(&self, mut predicate: F) -> (Channel<T>, impl Future<Output = ()>)
  where
    F: FnMut(&T) -> bool,
  {
    let source = self.clone();
    let output = Channel::rendezvous();
    let sink = output.clone();
    let driver = async move {
      loop {
        let value = match source.recv().await {
          Some(value) => value,
          None => break,
        };
        if !predicate(&value) {
          continue;
        }
        if sink.send(value).await.is_err() {
          return;
        }
      }
      sink.close().ok();
    };
    (output, driver)
  }

  /// Folds every value received from `self` into an accumulator, resolving
  /// once end of stream is observed.
  pub fn reduce<A, F>(&self, initial: A, mut combine: F) -> impl Future<Output = A>
  where
    F: FnMut(A, T) -> A,
  {
    let source = self.clone();
    async move {
      let mut acc = initial;
      while let Some(value) = source.recv().await {
        acc = combine(acc, value);
      }
      acc
    }
  }
}

/// One element of a [`concat`] chain: a channel to drain, or a single value
/// to forward as-is.
#[derive(Debug)]
pub enum Source<T> {
  /// Forward every value of this channel until its end of stream.
  Channel(Channel<T>),
  /// Forward this one value.
  Item(T),
}

/// Forwards the values of every source, in list order, into one output
/// channel.
///
/// Each channel source is drained to its end-of-stream marker before the
/// next source starts. The driver stops silently if the output channel is
/// closed underneath it, and closes the output once every source is
/// exhausted.
pub fn concat<T>(sources: Vec<Source<T>>) -> (Channel<T>, impl Future<Output = ()>) {
  let output = Channel::rendezvous();
  let sink = output.clone();
  let driver = async move {
    for source in sources {
      match source {
        Source::Channel(channel) => {
          while let Some(value) = channel.recv().await {
            if sink.send(value).await.is_err() {
              return;
            }
          }
        }
        Source::Item(value) => {
          if sink.send(value).await.is_err() {
            return;
          }
        }
      }
    }
    sink.close().ok();
  };
  (output, driver)
}
