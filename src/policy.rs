// src/policy.rs

//! Waiter selection policies.
//!
//! When several operations of the same kind are parked on a channel, the
//! pairing logic has to pick one. `Fifo` keeps arrival order and is fully
//! deterministic under test. `Random` draws uniformly, which removes any
//! starvation bias toward one registered channel when the same receiver
//! queue also carries multi-channel select registrations.

#[cfg(feature = "random")]
use rand::Rng;

/// How a channel picks among multiple eligible parked operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairPolicy {
  /// Oldest waiter first.
  #[default]
  Fifo,
  /// A uniformly random waiter.
  #[cfg(feature = "random")]
  Random,
}

impl PairPolicy {
  /// Index of the waiter to draw from a queue of `len` candidates.
  ///
  /// `len` must be non-zero.
  pub(crate) fn pick(&self, len: usize) -> usize {
    debug_assert!(len > 0, "drawing from an empty waiter queue");
    match self {
      PairPolicy::Fifo => 0,
      #[cfg(feature = "random")]
      PairPolicy::Random => rand::rng().random_range(0..len),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fifo_always_picks_front() {
    for len in 1..8 {
      assert_eq!(PairPolicy::Fifo.pick(len), 0);
    }
  }

  #[cfg(feature = "random")]
  #[test]
  fn random_stays_in_bounds() {
    for _ in 0..1000 {
      let idx = PairPolicy::Random.pick(5);
      assert!(idx < 5);
    }
  }
}
