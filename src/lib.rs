//! CSP-style rendezvous channels for Rust.
//!
//! Weft provides a single channel primitive connecting asynchronous
//! producers and consumers by direct pairing: a `send` and a `receive`
//! meet, one value changes hands, and both sides' futures settle at that
//! instant. Channels may also carry a bounded buffer, and a `select`
//! operation waits on the first ready value among several channels.
//!
//! Every operation returns an [`AsyncResult`], a single-settlement future
//! whose pending/fulfilled/rejected state can be inspected without polling.

pub mod error;

pub mod channel;
pub mod policy;
pub mod select;
pub mod stream;
pub mod telemetry;

// Internal utilities - not part of public API but exposed for crate use
mod async_result;
mod async_util;

// Public re-exports for convenience
pub use async_result::{AsyncResult, OpState};
pub use channel::{Channel, ChannelStream, Step};
pub use error::{CloseError, SendError, TryRecvError, TrySendError};
pub use policy::PairPolicy;
pub use select::{select, try_select, SelectFuture};
pub use stream::{concat, Source};
