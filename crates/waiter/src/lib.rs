//! Broadcast wakeup primitive.
//!
//! A [`BroadcastWaiter`] lets any number of tasks suspend until one shared event
//! fires. Every suspended task is woken together with [`BroadcastWaiter::resume_all`]
//! or failed together with [`BroadcastWaiter::cancel_all`]. Each pending wait can
//! also leave on its own, by being dropped or through
//! [`Wait::until`] with a [`CancellationToken`](tokio_util::sync::CancellationToken),
//! without disturbing the others.

mod waiter;


pub use waiter::{BroadcastWaiter, Wait, WaiterId};

/// A wait was interrupted before its event fired.
///
/// Raised when the waiter broadcasts a cancellation, when the waiter itself is
/// dropped, or when the caller's own cancellation token fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("wait cancelled")]
pub struct Cancelled;

/// Result type for wait operations.
pub type Result<T, E = Cancelled> = std::result::Result<T, E>;
