use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::{Cancelled, Result};

/// Opaque ticket for one registered wait.
///
/// Tickets are drawn from a per-waiter monotonic counter and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaiterId(pub u64);

type Slot = oneshot::Sender<Result<()>>;

#[derive(Default)]
struct Registry {
	next_id: u64,
	entries: FxHashMap<WaiterId, Slot>,
}

impl Registry {
	fn insert(&mut self, slot: Slot) -> WaiterId {
		self.next_id = self.next_id.wrapping_add(1);
		let id = WaiterId(self.next_id);
		self.entries.insert(id, slot);
		id
	}
}

/// Registry of pending waits that are woken en masse.
///
/// Entries are removed from the registry before their slot is consumed, so an
/// entry can be resumed at most once. Dropping the waiter drops every slot, and
/// any still-pending [`Wait`] resolves to [`Cancelled`].
#[derive(Default)]
pub struct BroadcastWaiter {
	registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for BroadcastWaiter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BroadcastWaiter").field("pending", &self.len()).finish()
	}
}

impl BroadcastWaiter {
	/// Creates an empty waiter.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a fresh entry and returns the future that resolves when it is resumed.
	///
	/// Registration happens here, synchronously, not on first poll. Callers that
	/// decide to wait under their own lock can register before releasing it and
	/// cannot miss a broadcast issued in between.
	pub fn register(&self) -> Wait {
		let (tx, rx) = oneshot::channel();
		let mut registry = self.registry.lock();
		let id = registry.insert(tx);
		let pending = registry.entries.len();
		drop(registry);

		tracing::trace!(waiter = id.0, pending, "waiter.register");
		Wait {
			id,
			rx,
			registry: Arc::downgrade(&self.registry),
		}
	}

	/// Suspends until the next [`Self::resume_all`] or [`Self::cancel_all`].
	pub async fn wait(&self) -> Result<()> {
		self.register().await
	}

	/// Like [`Self::wait`], but fails with [`Cancelled`] once `cancel` fires.
	pub async fn wait_until(&self, cancel: &CancellationToken) -> Result<()> {
		self.register().until(cancel).await
	}

	/// Resumes every registered entry successfully. Returns how many were resumed.
	///
	/// Entries registered after the snapshot is taken stay pending.
	pub fn resume_all(&self) -> usize {
		let count = self.broadcast(Ok(()));
		tracing::trace!(count, "waiter.resume_all");
		count
	}

	/// Fails every registered entry with [`Cancelled`]. Returns how many were cancelled.
	pub fn cancel_all(&self) -> usize {
		let count = self.broadcast(Err(Cancelled));
		tracing::trace!(count, "waiter.cancel_all");
		count
	}

	/// Returns the number of pending entries.
	pub fn len(&self) -> usize {
		self.registry.lock().entries.len()
	}

	/// Returns `true` when no entry is pending.
	pub fn is_empty(&self) -> bool {
		self.registry.lock().entries.is_empty()
	}

	fn broadcast(&self, outcome: Result<()>) -> usize {
		let taken = std::mem::take(&mut self.registry.lock().entries);
		let count = taken.len();
		for (_, slot) in taken {
			// The receiving side may already be gone; its drop guard found nothing to remove.
			let _ = slot.send(outcome);
		}
		count
	}
}

/// One registered wait.
///
/// Resolves to `Ok(())` on [`BroadcastWaiter::resume_all`] and to [`Cancelled`]
/// on [`BroadcastWaiter::cancel_all`] or when the waiter is dropped. Dropping an
/// unresolved `Wait` removes its entry from the registry.
#[must_use = "a wait does nothing unless awaited"]
pub struct Wait {
	id: WaiterId,
	rx: oneshot::Receiver<Result<()>>,
	registry: Weak<Mutex<Registry>>,
}

impl std::fmt::Debug for Wait {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Wait").field("id", &self.id).finish_non_exhaustive()
	}
}

impl Wait {
	/// Returns this wait's ticket.
	pub const fn id(&self) -> WaiterId {
		self.id
	}

	/// Awaits this entry, failing with [`Cancelled`] once `cancel` fires.
	///
	/// A resume that is already delivered wins over a token that fires in the
	/// same poll.
	pub async fn until(self, cancel: &CancellationToken) -> Result<()> {
		let id = self.id;
		tokio::select! {
			biased;
			outcome = self => outcome,
			_ = cancel.cancelled() => {
				tracing::trace!(waiter = id.0, "waiter.caller_cancelled");
				Err(Cancelled)
			}
		}
	}
}

impl Future for Wait {
	type Output = Result<()>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match Pin::new(&mut self.rx).poll(cx) {
			Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
			// Slot dropped without a send: the waiter itself went away.
			Poll::Ready(Err(_)) => Poll::Ready(Err(Cancelled)),
			Poll::Pending => Poll::Pending,
		}
	}
}

impl Drop for Wait {
	fn drop(&mut self) {
		let Some(registry) = self.registry.upgrade() else {
			return;
		};
		if registry.lock().entries.remove(&self.id).is_some() {
			tracing::trace!(waiter = self.id.0, "waiter.abandon");
		}
	}
}
