use curtain_waiter::{BroadcastWaiter, Result, Wait};
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::config::ProxyConfig;
use crate::phase::{Phase, Transition, TransitionCause};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
	Present,
	Dismiss,
}

impl Intent {
	const fn as_str(self) -> &'static str {
		match self {
			Self::Present => "present",
			Self::Dismiss => "dismiss",
		}
	}
}

/// Decision taken by one pass over the current phase.
enum Step {
	/// The intent is already satisfied.
	Done,
	/// This caller started the transition and finishes when it lands.
	Started(Wait),
	/// Another caller's transition is in flight; re-evaluate once it lands.
	Joined(Wait),
}

/// Present/dismiss coordinator for one modal surface.
///
/// Phase and waiter registry are only touched inside short critical sections;
/// no lock is held across a suspension. The lock order is phase, then
/// registry. Share the proxy between tasks through an `Arc`.
pub struct PresentationProxy {
	label: String,
	phase: Mutex<Phase>,
	waiter: BroadcastWaiter,
	phase_tx: watch::Sender<Phase>,
	transition_tx: broadcast::Sender<Transition>,
}

impl std::fmt::Debug for PresentationProxy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PresentationProxy")
			.field("label", &self.label)
			.field("phase", &self.phase())
			.field("pending_waiters", &self.pending_waiters())
			.finish()
	}
}

impl Default for PresentationProxy {
	fn default() -> Self {
		Self::new()
	}
}

impl PresentationProxy {
	/// Creates an idle proxy with default options.
	pub fn new() -> Self {
		Self::with_config(ProxyConfig::default())
	}

	/// Creates an idle proxy.
	pub fn with_config(config: ProxyConfig) -> Self {
		let (phase_tx, _) = watch::channel(Phase::Idle);
		let (transition_tx, _) = broadcast::channel(config.transition_capacity());
		Self {
			label: config.label,
			phase: Mutex::new(Phase::Idle),
			waiter: BroadcastWaiter::new(),
			phase_tx,
			transition_tx,
		}
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	/// Returns the current phase.
	pub fn phase(&self) -> Phase {
		*self.phase.lock()
	}

	/// Returns `true` while the phase is [`Phase::Presenting`] or [`Phase::Presented`].
	pub fn is_presented(&self) -> bool {
		self.phase().is_presented()
	}

	/// Watches the phase. The receiver always holds the latest value.
	pub fn subscribe(&self) -> watch::Receiver<Phase> {
		self.phase_tx.subscribe()
	}

	/// Subscribes to every phase change from now on.
	pub fn transitions(&self) -> broadcast::Receiver<Transition> {
		self.transition_tx.subscribe()
	}

	/// Number of callers currently suspended on an in-flight transition.
	pub fn pending_waiters(&self) -> usize {
		self.waiter.len()
	}

	/// Shows the modal and waits until it is visible.
	///
	/// Returns immediately when already presented. Joins a presentation that is
	/// in flight, and waits out a dismissal before starting a new presentation.
	///
	/// Fails with [`Cancelled`](crate::Cancelled) when a competing
	/// [`Self::dismiss`] abandons the presentation before it becomes visible, or
	/// when the proxy is torn down. Dropping the returned future withdraws this
	/// caller only.
	pub async fn present(&self) -> Result<()> {
		self.drive(Intent::Present, None).await
	}

	/// [`Self::present`], additionally failing with `Cancelled` once `cancel` fires.
	pub async fn present_until(&self, cancel: &CancellationToken) -> Result<()> {
		self.drive(Intent::Present, Some(cancel)).await
	}

	/// Hides the modal and waits until it is fully hidden.
	///
	/// Returns immediately when already idle. Joins a dismissal that is in
	/// flight. While a presentation is still pending, the presentation is
	/// abandoned instead: every waiter on it fails with `Cancelled`, the phase
	/// drops straight to [`Phase::Idle`], and this call returns without waiting.
	pub async fn dismiss(&self) -> Result<()> {
		self.drive(Intent::Dismiss, None).await
	}

	/// [`Self::dismiss`], additionally failing with `Cancelled` once `cancel` fires.
	pub async fn dismiss_until(&self, cancel: &CancellationToken) -> Result<()> {
		self.drive(Intent::Dismiss, Some(cancel)).await
	}

	/// Container hook: the content has become visible.
	///
	/// No-op unless the phase is [`Phase::Presenting`].
	pub fn on_will_present(&self) {
		let mut phase = self.phase.lock();
		if *phase != Phase::Presenting {
			tracing::trace!(proxy = %self.label, phase = phase.as_str(), "presentation.will_present.ignored");
			return;
		}
		self.transition(&mut phase, Phase::Presented, TransitionCause::WillPresent);
		let resumed = self.waiter.resume_all();
		tracing::trace!(proxy = %self.label, resumed, "presentation.will_present");
	}

	/// Container hook: the content has become fully hidden.
	///
	/// No-op unless the phase is [`Phase::Dismissing`].
	pub fn on_did_dismiss(&self) {
		let mut phase = self.phase.lock();
		if *phase != Phase::Dismissing {
			tracing::trace!(proxy = %self.label, phase = phase.as_str(), "presentation.did_dismiss.ignored");
			return;
		}
		self.transition(&mut phase, Phase::Idle, TransitionCause::DidDismiss);
		let resumed = self.waiter.resume_all();
		tracing::trace!(proxy = %self.label, resumed, "presentation.did_dismiss");
	}

	/// Teardown: forces [`Phase::Idle`] and fails every suspended caller.
	pub fn cancel_all(&self) {
		let mut phase = self.phase.lock();
		self.transition(&mut phase, Phase::Idle, TransitionCause::Teardown);
		let cancelled = self.waiter.cancel_all();
		if cancelled > 0 {
			tracing::debug!(proxy = %self.label, cancelled, "presentation.teardown");
		}
	}

	async fn drive(&self, intent: Intent, cancel: Option<&CancellationToken>) -> Result<()> {
		let mut joined = false;
		loop {
			let (wait, started) = match self.step(intent, joined) {
				Step::Done => return Ok(()),
				Step::Started(wait) => (wait, true),
				Step::Joined(wait) => (wait, false),
			};

			match cancel {
				Some(token) => wait.until(token).await?,
				None => wait.await?,
			}

			if started {
				return Ok(());
			}
			joined = true;
		}
	}

	/// Reads the phase and acts on it under one lock, registering before release.
	fn step(&self, intent: Intent, joined: bool) -> Step {
		let mut phase = self.phase.lock();
		match (intent, *phase) {
			(Intent::Present, Phase::Presented) | (Intent::Dismiss, Phase::Idle) => Step::Done,
			(Intent::Present, Phase::Idle) => {
				self.transition(&mut phase, Phase::Presenting, TransitionCause::Present);
				tracing::trace!(proxy = %self.label, joined, "presentation.present.start");
				Step::Started(self.waiter.register())
			}
			(Intent::Dismiss, Phase::Presented) => {
				self.transition(&mut phase, Phase::Dismissing, TransitionCause::Dismiss);
				tracing::trace!(proxy = %self.label, joined, "presentation.dismiss.start");
				Step::Started(self.waiter.register())
			}
			(Intent::Dismiss, Phase::Presenting) => {
				let cancelled = self.waiter.cancel_all();
				self.transition(&mut phase, Phase::Idle, TransitionCause::Reset);
				tracing::debug!(proxy = %self.label, cancelled, "presentation.reset");
				Step::Done
			}
			(_, Phase::Presenting | Phase::Dismissing) => {
				tracing::trace!(proxy = %self.label, intent = intent.as_str(), phase = phase.as_str(), "presentation.join");
				Step::Joined(self.waiter.register())
			}
		}
	}

	fn transition(&self, phase: &mut Phase, to: Phase, cause: TransitionCause) {
		let from = *phase;
		if from == to {
			return;
		}
		*phase = to;
		self.phase_tx.send_replace(to);
		// No subscribers is fine; transitions are best-effort observation.
		let _ = self.transition_tx.send(Transition { from, to, cause });
		tracing::debug!(proxy = %self.label, %from, %to, ?cause, "presentation.transition");
	}
}
