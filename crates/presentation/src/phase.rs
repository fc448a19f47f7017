/// Presentation lifecycle phase of one modal surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
	/// Hidden and at rest.
	#[default]
	Idle,
	/// A presentation was requested and the content is not yet visible.
	Presenting,
	/// Visible and at rest.
	Presented,
	/// A dismissal was requested and the content is not yet fully hidden.
	Dismissing,
}

impl Phase {
	/// Returns `true` while the modal is shown or on its way to being shown.
	pub const fn is_presented(self) -> bool {
		matches!(self, Self::Presenting | Self::Presented)
	}

	/// Returns `true` while a transition is waiting on a lifecycle event.
	pub const fn is_transitioning(self) -> bool {
		matches!(self, Self::Presenting | Self::Dismissing)
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Presenting => "presenting",
			Self::Presented => "presented",
			Self::Dismissing => "dismissing",
		}
	}
}

impl std::fmt::Display for Phase {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// What moved the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionCause {
	/// A `present` call started a presentation.
	Present,
	/// The container reported the content visible.
	WillPresent,
	/// A `dismiss` call started a dismissal.
	Dismiss,
	/// The container reported the content hidden.
	DidDismiss,
	/// A `dismiss` call abandoned a presentation that never became visible.
	Reset,
	/// The owning scope tore the proxy down.
	Teardown,
}

/// One phase change, as published on [`PresentationProxy::transitions`](crate::PresentationProxy::transitions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
	pub from: Phase,
	pub to: Phase,
	pub cause: TransitionCause,
}

impl Transition {
	/// Returns `true` if the state machine is allowed to take this edge.
	pub fn is_legal(&self) -> bool {
		use Phase::*;
		use TransitionCause::*;

		if self.from == self.to {
			return false;
		}
		matches!(
			(self.from, self.to, self.cause),
			(Idle, Presenting, Present)
				| (Presenting, Presented, WillPresent)
				| (Presented, Dismissing, Dismiss)
				| (Dismissing, Idle, DidDismiss)
				| (Presenting, Idle, Reset)
				| (_, Idle, Teardown)
		)
	}
}
