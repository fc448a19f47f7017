use serde::Deserialize;

/// Label used in trace output when none is configured.
pub const DEFAULT_LABEL: &str = "modal";
/// Default capacity of the transition broadcast channel.
pub const DEFAULT_TRANSITION_BUFFER: usize = 16;

/// Construction options for a [`PresentationProxy`](crate::PresentationProxy).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyConfig {
	/// Name of the coordinated surface, attached to every trace event as `proxy`.
	pub label: String,
	/// Capacity of the channel behind `transitions()`. Slow subscribers that fall
	/// further behind than this observe `RecvError::Lagged`.
	pub transition_buffer: usize,
}

impl Default for ProxyConfig {
	fn default() -> Self {
		Self {
			label: DEFAULT_LABEL.to_string(),
			transition_buffer: DEFAULT_TRANSITION_BUFFER,
		}
	}
}

impl ProxyConfig {
	/// Sets the trace label.
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = label.into();
		self
	}

	/// Sets the transition channel capacity.
	pub fn with_transition_buffer(mut self, capacity: usize) -> Self {
		self.transition_buffer = capacity;
		self
	}

	/// Channel capacity clamped to what `tokio::sync::broadcast` accepts.
	pub(crate) fn transition_capacity(&self) -> usize {
		self.transition_buffer.max(1)
	}
}
