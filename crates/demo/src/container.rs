//! Stand-in for the platform container that renders the modal.

use std::sync::Arc;

use curtain_presentation::{CancellationToken, Phase, PresentationProxy};
use tokio::task::JoinHandle;

use crate::config::ContainerConfig;

#[derive(Debug, Clone, Copy)]
enum Hook {
	WillPresent,
	DidDismiss,
}

impl Hook {
	fn fire(self, proxy: &PresentationProxy) {
		match self {
			Self::WillPresent => {
				tracing::info!(proxy = proxy.label(), "container.visible");
				proxy.on_will_present();
			}
			Self::DidDismiss => {
				tracing::info!(proxy = proxy.label(), "container.hidden");
				proxy.on_did_dismiss();
			}
		}
	}
}

/// Spawns a task that watches the proxy's phase and reports visibility after
/// the configured animation delay.
///
/// An animation is abandoned when the phase moves before it finishes, so a
/// reset presentation never receives a late hook.
pub fn spawn(proxy: Arc<PresentationProxy>, config: ContainerConfig, shutdown: CancellationToken) -> JoinHandle<()> {
	tokio::spawn(async move {
		let mut phases = proxy.subscribe();
		loop {
			let phase = *phases.borrow_and_update();
			let animation = match phase {
				Phase::Presenting => Some((config.present_delay(), Hook::WillPresent)),
				Phase::Dismissing => Some((config.dismiss_delay(), Hook::DidDismiss)),
				Phase::Idle | Phase::Presented => None,
			};

			if let Some((delay, hook)) = animation {
				tracing::debug!(%phase, delay_ms = delay.as_millis() as u64, "container.animate");
				tokio::select! {
					biased;
					_ = shutdown.cancelled() => break,
					changed = phases.changed() => {
						if changed.is_err() {
							break;
						}
						tracing::debug!(%phase, "container.animation_interrupted");
						continue;
					}
					_ = tokio::time::sleep(delay) => hook.fire(&proxy),
				}
			}

			tokio::select! {
				biased;
				_ = shutdown.cancelled() => break,
				changed = phases.changed() => {
					if changed.is_err() {
						break;
					}
				}
			}
		}
		tracing::debug!("container.stopped");
	})
}
