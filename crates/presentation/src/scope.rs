use std::ops::Deref;
use std::sync::Arc;

use crate::config::ProxyConfig;
use crate::proxy::PresentationProxy;

/// Owner of a proxy for the lifetime of its coordinating scope.
///
/// Dropping the scope tears the proxy down: the phase is forced to idle and
/// every suspended caller fails with [`Cancelled`](crate::Cancelled), even if
/// other tasks still hold handles to the proxy.
#[derive(Debug)]
pub struct PresentationScope {
	proxy: Arc<PresentationProxy>,
}

impl Default for PresentationScope {
	fn default() -> Self {
		Self::new(ProxyConfig::default())
	}
}

impl PresentationScope {
	pub fn new(config: ProxyConfig) -> Self {
		Self {
			proxy: Arc::new(PresentationProxy::with_config(config)),
		}
	}

	/// Returns a shareable handle for tasks that call into the proxy.
	pub fn handle(&self) -> Arc<PresentationProxy> {
		Arc::clone(&self.proxy)
	}
}

impl Deref for PresentationScope {
	type Target = PresentationProxy;

	fn deref(&self) -> &Self::Target {
		&self.proxy
	}
}

impl Drop for PresentationScope {
	fn drop(&mut self) {
		tracing::trace!(proxy = %self.proxy.label(), "presentation.scope.drop");
		self.proxy.cancel_all();
	}
}
