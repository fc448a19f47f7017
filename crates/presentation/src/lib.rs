//! Awaitable presentation lifecycle for a single modal surface.
//!
//! A [`PresentationProxy`] sits between application code that wants a modal
//! shown or hidden and the container that actually renders it. Callers `await`
//! [`PresentationProxy::present`] and [`PresentationProxy::dismiss`]; the
//! container reports real visibility through [`PresentationProxy::on_will_present`]
//! and [`PresentationProxy::on_did_dismiss`].
//!
//! ```text
//! Idle --present--> Presenting --on_will_present--> Presented
//! Presented --dismiss--> Dismissing --on_did_dismiss--> Idle
//! Presenting --dismiss--> Idle   (pending presenters get Cancelled)
//! ```
//!
//! Concurrent callers that find a transition in flight join it instead of
//! starting another. A caller whose own wait is interrupted receives
//! [`Cancelled`]; nothing else is ever reported as an error.

mod config;
mod phase;
mod proxy;
mod scope;


pub use config::ProxyConfig;
pub use curtain_waiter::{Cancelled, Result};
pub use phase::{Phase, Transition, TransitionCause};
pub use proxy::PresentationProxy;
pub use scope::PresentationScope;
/// Re-export of the token accepted by [`PresentationProxy::present_until`].
pub use tokio_util::sync::CancellationToken;
