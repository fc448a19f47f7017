use std::sync::Arc;

use curtain_presentation::{CancellationToken, Cancelled, Phase, PresentationProxy, Result};
use tokio::task::JoinHandle;

async fn settle(proxy: &PresentationProxy, pending: usize) {
	while proxy.pending_waiters() != pending {
		tokio::task::yield_now().await;
	}
}

fn spawn_present(proxy: &Arc<PresentationProxy>) -> JoinHandle<Result<()>> {
	let proxy = Arc::clone(proxy);
	tokio::spawn(async move { proxy.present().await })
}

fn spawn_dismiss(proxy: &Arc<PresentationProxy>) -> JoinHandle<Result<()>> {
	let proxy = Arc::clone(proxy);
	tokio::spawn(async move { proxy.dismiss().await })
}

/// Drives a fresh proxy to `Presented`.
async fn presented_proxy() -> Arc<PresentationProxy> {
	let proxy = Arc::new(PresentationProxy::new());
	let task = spawn_present(&proxy);
	settle(&proxy, 1).await;
	proxy.on_will_present();
	task.await.unwrap().unwrap();
	assert_eq!(proxy.phase(), Phase::Presented);
	proxy
}

#[tokio::test]
async fn present_completes_when_content_becomes_visible() {
	let proxy = Arc::new(PresentationProxy::new());
	let task = spawn_present(&proxy);
	settle(&proxy, 1).await;

	assert_eq!(proxy.phase(), Phase::Presenting);
	assert!(!task.is_finished());

	proxy.on_will_present();
	assert_eq!(task.await.unwrap(), Ok(()));
	assert_eq!(proxy.phase(), Phase::Presented);
	assert_eq!(proxy.pending_waiters(), 0);
}

#[tokio::test]
async fn concurrent_dismissals_complete_together() {
	let proxy = presented_proxy().await;

	let first = spawn_dismiss(&proxy);
	settle(&proxy, 1).await;
	assert_eq!(proxy.phase(), Phase::Dismissing);

	let second = spawn_dismiss(&proxy);
	settle(&proxy, 2).await;
	assert_eq!(proxy.phase(), Phase::Dismissing);

	proxy.on_did_dismiss();
	assert_eq!(first.await.unwrap(), Ok(()));
	assert_eq!(second.await.unwrap(), Ok(()));
	assert_eq!(proxy.phase(), Phase::Idle);
}

#[tokio::test]
async fn dismiss_before_visible_cancels_the_presentation() {
	let proxy = Arc::new(PresentationProxy::new());
	let present = spawn_present(&proxy);
	settle(&proxy, 1).await;
	assert_eq!(proxy.phase(), Phase::Presenting);

	proxy.dismiss().await.unwrap();
	assert_eq!(proxy.phase(), Phase::Idle);
	assert_eq!(proxy.pending_waiters(), 0);
	assert_eq!(present.await.unwrap(), Err(Cancelled));
}

#[tokio::test]
async fn joined_presenters_complete_only_on_visibility() {
	let proxy = Arc::new(PresentationProxy::new());
	let tasks: Vec<_> = (0..5).map(|_| spawn_present(&proxy)).collect();
	settle(&proxy, 5).await;

	for _ in 0..8 {
		tokio::task::yield_now().await;
	}
	assert!(tasks.iter().all(|t| !t.is_finished()), "no presenter may finish before visibility");
	assert_eq!(proxy.phase(), Phase::Presenting);

	proxy.on_will_present();
	for task in tasks {
		assert_eq!(task.await.unwrap(), Ok(()));
	}
	assert_eq!(proxy.phase(), Phase::Presented);
}

#[tokio::test]
async fn reset_cancels_the_presenter_and_every_joiner() {
	let proxy = Arc::new(PresentationProxy::new());
	let tasks: Vec<_> = (0..4).map(|_| spawn_present(&proxy)).collect();
	settle(&proxy, 4).await;

	proxy.dismiss().await.unwrap();
	assert_eq!(proxy.phase(), Phase::Idle);
	for task in tasks {
		assert_eq!(task.await.unwrap(), Err(Cancelled));
	}

	// Late hook from the abandoned presentation must not resurrect it.
	proxy.on_will_present();
	assert_eq!(proxy.phase(), Phase::Idle);
}

#[tokio::test]
async fn cancelling_one_presenter_leaves_the_rest_untouched() {
	let proxy = Arc::new(PresentationProxy::new());
	let token = CancellationToken::new();

	let cancelled = tokio::spawn({
		let proxy = Arc::clone(&proxy);
		let token = token.clone();
		async move { proxy.present_until(&token).await }
	});
	settle(&proxy, 1).await;
	let others: Vec<_> = (0..2).map(|_| spawn_present(&proxy)).collect();
	settle(&proxy, 3).await;

	token.cancel();
	assert_eq!(cancelled.await.unwrap(), Err(Cancelled));
	assert_eq!(proxy.pending_waiters(), 2);
	assert_eq!(proxy.phase(), Phase::Presenting);

	proxy.on_will_present();
	for task in others {
		assert_eq!(task.await.unwrap(), Ok(()));
	}
	assert_eq!(proxy.phase(), Phase::Presented);
}

#[tokio::test]
async fn aborting_the_initiating_presenter_keeps_the_transition() {
	let proxy = Arc::new(PresentationProxy::new());
	let initiator = spawn_present(&proxy);
	settle(&proxy, 1).await;
	let joiner = spawn_present(&proxy);
	settle(&proxy, 2).await;

	initiator.abort();
	assert!(initiator.await.unwrap_err().is_cancelled());
	settle(&proxy, 1).await;
	assert_eq!(proxy.phase(), Phase::Presenting);

	proxy.on_will_present();
	assert_eq!(joiner.await.unwrap(), Ok(()));
}

#[tokio::test]
async fn cancelling_a_dismisser_keeps_the_dismissal() {
	let proxy = presented_proxy().await;
	let token = CancellationToken::new();

	let dismisser = tokio::spawn({
		let proxy = Arc::clone(&proxy);
		let token = token.clone();
		async move { proxy.dismiss_until(&token).await }
	});
	settle(&proxy, 1).await;

	token.cancel();
	assert_eq!(dismisser.await.unwrap(), Err(Cancelled));
	assert_eq!(proxy.phase(), Phase::Dismissing);

	proxy.on_did_dismiss();
	assert_eq!(proxy.phase(), Phase::Idle);
}

#[tokio::test]
async fn presenter_joined_during_dismissal_starts_a_fresh_presentation() {
	let proxy = presented_proxy().await;

	let dismiss = spawn_dismiss(&proxy);
	settle(&proxy, 1).await;
	let present = spawn_present(&proxy);
	settle(&proxy, 2).await;
	assert_eq!(proxy.phase(), Phase::Dismissing);

	proxy.on_did_dismiss();
	assert_eq!(dismiss.await.unwrap(), Ok(()));

	settle(&proxy, 1).await;
	assert_eq!(proxy.phase(), Phase::Presenting);
	assert!(!present.is_finished());

	proxy.on_will_present();
	assert_eq!(present.await.unwrap(), Ok(()));
	assert_eq!(proxy.phase(), Phase::Presented);
}

#[tokio::test]
async fn dismiss_joined_during_dismissal_does_not_restart() {
	let proxy = presented_proxy().await;
	let first = spawn_dismiss(&proxy);
	settle(&proxy, 1).await;
	let second = spawn_dismiss(&proxy);
	settle(&proxy, 2).await;

	proxy.on_did_dismiss();
	first.await.unwrap().unwrap();
	second.await.unwrap().unwrap();
	assert_eq!(proxy.phase(), Phase::Idle);
	assert_eq!(proxy.pending_waiters(), 0);
}

#[tokio::test]
async fn teardown_fails_everyone_and_returns_to_idle() {
	let proxy = presented_proxy().await;
	let dismissers: Vec<_> = (0..3).map(|_| spawn_dismiss(&proxy)).collect();
	settle(&proxy, 3).await;

	proxy.cancel_all();
	assert_eq!(proxy.phase(), Phase::Idle);
	assert_eq!(proxy.pending_waiters(), 0);
	for task in dismissers {
		assert_eq!(task.await.unwrap(), Err(Cancelled));
	}

	// The proxy stays usable after teardown.
	let again = spawn_present(&proxy);
	settle(&proxy, 1).await;
	proxy.on_will_present();
	assert_eq!(again.await.unwrap(), Ok(()));
}
