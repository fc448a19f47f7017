//! Scripted caller behaviour against one proxy.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use curtain_presentation::{CancellationToken, Cancelled, PresentationProxy, PresentationScope};
use tokio::task::JoinHandle;

use crate::config::DemoConfig;
use crate::container;

/// Which caller script to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Scenario {
	/// All callers present, then one caller dismisses.
	Roundtrip,
	/// All callers present, then a dismiss arrives before the content is visible.
	Interrupt,
	/// All callers present, then the owning scope ends.
	Teardown,
}

/// How one caller's intent ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	Completed,
	Cancelled,
	TimedOut,
}

/// Tally of caller outcomes for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Report {
	pub completed: usize,
	pub cancelled: usize,
	pub timed_out: usize,
}

impl Report {
	fn record(&mut self, outcome: Outcome) {
		match outcome {
			Outcome::Completed => self.completed += 1,
			Outcome::Cancelled => self.cancelled += 1,
			Outcome::TimedOut => self.timed_out += 1,
		}
	}
}

/// Runs `scenario` against a fresh scope and a simulated container.
pub async fn run(scenario: Scenario, config: &DemoConfig) -> anyhow::Result<Report> {
	let scope = PresentationScope::new(config.proxy.clone());
	let shutdown = CancellationToken::new();
	let container = container::spawn(scope.handle(), config.container.clone(), shutdown.clone());

	let report = match scenario {
		Scenario::Roundtrip => roundtrip(&scope, config).await,
		Scenario::Interrupt => interrupt(&scope, config).await,
		Scenario::Teardown => teardown(scope, config).await,
	};

	shutdown.cancel();
	container.await.context("container task failed")?;
	report
}

async fn roundtrip(scope: &PresentationScope, config: &DemoConfig) -> anyhow::Result<Report> {
	let mut report = Report::default();
	for presenter in spawn_presenters(&scope.handle(), config.callers, config.timeout()) {
		report.record(presenter.await.context("presenter task failed")?);
	}
	tracing::info!(phase = %scope.phase(), "scenario.presented");

	let outcome = guarded(config.timeout(), scope.dismiss()).await;
	tracing::info!(?outcome, phase = %scope.phase(), "caller.dismiss");
	report.record(outcome);
	Ok(report)
}

async fn interrupt(scope: &PresentationScope, config: &DemoConfig) -> anyhow::Result<Report> {
	let callers = config.callers.max(1);
	let presenters = spawn_presenters(&scope.handle(), callers, config.timeout());
	joined(scope, callers).await;

	let mut report = Report::default();
	let outcome = guarded(config.timeout(), scope.dismiss()).await;
	tracing::info!(?outcome, phase = %scope.phase(), "caller.dismiss");
	report.record(outcome);

	for presenter in presenters {
		report.record(presenter.await.context("presenter task failed")?);
	}
	Ok(report)
}

async fn teardown(scope: PresentationScope, config: &DemoConfig) -> anyhow::Result<Report> {
	let callers = config.callers.max(1);
	let proxy = scope.handle();
	let presenters = spawn_presenters(&proxy, callers, config.timeout());
	joined(&proxy, callers).await;

	tracing::info!("scenario.scope_end");
	drop(scope);

	let mut report = Report::default();
	for presenter in presenters {
		report.record(presenter.await.context("presenter task failed")?);
	}
	tracing::info!(phase = %proxy.phase(), "scenario.torn_down");
	Ok(report)
}

fn spawn_presenters(proxy: &Arc<PresentationProxy>, count: usize, timeout: Option<Duration>) -> Vec<JoinHandle<Outcome>> {
	(0..count)
		.map(|caller| {
			let proxy = Arc::clone(proxy);
			tokio::spawn(async move {
				let outcome = guarded(timeout, proxy.present()).await;
				tracing::info!(caller, ?outcome, "caller.present");
				outcome
			})
		})
		.collect()
}

/// Yields until `count` callers are suspended on the in-flight transition.
async fn joined(proxy: &PresentationProxy, count: usize) {
	while proxy.pending_waiters() < count {
		tokio::task::yield_now().await;
	}
}

/// Applies the caller-side timeout policy to one intent.
async fn guarded(timeout: Option<Duration>, intent: impl Future<Output = Result<(), Cancelled>>) -> Outcome {
	let result = match timeout {
		Some(limit) => match tokio::time::timeout(limit, intent).await {
			Ok(result) => result,
			Err(_) => return Outcome::TimedOut,
		},
		None => intent.await,
	};
	match result {
		Ok(()) => Outcome::Completed,
		Err(Cancelled) => Outcome::Cancelled,
	}
}
