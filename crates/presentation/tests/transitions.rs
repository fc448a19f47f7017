use std::collections::VecDeque;
use std::sync::Arc;

use curtain_presentation::{Phase, PresentationProxy, ProxyConfig, Result, Transition};
use proptest::prelude::*;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy)]
enum Op {
	Present,
	Dismiss,
	WillPresent,
	DidDismiss,
	AbortOldestCaller,
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![
		3 => Just(Op::Present),
		3 => Just(Op::Dismiss),
		2 => Just(Op::WillPresent),
		2 => Just(Op::DidDismiss),
		1 => Just(Op::AbortOldestCaller),
	]
}

struct Run {
	transitions: Vec<Transition>,
	/// Phases observed after each operation had settled, with the registry size at that moment.
	checkpoints: Vec<(Phase, usize)>,
	final_phase: Phase,
	final_pending: usize,
}

async fn run(ops: Vec<Op>) -> Run {
	let proxy = Arc::new(PresentationProxy::with_config(ProxyConfig::default().with_transition_buffer(1024)));
	let mut rx = proxy.transitions();
	let mut callers: VecDeque<JoinHandle<Result<()>>> = VecDeque::new();
	let mut checkpoints = Vec::with_capacity(ops.len());

	for op in ops {
		match op {
			Op::Present => {
				let proxy = Arc::clone(&proxy);
				callers.push_back(tokio::spawn(async move { proxy.present().await }));
			}
			Op::Dismiss => {
				let proxy = Arc::clone(&proxy);
				callers.push_back(tokio::spawn(async move { proxy.dismiss().await }));
			}
			Op::WillPresent => proxy.on_will_present(),
			Op::DidDismiss => proxy.on_did_dismiss(),
			Op::AbortOldestCaller => {
				if let Some(caller) = callers.pop_front() {
					caller.abort();
				}
			}
		}
		for _ in 0..16 {
			tokio::task::yield_now().await;
		}
		checkpoints.push((proxy.phase(), proxy.pending_waiters()));
	}

	// A caller that had not been polled yet can still start a transition after teardown.
	while !callers.is_empty() {
		proxy.cancel_all();
		tokio::task::yield_now().await;
		callers.retain(|caller| !caller.is_finished());
	}

	let mut transitions = Vec::new();
	loop {
		match rx.try_recv() {
			Ok(t) => transitions.push(t),
			Err(TryRecvError::Empty) => break,
			Err(err) => panic!("transition stream broke: {err:?}"),
		}
	}

	Run {
		transitions,
		checkpoints,
		final_phase: proxy.phase(),
		final_pending: proxy.pending_waiters(),
	}
}

proptest! {
	#[test]
	fn phase_moves_only_along_legal_edges(ops in prop::collection::vec(op(), 1..48)) {
		let rt = tokio::runtime::Builder::new_current_thread().build().expect("runtime");
		let run = rt.block_on(run(ops));

		for t in &run.transitions {
			prop_assert!(t.is_legal(), "illegal transition {:?}", t);
		}
		for pair in run.transitions.windows(2) {
			prop_assert_eq!(pair[0].to, pair[1].from, "transition stream skipped a phase");
		}
		if let Some(first) = run.transitions.first() {
			prop_assert_eq!(first.from, Phase::Idle);
		}

		for (phase, pending) in &run.checkpoints {
			if !phase.is_transitioning() {
				prop_assert_eq!(*pending, 0, "waiters registered while {}", phase);
			}
		}

		prop_assert_eq!(run.final_phase, Phase::Idle);
		prop_assert_eq!(run.final_pending, 0);
	}
}
