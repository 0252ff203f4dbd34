//! Callback group semantics, observed through a single stage
//!
//! What it tests:
//! - Run-forever callbacks are re-invoked until they ask for a transition
//! - A transition or an error cancels every sibling callback of the stage
//! - Simultaneous transitions resolve to the earliest callback in the stage
//! - Run-once groups finish normally when every callback returns

use staged_fsm::{
    goto, Callback, CallbackError, CallbackResult, FsmError, ReplayPolicy, StageKind,
    StageOutcome, State, StateId,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Clone, Debug, PartialEq, Eq, Hash, StateId)]
enum Pump {
    Priming,
    Pumping,
    Draining,
}

#[tokio::test]
async fn run_forever_invokes_callback_until_it_signals() {
    const NOOPS: usize = 5;
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let state = State::builder(Pump::Pumping)
        .on_run(move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < NOOPS {
                    Ok(())
                } else {
                    goto(Pump::Draining)
                }
            }
        })
        .build()
        .unwrap();

    let outcome = state
        .stage(StageKind::Run)
        .run(state.name(), StageKind::Run)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        StageOutcome::Transition(staged_fsm::TransitionSignal::to(Pump::Draining))
    );
    assert_eq!(calls.load(Ordering::SeqCst), NOOPS + 1);
}

#[tokio::test]
async fn run_forever_lets_siblings_make_progress() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let ticker = ticks.clone();
    let observer = ticks.clone();

    let state = State::builder(Pump::Pumping)
        // Never suspends on its own: only the yield between invocations lets the
        // sibling run.
        .on_run(move || {
            let ticker = ticker.clone();
            async move {
                ticker.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .on_run(move || {
            let observer = observer.clone();
            async move {
                if observer.load(Ordering::SeqCst) >= 10 {
                    goto(Pump::Draining)
                } else {
                    Ok(())
                }
            }
        })
        .build()
        .unwrap();

    let outcome = state
        .stage(StageKind::Run)
        .run(state.name(), StageKind::Run)
        .await
        .unwrap();

    assert!(matches!(outcome, StageOutcome::Transition(ref s) if s.target == Pump::Draining));
    assert!(ticks.load(Ordering::SeqCst) >= 10);
}

#[tokio::test]
async fn transition_cancels_sibling_callbacks() {
    let finished = Arc::new(AtomicBool::new(false));
    let flag = finished.clone();

    let state = State::builder(Pump::Pumping)
        .on_run(move || {
            let flag = flag.clone();
            async move {
                sleep(Duration::from_millis(200)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
        })
        .on_run(|| async {
            sleep(Duration::from_millis(10)).await;
            goto(Pump::Draining)
        })
        .build()
        .unwrap();

    let outcome = state
        .stage(StageKind::Run)
        .run(state.name(), StageKind::Run)
        .await
        .unwrap();
    assert!(matches!(outcome, StageOutcome::Transition(_)));

    // The slow sibling was dropped, so it can never finish later.
    sleep(Duration::from_millis(300)).await;
    assert!(!finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn callback_error_is_fatal_and_cancels_siblings() {
    let finished = Arc::new(AtomicBool::new(false));
    let flag = finished.clone();

    let state = State::builder(Pump::Priming)
        .on_enter(move || {
            let flag = flag.clone();
            async move {
                sleep(Duration::from_millis(200)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
        })
        .on_enter(|| async { Err(CallbackError::failed("valve stuck")) })
        .on_run(|| async { goto(Pump::Pumping) })
        .build()
        .unwrap();

    let err = state
        .stage(StageKind::Entry)
        .run(state.name(), StageKind::Entry)
        .await
        .unwrap_err();

    match &err {
        FsmError::CallbackFailed { state, stage, source } => {
            assert_eq!(state, "Priming");
            assert_eq!(*stage, StageKind::Entry);
            assert_eq!(source.to_string(), "valve stuck");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        err.to_string(),
        "callback failed in state Priming, stage entry: valve stuck"
    );

    sleep(Duration::from_millis(300)).await;
    assert!(!finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn simultaneous_transitions_pick_the_earliest_callback() {
    // Both callbacks finish on the same poll; the first registered one wins every time.
    for _ in 0..20 {
        let state = State::builder(Pump::Pumping)
            .on_run(|| async { goto(Pump::Draining) })
            .on_run(|| async { goto(Pump::Priming) })
            .build()
            .unwrap();

        let outcome = state
            .stage(StageKind::Run)
            .run(state.name(), StageKind::Run)
            .await
            .unwrap();
        assert!(matches!(outcome, StageOutcome::Transition(ref s) if s.target == Pump::Draining));
    }
}

#[tokio::test]
async fn run_once_stage_completes_after_every_callback() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let first = log.clone();
    let second = log.clone();

    let state = State::builder(Pump::Draining)
        .on_exit(move || {
            let first = first.clone();
            async move {
                sleep(Duration::from_millis(20)).await;
                first.lock().await.push("slow");
                Ok(())
            }
        })
        .on_exit(move || {
            let second = second.clone();
            async move {
                second.lock().await.push("fast");
                Ok(())
            }
        })
        .on_run(|| async { goto(Pump::Priming) })
        .build()
        .unwrap();

    let outcome = state
        .stage(StageKind::Exit)
        .run(state.name(), StageKind::Exit)
        .await
        .unwrap();

    assert_eq!(outcome, StageOutcome::Completed);
    // Both ran concurrently: the fast one finished first.
    assert_eq!(*log.lock().await, vec!["fast", "slow"]);
}

#[tokio::test]
async fn empty_stage_completes_immediately() {
    let state = State::builder(Pump::Priming)
        .on_run(|| async { goto(Pump::Pumping) })
        .replay(StageKind::Entry, ReplayPolicy::RunForever)
        .build()
        .unwrap();

    let outcome = state
        .stage(StageKind::Entry)
        .run(state.name(), StageKind::Entry)
        .await
        .unwrap();
    assert_eq!(outcome, StageOutcome::Completed);
}

#[tokio::test]
async fn callback_objects_run_alongside_closures() {
    struct Gauge {
        reads: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Callback<Pump> for Arc<Gauge> {
        async fn call(&self) -> CallbackResult<Pump> {
            if self.reads.fetch_add(1, Ordering::SeqCst) == 2 {
                goto(Pump::Draining)
            } else {
                Ok(())
            }
        }
    }

    let gauge = Arc::new(Gauge {
        reads: AtomicUsize::new(0),
    });

    let state = State::builder(Pump::Pumping)
        .callback(StageKind::Run, gauge.clone())
        .build()
        .unwrap();

    let outcome = state
        .stage(StageKind::Run)
        .run(state.name(), StageKind::Run)
        .await
        .unwrap();

    assert!(matches!(outcome, StageOutcome::Transition(ref s) if s.target == Pump::Draining));
    assert_eq!(gauge.reads.load(Ordering::SeqCst), 3);
}
