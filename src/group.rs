//! Fork-join execution of one stage's callbacks.
//!
//! All callbacks of a group are polled in place by the future returned from
//! [`run_group`]; nothing is spawned. Resolving the group, or dropping it because the
//! timeout fired or the caller was cancelled, drops every callback future still in
//! flight, so no callback outlives its group.

use std::task::Poll;
use std::time::Duration;

use futures::future::poll_fn;

use crate::handlers::SharedCallback;
use crate::types::{
    BoxError, BoxFuture, CallbackError, CallbackResult, ReplayPolicy, StateId, TransitionSignal,
};

/// How a callback group resolved
#[derive(Debug)]
pub(crate) enum GroupOutcome<S> {
    /// Every callback returned `Ok(())`. Only reachable under [`ReplayPolicy::RunOnce`].
    Completed,
    /// A callback requested a transition
    Signalled(TransitionSignal<S>),
    /// A callback failed
    Failed(BoxError),
    /// The group timeout elapsed first
    TimedOut,
}

/// Run `callbacks` concurrently and resolve on the first signal or error.
///
/// When several callbacks finish with a signal or error during the same wake-up, the
/// one earliest in `callbacks` wins and the others are discarded.
pub(crate) async fn run_group<S: StateId>(
    callbacks: &[SharedCallback<S>],
    policy: ReplayPolicy,
    timeout: Option<Duration>,
) -> GroupOutcome<S> {
    if callbacks.is_empty() {
        return GroupOutcome::Completed;
    }

    let tasks = callbacks
        .iter()
        .map(|callback| Some(drive(callback.clone(), policy)))
        .collect();

    match timeout {
        Some(limit) => match tokio::time::timeout(limit, join_first(tasks)).await {
            Ok(outcome) => outcome,
            Err(_) => GroupOutcome::TimedOut,
        },
        None => join_first(tasks).await,
    }
}

fn drive<S: StateId>(
    callback: SharedCallback<S>,
    policy: ReplayPolicy,
) -> BoxFuture<'static, CallbackResult<S>> {
    match policy {
        ReplayPolicy::RunOnce => Box::pin(async move { callback.call().await }),
        ReplayPolicy::RunForever => Box::pin(run_forever(callback)),
    }
}

async fn run_forever<S: StateId>(callback: SharedCallback<S>) -> CallbackResult<S> {
    loop {
        callback.call().await?;
        tokio::task::yield_now().await;
    }
}

async fn join_first<S>(
    mut tasks: Vec<Option<BoxFuture<'static, CallbackResult<S>>>>,
) -> GroupOutcome<S> {
    poll_fn(|cx| {
        let mut pending = false;
        for slot in tasks.iter_mut() {
            let Some(task) = slot.as_mut() else {
                continue;
            };
            match task.as_mut().poll(cx) {
                Poll::Pending => pending = true,
                Poll::Ready(Ok(())) => *slot = None,
                Poll::Ready(Err(CallbackError::Transition(signal))) => {
                    return Poll::Ready(GroupOutcome::Signalled(signal));
                }
                Poll::Ready(Err(CallbackError::Failed(err))) => {
                    return Poll::Ready(GroupOutcome::Failed(err));
                }
            }
        }
        if pending {
            Poll::Pending
        } else {
            Poll::Ready(GroupOutcome::Completed)
        }
    })
    .await
}
