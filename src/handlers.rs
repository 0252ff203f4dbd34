//! Callback trait and helpers for callback authors

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::types::{CallbackError, CallbackResult, StateId, TransitionSignal};

/// A zero-argument unit of async work attached to a stage.
///
/// Returning `Ok(())` means "done for now": a run-once stage counts the callback as
/// finished, a run-forever stage calls it again. Returning
/// [`CallbackError::Transition`] asks the machine to move and cancels the sibling
/// callbacks of the same stage.
#[async_trait]
pub trait Callback<S: StateId>: Send + Sync + 'static {
    async fn call(&self) -> CallbackResult<S>;
}

/// Shared handle to a callback, as stored by a stage
pub type SharedCallback<S> = Arc<dyn Callback<S>>;

/// Adapter turning an async closure into a [`Callback`]
pub(crate) struct FnCallback<F>(pub(crate) F);

#[async_trait]
impl<S, F, Fut> Callback<S> for FnCallback<F>
where
    S: StateId,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallbackResult<S>> + Send + 'static,
{
    async fn call(&self) -> CallbackResult<S> {
        (self.0)().await
    }
}

/// Request a transition to `target` from inside a callback.
///
/// ```rust
/// use staged_fsm::{goto, CallbackResult, StateId};
///
/// #[derive(Clone, Debug, PartialEq, Eq, Hash, StateId)]
/// enum Phase {
///     Idle,
///     Busy,
/// }
///
/// async fn poll_queue() -> CallbackResult<Phase> {
///     goto(Phase::Busy)
/// }
/// ```
pub fn goto<S>(target: S) -> CallbackResult<S> {
    Err(CallbackError::Transition(TransitionSignal::to(target)))
}
