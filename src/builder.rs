//! Fluent builder API for creating states

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::FsmError;
use crate::handlers::{Callback, FnCallback};
use crate::stage::StageConfig;
use crate::state::State;
use crate::types::{CallbackResult, FsmResult, ReplayPolicy, StageKind, StateId};

/// Builder for a [`State`].
///
/// Stages default to no callbacks and no timeout. Entry and exit run each callback once;
/// the run stage re-invokes its callbacks until one of them requests a transition.
pub struct StateBuilder<S: StateId> {
    name: S,
    entry: StageConfig<S>,
    run: StageConfig<S>,
    exit: StageConfig<S>,
}

impl<S: StateId> StateBuilder<S> {
    /// Create a new builder for the state `name`
    pub fn new(name: S) -> Self {
        Self {
            name,
            entry: StageConfig::new(StageKind::Entry.default_policy()),
            run: StageConfig::new(StageKind::Run.default_policy()),
            exit: StageConfig::new(StageKind::Exit.default_policy()),
        }
    }

    fn stage_mut(&mut self, kind: StageKind) -> &mut StageConfig<S> {
        match kind {
            StageKind::Entry => &mut self.entry,
            StageKind::Run => &mut self.run,
            StageKind::Exit => &mut self.exit,
        }
    }

    /// Add an entry callback
    pub fn on_enter<F, Fut>(self, handler: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult<S>> + Send + 'static,
    {
        self.callback(StageKind::Entry, FnCallback(handler))
    }

    /// Add a run callback
    pub fn on_run<F, Fut>(self, handler: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult<S>> + Send + 'static,
    {
        self.callback(StageKind::Run, FnCallback(handler))
    }

    /// Add an exit callback
    pub fn on_exit<F, Fut>(self, handler: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult<S>> + Send + 'static,
    {
        self.callback(StageKind::Exit, FnCallback(handler))
    }

    /// Add a callback object to `stage`
    pub fn callback(mut self, stage: StageKind, callback: impl Callback<S>) -> Self {
        self.stage_mut(stage).callbacks.push(Arc::new(callback));
        self
    }

    /// Bound `stage` by `duration`; expiry is fatal
    pub fn timeout(mut self, stage: StageKind, duration: Duration) -> Self {
        let config = self.stage_mut(stage);
        config.timeout = Some(duration);
        config.timeout_fallback = None;
        self
    }

    /// Bound `stage` by `duration`; expiry transitions to `fallback`
    pub fn timeout_to(mut self, stage: StageKind, duration: Duration, fallback: S) -> Self {
        let config = self.stage_mut(stage);
        config.timeout = Some(duration);
        config.timeout_fallback = Some(fallback);
        self
    }

    /// Override the replay policy of `stage`
    pub fn replay(mut self, stage: StageKind, policy: ReplayPolicy) -> Self {
        self.stage_mut(stage).policy = policy;
        self
    }

    /// Build the state
    pub fn build(self) -> FsmResult<State<S>> {
        if self.run.callbacks.is_empty() {
            return Err(FsmError::EmptyRunStage {
                state: self.name.name().to_string(),
            });
        }

        Ok(State {
            name: self.name,
            entry: self.entry,
            run: self.run,
            exit: self.exit,
        })
    }
}
