//! Stage configuration and execution

use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::FsmError;
use crate::group::{run_group, GroupOutcome};
use crate::handlers::SharedCallback;
use crate::types::{FsmResult, ReplayPolicy, StageKind, StageOutcome, StateId, TransitionSignal};

/// Callbacks and limits for one stage of a state
pub struct StageConfig<S: StateId> {
    pub(crate) callbacks: Vec<SharedCallback<S>>,
    pub(crate) policy: ReplayPolicy,
    pub(crate) timeout: Option<Duration>,
    pub(crate) timeout_fallback: Option<S>,
}

impl<S: StateId> StageConfig<S> {
    /// An empty stage with the given replay policy and no timeout
    pub fn new(policy: ReplayPolicy) -> Self {
        Self {
            callbacks: Vec::new(),
            policy,
            timeout: None,
            timeout_fallback: None,
        }
    }

    pub fn callbacks(&self) -> &[SharedCallback<S>] {
        &self.callbacks
    }

    pub fn policy(&self) -> ReplayPolicy {
        self.policy
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn timeout_fallback(&self) -> Option<&S> {
        self.timeout_fallback.as_ref()
    }

    /// Run this stage's callbacks as one group on behalf of `state`.
    ///
    /// A timeout with a fallback target resolves as a transition to that target; without
    /// one it is fatal. Callback failures are fatal and tagged with the state and stage.
    pub async fn run(&self, state: &S, kind: StageKind) -> FsmResult<StageOutcome<S>> {
        debug!(
            "state {} running {} stage with {} callback(s)",
            state.name(),
            kind,
            self.callbacks.len()
        );

        match run_group(&self.callbacks, self.policy, self.timeout).await {
            GroupOutcome::Completed => Ok(StageOutcome::Completed),
            GroupOutcome::Signalled(signal) => Ok(StageOutcome::Transition(signal)),
            GroupOutcome::Failed(source) => Err(FsmError::CallbackFailed {
                state: state.name().to_string(),
                stage: kind,
                source,
            }),
            GroupOutcome::TimedOut => match &self.timeout_fallback {
                Some(fallback) => {
                    warn!(
                        "timeout in state {}, stage {}, falling back to {}",
                        state.name(),
                        kind,
                        fallback.name()
                    );
                    Ok(StageOutcome::Transition(TransitionSignal::to(fallback.clone())))
                }
                None => {
                    warn!("timeout in state {}, stage {}", state.name(), kind);
                    Err(FsmError::StageTimeout {
                        state: state.name().to_string(),
                        stage: kind,
                    })
                }
            },
        }
    }
}

impl<S: StateId> fmt::Debug for StageConfig<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageConfig")
            .field("callbacks", &self.callbacks.len())
            .field("policy", &self.policy)
            .field("timeout", &self.timeout)
            .field("timeout_fallback", &self.timeout_fallback)
            .finish()
    }
}
