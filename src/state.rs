//! A state: three stages run in sequence

use tracing::debug;

use crate::builder::StateBuilder;
use crate::error::FsmError;
use crate::stage::StageConfig;
use crate::types::{FsmResult, StageKind, StageOutcome, StateId, TransitionSignal};

/// One state of the machine.
///
/// Built through [`State::builder`]; immutable afterwards.
#[derive(Debug)]
pub struct State<S: StateId> {
    pub(crate) name: S,
    pub(crate) entry: StageConfig<S>,
    pub(crate) run: StageConfig<S>,
    pub(crate) exit: StageConfig<S>,
}

impl<S: StateId> State<S> {
    /// Start building a state named `name`
    pub fn builder(name: S) -> StateBuilder<S> {
        StateBuilder::new(name)
    }

    pub fn name(&self) -> &S {
        &self.name
    }

    pub fn stage(&self, kind: StageKind) -> &StageConfig<S> {
        match kind {
            StageKind::Entry => &self.entry,
            StageKind::Run => &self.run,
            StageKind::Exit => &self.exit,
        }
    }

    /// Run entry, run and exit, and report where the machine should go next.
    ///
    /// - A transition from entry skips the run stage.
    /// - Exit always runs unless entry or run failed, and a transition from exit replaces
    ///   whatever was requested earlier.
    /// - Falling through all three stages without a transition is an error.
    ///
    /// The returned signal always has `origin` set to this state.
    pub async fn run(&self) -> FsmResult<TransitionSignal<S>> {
        debug!("state {} started", self.name.name());

        let mut captured = match self.entry.run(&self.name, StageKind::Entry).await? {
            StageOutcome::Transition(signal) => Some(signal),
            StageOutcome::Completed => None,
        };

        if captured.is_none() {
            if let StageOutcome::Transition(signal) =
                self.run.run(&self.name, StageKind::Run).await?
            {
                captured = Some(signal);
            }
        }

        if let StageOutcome::Transition(signal) = self.exit.run(&self.name, StageKind::Exit).await?
        {
            captured = Some(signal);
        }

        match captured {
            Some(signal) => Ok(signal.from_state(self.name.clone())),
            None => Err(FsmError::NoTransition {
                state: self.name.name().to_string(),
            }),
        }
    }
}
