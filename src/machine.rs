//! StateMachine implementation

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::time::Duration;

use tracing::debug;

use crate::error::FsmError;
use crate::state::State;
use crate::types::{FsmResult, StateId, TransitionSignal};

/// Machine-wide settings
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MachineConfig {
    /// Pause between two dispatch iterations. Zero only yields to the scheduler.
    pub transition_pause: Duration,
}

/// Owns every state and drives the active one
#[derive(Debug)]
pub struct StateMachine<S: StateId> {
    states: HashMap<S, State<S>>,
    active: S,
    config: MachineConfig,
}

impl<S: StateId> StateMachine<S> {
    /// Create a machine over `states`, checked against the declared `identifiers`.
    ///
    /// Fails when two states share a name, when a state is not declared, when a declared
    /// identifier has no state, or when `initial` has no state.
    pub fn new(
        states: impl IntoIterator<Item = State<S>>,
        identifiers: impl IntoIterator<Item = S>,
        initial: S,
    ) -> FsmResult<Self> {
        let declared: Vec<S> = identifiers.into_iter().collect();
        let declared_set: HashSet<&S> = declared.iter().collect();

        let mut by_name: HashMap<S, State<S>> = HashMap::new();
        for state in states {
            if by_name.contains_key(state.name()) {
                return Err(FsmError::DuplicateState {
                    state: state.name().name().to_string(),
                });
            }
            if !declared_set.contains(state.name()) {
                return Err(FsmError::UndeclaredState {
                    state: state.name().name().to_string(),
                });
            }
            by_name.insert(state.name().clone(), state);
        }

        let mut missing: Vec<String> = Vec::new();
        for id in &declared {
            let name = id.name().to_string();
            if !by_name.contains_key(id) && !missing.contains(&name) {
                missing.push(name);
            }
        }
        if !missing.is_empty() {
            return Err(FsmError::UndefinedStates { states: missing });
        }

        if !by_name.contains_key(&initial) {
            return Err(FsmError::InitialStateNotFound {
                state: initial.name().to_string(),
            });
        }

        Ok(Self {
            states: by_name,
            active: initial,
            config: MachineConfig::default(),
        })
    }

    /// Create a machine whose declared identifiers are every value of `S`
    pub fn with_all_states(
        states: impl IntoIterator<Item = State<S>>,
        initial: S,
    ) -> FsmResult<Self> {
        Self::new(states, S::all(), initial)
    }

    /// Replace the machine settings
    pub fn with_config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Identifier of the active state
    pub fn active_state(&self) -> &S {
        &self.active
    }

    /// The active state
    pub fn active(&self) -> &State<S> {
        // Every identifier `active` can hold was looked up in `states` first.
        &self.states[&self.active]
    }

    /// All states, in no particular order
    pub fn states(&self) -> impl Iterator<Item = &State<S>> {
        self.states.values()
    }

    /// Run the active state once and activate the state it asked for.
    ///
    /// Returns the signal that was followed, with `origin` set.
    pub async fn step(&mut self) -> FsmResult<TransitionSignal<S>> {
        let active = self
            .states
            .get(&self.active)
            .ok_or_else(|| FsmError::StateNotFound {
                state: self.active.name().to_string(),
            })?;
        let signal = active.run().await?;

        if !self.states.contains_key(&signal.target) {
            return Err(FsmError::StateNotFound {
                state: signal.target.name().to_string(),
            });
        }

        debug!(
            "FSM transitioned from {} to {}",
            self.active.name(),
            signal.target.name()
        );
        self.active = signal.target.clone();
        Ok(signal)
    }

    /// Dispatch transitions until a state fails.
    ///
    /// Only returns on error; stop it from outside by dropping the future, for example
    /// with `tokio::time::timeout` or `tokio::select!`. [`active_state`] then reports the
    /// last state that was activated.
    ///
    /// [`active_state`]: StateMachine::active_state
    pub async fn run_loop(&mut self) -> FsmResult<Infallible> {
        loop {
            self.step().await?;
            if self.config.transition_pause.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.config.transition_pause).await;
            }
        }
    }
}
