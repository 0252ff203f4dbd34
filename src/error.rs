// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2026 staged-fsm Contributors

//! Error types for state machine construction and execution.

use thiserror::Error;

use crate::types::{BoxError, StageKind};

/// Unrecoverable errors raised while building or running a state machine.
///
/// A requested transition is never an error: it travels as a
/// [`TransitionSignal`](crate::TransitionSignal). Everything here terminates
/// [`StateMachine::run_loop`](crate::StateMachine::run_loop).
#[derive(Error, Debug)]
pub enum FsmError {
    /// A stage's timeout elapsed and the stage has no fallback target.
    #[error("timeout in state {state}, stage {stage}, no target specified")]
    StageTimeout { state: String, stage: StageKind },

    /// Entry, run and exit all completed and none of them asked for a transition.
    #[error("state {state} completed without requesting a transition")]
    NoTransition { state: String },

    /// A transition targeted an identifier with no registered state.
    #[error("state not found: {state}")]
    StateNotFound { state: String },

    /// Two states were registered under the same identifier.
    #[error("duplicate state name: {state}")]
    DuplicateState { state: String },

    /// A state was registered under an identifier outside the declared set.
    #[error("state not declared: {state}")]
    UndeclaredState { state: String },

    /// Some declared identifiers have no state.
    #[error("undefined states: {{{}}}", .states.join(", "))]
    UndefinedStates { states: Vec<String> },

    /// The initial identifier has no state.
    #[error("initial state not found: {state}")]
    InitialStateNotFound { state: String },

    /// A state was built without run callbacks, so it could never leave.
    #[error("no callbacks in run stage, state: {state}")]
    EmptyRunStage { state: String },

    /// A callback failed with a domain error.
    #[error("callback failed in state {state}, stage {stage}: {source}")]
    CallbackFailed {
        state: String,
        stage: StageKind,
        #[source]
        source: BoxError,
    },
}
