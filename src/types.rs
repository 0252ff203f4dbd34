//! Core types for the staged state machine

use std::fmt::{self, Debug};
use std::hash::Hash;

use crate::error::FsmError;

/// Trait for state identifier types.
///
/// Identifiers form a closed set known when the machine is built. For fieldless enums,
/// derive it with `#[derive(staged_fsm::StateId)]`.
///
/// The derive only accepts enums with at least one variant, none of which carry data:
///
/// ```compile_fail
/// #[derive(Clone, Debug, PartialEq, Eq, Hash, staged_fsm::StateId)]
/// struct Idle;
/// ```
///
/// ```compile_fail
/// #[derive(Clone, Debug, PartialEq, Eq, Hash, staged_fsm::StateId)]
/// enum Phase {
///     Waiting(u8),
/// }
/// ```
///
/// ```compile_fail
/// #[derive(Clone, Debug, PartialEq, Eq, Hash, staged_fsm::StateId)]
/// enum Nothing {}
/// ```
pub trait StateId: Clone + Debug + Eq + Hash + Send + Sync + 'static {
    /// Human-readable symbol used in logs and error messages
    fn name(&self) -> &str;

    /// Every identifier of this type, in declaration order
    fn all() -> Vec<Self>;
}

/// A request to move the machine into `target`.
///
/// Callbacks create signals with [`TransitionSignal::to`]; the owning state fills in
/// `origin` when it hands the signal to the machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionSignal<S> {
    /// The state to activate next
    pub target: S,
    /// The state that produced the signal, once it has left that state
    pub origin: Option<S>,
}

impl<S> TransitionSignal<S> {
    /// Request a transition to `target`
    pub fn to(target: S) -> Self {
        Self {
            target,
            origin: None,
        }
    }

    /// Re-issue this signal on behalf of `origin`
    pub fn from_state(self, origin: S) -> Self {
        Self {
            target: self.target,
            origin: Some(origin),
        }
    }
}

/// Boxed domain error raised by a callback
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a callback stopped
#[derive(Debug)]
pub enum CallbackError<S> {
    /// The callback asked for a transition. This is control flow, not a failure.
    Transition(TransitionSignal<S>),
    /// The callback failed.
    Failed(BoxError),
}

impl<S> CallbackError<S> {
    /// Wrap a domain error
    pub fn failed(err: impl Into<BoxError>) -> Self {
        CallbackError::Failed(err.into())
    }
}

impl<S> From<TransitionSignal<S>> for CallbackError<S> {
    fn from(signal: TransitionSignal<S>) -> Self {
        CallbackError::Transition(signal)
    }
}

/// Result of a single callback invocation
pub type CallbackResult<S> = Result<(), CallbackError<S>>;

/// How a stage drives its callbacks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReplayPolicy {
    /// Invoke each callback exactly once
    #[default]
    RunOnce,
    /// Re-invoke each callback, yielding between calls, until it returns an error
    RunForever,
}

/// The three stages of a state, in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    Entry,
    Run,
    Exit,
}

impl StageKind {
    /// Replay policy a stage gets unless overridden
    pub fn default_policy(self) -> ReplayPolicy {
        match self {
            StageKind::Run => ReplayPolicy::RunForever,
            StageKind::Entry | StageKind::Exit => ReplayPolicy::RunOnce,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Entry => "entry",
            StageKind::Run => "run",
            StageKind::Exit => "exit",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a stage resolved to, when it did not fail
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageOutcome<S> {
    /// Every callback returned normally
    Completed,
    /// A callback, or the timeout fallback, requested a transition
    Transition(TransitionSignal<S>),
}

/// A boxed future that is Send
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Result type for FSM operations
pub type FsmResult<T> = Result<T, FsmError>;
