//! Async state machine whose states are made of concurrent callback groups.
//!
//! Every [`State`] has three stages, run in order: **entry**, **run** and **exit**. A stage
//! is not a single step but a group of callbacks that run concurrently:
//! - Entry and exit callbacks run once; the stage finishes when all of them return.
//! - Run callbacks are re-invoked forever, yielding between calls, until one of them asks
//!   for a transition.
//! - Any callback may ask for a transition by returning [`goto`]. The stage then cancels
//!   its sibling callbacks and resolves with that target.
//! - A stage may carry a timeout for the whole group, optionally with a fallback target.
//!
//! The [`StateMachine`] runs the active state, follows the transition it produced, and
//! repeats until the caller drops [`StateMachine::run_loop`] or a state fails.
//!
//! ## Stage rules
//!
//! - A transition requested during entry skips the run stage.
//! - Exit always runs after entry/run, even when a transition is already pending, and a
//!   transition requested during exit replaces the pending one.
//! - Errors are fatal: an error in entry or run aborts the state without running exit.
//! - A state that gets through all three stages without a transition is an error.
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::Duration;
//! use staged_fsm::{goto, State, StateId, StateMachine};
//!
//! #[derive(Clone, Debug, PartialEq, Eq, Hash, StateId)]
//! enum Door {
//!     Closed,
//!     Open,
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), staged_fsm::FsmError> {
//!     let closed = State::builder(Door::Closed)
//!         .on_run(|| async { goto(Door::Open) })
//!         .build()?;
//!
//!     let open = State::builder(Door::Open)
//!         .on_run(|| async {
//!             tokio::time::sleep(Duration::from_secs(3600)).await;
//!             Ok(())
//!         })
//!         .build()?;
//!
//!     let mut door = StateMachine::with_all_states(vec![closed, open], Door::Closed)?;
//!
//!     // The loop never finishes on its own; bound it from outside.
//!     let _ = tokio::time::timeout(Duration::from_millis(50), door.run_loop()).await;
//!     assert_eq!(door.active_state(), &Door::Open);
//!     Ok(())
//! }
//! ```
//!
//! ## Timeouts
//!
//! Timeouts bound a whole stage, not a single callback. When one elapses, every callback
//! of the stage is cancelled; the stage then resolves as a transition to its fallback
//! target, or as [`FsmError::StageTimeout`] when there is none.
//!
//! ```rust
//! use std::time::Duration;
//! use staged_fsm::{State, StageKind, StateId};
//!
//! #[derive(Clone, Debug, PartialEq, Eq, Hash, StateId)]
//! enum Link {
//!     Connecting,
//!     Offline,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), staged_fsm::FsmError> {
//! let connecting = State::builder(Link::Connecting)
//!     .on_run(|| async {
//!         std::future::pending::<()>().await;
//!         Ok(())
//!     })
//!     .timeout_to(StageKind::Run, Duration::from_millis(10), Link::Offline)
//!     .build()?;
//!
//! let signal = connecting.run().await?;
//! assert_eq!(signal.target, Link::Offline);
//! assert_eq!(signal.origin, Some(Link::Connecting));
//! # Ok(())
//! # }
//! ```

// Allow this crate to refer to itself via `staged_fsm` so that
// derive expansions using `::staged_fsm::...` also work in
// the crate's own tests.
extern crate self as staged_fsm;

// Module declarations
pub mod builder;
pub mod error;
mod group;
pub mod handlers;
pub mod machine;
pub mod stage;
pub mod state;
pub mod types;

// Re-export main types for convenience
pub use builder::StateBuilder;
pub use error::FsmError;
pub use handlers::{goto, Callback, SharedCallback};
pub use machine::{MachineConfig, StateMachine};
pub use stage::StageConfig;
pub use state::State;
pub use types::{
    BoxError, CallbackError, CallbackResult, FsmResult, ReplayPolicy, StageKind, StageOutcome,
    StateId, TransitionSignal,
};

// Re-export the derive so users can write `#[derive(staged_fsm::StateId)]`.
pub use staged_fsm_macros::StateId;
