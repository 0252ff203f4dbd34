//! Traffic light driven by staged callbacks
//!
//! Run with `RUST_LOG=staged_fsm=debug cargo run --example traffic_light`.

use staged_fsm::{goto, MachineConfig, StageKind, State, StateId, StateMachine};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Hash, StateId)]
enum Light {
    Red,
    Green,
    Amber,
    Flashing,
}

#[tokio::main]
async fn main() -> Result<(), staged_fsm::FsmError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "staged_fsm=debug".to_string()),
        )
        .init();

    let cycles = Arc::new(AtomicUsize::new(0));

    let red = {
        let cycles = cycles.clone();
        State::builder(Light::Red)
            .on_enter(move || {
                let cycles = cycles.clone();
                async move {
                    let n = cycles.fetch_add(1, Ordering::SeqCst) + 1;
                    println!("cycle {n}: red");
                    Ok(())
                }
            })
            .on_run(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                goto(Light::Green)
            })
            .build()?
    };

    let green = State::builder(Light::Green)
        .on_enter(|| async {
            println!("green");
            Ok(())
        })
        // The sensor polls forever; the stage timeout ends the phase.
        .on_run(|| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        })
        .timeout_to(StageKind::Run, Duration::from_millis(400), Light::Amber)
        .build()?;

    let amber = {
        let cycles = cycles.clone();
        State::builder(Light::Amber)
            .on_run(|| async {
                tokio::time::sleep(Duration::from_millis(150)).await;
                goto(Light::Red)
            })
            .on_exit(move || {
                let cycles = cycles.clone();
                async move {
                    if cycles.load(Ordering::SeqCst) >= 3 {
                        goto(Light::Flashing)
                    } else {
                        Ok(())
                    }
                }
            })
            .build()?
    };

    let flashing = State::builder(Light::Flashing)
        .on_enter(|| async {
            println!("flashing amber until shutdown");
            Ok(())
        })
        .on_run(|| async {
            std::future::pending::<()>().await;
            Ok(())
        })
        .build()?;

    let mut machine =
        StateMachine::with_all_states(vec![red, green, amber, flashing], Light::Red)?
            .with_config(MachineConfig {
                transition_pause: Duration::from_millis(10),
            });

    let outcome = tokio::time::timeout(Duration::from_secs(5), machine.run_loop()).await;
    match outcome {
        Ok(Err(err)) => return Err(err),
        Ok(Ok(never)) => match never {},
        Err(_) => println!("stopped in {}", machine.active_state().name()),
    }
    Ok(())
}
