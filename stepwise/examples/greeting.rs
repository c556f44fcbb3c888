//! Example: a sequence mixing remote-style calls, a pause and a join
//!
//! Run with `RUST_LOG=stepwise=debug cargo run --example greeting` to
//! follow the sequence step by step.

use stepwise::time::sleep;
use stepwise::{Future, Resume, Step, task};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Stand-in for a call to a remote service.
fn say(text: &'static str) -> Future<()> {
    task::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        println!("robot says: {text}");
        Ok(())
    })
}

#[stepwise::sequence]
fn greeting() -> impl stepwise::Coroutine<Output = &'static str> {
    let mut stage = 0;

    move |input: Resume| {
        input.into_value()?;
        stage += 1;

        match stage {
            1 => Ok(Step::wait(say("hello"))),
            2 => Ok(Step::wait(sleep(Duration::from_millis(300)))),
            // Both timers run at the same time.
            3 => Ok(Step::join([
                sleep(Duration::from_millis(200)),
                sleep(Duration::from_millis(200)),
            ])),
            4 => Ok(Step::wait(say("goodbye"))),
            _ => Ok(Step::Return("greeted")),
        }
    }
}

#[stepwise::main]
fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let sequence = greeting();

    match sequence.value() {
        Ok(outcome) => println!("sequence finished: {outcome:?}"),
        Err(error) => println!("sequence failed: {error}"),
    }
}
