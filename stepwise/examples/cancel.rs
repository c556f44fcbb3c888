//! Example: canceling a running sequence
//!
//! The sequence ticks every 100ms; canceling it stops the ticking and
//! disarms the pending timer. Steps that already ran are not undone.

use stepwise::time::sleep;
use stepwise::{Resume, RuntimeBuilder, Sequence, Step};
use std::thread;
use std::time::Duration;

fn main() -> std::io::Result<()> {
    let runtime = RuntimeBuilder::new().worker_threads(2).build()?;

    runtime.enter(|| {
        let mut ticks = 0;

        let ticker = Sequence::start(move |input: Resume| {
            input.into_value()?;

            if ticks > 0 {
                println!("tick {ticks}");
            }
            ticks += 1;

            Ok(Step::<()>::wait(sleep(Duration::from_millis(100))))
        });

        thread::sleep(Duration::from_millis(350));
        ticker.cancel();

        println!("canceled: {}", ticker.is_canceled());
    });

    Ok(())
}
