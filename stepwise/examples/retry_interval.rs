//! Example: retrying a flaky operation with a pause between attempts

use stepwise::time::sleep;
use stepwise::tools::retry;
use stepwise::{Error, Future};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn connect(attempts: &AtomicUsize) -> Future<&'static str> {
    let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
    println!("connecting, attempt {attempt}");

    sleep(Duration::from_millis(20)).try_map(move |_| {
        if attempt < 3 {
            Err(Error::msg("connection refused"))
        } else {
            Ok("connected")
        }
    })
}

#[stepwise::main(worker_threads = 2)]
fn main() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let connection = retry(5, move || connect(&counter))
        .set_interval(Duration::from_millis(100))
        .start();

    println!("{:?}", connection.value());
}
