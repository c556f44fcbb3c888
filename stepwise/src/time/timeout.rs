use crate::error::Error;
use crate::future::{Future, Promise};
use crate::time::sleep;

use std::time::Duration;

/// Races `future` against a timer of `duration`.
///
/// Settles with the future's outcome if it settles first, or fails with
/// [`Error::TimedOut`] and cancels the future if the timer fires first.
/// Canceling the returned future cancels both.
pub fn timeout<T>(duration: Duration, future: Future<T>) -> Future<T>
where
    T: Clone + Send + 'static,
{
    let timer = sleep(duration);

    let (inner, delay) = (future.clone(), timer.clone());
    let promise = Promise::with_cancel(move |_: &Promise<T>| {
        inner.cancel();
        delay.cancel();
    });
    let result = promise.future();

    {
        let promise = promise.clone();
        let timer = timer.clone();

        future.add_callback(move |settled| {
            timer.cancel();
            let _ = promise.complete(settled.outcome());
        });
    }

    timer.add_callback(move |fired| {
        if fired.is_canceled() {
            return;
        }

        let error = match fired.value() {
            Ok(()) => Error::TimedOut,
            Err(error) => error,
        };

        if promise.set_error(error).is_ok() {
            future.cancel();
        }
    });

    result
}
