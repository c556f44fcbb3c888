use crate::error::{Error, Result};
use crate::future::core::Outcome;
use crate::future::{Future, Value};

/// One unit of suspension yielded by a [`Coroutine`](super::Coroutine).
///
/// `T` is the sequence's output type, carried by [`Step::Return`].
#[derive(Debug)]
pub enum Step<T> {
    /// Suspend until this future settles.
    Single(Future<Value>),

    /// Suspend until every future settles; resumes with a `Vec<Value>` in
    /// the same order, or with the first failure.
    Join(Vec<Future<Value>>),

    /// Finish now with a value, without awaiting anything.
    Return(T),

    /// Finish now without a value.
    Done,
}

impl<T> Step<T> {
    /// Awaits a typed future.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// Ok(Step::wait(sleep(Duration::from_millis(200))))
    /// ```
    pub fn wait<U>(future: Future<U>) -> Self
    where
        U: Clone + Send + Sync + 'static,
    {
        Step::Single(future.erase())
    }

    /// Awaits a collection of typed futures as one step.
    pub fn join<U, I>(futures: I) -> Self
    where
        U: Clone + Send + Sync + 'static,
        I: IntoIterator<Item = Future<U>>,
    {
        Step::Join(futures.into_iter().map(|future| future.erase()).collect())
    }
}

/// What a coroutine is resumed with.
#[derive(Debug, Clone)]
pub enum Resume {
    /// First call; nothing has been awaited yet.
    Start,

    /// The previous step succeeded with this value.
    Value(Value),

    /// The previous step failed. Returning the error from `resume`
    /// (for example through `?`) fails the whole sequence; handling it
    /// lets the sequence continue.
    Error(Error),
}

impl Resume {
    /// Returns `true` for the first call.
    pub fn is_start(&self) -> bool {
        matches!(self, Resume::Start)
    }

    /// Returns the previous step's value, or its error.
    ///
    /// [`Resume::Start`] yields the unit value.
    pub fn into_value(self) -> Result<Value> {
        match self {
            Resume::Start => Ok(Value::unit()),
            Resume::Value(value) => Ok(value),
            Resume::Error(error) => Err(error),
        }
    }

    /// Returns the previous step's value read as `T`.
    pub fn get<T: Clone + 'static>(self) -> Result<T> {
        self.into_value()?.downcast()
    }

    /// Returns the values of a [`Step::Join`], in order.
    pub fn into_values(self) -> Result<Vec<Value>> {
        self.get::<Vec<Value>>()
    }
}

impl From<Outcome<Value>> for Resume {
    fn from(outcome: Outcome<Value>) -> Self {
        match outcome {
            Outcome::Value(value) => Resume::Value(value),
            Outcome::Error(error) => Resume::Error(error),
            Outcome::Canceled => Resume::Error(Error::Canceled),
        }
    }
}
