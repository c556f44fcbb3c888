use crate::error::{Error, Result};
use crate::future::{Future, Value};

use std::any;
use std::marker::PhantomData;

/// Typed position inside a tuple join.
///
/// Used by the [`join!`](crate::join!) expansion to read each member's
/// value back with its original type.
pub struct Slot<T>(PhantomData<fn() -> T>);

impl<T: Clone + 'static> Slot<T> {
    /// Captures the value type of `future`.
    pub fn of(_future: &Future<T>) -> Self {
        Slot(PhantomData)
    }

    /// Takes the next joined value and reads it as `T`.
    pub fn take<I>(&self, values: &mut I) -> Result<T>
    where
        I: Iterator<Item = Value>,
    {
        values
            .next()
            .ok_or(Error::TypeMismatch {
                expected: any::type_name::<T>(),
            })?
            .downcast()
    }
}
