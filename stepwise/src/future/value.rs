use crate::error::{Error, Result};

use std::any::{self, Any};
use std::fmt;
use std::sync::Arc;

/// A type-erased, cheaply clonable step result.
///
/// Successive steps of a [`Sequence`](crate::Sequence) produce values of
/// different types; they are handed back to the coroutine as `Value`s and
/// read with [`downcast`](Self::downcast).
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    /// Wraps `value`. Wrapping a `Value` returns it unchanged.
    pub fn new<T>(value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        if let Some(value) = (&value as &dyn Any).downcast_ref::<Value>() {
            return value.clone();
        }

        Self {
            inner: Arc::new(value),
            type_name: any::type_name::<T>(),
        }
    }

    /// The value produced by steps that carry no data.
    pub fn unit() -> Self {
        Self::new(())
    }

    /// Returns `true` if the wrapped value has type `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrows the wrapped value as `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Clones the wrapped value out as `T`.
    ///
    /// Fails with [`Error::TypeMismatch`] if the value has another type.
    pub fn downcast<T: Clone + 'static>(&self) -> Result<T> {
        self.downcast_ref::<T>()
            .cloned()
            .ok_or(Error::TypeMismatch {
                expected: any::type_name::<T>(),
            })
    }

    /// Name of the wrapped type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", self.type_name)
    }
}
