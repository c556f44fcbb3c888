use std::fmt;
use std::sync::Arc;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while settling, observing or composing futures.
///
/// `Error` is cheap to clone: a settled outcome is shared by every holder of
/// the future, and each of them may ask for it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The operation failed; carries a human-readable description.
    #[error("{0}")]
    Failed(String),

    /// The future was canceled before producing a value.
    #[error("future canceled")]
    Canceled,

    /// A [`timeout`](crate::time::timeout) deadline elapsed first.
    #[error("deadline elapsed")]
    TimedOut,

    /// Every promise handle was dropped while the future was still pending.
    #[error("promise dropped before being settled")]
    BrokenPromise,

    /// A promise was settled a second time.
    #[error("promise already settled")]
    AlreadySettled,

    /// A runtime facility was used outside of a runtime context.
    #[error("no runtime available in the current context")]
    NoRuntime,

    /// The runtime shut down before the operation could run.
    #[error("runtime is shutting down")]
    Shutdown,

    /// A type-erased value was read back as the wrong type.
    #[error("value has unexpected type, expected `{expected}`")]
    TypeMismatch { expected: &'static str },

    /// User code panicked while running inside a callback or coroutine.
    #[error("panicked: {0}")]
    Panicked(String),

    /// A structured error raised by user code.
    #[error(transparent)]
    Custom(Arc<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Creates an [`Error::Failed`] from any displayable message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Error::Failed(message.to_string())
    }

    /// Wraps a structured error, keeping it available for downcasting.
    pub fn custom<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Custom(Arc::new(error))
    }

    /// Returns `true` for [`Error::Canceled`].
    pub fn is_canceled(&self) -> bool {
        matches!(self, Error::Canceled)
    }

    /// Attempts to view a [`Error::Custom`] payload as a concrete type.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Error::Custom(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Builds an [`Error::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };

        Error::Panicked(message)
    }
}
