use crate::runtime::handle::Handle;

use std::cell::RefCell;

thread_local! {
    /// Handle to the runtime entered on this thread, if any.
    ///
    /// Installed on every worker thread for its whole lifetime, and on
    /// user threads for the duration of [`Handle::enter`].
    pub(crate) static CURRENT: RefCell<Option<Handle>> = const { RefCell::new(None) };
}

/// Restores the previous context when dropped, even on unwind.
struct Restore(Option<Handle>);

impl Drop for Restore {
    fn drop(&mut self) {
        let previous = self.0.take();
        CURRENT.with(|current| current.replace(previous));
    }
}

/// Runs `f` with `handle` installed as the current runtime.
///
/// The previous context, if any, is restored afterwards, which allows
/// nesting.
pub(crate) fn enter_context<R>(handle: Handle, f: impl FnOnce() -> R) -> R {
    let previous = CURRENT.with(|current| current.replace(Some(handle)));
    let _restore = Restore(previous);

    f()
}

/// Returns a clone of the current handle.
pub(crate) fn current() -> Option<Handle> {
    CURRENT.with(|current| current.borrow().clone())
}
