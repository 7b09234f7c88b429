//! Allocation ledger for leak checks.
//!
//! Every node, shared message and cached format string charges its size here
//! when it is created and refunds it when it is freed. The ledger is
//! thread-local so concurrently running tests don't see each other's chains.
//!
//! Only compiled in with the `mem-usage` feature (and always under `cfg(test)`);
//! otherwise [`charge`] and [`refund`] are empty and optimize away.
//!
//! ```rust,ignore
//! // Requires the `mem-usage` feature
//! let before = errchain::mem::in_use();
//! let err = errchain::error!(1, "disk full");
//! assert!(errchain::mem::in_use() > before);
//! drop(err);
//! assert_eq!(errchain::mem::in_use(), before);
//! ```

#[cfg(any(test, feature = "mem-usage"))]
mod ledger {
    use core::cell::Cell;

    std::thread_local! {
        static IN_USE: Cell<usize> = const { Cell::new(0) };
    }

    pub(crate) fn charge(bytes: usize) {
        IN_USE.with(|n| n.set(n.get() + bytes));
    }

    pub(crate) fn refund(bytes: usize) {
        IN_USE.with(|n| n.set(n.get().saturating_sub(bytes)));
    }

    /// Bytes currently held by error chains on this thread.
    pub fn in_use() -> usize {
        IN_USE.with(Cell::get)
    }
}

#[cfg(any(test, feature = "mem-usage"))]
pub use ledger::in_use;
#[cfg(any(test, feature = "mem-usage"))]
pub(crate) use ledger::{charge, refund};

#[cfg(not(any(test, feature = "mem-usage")))]
#[inline(always)]
pub(crate) fn charge(_bytes: usize) {}

#[cfg(not(any(test, feature = "mem-usage")))]
#[inline(always)]
pub(crate) fn refund(_bytes: usize) {}
