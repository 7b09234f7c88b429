//! # errchain - owned error chains with call-site traces
//!
//! An [`Error`] records a numeric code, a message and the place it was created.
//! Each frame that can't handle it wraps it, adding its own location, so the
//! value that reaches the top is a chain with one node per propagating frame:
//!
//! ```text
//! something bad happened; at func3 (src/io.rs:30); at func2 (src/io.rs:20); at func1 (src/io.rs:10);
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use errchain::{error, try_wrap, Result, NOERROR};
//!
//! fn func1() -> Result {
//!     Err(error!(0, "something bad happened"))
//! }
//!
//! fn func2() -> Result {
//!     try_wrap!(func1());
//!     NOERROR
//! }
//!
//! fn func3() -> Result {
//!     try_wrap!(func2());
//!     NOERROR
//! }
//!
//! let err = func3().unwrap_err();
//! assert_eq!(err.depth(), 3);
//! let text = err.format();
//! assert!(text.starts_with("something bad happened; at func3 ("));
//! assert!(text.ends_with(");"));
//! ```
//!
//! ## Operations
//!
//! | Operation | Use |
//! |-----------|-----|
//! | Create | [`error!`], [`Error::new`] |
//! | Wrap | [`wrap!`], [`try_wrap!`], [`Error::wrap`], [`ResultExt::wrap`] |
//! | Format | [`Error::format`] (cached), [`Error::trace`], `{:#}` |
//! | Release | drop, [`Error::release`], [`release`] |
//!
//! The macros capture the enclosing function name; the `#[track_caller]`
//! methods capture file, line and column only (use
//! [`wrap_fn(|| {})`](Error::wrap_fn) to add the name). A segment with no
//! name still has the full shape, with `?` as the routine:
//!
//! ```rust
//! use errchain::Error;
//!
//! let err = Error::new(2, "no name");
//! let site = err.site();
//! assert_eq!(err.format(), format!("no name; at ? ({}:{});", site.file(), site.line()));
//! ```
//!
//! ## Ownership
//!
//! A chain has exactly one owner. Wrapping moves the inner node into the new
//! one; dropping the outermost node frees everything. Code and message are
//! shared by the chain and never re-rendered.
//!
//! ## Features
//!
//! - `mem-usage`: [`mem::in_use`] reports the bytes held by chains on the
//!   current thread, for leak checks in tests.
//! - `tracing`: trace-level events on create, wrap and explicit release, each
//!   with `code`, `file` and `line` fields.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;
#[cfg(any(test, feature = "mem-usage"))]
extern crate std;

mod ext;
mod format;
pub mod mem;
mod node;
pub mod prelude;
mod site;

pub use node::{Chain, Error, NOERROR, Result, release};
pub use ext::{ErrorExt, ResultExt, ResultStartExt};
pub use format::TraceDisplay;
pub use site::{Site, UNKNOWN_ROUTINE};

/// Create a root [`Error`], formatting the message and capturing the call site
/// including the enclosing function name.
///
/// ```rust
/// fn open(path: &str) -> errchain::Error {
///     errchain::error!(2, "cannot open {}", path)
/// }
///
/// let err = open("/etc/app.toml");
/// assert_eq!(err.message(), "cannot open /etc/app.toml");
/// assert_eq!(err.site().routine(), Some("open"));
/// ```
#[macro_export]
macro_rules! error {
    ($code:expr, $($arg:tt)+) => {
        $crate::Error::new_at($code, $crate::__private::format!($($arg)+), $crate::site!())
    };
}

/// Wrap an [`Error`], capturing the call site including the enclosing
/// function name.
///
/// ```rust
/// use errchain::{error, wrap};
///
/// fn outer() -> errchain::Error {
///     wrap!(error!(1, "inner failure"))
/// }
///
/// let err = outer();
/// assert_eq!(err.depth(), 2);
/// assert_eq!(err.site().routine(), Some("outer"));
/// ```
#[macro_export]
macro_rules! wrap {
    ($err:expr) => {
        $crate::Error::wrap_at($err, $crate::site!())
    };
}

/// Evaluate a `Result<T, Error>`: yield `T` on `Ok`, or wrap the error at this
/// call site and return it.
///
/// The enclosing function must return `Result<_, Error>`.
///
/// ```rust
/// use errchain::{error, try_wrap, Result};
///
/// fn parse() -> Result<u32> {
///     Err(error!(7, "bad digit"))
/// }
///
/// fn load() -> Result<u32> {
///     let n = try_wrap!(parse());
///     Ok(n * 2)
/// }
///
/// assert_eq!(load().unwrap_err().depth(), 2);
/// ```
#[macro_export]
macro_rules! try_wrap {
    ($result:expr) => {
        match $result {
            ::core::result::Result::Ok(v) => v,
            ::core::result::Result::Err(err) => {
                return ::core::result::Result::Err($crate::wrap!(err));
            }
        }
    };
}

#[doc(hidden)]
pub mod __private {
    pub use alloc::format;
}
