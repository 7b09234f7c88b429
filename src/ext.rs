//! Extension traits for propagating chains through `Result`s.
//!
//! - [`ResultExt`]: call `.wrap()` on `Result<T, Error>` to add a frame
//! - [`ErrorExt`]: call `.start_chain(code)` on any `Display` error
//! - [`ResultStartExt`]: call `.start_chain(code)` on `Result<T, E>`

use alloc::string::ToString;
use core::fmt;

use crate::{Error, Site};

// ============================================================================
// ResultExt - wrapping on Result<T, Error>
// ============================================================================

/// Extension trait for wrapping the error side of a `Result<T, Error>`.
///
/// `Ok` values pass through untouched and nothing is allocated.
///
/// ## Example
///
/// ```rust
/// use errchain::{Error, ResultExt, Result};
///
/// fn inner() -> Result<u32> {
///     Err(Error::new(3, "no such key"))
/// }
///
/// fn outer() -> Result<u32> {
///     let v = inner().wrap()?;
///     Ok(v + 1)
/// }
///
/// let err = outer().unwrap_err();
/// assert_eq!(err.depth(), 2);
/// assert_eq!(err.code(), 3);
/// ```
pub trait ResultExt<T> {
    /// Wrap the error with the caller's location.
    #[track_caller]
    fn wrap(self) -> Result<T, Error>;

    /// Wrap the error, naming the frame after the function enclosing `marker`.
    ///
    /// Pass an empty closure `|| {}`.
    #[track_caller]
    fn wrap_fn<F: Fn()>(self, marker: F) -> Result<T, Error>;

    /// Wrap the error with an explicit routine label.
    #[track_caller]
    fn wrap_named(self, name: &'static str) -> Result<T, Error>;

    /// Wrap the error at an explicit site.
    fn wrap_at(self, site: Site) -> Result<T, Error>;

    /// The chain's code, or `None` on `Ok`.
    fn err_code(&self) -> Option<i32>;
}

impl<T> ResultExt<T> for Result<T, Error> {
    #[track_caller]
    #[inline]
    fn wrap(self) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.wrap()),
        }
    }

    #[track_caller]
    #[inline]
    fn wrap_fn<F: Fn()>(self, marker: F) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.wrap_fn(marker)),
        }
    }

    #[track_caller]
    #[inline]
    fn wrap_named(self, name: &'static str) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.wrap_named(name)),
        }
    }

    #[inline]
    fn wrap_at(self, site: Site) -> Result<T, Error> {
        self.map_err(|e| e.wrap_at(site))
    }

    #[inline]
    fn err_code(&self) -> Option<i32> {
        self.as_ref().err().map(Error::code)
    }
}

// ============================================================================
// ErrorExt - starting a chain from a foreign error
// ============================================================================

/// Start a chain from any error type, using its `Display` text as the message.
///
/// ```rust
/// use errchain::ErrorExt;
///
/// let parse = "x".parse::<u8>().unwrap_err();
/// let err = parse.start_chain(22);
/// assert_eq!(err.code(), 22);
/// assert_eq!(err.message(), "invalid digit found in string");
/// ```
pub trait ErrorExt: Sized {
    /// Create a root node with `code` and this value's `Display` text.
    #[track_caller]
    fn start_chain(self, code: i32) -> Error;
}

impl<E: fmt::Display> ErrorExt for E {
    #[track_caller]
    #[inline]
    fn start_chain(self, code: i32) -> Error {
        Error::new(code, self.to_string())
    }
}

// ============================================================================
// ResultStartExt - starting a chain on Result<T, E>
// ============================================================================

/// Start a chain on the error side of a `Result<T, E>`.
///
/// The message is only rendered on `Err`.
pub trait ResultStartExt<T> {
    /// Convert `Err(e)` into a root [`Error`] with `code`.
    #[track_caller]
    fn start_chain(self, code: i32) -> Result<T, Error>;
}

impl<T, E: fmt::Display> ResultStartExt<T> for Result<T, E> {
    #[track_caller]
    #[inline]
    fn start_chain(self, code: i32) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.start_chain(code)),
        }
    }
}
