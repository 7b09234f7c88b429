//! Convenient re-exports for common usage.
//!
//! ```rust
//! use errchain::prelude::*;
//!
//! fn inner() -> Result {
//!     Err(Error::new(4, "timed out"))
//! }
//!
//! fn outer() -> Result {
//!     inner().wrap()?;
//!     NOERROR
//! }
//!
//! assert_eq!(outer().unwrap_err().depth(), 2);
//! ```

pub use crate::{Error, ErrorExt, NOERROR, Result, ResultExt, ResultStartExt};
pub use crate::{error, try_wrap, wrap};
