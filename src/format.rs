//! Single-line chain rendering.
//!
//! [`TraceDisplay`] writes the text that [`Error::format`] caches:
//!
//! ```text
//! something bad happened; at func3 (src/io.rs:30); at func2 (src/io.rs:20); at func1 (src/io.rs:10);
//! ```
//!
//! One segment per node, outermost first. The message is written once, before
//! the first segment.

use core::fmt;

use crate::{Error, Site};

/// `Display` adapter for an error chain. Created by [`Error::trace`].
///
/// Unlike [`Error::format`] this renders on every use and caches nothing.
#[derive(Clone, Copy)]
pub struct TraceDisplay<'a> {
    err: &'a Error,
}

impl<'a> TraceDisplay<'a> {
    pub(crate) fn new(err: &'a Error) -> Self {
        Self { err }
    }
}

impl fmt::Display for TraceDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.err.message())?;
        let mut sep = "; at ";
        for node in self.err.chain() {
            f.write_str(sep)?;
            write_segment(f, node.site())?;
            sep = " at ";
        }
        Ok(())
    }
}

impl fmt::Debug for TraceDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn write_segment(f: &mut fmt::Formatter<'_>, site: &Site) -> fmt::Result {
    write!(f, "{};", site)
}
