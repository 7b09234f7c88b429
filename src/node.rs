//! The [`Error`] chain node.
//!
//! An `Error` is one link of an owned chain. The root link is created where
//! the failure happened; every frame that propagates the failure wraps it,
//! adding its own [`Site`] and taking ownership of the inner link. Code and
//! message are shared by the whole chain.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::any::Any;
use core::cell::OnceCell;
use core::fmt;
use core::mem::size_of;

use crate::Site;
use crate::format::TraceDisplay;
use crate::mem;

/// Result alias whose error is an [`Error`] chain. `Result` with no arguments
/// is the plain "did it fail" return type.
pub type Result<T = (), E = Error> = core::result::Result<T, E>;

/// The success sentinel: no failure, nothing to wrap or release.
///
/// ```rust
/// use errchain::{NOERROR, Result};
///
/// fn check() -> Result {
///     NOERROR
/// }
///
/// assert!(check().is_ok());
/// ```
pub const NOERROR: Result = Ok(());

/// One node of an owned error chain.
///
/// ## Ownership
///
/// `Error` is not `Clone`. [`wrap`](Self::wrap) consumes the node it wraps, so
/// a chain always has exactly one owner and is freed exactly once, when the
/// outermost node is dropped or [`release`](Self::release)d. Dropping walks
/// the chain iteratively, so very long chains don't recurse.
///
/// `Error` is `Send` but not `Sync`: a chain may move between threads, but the
/// format cache is not synchronized.
///
/// ## Example
///
/// ```rust
/// use errchain::{error, wrap, Result};
///
/// fn read_block() -> Result {
///     Err(error!(5, "short read: {} of {} bytes", 12, 512))
/// }
///
/// fn load() -> Result {
///     read_block().map_err(|e| wrap!(e))
/// }
///
/// let err = load().unwrap_err();
/// assert_eq!(err.code(), 5);
/// assert_eq!(err.message(), "short read: 12 of 512 bytes");
/// assert_eq!(err.depth(), 2);
/// assert!(err.format().starts_with("short read: 12 of 512 bytes; at load ("));
/// ```
pub struct Error {
    node: Box<Node>,
}

struct Node {
    code: i32,
    message: Arc<str>,
    site: Site,
    formatted: OnceCell<String>,
    user_data: Option<Box<dyn Any + Send>>,
    previous: Option<Error>,
}

impl Node {
    fn new(code: i32, message: Arc<str>, site: Site, previous: Option<Error>) -> Box<Self> {
        mem::charge(size_of::<Node>());
        Box::new(Self {
            code,
            message,
            site,
            formatted: OnceCell::new(),
            user_data: None,
            previous,
        })
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut bytes = size_of::<Node>();
        if let Some(text) = self.formatted.get() {
            bytes += text.len();
        }
        // Last holder of the message pays for it.
        if Arc::strong_count(&self.message) == 1 {
            bytes += self.message.len();
        }
        mem::refund(bytes);
    }
}

// ============================================================================
// Create / Wrap
// ============================================================================

impl Error {
    /// Create a root node, capturing the caller's file, line and column.
    ///
    /// Use [`error!`](crate::error!) to also record the enclosing function
    /// name and to format the message in place.
    #[track_caller]
    #[inline]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self::new_at(code, message, Site::caller())
    }

    /// Create a root node at an explicit site.
    pub fn new_at(code: i32, message: impl Into<String>, site: Site) -> Self {
        let message: Arc<str> = Arc::from(message.into());
        mem::charge(message.len());

        #[cfg(feature = "tracing")]
        tracing::trace!(
            code,
            file = site.file(),
            line = site.line(),
            msg = &*message,
            "error created"
        );

        Self {
            node: Node::new(code, message, site, None),
        }
    }

    /// Wrap this node, recording the caller's file, line and column.
    ///
    /// The returned node owns `self`. Code and message are carried over
    /// without being re-rendered.
    #[track_caller]
    #[inline]
    #[must_use = "the wrapped chain is dropped immediately"]
    pub fn wrap(self) -> Self {
        self.wrap_at(Site::caller())
    }

    /// Wrap this node, naming the site after the function enclosing `marker`.
    ///
    /// Pass an empty closure `|| {}`.
    ///
    /// ```rust
    /// use errchain::Error;
    ///
    /// fn open_db() -> Error {
    ///     Error::new(2, "missing file").wrap_fn(|| {})
    /// }
    ///
    /// assert_eq!(open_db().site().routine(), Some("open_db"));
    /// ```
    #[track_caller]
    #[inline]
    #[must_use = "the wrapped chain is dropped immediately"]
    pub fn wrap_fn<F: Fn()>(self, marker: F) -> Self {
        self.wrap_at(Site::caller_in(marker))
    }

    /// Wrap this node with an explicit routine label.
    #[track_caller]
    #[inline]
    #[must_use = "the wrapped chain is dropped immediately"]
    pub fn wrap_named(self, name: &'static str) -> Self {
        self.wrap_at(Site::caller().with_routine(name))
    }

    /// Wrap this node at an explicit site.
    #[must_use = "the wrapped chain is dropped immediately"]
    pub fn wrap_at(self, site: Site) -> Self {
        let code = self.node.code;
        let message = Arc::clone(&self.node.message);

        #[cfg(feature = "tracing")]
        tracing::trace!(code, file = site.file(), line = site.line(), "error wrapped");

        Self {
            node: Node::new(code, message, site, Some(self)),
        }
    }
}

// ============================================================================
// Inspection
// ============================================================================

impl Error {
    /// Caller-defined classification, identical on every node of the chain.
    #[inline]
    pub fn code(&self) -> i32 {
        self.node.code
    }

    /// Check the chain's code.
    #[inline]
    pub fn is(&self, code: i32) -> bool {
        self.node.code == code
    }

    /// The message rendered when the root was created.
    #[inline]
    pub fn message(&self) -> &str {
        &self.node.message
    }

    /// Length of the message in bytes.
    #[inline]
    pub fn message_len(&self) -> usize {
        self.node.message.len()
    }

    /// Where this node was created or wrapped.
    #[inline]
    pub fn site(&self) -> &Site {
        &self.node.site
    }

    /// The node this one wraps, or `None` on the root.
    #[inline]
    pub fn previous(&self) -> Option<&Error> {
        self.node.previous.as_ref()
    }

    /// True if this node was created rather than wrapped.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.node.previous.is_none()
    }

    /// The node where the failure originated.
    pub fn root(&self) -> &Error {
        let mut cur = self;
        while let Some(prev) = cur.previous() {
            cur = prev;
        }
        cur
    }

    /// Number of nodes from this one down to the root, inclusive.
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// Iterate over nodes, this one first, root last.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// Iterate over the sites of the chain, this node's first.
    pub fn sites(&self) -> impl Iterator<Item = &Site> + '_ {
        self.chain().map(Error::site)
    }

    /// Drop this node and return the one it wraps.
    ///
    /// Returns `None` (and frees the node) if this is the root.
    pub fn into_previous(mut self) -> Option<Error> {
        self.node.previous.take()
    }
}

// ============================================================================
// User data
// ============================================================================

impl Error {
    /// Attach an opaque value to this node, replacing any previous one.
    ///
    /// The crate never reads it. It lives on this node only, not the chain.
    pub fn set_user_data<T: Any + Send>(&mut self, data: T) {
        self.node.user_data = Some(Box::new(data));
    }

    /// Builder form of [`set_user_data`](Self::set_user_data).
    #[must_use]
    pub fn with_user_data<T: Any + Send>(mut self, data: T) -> Self {
        self.set_user_data(data);
        self
    }

    /// Borrow the attached value if it is a `T`.
    pub fn user_data<T: Any>(&self) -> Option<&T> {
        // Deref to the trait object; `Box<dyn Any>` is itself `Any`.
        self.node.user_data.as_deref()?.downcast_ref()
    }

    /// True if a value is attached, whatever its type.
    pub fn has_user_data(&self) -> bool {
        self.node.user_data.is_some()
    }

    /// Detach the value if it is a `T`; a value of another type stays attached.
    pub fn take_user_data<T: Any + Send>(&mut self) -> Option<T> {
        match self.node.user_data.take()?.downcast::<T>() {
            Ok(data) => Some(*data),
            Err(other) => {
                self.node.user_data = Some(other);
                None
            }
        }
    }
}

// ============================================================================
// Format / Release
// ============================================================================

impl Error {
    /// Render the chain as `message; at site; at site; ...;`, outermost first.
    ///
    /// The text is computed on the first call and cached on this node;
    /// later calls return the same buffer.
    pub fn format(&self) -> &str {
        self.node.formatted.get_or_init(|| {
            let text = self.trace().to_string();
            mem::charge(text.len());
            text
        })
    }

    /// True once [`format`](Self::format) has been called on this node.
    #[inline]
    pub fn is_formatted(&self) -> bool {
        self.node.formatted.get().is_some()
    }

    /// The chain trace as a `Display` value, without caching.
    pub fn trace(&self) -> TraceDisplay<'_> {
        TraceDisplay::new(self)
    }

    /// Free this node and every node it wraps.
    ///
    /// Same as dropping; spelled out for call sites that handle a failure and
    /// discard it. With the `tracing` feature this is the call that emits the
    /// release event; a plain drop is silent.
    #[inline]
    pub fn release(self) {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            code = self.code(),
            file = self.site().file(),
            line = self.site().line(),
            depth = self.depth(),
            "error released"
        );

        drop(self);
    }
}

/// Release an optional chain. `None` is a no-op.
#[inline]
pub fn release(err: Option<Error>) {
    if let Some(err) = err {
        err.release();
    }
}

impl Drop for Error {
    fn drop(&mut self) {
        let mut next = self.node.previous.take();
        while let Some(mut err) = next {
            next = err.node.previous.take();
        }
    }
}

// ============================================================================
// Chain iterator
// ============================================================================

/// Iterator over the nodes of a chain, outermost first.
///
/// Created by [`Error::chain`].
#[derive(Clone)]
pub struct Chain<'a> {
    next: Option<&'a Error>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Error;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        self.next = cur.previous();
        Some(cur)
    }
}

impl core::iter::FusedIterator for Chain<'_> {}

// ============================================================================
// Trait impls
// ============================================================================

impl fmt::Display for Error {
    /// The message only. Use `{:#}` (or [`Error::format`]) for the full trace.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            fmt::Display::fmt(&self.trace(), f)
        } else {
            f.write_str(self.message())
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error({}): {}", self.code(), self.message())?;
        for node in self.chain() {
            let site = node.site();
            writeln!(f, "    at {}:{}", site.file(), site.line())?;
            if let Some(routine) = site.routine_path() {
                writeln!(f, "       ╰─ in {}", routine)?;
            }
        }
        Ok(())
    }
}

impl core::error::Error for Error {}
