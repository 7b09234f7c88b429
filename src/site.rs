//! Call-site capture for chain nodes.
//!
//! A [`Site`] is the `(file, line, column, routine)` tuple recorded every time a
//! node is created or wrapped. File, line and column come from
//! `#[track_caller]`; the routine name is only known when the site is captured
//! by a macro ([`site!`](crate::site!), [`error!`](crate::error!),
//! [`wrap!`](crate::wrap!)) or through a closure marker
//! ([`Error::wrap_fn`](crate::Error::wrap_fn)). Sites without one print
//! [`UNKNOWN_ROUTINE`] in its place, so every rendered site has the same shape.

use core::fmt;
use core::panic::Location;

/// Where a node of an error chain was created or wrapped.
///
/// `Site` is `Copy` and never allocates: the location is a `'static` reference
/// compiled into the binary and the routine name is a `'static` type name.
///
/// ## Example
///
/// ```rust
/// use errchain::Site;
///
/// let site = Site::caller();
/// assert!(site.file().ends_with(".rs"));
/// assert_eq!(site.routine(), None);
///
/// let named = errchain::site!();
/// assert!(named.routine().is_some());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Site {
    location: &'static Location<'static>,
    routine: Option<&'static str>,
}

impl Site {
    /// Capture the caller's file, line and column, without a routine name.
    #[track_caller]
    #[inline]
    pub fn caller() -> Self {
        Self {
            location: Location::caller(),
            routine: None,
        }
    }

    /// Build a site from an existing location.
    #[inline]
    pub const fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            location,
            routine: None,
        }
    }

    /// Attach a routine name (a bare name or a `::`-separated path).
    #[inline]
    pub const fn with_routine(mut self, routine: &'static str) -> Self {
        self.routine = Some(routine);
        self
    }

    /// Capture the caller's location and name it after the function that
    /// encloses `marker`.
    ///
    /// Pass an empty closure `|| {}`; its type name includes the parent
    /// function path.
    #[track_caller]
    #[inline]
    pub fn caller_in<F: Fn()>(_marker: F) -> Self {
        let full_name = core::any::type_name::<F>();
        let name = full_name.strip_suffix("::{{closure}}").unwrap_or(full_name);
        Self::caller().with_routine(name)
    }

    /// Source file path as recorded by the compiler.
    #[inline]
    pub fn file(&self) -> &'static str {
        self.location.file()
    }

    /// 1-based line number.
    #[inline]
    pub fn line(&self) -> u32 {
        self.location.line()
    }

    /// 1-based column number.
    #[inline]
    pub fn column(&self) -> u32 {
        self.location.column()
    }

    /// The underlying compiler location.
    #[inline]
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Short routine name: the last path segment that is not a closure.
    ///
    /// `my_crate::db::load::{{closure}}` yields `load`.
    pub fn routine(&self) -> Option<&'static str> {
        self.routine.map(short_name)
    }

    /// Full routine path as captured, if any.
    #[inline]
    pub fn routine_path(&self) -> Option<&'static str> {
        self.routine
    }
}

/// Last meaningful segment of a type-name path.
fn short_name(path: &'static str) -> &'static str {
    path.rsplit("::")
        .find(|seg| !seg.is_empty() && !seg.starts_with("{{"))
        .unwrap_or(path)
}

/// Printed in place of the routine name when none was captured.
pub const UNKNOWN_ROUTINE: &str = "?";

impl fmt::Display for Site {
    /// `routine (file:line)`; the routine is `?` when unknown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routine = self.routine().unwrap_or(UNKNOWN_ROUTINE);
        write!(f, "{} ({}:{})", routine, self.file(), self.line())
    }
}

impl fmt::Debug for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Site")
            .field("file", &self.file())
            .field("line", &self.line())
            .field("column", &self.column())
            .field("routine", &self.routine_path())
            .finish()
    }
}

impl From<&'static Location<'static>> for Site {
    #[inline]
    fn from(location: &'static Location<'static>) -> Self {
        Self::from_location(location)
    }
}

/// Capture a [`Site`] at the macro call expression, including the name of the
/// enclosing function.
///
/// ```rust
/// fn load_config() -> errchain::Site {
///     errchain::site!()
/// }
///
/// assert_eq!(load_config().routine(), Some("load_config"));
/// ```
#[macro_export]
macro_rules! site {
    () => {{
        fn __errchain_here() {}
        let path = ::core::any::type_name_of_val(&__errchain_here);
        let path = match path.strip_suffix("::__errchain_here") {
            ::core::option::Option::Some(p) => p,
            ::core::option::Option::None => path,
        };
        $crate::Site::caller().with_routine(path)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_skips_closures() {
        assert_eq!(short_name("a::b::load"), "load");
        assert_eq!(short_name("a::b::load::{{closure}}"), "load");
        assert_eq!(short_name("a::b::load::{{closure}}::{{closure}}"), "load");
        assert_eq!(short_name("main"), "main");
    }

    #[test]
    fn caller_has_no_routine() {
        let site = Site::caller();
        assert!(site.file().ends_with("site.rs"));
        assert_eq!(site.routine(), None);
        let expected = alloc::format!("? ({}:{})", site.file(), site.line());
        assert_eq!(alloc::format!("{}", site), expected);
    }

    #[test]
    fn macro_names_enclosing_fn() {
        fn parse_header() -> Site {
            crate::site!()
        }
        let site = parse_header();
        assert_eq!(site.routine(), Some("parse_header"));
        assert!(site.routine_path().is_some_and(|p| p.ends_with("parse_header")));
    }

    #[test]
    fn caller_in_names_enclosing_fn() {
        fn open_socket() -> Site {
            Site::caller_in(|| {})
        }
        assert_eq!(open_socket().routine(), Some("open_socket"));
    }

    #[test]
    fn from_location_keeps_position() {
        let loc = Location::caller();
        let site = Site::from(loc).with_routine("a::b::flush");
        assert_eq!(site.line(), loc.line());
        assert_eq!(site.column(), loc.column());
        assert_eq!(site.location(), loc);
        assert_eq!(site.routine(), Some("flush"));
        assert_eq!(site.routine_path(), Some("a::b::flush"));
    }

    #[test]
    fn display_with_routine() {
        let site = Site::caller().with_routine("func1");
        let expected = alloc::format!("func1 ({}:{})", site.file(), site.line());
        assert_eq!(alloc::format!("{}", site), expected);
    }
}
