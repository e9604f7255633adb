//! Gitignore pattern matching.
//!
//! Decides whether a relative path inside a working tree is ignored, using
//! the same rules as `git check-ignore`: layered pattern sources
//! (global excludes, `.git/info/exclude`, root and nested `.gitignore`
//! files), last-match-wins evaluation with `!` re-inclusion, and git's
//! wildmatch glob dialect (`*`, `?`, `**`, bracket expressions with POSIX
//! classes, backslash escapes).
//!
//! The matcher operates on slash-separated paths relative to the repository
//! root. Matching is byte-wise over UTF-8; no filesystem access happens on
//! the query path.
//!
//! ```no_run
//! use bstr::BStr;
//! use git_ignore::IgnoreStack;
//!
//! let mut stack = IgnoreStack::new();
//! stack.add_patterns(b"*.log\n!important.log\n", BStr::new(""), "");
//! assert!(stack.is_ignored_path(BStr::new("debug.log"), false));
//! assert!(!stack.is_ignored_path(BStr::new("important.log"), false));
//! ```

mod pattern;
mod stack;
mod walk;
mod wildmatch;

// Re-export the byte-string types used at the API boundary.
pub use bstr::{BStr, BString, ByteSlice};

pub use error::IgnoreError;
pub use stack::{IgnoreStack, MatchDetail, PatternError};
pub use walk::walk;

mod error {
    /// Errors from the filesystem-facing loading operations. Pattern
    /// compilation faults are not errors; they accumulate on
    /// [`IgnoreStack::errors`](crate::IgnoreStack::errors).
    #[derive(Debug, thiserror::Error)]
    pub enum IgnoreError {
        #[error(transparent)]
        Io(#[from] std::io::Error),
    }
}
