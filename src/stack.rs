//! Layered gitignore pattern stack.
//!
//! Patterns are kept in insertion order across all ingestion calls; queries
//! walk the list newest-to-oldest so the last matching pattern decides the
//! outcome, which is how git resolves deny/re-include chains. Patterns from
//! nested ignore files carry a scope prefix and only apply beneath it.

use std::fmt;
use std::path::Path;

use bstr::{BStr, BString, ByteSlice};

use crate::pattern::{self, Pattern, Reject};
use crate::wildmatch;
use crate::IgnoreError;

/// A pattern line that could not be compiled.
///
/// Invalid patterns are skipped during matching; this record lets callers
/// detect and report them. The display form is
/// `<source>:<line>: invalid pattern: <text>: <message>`, with the
/// `<source>:` prefix omitted for programmatic patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    /// The original pattern text.
    pub pattern: BString,
    /// Source file path; empty for programmatic patterns.
    pub source: String,
    /// 1-based line number within the source.
    pub line: usize,
    pub message: String,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.source.is_empty() {
            write!(f, "{}:{}: ", self.source, self.line)?;
        }
        write!(f, "invalid pattern: {}: {}", self.pattern, self.message)
    }
}

impl std::error::Error for PatternError {}

/// Which pattern matched a path, and the resulting decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchDetail {
    /// The path should be ignored.
    pub ignored: bool,
    /// Some pattern matched; `false` means no pattern applied at all.
    pub matched: bool,
    /// Original pattern text, including any leading `!`.
    pub pattern: BString,
    /// File the pattern came from; empty for programmatic patterns.
    pub source: String,
    /// 1-based line number in `source`; 0 if no match.
    pub line: usize,
    /// The matching pattern was a negation.
    pub negate: bool,
}

/// Checks paths against gitignore rules collected from ignore files and
/// programmatic patterns, with last-match-wins semantics.
///
/// Paths use forward slashes and are relative to the repository root. The
/// explicit-flag query form ([`is_ignored_path`](Self::is_ignored_path)) is
/// canonical; [`is_ignored`](Self::is_ignored) derives the flag from a
/// trailing `/`.
///
/// A stack is safe to share across threads once ingestion is complete; do
/// not add patterns concurrently with matching.
#[derive(Debug, Clone, Default)]
pub struct IgnoreStack {
    patterns: Vec<Pattern>,
    errors: Vec<PatternError>,
}

impl IgnoreStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and append pattern lines, scoped to `scope_dir` (slash-form
    /// relative directory, empty for root-level patterns). `source`
    /// annotates diagnostics and may be empty.
    ///
    /// Later patterns take precedence over earlier ones, both across calls
    /// and within one buffer.
    pub fn add_patterns(&mut self, content: &[u8], scope_dir: &BStr, source: &str) {
        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = pattern::trim_trailing_spaces(raw);
            if line.is_empty() || line[0] == b'#' {
                continue;
            }
            match pattern::compile(line.as_bstr(), scope_dir, source, line_no) {
                Ok(p) => self.patterns.push(p),
                Err(Reject::Empty) => {}
                Err(Reject::Invalid(message)) => self.errors.push(PatternError {
                    pattern: BString::from(line),
                    source: source.to_string(),
                    line: line_no,
                    message,
                }),
            }
        }
    }

    /// Read an ignore file and append its patterns, scoped to `scope_dir`.
    /// A missing file is not an error.
    pub fn add_file(&mut self, path: &Path, scope_dir: &BStr) -> Result<(), IgnoreError> {
        let content = match std::fs::read(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(IgnoreError::Io(e)),
        };
        self.add_patterns(&content, scope_dir, &path.to_string_lossy());
        Ok(())
    }

    /// Pattern compilation errors accumulated across all ingestion calls.
    pub fn errors(&self) -> &[PatternError] {
        &self.errors
    }

    /// Number of compiled patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check whether a path is ignored, deriving the directory flag from a
    /// trailing `/` (e.g. `vendor/` queries the directory `vendor`).
    pub fn is_ignored(&self, rel_path: &BStr) -> bool {
        let (path, is_dir) = strip_dir_suffix(rel_path);
        self.is_ignored_path(path, is_dir)
    }

    /// Check whether a path is ignored, with an explicit directory flag.
    /// The path must not carry a trailing slash.
    pub fn is_ignored_path(&self, rel_path: &BStr, is_dir: bool) -> bool {
        let segs = split_segments(rel_path);
        self.last_match(&segs, is_dir).is_some_and(|p| !p.negate)
    }

    /// Like [`is_ignored`](Self::is_ignored), but report which pattern
    /// decided the outcome.
    pub fn match_detail(&self, rel_path: &BStr) -> MatchDetail {
        let (path, is_dir) = strip_dir_suffix(rel_path);
        self.match_detail_path(path, is_dir)
    }

    /// Like [`is_ignored_path`](Self::is_ignored_path), but report which
    /// pattern decided the outcome.
    pub fn match_detail_path(&self, rel_path: &BStr, is_dir: bool) -> MatchDetail {
        let segs = split_segments(rel_path);
        match self.last_match(&segs, is_dir) {
            Some(p) => MatchDetail {
                ignored: !p.negate,
                matched: true,
                pattern: p.text.clone(),
                source: p.source.clone(),
                line: p.line,
                negate: p.negate,
            },
            None => MatchDetail::default(),
        }
    }

    /// Newest-to-oldest scan for the first (i.e. last-inserted) pattern
    /// that matches.
    fn last_match(&self, path_segs: &[&[u8]], is_dir: bool) -> Option<&Pattern> {
        let last_seg = path_segs.last().copied().unwrap_or_default();
        self.patterns.iter().rev().find(|p| {
            if !p.literal_suffix.is_empty() && !last_seg.ends_with(&p.literal_suffix) {
                return false;
            }
            pattern_matches(p, path_segs, is_dir)
        })
    }
}

fn split_segments(path: &BStr) -> Vec<&[u8]> {
    path.as_bytes().split(|&b| b == b'/').collect()
}

fn strip_dir_suffix(path: &BStr) -> (&BStr, bool) {
    match path.as_bytes().strip_suffix(b"/") {
        Some(stripped) => (stripped.as_bstr(), true),
        None => (path, false),
    }
}

/// Check the compiled pattern against the path segments, applying the scope
/// prefix and the directory-only rules.
fn pattern_matches(p: &Pattern, path_segs: &[&[u8]], is_dir: bool) -> bool {
    let mut segs = path_segs;
    if !p.prefix.is_empty() {
        let prefix_segs: Vec<&[u8]> = p.prefix.split(|&b| b == b'/').collect();
        if segs.len() < prefix_segs.len() || segs[..prefix_segs.len()] != prefix_segs[..] {
            return false;
        }
        segs = &segs[prefix_segs.len()..];
    }

    if p.dir_only {
        if wildmatch::match_segments(&p.segments, segs) {
            // The pattern names this path exactly; it only applies to
            // directories.
            return is_dir;
        }
        // Descendant matching needs a concrete segment to identify the
        // ignored directory; pure ** dir-only patterns only match
        // directory paths directly.
        if !p.has_concrete {
            return false;
        }
        return (1..segs.len())
            .rev()
            .any(|end| wildmatch::match_segments(&p.segments, &segs[..end]));
    }

    wildmatch::match_segments(&p.segments, segs)
}
