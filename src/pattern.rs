//! Pattern line compilation.
//!
//! One ignore line becomes a [`Pattern`]: a list of `/`-delimited segments
//! plus the flags that drive matching (negation, directory-only, anchoring,
//! scope prefix). `**` is represented structurally so the matcher never has
//! to re-derive it from text.

use bstr::{BStr, BString, ByteSlice};

use crate::wildmatch::{find_class_end, is_posix_class_name};

/// A single `/`-delimited piece of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    /// `**`: matches zero or more consecutive path segments.
    DoubleStar,
    /// One glob matching exactly one path component (`*`, `?`, `[...]`,
    /// `\`-escapes allowed).
    Literal(BString),
}

/// The compiled form of one ignore line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Pattern {
    pub(crate) segments: Vec<Segment>,
    /// The line began with `!`; a winning match re-includes the path.
    pub(crate) negate: bool,
    /// The line ended with an unescaped `/`; matches directories only.
    pub(crate) dir_only: bool,
    /// Leading `/` or any non-trailing `/`: matched relative to the scope
    /// directory rather than floating to any depth.
    pub(crate) anchored: bool,
    /// At least one segment is not `**`.
    pub(crate) has_concrete: bool,
    /// Directory scope for patterns from nested ignore files; empty at root.
    pub(crate) prefix: BString,
    /// The original line after trimming, for diagnostics.
    pub(crate) text: BString,
    /// Source file identifier; empty for programmatic patterns.
    pub(crate) source: String,
    /// 1-based line number within the source.
    pub(crate) line: usize,
    /// Fast-reject: the last path segment must end with this.
    pub(crate) literal_suffix: BString,
}

/// Why a line did not compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reject {
    /// Nothing left after stripping markers; dropped without diagnostics.
    Empty,
    /// Structurally invalid; reported through the stack's error list.
    Invalid(String),
}

/// Strip unescaped trailing spaces.
///
/// Tabs are kept (git only strips spaces). A `\` immediately before a space
/// escapes it, so `foo\ ` keeps the trailing `\ `.
pub(crate) fn trim_trailing_spaces(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && line[end - 1] == b' ' {
        if end >= 2 && line[end - 2] == b'\\' {
            break;
        }
        end -= 1;
    }
    &line[..end]
}

/// Compile one trimmed, non-comment line into a [`Pattern`].
pub(crate) fn compile(
    line: &BStr,
    scope_dir: &BStr,
    source: &str,
    line_no: usize,
) -> Result<Pattern, Reject> {
    let mut rest: &[u8] = line.as_bytes();

    let negate = rest.first() == Some(&b'!');
    if negate {
        rest = &rest[1..];
    }

    // `\#` and `\!` start a literal `#` / `!`.
    if rest.len() >= 2 && rest[0] == b'\\' && (rest[1] == b'#' || rest[1] == b'!') {
        rest = &rest[1..];
    }

    if rest.is_empty() || rest == b"/" {
        return Err(Reject::Empty);
    }

    let mut dir_only = false;
    if rest.len() > 1 && rest[rest.len() - 1] == b'/' {
        dir_only = true;
        rest = &rest[..rest.len() - 1];
    }

    let had_leading_slash = rest[0] == b'/';
    if had_leading_slash {
        rest = &rest[1..];
        if rest.is_empty() {
            return Err(Reject::Empty);
        }
    }

    let raw_segs: Vec<&[u8]> = rest.split(|&b| b == b'/').collect();

    // A pattern with no slash anywhere floats to any depth.
    let anchored = had_leading_slash || raw_segs.len() > 1;

    let mut segments = Vec::with_capacity(raw_segs.len() + 2);
    if !anchored {
        segments.push(Segment::DoubleStar);
    }
    for raw in raw_segs {
        if raw == b"**" {
            // Consecutive ** collapse to one.
            if segments.last() != Some(&Segment::DoubleStar) {
                segments.push(Segment::DoubleStar);
            }
        } else {
            segments.push(Segment::Literal(BString::from(raw)));
        }
    }

    for seg in &segments {
        if let Segment::Literal(raw) = seg {
            if let Some(message) = validate_brackets(raw) {
                return Err(Reject::Invalid(message));
            }
        }
    }

    // Implicit trailing ** so that matching `foo` also matches `foo/anything`.
    // Dir-only patterns handle descendants separately at match time.
    if !dir_only && segments.last() != Some(&Segment::DoubleStar) {
        segments.push(Segment::DoubleStar);
    }

    let has_concrete = segments.iter().any(|s| matches!(s, Segment::Literal(_)));
    let literal_suffix = extract_literal_suffix(&segments);

    Ok(Pattern {
        segments,
        negate,
        dir_only,
        anchored,
        has_concrete,
        prefix: BString::from(scope_dir.as_bytes()),
        text: BString::from(line.as_bytes()),
        source: source.to_string(),
        line: line_no,
        literal_suffix,
    })
}

/// Check that bracket expressions close properly and only use known POSIX
/// class names. An unclosed `[` is fine (it matches literally); an unknown
/// class name is the one structural error git diagnoses.
fn validate_brackets(glob: &[u8]) -> Option<String> {
    let mut i = 0;
    while i < glob.len() {
        if glob[i] == b'\\' && i + 1 < glob.len() {
            i += 2;
            continue;
        }
        if glob[i] != b'[' {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        if j < glob.len() && (glob[j] == b'!' || glob[j] == b'^') {
            j += 1;
        }
        if j < glob.len() && glob[j] == b']' {
            // ] as the first member is literal
            j += 1;
        }
        while j < glob.len() && glob[j] != b']' {
            if glob[j] == b'\\' && j + 1 < glob.len() {
                j += 2;
                continue;
            }
            if glob[j] == b'[' && j + 1 < glob.len() && glob[j + 1] == b':' {
                if let Some(end) = find_class_end(glob, j + 2) {
                    let name = &glob[j + 2..end];
                    if !is_posix_class_name(name) {
                        return Some(format!("unknown POSIX class [:{}:]", name.as_bstr()));
                    }
                    j = end + 2;
                    continue;
                }
            }
            j += 1;
        }
        if j >= glob.len() {
            // No closing ]; the [ is literal.
            i += 1;
            continue;
        }
        i = j + 1;
    }
    None
}

/// Extract the literal trailing portion of the last concrete segment, for
/// fast rejection. `*.log` yields `.log`, `test_*.go` yields `.go`. Empty
/// when the suffix would contain wildcards, brackets, or escapes.
fn extract_literal_suffix(segments: &[Segment]) -> BString {
    let last = segments.iter().rev().find_map(|s| match s {
        Segment::Literal(raw) => Some(raw.as_slice()),
        Segment::DoubleStar => None,
    });
    let Some(last) = last else {
        return BString::default();
    };
    let Some(star) = last.iter().rposition(|&b| b == b'*') else {
        return BString::default();
    };
    let suffix = &last[star + 1..];
    if suffix.is_empty() || suffix.iter().any(|b| matches!(b, b'*' | b'?' | b'[' | b'\\')) {
        return BString::default();
    }
    BString::from(suffix)
}
