//! Two-pointer glob matching over pre-split path segments.
//!
//! The segment walker treats `**` as "zero or more path components" with a
//! single saved backtrack point; the character matcher does the same for `*`
//! within one component. Neither layer ever crosses a `/`, and neither
//! compiles to a regular expression.

use crate::pattern::Segment;

/// Match compiled pattern segments against path segments.
///
/// `DoubleStar` matches zero or more consecutive path segments; a `Literal`
/// matches exactly one component via [`match_segment`].
pub(crate) fn match_segments(pat: &[Segment], path: &[&[u8]]) -> bool {
    let mut px = 0;
    let mut sx = 0;
    // Backtrack point for the most recent ** we passed.
    let mut star: Option<(usize, usize)> = None;

    while sx < path.len() {
        match pat.get(px) {
            Some(Segment::DoubleStar) => {
                // Try consuming zero path segments first.
                star = Some((px, sx));
                px += 1;
            }
            Some(Segment::Literal(glob)) if match_segment(glob, path[sx]) => {
                px += 1;
                sx += 1;
            }
            _ => match star {
                // Extend the last ** by one more path segment.
                Some((star_px, star_sx)) => {
                    star = Some((star_px, star_sx + 1));
                    sx = star_sx + 1;
                    px = star_px + 1;
                }
                None => return false,
            },
        }
    }

    // Whatever pattern remains must be all **.
    pat[px..].iter().all(|s| matches!(s, Segment::DoubleStar))
}

/// Match a single path component against one glob segment.
///
/// Handles `*`, `?`, `[...]` and `\`-escapes with a single saved backtrack
/// point for `*`.
pub(crate) fn match_segment(glob: &[u8], text: &[u8]) -> bool {
    let mut gx = 0;
    let mut tx = 0;
    let mut star: Option<(usize, usize)> = None;

    while tx < text.len() {
        let mut advanced = false;
        if gx < glob.len() {
            match glob[gx] {
                b'\\' if gx + 1 < glob.len() => {
                    if text[tx] == glob[gx + 1] {
                        gx += 2;
                        tx += 1;
                        advanced = true;
                    }
                }
                b'?' => {
                    gx += 1;
                    tx += 1;
                    advanced = true;
                }
                b'*' => {
                    // Try matching zero characters first.
                    star = Some((gx, tx));
                    gx += 1;
                    advanced = true;
                }
                b'[' => match match_bracket(glob, gx, text[tx]) {
                    Some((true, after)) => {
                        gx = after;
                        tx += 1;
                        advanced = true;
                    }
                    Some((false, _)) => {}
                    None => {
                        // No closing ]; the [ is a literal byte.
                        if text[tx] == b'[' {
                            gx += 1;
                            tx += 1;
                            advanced = true;
                        }
                    }
                },
                ch => {
                    if text[tx] == ch {
                        gx += 1;
                        tx += 1;
                        advanced = true;
                    }
                }
            }
        }
        if advanced {
            continue;
        }

        // Mismatch: give the last * one more character, or fail.
        match star {
            Some((star_gx, star_tx)) => {
                star = Some((star_gx, star_tx + 1));
                tx = star_tx + 1;
                gx = star_gx + 1;
            }
            None => return false,
        }
    }

    while glob.get(gx) == Some(&b'*') {
        gx += 1;
    }
    gx == glob.len()
}

/// Evaluate the bracket expression starting at `glob[pos]` (the `[`) against
/// `ch`. Returns `(matched, position_after_closing_bracket)`, or `None` when
/// the bracket never closes.
fn match_bracket(glob: &[u8], pos: usize, ch: u8) -> Option<(bool, usize)> {
    let mut i = pos + 1;
    if i >= glob.len() {
        return None;
    }

    let negate = glob[i] == b'!' || glob[i] == b'^';
    if negate {
        i += 1;
    }

    let mut matched = false;
    // ] is a literal member when it is the first char after [, [! or [^.
    let mut first = true;

    while i < glob.len() {
        if glob[i] == b']' && !first {
            return Some((matched != negate, i + 1));
        }
        first = false;

        // POSIX character class: [:name:]
        if glob[i] == b'[' && i + 1 < glob.len() && glob[i + 1] == b':' {
            if let Some(end) = find_class_end(glob, i + 2) {
                if posix_class_matches(&glob[i + 2..end], ch) {
                    matched = true;
                }
                i = end + 2;
                continue;
            }
            // No closing :]; fall through and treat the [ as a member.
        }

        let lo = if glob[i] == b'\\' && i + 1 < glob.len() {
            i += 1;
            glob[i]
        } else {
            glob[i]
        };
        i += 1;

        // Range lo-hi, unless the - closes the bracket.
        if i + 1 < glob.len() && glob[i] == b'-' && glob[i + 1] != b']' {
            i += 1;
            let hi = if glob[i] == b'\\' && i + 1 < glob.len() {
                i += 1;
                glob[i]
            } else {
                glob[i]
            };
            i += 1;
            if ch >= lo && ch <= hi {
                matched = true;
            }
        } else if ch == lo {
            matched = true;
        }
    }

    None
}

/// Find the `:` of the closing `:]` at or after `start`.
pub(crate) fn find_class_end(glob: &[u8], start: usize) -> Option<usize> {
    let mut i = start;
    while i + 1 < glob.len() {
        if glob[i] == b':' && glob[i + 1] == b']' {
            return Some(i);
        }
        i += 1;
    }
    None
}

pub(crate) fn is_posix_class_name(name: &[u8]) -> bool {
    matches!(
        name,
        b"alnum"
            | b"alpha"
            | b"blank"
            | b"cntrl"
            | b"digit"
            | b"graph"
            | b"lower"
            | b"print"
            | b"punct"
            | b"space"
            | b"upper"
            | b"xdigit"
    )
}

/// Byte-level, ASCII-only POSIX class membership, matching git's wildmatch.
fn posix_class_matches(name: &[u8], ch: u8) -> bool {
    match name {
        b"alnum" => ch.is_ascii_alphanumeric(),
        b"alpha" => ch.is_ascii_alphabetic(),
        b"blank" => ch == b' ' || ch == b'\t',
        b"cntrl" => ch.is_ascii_control(),
        b"digit" => ch.is_ascii_digit(),
        b"graph" => ch.is_ascii_graphic(),
        b"lower" => ch.is_ascii_lowercase(),
        b"print" => ch.is_ascii_graphic() || ch == b' ',
        b"punct" => ch.is_ascii_punctuation(),
        b"space" => matches!(ch, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c),
        b"upper" => ch.is_ascii_uppercase(),
        b"xdigit" => ch.is_ascii_hexdigit(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use bstr::BString;

    use super::*;

    fn segs(pat: &[&str]) -> Vec<Segment> {
        pat.iter()
            .map(|s| {
                if *s == "**" {
                    Segment::DoubleStar
                } else {
                    Segment::Literal(BString::from(*s))
                }
            })
            .collect()
    }

    fn walk(pat: &[&str], path: &[&str]) -> bool {
        let pat = segs(pat);
        let path: Vec<&[u8]> = path.iter().map(|s| s.as_bytes()).collect();
        match_segments(&pat, &path)
    }

    #[test]
    fn literal_segments() {
        assert!(walk(&["foo"], &["foo"]));
        assert!(!walk(&["foo"], &["bar"]));
        assert!(walk(&["foo", "bar"], &["foo", "bar"]));
        assert!(!walk(&["foo", "bar"], &["foo"]));
        assert!(!walk(&["foo"], &["foo", "bar"]));
    }

    #[test]
    fn doublestar_zero_or_more() {
        assert!(walk(&["**", "foo"], &["foo"]));
        assert!(walk(&["**", "foo"], &["a", "foo"]));
        assert!(walk(&["**", "foo"], &["a", "b", "foo"]));
        assert!(!walk(&["**", "foo"], &["a", "b", "foobar"]));
        assert!(walk(&["foo", "**"], &["foo"]));
        assert!(walk(&["foo", "**"], &["foo", "a", "b"]));
        assert!(walk(&["a", "**", "b"], &["a", "b"]));
        assert!(walk(&["a", "**", "b"], &["a", "x", "y", "b"]));
        assert!(!walk(&["a", "**", "b"], &["a", "x", "y", "c"]));
    }

    #[test]
    fn doublestar_backtracks_to_later_match() {
        // The first candidate for ** must be abandoned to find the real one.
        assert!(walk(&["**", "b", "c"], &["b", "x", "b", "c"]));
        assert!(walk(&["**", "b", "**", "c"], &["a", "b", "b", "d", "c"]));
        assert!(!walk(&["**", "b", "c"], &["b", "x", "b", "d"]));
    }

    #[test]
    fn pure_doublestar() {
        assert!(walk(&["**"], &["a"]));
        assert!(walk(&["**"], &["a", "b", "c"]));
        assert!(walk(&["**", "**"], &["a", "b"]));
    }

    #[test]
    fn single_segment_literals() {
        assert!(match_segment(b"foo", b"foo"));
        assert!(!match_segment(b"foo", b"bar"));
        assert!(!match_segment(b"fo", b"foo"));
        assert!(match_segment(b"", b""));
    }

    #[test]
    fn single_segment_star() {
        assert!(match_segment(b"*", b"foo"));
        assert!(match_segment(b"*", b""));
        assert!(match_segment(b"f*", b"foo"));
        assert!(!match_segment(b"*f", b"foo"));
        assert!(match_segment(b"*ob*a*r*", b"foobar"));
        assert!(match_segment(b"*ab", b"aaaaaaabababab"));
        assert!(match_segment(b"foo*", b"foo"));
    }

    #[test]
    fn single_segment_question() {
        assert!(match_segment(b"???", b"foo"));
        assert!(!match_segment(b"??", b"foo"));
        assert!(!match_segment(b"?", b""));
        assert!(match_segment(b"?o?", b"foo"));
    }

    #[test]
    fn consecutive_stars_behave_as_one() {
        assert!(match_segment(b"***foo", b"foo"));
        assert!(match_segment(b"***foo", b"afoo"));
        assert!(!match_segment(b"***foo", b"foobar"));
        assert!(match_segment(b"foo**bar", b"foobazbar"));
    }

    #[test]
    fn escapes() {
        assert!(match_segment(b"foo\\*", b"foo*"));
        assert!(!match_segment(b"foo\\*bar", b"foobar"));
        assert!(match_segment(b"f\\\\oo", b"f\\oo"));
        assert!(match_segment(b"\\??\\?b", b"?a?b"));
        assert!(match_segment(b"\\a\\b\\c", b"abc"));
        assert!(match_segment(b"\\[ab]", b"[ab]"));
        // A trailing backslash matches itself.
        assert!(match_segment(b"foo\\", b"foo\\"));
        assert!(!match_segment(b"foo\\", b"foo"));
    }

    #[test]
    fn bracket_basics() {
        assert!(match_segment(b"[abc]", b"a"));
        assert!(match_segment(b"[abc]", b"c"));
        assert!(!match_segment(b"[abc]", b"d"));
        assert!(match_segment(b"t[a-g]n", b"ten"));
        assert!(!match_segment(b"t[!a-g]n", b"ten"));
        assert!(match_segment(b"t[!a-g]n", b"ton"));
        assert!(match_segment(b"t[^a-g]n", b"ton"));
        assert!(match_segment(b"*[al]?", b"ball"));
        assert!(!match_segment(b"[ten]", b"ten"));
        assert!(match_segment(b"a[c-c]rt", b"acrt"));
        assert!(!match_segment(b"a[c-c]st", b"acrt"));
    }

    #[test]
    fn bracket_closing_bracket_first() {
        assert!(match_segment(b"a[]]b", b"a]b"));
        assert!(match_segment(b"a[]-]b", b"a-b"));
        assert!(match_segment(b"a[]-]b", b"a]b"));
        assert!(!match_segment(b"a[]-]b", b"aab"));
        assert!(match_segment(b"a[]a-]b", b"aab"));
        assert!(match_segment(b"]", b"]"));
        assert!(!match_segment(b"[!]-]", b"]"));
        assert!(match_segment(b"[!]-]", b"a"));
        assert!(match_segment(b"[[]ab]", b"[ab]"));
    }

    #[test]
    fn bracket_escapes_and_ranges() {
        assert!(match_segment(b"[\\-_]", b"-"));
        assert!(match_segment(b"[\\-_]", b"_"));
        assert!(!match_segment(b"[\\-_]", b"a"));
        assert!(match_segment(b"[\\]]", b"]"));
        assert!(match_segment(b"[\\\\]", b"\\"));
        assert!(!match_segment(b"[!\\\\]", b"\\"));
        assert!(match_segment(b"[!\\\\]", b"a"));
        assert!(match_segment(b"[A-\\\\]", b"G"));
        assert!(match_segment(b"[\\\\-^]", b"]"));
        assert!(!match_segment(b"[\\\\-^]", b"["));
        assert!(match_segment(b"[\\1-\\3]", b"2"));
        assert!(match_segment(b"[\\1-\\3]", b"3"));
        assert!(!match_segment(b"[\\1-\\3]", b"4"));
        assert!(match_segment(b"[[-\\]]", b"\\"));
        assert!(match_segment(b"[[-\\]]", b"["));
        assert!(match_segment(b"[[-\\]]", b"]"));
        assert!(!match_segment(b"[[-\\]]", b"-"));
    }

    #[test]
    fn bracket_dash_edge_cases() {
        assert!(match_segment(b"[-]", b"-"));
        assert!(match_segment(b"[--A]", b"-"));
        assert!(match_segment(b"[--A]", b"5"));
        assert!(match_segment(b"[,-.]", b"-"));
        assert!(!match_segment(b"[,-.]", b"+"));
        assert!(match_segment(b"[---]", b"-"));
        assert!(match_segment(b"[------]", b"-"));
        assert!(match_segment(b"[a-e-n]", b"-"));
        assert!(!match_segment(b"[a-e-n]", b"j"));
        assert!(match_segment(b"[!------]", b"a"));
        assert!(match_segment(b"[ --]", b" "));
        assert!(match_segment(b"[ --]", b"$"));
        assert!(match_segment(b"[ --]", b"-"));
        assert!(!match_segment(b"[ --]", b"0"));
        // Caret not at the start is a literal member.
        assert!(match_segment(b"[a^bc]", b"^"));
    }

    #[test]
    fn malformed_bracket_is_literal() {
        assert!(match_segment(b"file[.txt", b"file[.txt"));
        assert!(!match_segment(b"file[.txt", b"filea.txt"));
        assert!(match_segment(b"a[!", b"a[!"));
    }

    #[test]
    fn posix_classes() {
        assert!(match_segment(b"[[:alpha:]]", b"a"));
        assert!(match_segment(b"[[:alpha:]]", b"Z"));
        assert!(!match_segment(b"[[:alpha:]]", b"1"));
        assert!(match_segment(b"[[:digit:]]", b"5"));
        assert!(!match_segment(b"[[:digit:]]", b"a"));
        assert!(match_segment(b"[[:alnum:]]", b"5"));
        assert!(!match_segment(b"[[:alnum:]]", b"!"));
        assert!(match_segment(b"[[:blank:]]", b"\t"));
        assert!(match_segment(b"[[:space:]]", b"\x0b"));
        assert!(match_segment(b"[[:cntrl:]]", b"\x7f"));
        assert!(match_segment(b"[[:xdigit:]]", b"f"));
        assert!(match_segment(b"[[:xdigit:]]", b"D"));
        assert!(match_segment(b"[[:upper:]]", b"A"));
        assert!(!match_segment(b"[[:upper:]]", b"a"));
        assert!(match_segment(b"[[:print:]]", b" "));
        assert!(!match_segment(b"[[:graph:]]", b" "));
        assert!(match_segment(b"[[:punct:]]", b"."));
        assert!(!match_segment(b"[[:punct:]]", b"a"));
    }

    #[test]
    fn posix_classes_combined() {
        assert!(match_segment(
            b"[[:alpha:]][[:digit:]][[:upper:]]",
            b"a1B"
        ));
        assert!(match_segment(b"[[:digit:][:upper:][:space:]]", b"A"));
        assert!(match_segment(b"[[:digit:][:upper:][:space:]]", b"1"));
        assert!(match_segment(b"[[:digit:][:upper:][:space:]]", b" "));
        assert!(!match_segment(b"[[:digit:][:upper:][:space:]]", b"a"));
        assert!(!match_segment(b"[[:digit:][:upper:][:space:]]", b"."));
        assert!(match_segment(b"[[:digit:][:punct:][:space:]]", b"."));
        // Ranges and classes mix in one bracket.
        assert!(match_segment(b"[a-c[:digit:]x-z]", b"5"));
        assert!(match_segment(b"[a-c[:digit:]x-z]", b"b"));
        assert!(match_segment(b"[a-c[:digit:]x-z]", b"y"));
        assert!(!match_segment(b"[a-c[:digit:]x-z]", b"q"));
        // Negated class combination.
        assert!(match_segment(
            b"[^[:alnum:][:alpha:][:blank:][:cntrl:][:digit:][:lower:][:space:][:upper:][:xdigit:]]",
            b"."
        ));
    }

    #[test]
    fn backtracking_stress() {
        assert!(match_segment(
            b"-*-*-*-*-*-*-12-*-*-*-m-*-*-*",
            b"-adobe-courier-bold-o-normal--12-120-75-75-m-70-iso8859-1"
        ));
        assert!(!match_segment(
            b"-*-*-*-*-*-*-12-*-*-*-m-*-*-*",
            b"-adobe-courier-bold-o-normal--12-120-75-75-X-70-iso8859-1"
        ));
    }
}
