//! Find-all primitive over escaped text.
//!
//! Patterns emulate lazy `open(.+?)close` matching (dot matches newlines) with an optional
//! negative lookahead right after the opening delimiter. Matches are leftmost-first and
//! non-overlapping.

/// One match: byte range in the searched text plus its capture groups.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Match<'t> {
    pub start: usize,
    pub end: usize,
    pub groups: Vec<&'t str>,
}

pub(crate) trait Pattern {
    /// Leftmost match starting at or after byte offset `from`.
    fn find_at<'t>(&self, text: &'t str, from: usize) -> Option<Match<'t>>;
}

/// `open (.+?) close`, rejecting an opening delimiter immediately followed by `not_followed_by`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Delimited {
    pub open: &'static str,
    pub close: &'static str,
    pub not_followed_by: Option<&'static str>,
}

impl Pattern for Delimited {
    fn find_at<'t>(&self, text: &'t str, from: usize) -> Option<Match<'t>> {
        let mut search = from;
        while let Some(offset) = text[search..].find(self.open) {
            let start = search + offset;
            let body = start + self.open.len();
            let rest = &text[body..];
            if self.not_followed_by.is_some_and(|r| rest.starts_with(r)) {
                search = start + char_len_at(text, start);
                continue;
            }
            // Later starts only shrink the window, so a missing close ends the search.
            let (_, close_at) = lazy_until(text, body, self.close)?;
            return Some(Match {
                start,
                end: close_at + self.close.len(),
                groups: vec![&text[body..close_at]],
            });
        }
        None
    }
}

/// `\[(.+?)\]\((.+?)\)` over escaped text: label and url captures.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Link;

const LINK_OPEN: &str = "\\[";
const LINK_MIDDLE: &str = "\\]\\(";
const LINK_CLOSE: &str = "\\)";

impl Pattern for Link {
    fn find_at<'t>(&self, text: &'t str, from: usize) -> Option<Match<'t>> {
        let start = from + text[from..].find(LINK_OPEN)?;
        let label_start = start + LINK_OPEN.len();
        let (label, middle_at) = lazy_until(text, label_start, LINK_MIDDLE)?;
        let url_start = middle_at + LINK_MIDDLE.len();
        let (url, close_at) = lazy_until(text, url_start, LINK_CLOSE)?;
        Some(Match {
            start,
            end: close_at + LINK_CLOSE.len(),
            groups: vec![label, url],
        })
    }
}

/// Lazy `(.+?)delimiter` starting at `body`: at least one char, then the nearest `delimiter`.
/// Returns the capture and the byte offset of the delimiter.
fn lazy_until<'t>(text: &'t str, body: usize, delimiter: &str) -> Option<(&'t str, usize)> {
    let first = text[body..].chars().next()?;
    let search = body + first.len_utf8();
    let at = search + text[search..].find(delimiter)?;
    Some((&text[body..at], at))
}

fn char_len_at(text: &str, at: usize) -> usize {
    text[at..].chars().next().map_or(1, char::len_utf8)
}

/// Replaces every non-overlapping match of `pattern` with `replacement(&match)`.
pub(crate) fn replace_all<P, F>(text: &str, pattern: &P, mut replacement: F) -> String
where
    P: Pattern,
    F: FnMut(&Match<'_>) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    while let Some(m) = pattern.find_at(text, cursor) {
        out.push_str(&text[cursor..m.start]);
        out.push_str(&replacement(&m));
        cursor = m.end;
    }
    out.push_str(&text[cursor..]);
    out
}
