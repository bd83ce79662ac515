//! Protect-and-restore table used while rewriting text in several passes.
//!
//! A resolved span is replaced by an opaque token `<open><index><close>` whose marker characters
//! are private-use code points absent from the working text, so a token can neither collide with
//! natural text nor be matched by a later pass. One table is shared by a whole transpilation,
//! including its recursive calls, which keeps every index unique.

use std::ops::RangeInclusive;

/// Private-use planes searched for marker characters, BMP first.
const MARKER_RANGES: [RangeInclusive<u32>; 2] = [0xE000..=0xF8FF, 0xF0000..=0xFFFFD];

#[derive(Debug)]
pub(crate) struct PlaceholderTable {
    open: char,
    close: char,
    entries: Vec<(String, String)>,
}

impl PlaceholderTable {
    /// Builds an empty table whose markers do not occur in `text`.
    /// Returns `None` only if `text` already uses every private-use code point.
    pub(crate) fn for_text(text: &str) -> Option<Self> {
        let mut markers = MARKER_RANGES
            .iter()
            .flat_map(|range| range.clone())
            .filter_map(char::from_u32)
            .filter(|c| !text.contains(*c));
        let open = markers.next()?;
        let close = markers.next()?;
        Some(Self {
            open,
            close,
            entries: Vec::new(),
        })
    }

    /// Stores `replacement` and returns the token to put in its place.
    pub(crate) fn register(&mut self, replacement: String) -> String {
        let token = format!("{}{}{}", self.open, self.entries.len(), self.close);
        self.entries.push((token.clone(), replacement));
        token
    }

    /// Substitutes every token, last registered first.
    ///
    /// An outer construct is registered after the constructs nested in it, so its replacement
    /// (which still contains their tokens) is put back before those tokens are looked up.
    pub(crate) fn expand(self, mut text: String) -> String {
        for (token, replacement) in self.entries.into_iter().rev() {
            text = text.replace(&token, &replacement);
        }
        text
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}
