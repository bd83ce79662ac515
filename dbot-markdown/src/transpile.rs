//! Loose Markdown → MarkdownV2.
//!
//! The input is escaped first, so every marker is inert. Constructs are then recognised from their
//! escaped delimiters in two levels, verbatim constructs before styles, and each match is swapped
//! for a placeholder token. All tokens are expanded once at the end.

use crate::escape::escape;
use crate::pattern::{replace_all, Delimited, Link};
use crate::placeholder::PlaceholderTable;

/// A construct whose content is copied unchanged.
struct Verbatim {
    pattern: Delimited,
    wrap: &'static str,
}

/// A styling construct; its content is transpiled recursively.
struct Style {
    pattern: Delimited,
    open: &'static str,
    close: &'static str,
}

const CODE_BLOCK: Verbatim = Verbatim {
    pattern: Delimited {
        open: "\\`\\`\\`",
        close: "\\`\\`\\`",
        not_followed_by: None,
    },
    wrap: "```",
};

const MONOSPACE: Verbatim = Verbatim {
    pattern: Delimited {
        open: "\\`",
        close: "\\`",
        not_followed_by: None,
    },
    wrap: "`",
};

/// Precedence order: doubled markers before single ones.
const STYLES: [Style; 6] = [
    // **bold**
    Style {
        pattern: Delimited {
            open: "\\*\\*",
            close: "\\*\\*",
            not_followed_by: Some("\\*"),
        },
        open: "*",
        close: "*",
    },
    // __bold__
    Style {
        pattern: Delimited {
            open: "\\_\\_",
            close: "\\_\\_",
            not_followed_by: Some("\\_"),
        },
        open: "*",
        close: "*",
    },
    // *italic*
    Style {
        pattern: Delimited {
            open: "\\*",
            close: "\\*",
            not_followed_by: Some("\\*"),
        },
        open: "_",
        close: "_",
    },
    // _italic_
    Style {
        pattern: Delimited {
            open: "\\_",
            close: "\\_",
            not_followed_by: Some("\\_"),
        },
        open: "_",
        close: "_",
    },
    // ~~strikethrough~~
    Style {
        pattern: Delimited {
            open: "\\~\\~",
            close: "\\~\\~",
            not_followed_by: Some("\\~"),
        },
        open: "~",
        close: "~",
    },
    // <u>underline</u>; only `>` is reserved, so the tag escapes to `<u\>`
    Style {
        pattern: Delimited {
            open: "<u\\>",
            close: "</u\\>",
            not_followed_by: None,
        },
        open: "__",
        close: "__",
    },
];

/// Converts loosely formatted Markdown into escaped MarkdownV2.
///
/// Literal punctuation comes out escaped; recognised constructs come out with real delimiters.
/// Unbalanced markers are left escaped.
///
/// ```
/// use dbot_markdown::transpile;
///
/// assert_eq!(transpile("**_a_**"), "*_a_*");
/// assert_eq!(transpile("1.5 + 2"), "1\\.5 \\+ 2");
/// ```
pub fn transpile(text: &str) -> String {
    let escaped = escape(text);
    let Some(mut table) = PlaceholderTable::for_text(&escaped) else {
        return escaped;
    };
    let protected = resolve_verbatim(&escaped, &mut table);
    let styled = resolve_styles(&protected, &mut table);
    table.expand(styled)
}

/// Level A: code blocks, inline code, links.
fn resolve_verbatim(text: &str, table: &mut PlaceholderTable) -> String {
    let mut text = text.to_string();
    for construct in [&CODE_BLOCK, &MONOSPACE] {
        text = replace_all(&text, &construct.pattern, |m| {
            table.register(format!("{0}{1}{0}", construct.wrap, m.groups[0]))
        });
    }
    replace_all(&text, &Link, |m| {
        let label = resolve_styles(m.groups[0], table);
        table.register(format!("[{}]({})", label, m.groups[1]))
    })
}

/// Level B: bold, italic, strikethrough, underline; recursive on each capture.
fn resolve_styles(text: &str, table: &mut PlaceholderTable) -> String {
    let mut text = text.to_string();
    for style in &STYLES {
        text = apply_style(&text, style, table);
    }
    text
}

fn apply_style(text: &str, style: &Style, table: &mut PlaceholderTable) -> String {
    replace_all(text, &style.pattern, |m| {
        let inner = resolve_styles(m.groups[0], table);
        table.register(format!("{}{}{}", style.open, inner, style.close))
    })
}
