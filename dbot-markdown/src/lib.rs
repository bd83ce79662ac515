//! # dbot-markdown
//!
//! Converts the loosely formatted Markdown produced by chat models into Telegram MarkdownV2.
//!
//! - [`escape`]: backslash-escapes every reserved MarkdownV2 character.
//! - [`transpile`]: escapes the whole text, then recovers bold, italic, strikethrough, underline,
//!   inline code, code blocks and links from the escaped form. Unbalanced markers stay escaped.
//!
//! Both functions are pure and never fail.

mod escape;
mod pattern;
mod placeholder;
mod transpile;

pub use escape::{escape, is_reserved, RESERVED_CHARS};
pub use transpile::transpile;
