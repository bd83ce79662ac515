//! # dbot-stream
//!
//! Keeps one chat message in sync with a growing text.
//!
//! - **[`MessageHandle`]** – owns the remote message: created by a send, then updated by edits.
//!   At most one remote call is in flight per handle; updates requested meanwhile are dropped
//!   unless they are *guaranteed*, in which case they run after the in-flight call settles.
//! - **[`run_stream_edit_loop`]** – feeds text deltas from a channel into non-guaranteed updates.
//! - **[`EditConfig`]** – minimum interval between remote calls and edit retry count.

mod coalescer;
mod config;
mod error;
mod retry;
mod stream_edit;

pub use coalescer::{MessageHandle, PendingEdit};
pub use config::{EditConfig, DEFAULT_MIN_EDIT_INTERVAL};
pub use error::CoalescerError;
pub use retry::{extract_retry_after_seconds, is_message_not_modified_error};
pub use stream_edit::{format_in_progress, run_stream_edit_loop};
