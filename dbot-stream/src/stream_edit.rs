//! Stream-edit loop: consumes text deltas from a channel and pushes the accumulated text to a
//! [`MessageHandle`] as non-guaranteed updates.
//!
//! Deltas that arrive while an edit is in flight are only accumulated; the caller applies the
//! final text with a guaranteed update once the stream ends.

use tokio::sync::mpsc;
use tracing::debug;

use crate::coalescer::MessageHandle;

/// Text shown while the reply is still streaming: the content followed by the indicator.
pub fn format_in_progress(content: &str, indicator: &str) -> String {
    if indicator.is_empty() {
        content.to_string()
    } else {
        format!("{} {}", content, indicator)
    }
}

/// **Entry point.** Accumulates deltas from `rx` until the channel closes and returns the full text.
///
/// Call via `tokio::spawn(run_stream_edit_loop(handle.clone(), rx, indicator))`, then drop the
/// sender when the completion finishes.
pub async fn run_stream_edit_loop(
    handle: MessageHandle,
    mut rx: mpsc::UnboundedReceiver<String>,
    indicator: String,
) -> String {
    let mut content = String::new();
    while let Some(delta) = rx.recv().await {
        if delta.is_empty() {
            continue;
        }
        content.push_str(&delta);
        // Dropped by the handle if an edit is in flight.
        let _ = handle.update(format_in_progress(&content, &indicator), false);
    }
    debug!(
        chat_id = handle.chat().id,
        content_len = content.len(),
        "Stream closed"
    );
    content
}
