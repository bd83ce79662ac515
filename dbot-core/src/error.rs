use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbotError {
    /// The transport rejected or failed a call.
    #[error("Bot error: {0}")]
    Bot(String),

    /// A streamed reply could not be delivered (the message was never created).
    #[error("Stream error: {0}")]
    Stream(String),
}

pub type Result<T> = std::result::Result<T, DbotError>;
