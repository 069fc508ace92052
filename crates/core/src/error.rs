use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpantopoError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("inventory lookup failed: {0}")]
    Lookup(String),

    #[error("sink error: {0}")]
    Sink(String),
}

pub type Result<T> = std::result::Result<T, SpantopoError>;
