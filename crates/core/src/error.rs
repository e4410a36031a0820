use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}
