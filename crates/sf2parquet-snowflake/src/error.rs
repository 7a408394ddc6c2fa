use thiserror::Error;

/// Errors from the Snowflake session client.
#[derive(Debug, Error)]
pub enum SnowflakeError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("login rejected: {0}")]
    Login(String),

    #[error("statement failed: {0}")]
    Statement(String),

    #[error("unexpected response: {0}")]
    Protocol(String),

    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
}
