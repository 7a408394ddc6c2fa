use thiserror::Error;

/// Errors from the Salesforce client.
#[derive(Debug, Error)]
pub enum SalesforceError {
    /// SOAP login rejected (bad credentials, locked out, wrong domain).
    #[error("login failed: {0}")]
    Login(String),

    /// Error returned by the REST API, e.g. INVALID_TYPE for a bad
    /// object name.
    #[error("[{error_code}] {message}")]
    Api { error_code: String, message: String },

    #[error("unexpected response: {0}")]
    Protocol(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
}
