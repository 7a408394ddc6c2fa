// Invocation result object.

use serde::Serialize;

/// Returned to the invoker: numeric status code plus a human-readable
/// message. 200 covers runs with per-object failures; 500 means the run
/// aborted before processing anything.
#[derive(Debug, Serialize)]
pub(crate) struct RunResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl RunResponse {
    pub fn completed(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: body.into(),
        }
    }

    pub fn failed(body: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            body: body.into(),
        }
    }
}
