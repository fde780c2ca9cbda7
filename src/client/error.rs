use thiserror::Error;

/// Everything that can turn a test case into a failure verdict.
///
/// Transport errors, bad status codes, and malformed bodies are all
/// recoverable at the runner level: the case is logged as failed and the run
/// moves on.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("expected status {expected}, got {actual} ({body})")]
    UnexpectedStatus {
        expected: u16,
        actual: u16,
        body: String,
    },

    #[error("response body is not valid JSON: {0}")]
    NotJson(String),

    #[error("missing field `{0}` in response body")]
    MissingField(String),

    #[error("field `{field}`: {detail}")]
    BadField { field: String, detail: String },

    #[error("response shape mismatch: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A case depends on state an earlier case failed to capture.
    #[error("no data available: {0}")]
    Prereq(&'static str),

    #[error("{0}")]
    Assertion(String),
}
