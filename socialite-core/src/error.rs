use thiserror::Error;

/// Errors that can occur while running a social login flow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A caller-supplied value was missing or malformed (empty access token,
    /// empty config key, unsupported driver name, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The `state` echoed by the provider did not match the one stored in the session.
    #[error("Invalid state: the callback state does not match the session state")]
    InvalidState,
    /// The HTTP exchange with the provider failed.
    #[error("Transport error: {0}")]
    Transport(String),
    /// The provider answered with a body that could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),
    /// The provider answered with an explicit error payload.
    #[error("Provider error: {0}")]
    Provider(String),
    /// The operation is not supported by this adapter.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::Parse(err.to_string())
    }
}
