//! Common error types for EEGWA

use thiserror::Error;

/// Common result type for EEGWA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across EEGWA crates
#[derive(Error, Debug)]
pub enum Error {
    /// Request never produced a response (connection refused, DNS, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Server answered with a non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Where the presentation layer should send the user after a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureRoute {
    /// 401: session is gone, sign in again
    SignIn,
    /// 403: recording belongs to someone else
    Forbidden,
    /// 500: backend is unhealthy
    NetworkIssues,
}

impl FailureRoute {
    /// Route path used by the web front end
    pub fn path(&self) -> &'static str {
        match self {
            FailureRoute::SignIn => "/sign-in",
            FailureRoute::Forbidden => "/403-forbidden",
            FailureRoute::NetworkIssues => "/network-issues",
        }
    }
}

impl Error {
    /// True for failures of the remote call itself (no response, or an error status)
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Status { .. })
    }

    /// HTTP status of the failed call, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify an HTTP failure into the view the user should be redirected to
    pub fn failure_route(&self) -> Option<FailureRoute> {
        match self.status()? {
            401 => Some(FailureRoute::SignIn),
            403 => Some(FailureRoute::Forbidden),
            500 => Some(FailureRoute::NetworkIssues),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
