use thiserror::Error;

/// Failure at the cluster API boundary.
///
/// `Rejected` replaces in-band error strings: the cluster answered, but
/// refused the request, so no asynchronous job exists.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("io error: {0}")]
    Io(String),
}

impl ClientError {
    /// Returns `true` if the cluster explicitly refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::Rejected { .. })
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Io(e.to_string())
    }
}
