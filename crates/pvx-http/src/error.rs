use thiserror::Error;

/// Invalid [`crate::ClusterConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid cluster endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("missing cluster setting: {0}")]
    Missing(&'static str),

    #[error("failed to build http client: {0}")]
    Client(String),
}
