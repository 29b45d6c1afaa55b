use thiserror::Error;

/// All the ways things can go wrong in repomark
///
/// We use thiserror here because it generates the boilerplate for us.
/// Life's too short to manually implement Display and Error traits.
#[derive(Error, Debug)]
pub enum Error {
    /// The search endpoint answered, just not with a 2xx
    #[error("{0}")]
    ApiError(String),

    #[error("{0}")]
    NetworkError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] repomark_storage::StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<repomark_api::GitHubError> for Error {
    fn from(err: repomark_api::GitHubError) -> Self {
        use repomark_api::GitHubError;

        match err {
            GitHubError::Status { .. } | GitHubError::Parse(_) => Error::ApiError(err.to_string()),
            GitHubError::Network(_) | GitHubError::Client(_) => {
                Error::NetworkError(err.to_string())
            }
        }
    }
}
