use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Failed to persist session: {0:#}")]
    Storage(anyhow::Error),

    #[error("Failed to serialize user: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Storage(err)
    }
}

impl AuthError {
    /// True when the server rejected the credential (HTTP 401)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AuthError::Api(ApiError::Unauthorized))
    }
}
