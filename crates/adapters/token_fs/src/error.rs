//! Token file errors.

use plugdash_domain::error::PlugDashError;

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    /// Reading, writing or removing the token file failed.
    #[error("token file error")]
    Io(#[from] std::io::Error),

    /// Failed to encode the token as JSON.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),
}

impl From<TokenStoreError> for PlugDashError {
    fn from(err: TokenStoreError) -> Self {
        Self::Remote(Box::new(err))
    }
}
