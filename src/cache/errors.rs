//! Cache error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("[PITCH_CACHE_IO] cache io failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("[PITCH_CACHE_CODEC] cache frame codec failure: {detail}")]
    Codec { detail: String },

    #[error("[PITCH_CACHE_CODEC] cache value serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    pub fn codec(detail: impl Into<String>) -> Self {
        CacheError::Codec {
            detail: detail.into(),
        }
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
