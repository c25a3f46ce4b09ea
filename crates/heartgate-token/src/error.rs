//! Token codec errors.

use thiserror::Error;

use heartgate_core::error::{AppError, ErrorKind, INVALID_TOKEN_MESSAGE};

/// Reasons a token could not be produced or read.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token is not valid URL-safe base64.
    #[error("token is not valid base64: {0}")]
    Malformed(#[from] base64::DecodeError),
    /// The decoded token is shorter than its fixed header.
    #[error("token is truncated ({0} bytes)")]
    Truncated(usize),
    /// The token was written by an unknown format version.
    #[error("unsupported token version {0}")]
    UnsupportedVersion(u8),
    /// Decryption failed: wrong key or tampered ciphertext.
    #[error("token failed authentication")]
    Authentication,
    /// The plaintext is not a valid claims document.
    #[error("token payload is not valid claims JSON: {0}")]
    Payload(#[source] serde_json::Error),
    /// The claims carry no user.
    #[error("token carries no user_id")]
    MissingUser,
    /// Claims could not be serialized or encrypted.
    #[error("failed to seal token: {0}")]
    Seal(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Seal(ref message) => {
                AppError::internal(format!("Token encoding failed: {message}"))
            }
            other => AppError::with_source(ErrorKind::InvalidToken, INVALID_TOKEN_MESSAGE, other),
        }
    }
}
