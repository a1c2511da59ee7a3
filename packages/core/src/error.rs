use thiserror::Error;

/// Failures of the primitive layer (session cipher, key wrap, signatures).
///
/// Payloads carry a human-readable reason only. Key material never ends up
/// in an error message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Failed to generate keys: {0}")]
    KeyGenerationFailure(String),
    #[error("Key wrap failed: {0}")]
    WrapFailure(String),
    #[error("Key unwrap failed: {0}")]
    UnwrapFailure(String),
    #[error("Symmetric cipher failed: {0}")]
    CipherFailure(String),
    #[error("Signing failed: {0}")]
    SignFailure(String),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl From<cfb8::cipher::InvalidLength> for CryptoError {
    fn from(_: cfb8::cipher::InvalidLength) -> Self {
        CryptoError::CipherFailure("invalid session key or IV length".to_string())
    }
}

impl From<base64::DecodeError> for CryptoError {
    fn from(err: base64::DecodeError) -> Self {
        CryptoError::Encoding(format!("Base64 decode failed: {}", err))
    }
}
