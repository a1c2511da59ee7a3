// Типы ошибок

use crate::error::CryptoError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MailError {
    /// No accepted friendship between the two identities. Pending, deleted
    /// and never-existing friendships all end up here.
    #[error("This user is not your friend")]
    NotFriend,

    #[error("Protocol metadata missing: {0}")]
    ProtocolMetadataMissing(String),

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Verification ran and the signature did not match.
    #[error("Message could not be verified")]
    SignatureInvalid,

    #[error("Cryptography error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Envelope has neither a body nor attachments")]
    EmptyContent,

    #[error("Subject has incorrect format")]
    IncorrectSubjectFormat,

    #[error("Friendship already exists between {0} and {1}")]
    FriendshipAlreadyExists(String, String),

    #[error("Friendship already accepted")]
    FriendshipAlreadyAccepted,

    #[error("Friendship was not requested or does not exist")]
    FriendshipNotFound,

    #[error("Key material in the friend request does not match the stored friendship")]
    KeyMismatch,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl MailError {
    /// Stable dotted error code for outer layers.
    pub fn code(&self) -> &'static str {
        match self {
            MailError::NotFriend => "not.friend.error",
            MailError::ProtocolMetadataMissing(_) => "protocol.metadata.missing",
            MailError::ProtocolViolation(_) => "protocol.violation",
            MailError::SignatureInvalid => "signature.invalid",
            MailError::Crypto(CryptoError::KeyGenerationFailure(_)) => "generation.keys.error",
            MailError::Crypto(CryptoError::WrapFailure(_)) => "encrypt.error",
            MailError::Crypto(CryptoError::UnwrapFailure(_)) => "decrypt.error",
            MailError::Crypto(CryptoError::CipherFailure(_)) => "cipher.error",
            MailError::Crypto(CryptoError::SignFailure(_)) => "sign.error",
            MailError::Crypto(CryptoError::InvalidKey(_)) => "key.invalid",
            MailError::Crypto(CryptoError::Encoding(_)) => "encoding.error",
            MailError::Validation(_) => "Invalid.input",
            MailError::EmptyContent => "content.empty",
            MailError::IncorrectSubjectFormat => "subject.format.error",
            MailError::FriendshipAlreadyExists(_, _) => "Record.already.exist",
            MailError::FriendshipAlreadyAccepted => "friendship.already.accepted",
            MailError::FriendshipNotFound => "friendship.not.found",
            MailError::KeyMismatch => "friendship.key.mismatch",
            MailError::Transport(_) => "connection.error",
            MailError::Storage(_) => "storage.error",
            MailError::Serialization(_) => "serialization.error",
            MailError::NotFound(_) => "Record.not.found",
        }
    }

    /// Only transport failures are worth retrying; everything else is terminal.
    pub fn is_retriable(&self) -> bool {
        matches!(self, MailError::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, MailError>;
