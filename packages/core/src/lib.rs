// MailSeal Core
// Friendship-scoped encryption and signing of mail envelopes

#![warn(clippy::all)]

// Модули
pub mod api;
pub mod config;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod protocol;
pub mod storage;
pub mod utils;

// Re-exports для удобства
pub use api::{FriendshipKeyStore, KeyExchange, MailSealAPI, SecureMailService, SendRequest};
pub use crypto::{ClassicSuiteProvider, CryptoProvider};
pub use envelope::decryptor::OpenedMessage;
pub use envelope::{Attachment, Envelope, EnvelopeState};
pub use utils::error::{MailError, Result};

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::crypto::keys::KeyPairMaterial;
    use crate::crypto::provider::AsymmetricProvider;
    use crate::crypto::suites::rsa_pkcs1::RsaPkcs1Provider;
    use once_cell::sync::Lazy;

    // 2048-bit generation is slow; one pair serves every unit test.
    static SHARED_KEY_PAIR: Lazy<KeyPairMaterial> = Lazy::new(|| {
        RsaPkcs1Provider::generate_key_pair().expect("RSA key generation failed")
    });

    pub(crate) fn shared_key_pair() -> &'static KeyPairMaterial {
        &SHARED_KEY_PAIR
    }
}
