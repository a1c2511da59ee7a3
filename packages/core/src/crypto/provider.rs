//! Provider traits for the three primitives the envelope protocol is built on.
//!
//! The protocol fixes one implementation of each (see [`crate::crypto::suites`]),
//! but the envelope code is written against these traits so the primitives
//! stay isolated and individually testable.

use crate::crypto::keys::{KeyPairMaterial, SessionKeyMaterial};
use crate::error::CryptoError;

/// Symmetric block cipher used for body and attachment confidentiality.
pub trait SymmetricProvider: Send + Sync + 'static {
    /// Session key length in bytes
    const KEY_LEN: usize;
    /// IV length in bytes
    const IV_LEN: usize;

    /// Generates a fresh session key and IV.
    fn generate_session_key() -> Result<SessionKeyMaterial, CryptoError>;

    fn encrypt(plaintext: &[u8], session: &SessionKeyMaterial) -> Result<Vec<u8>, CryptoError>;

    fn decrypt(ciphertext: &[u8], session: &SessionKeyMaterial) -> Result<Vec<u8>, CryptoError>;
}

/// Asymmetric algorithm used for wrapping session material and for signatures.
///
/// Keys are passed around in their serialized (DER) form.
pub trait AsymmetricProvider: Send + Sync + 'static {
    /// Generates a new key pair.
    fn generate_key_pair() -> Result<KeyPairMaterial, CryptoError>;

    /// Encrypts `data` under `public_key`.
    fn wrap_key(public_key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Decrypts `wrapped` with `private_key`.
    fn unwrap_key(private_key: &[u8], wrapped: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Signs a message with the given private key.
    fn sign(private_key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Verifies a signature with the given public key.
    ///
    /// A signature that does not match is `Ok(false)`, not an error. Errors
    /// are reserved for unusable key material.
    fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, CryptoError>;

    /// Checks that a public and a private key belong together.
    fn is_matching_pair(public_key: &[u8], private_key: &[u8]) -> Result<bool, CryptoError>;
}

/// Digest used for the aggregate hash.
pub trait DigestProvider: Send + Sync + 'static {
    /// Digest of `data` rendered as text, ready for concatenation.
    fn digest_hex(data: &[u8]) -> String;
}

/// Bundles the three primitives into one suite.
pub trait CryptoProvider: Send + Sync + 'static {
    type Symmetric: SymmetricProvider;
    type Asymmetric: AsymmetricProvider;
    type Digest: DigestProvider;

    /// Human-readable suite name, for logs.
    fn suite_name() -> &'static str;
}
