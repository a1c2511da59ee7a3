// Ключевой материал
// Friendship key pair (long-lived, shared by both friends) and the per-envelope
// session key.

use crate::error::CryptoError;
use crate::utils::b64;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Separator between the two halves in a friend-request body.
pub const KEY_PAIR_SEPARATOR: char = '#';

/// Serialized asymmetric key pair of a friendship.
///
/// Both halves are DER-encoded. The private half is wiped on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct KeyPairMaterial {
    #[serde(with = "serde_bytes")]
    public_key: Vec<u8>,
    #[serde(with = "serde_bytes")]
    private_key: Vec<u8>,
}

impl KeyPairMaterial {
    pub fn new(public_key: Vec<u8>, private_key: Vec<u8>) -> Self {
        Self {
            public_key,
            private_key,
        }
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    pub fn public_key_b64(&self) -> String {
        b64::encode(&self.public_key)
    }

    pub fn private_key_b64(&self) -> String {
        b64::encode(&self.private_key)
    }

    pub fn from_b64(public_key: &str, private_key: &str) -> Result<Self, CryptoError> {
        let public_key = b64::decode(public_key)
            .map_err(|e| CryptoError::InvalidKey(format!("public key: {}", e)))?;
        let private_key = b64::decode(private_key)
            .map_err(|e| CryptoError::InvalidKey(format!("private key: {}", e)))?;
        Ok(Self::new(public_key, private_key))
    }

    /// Encodes the pair as `<public_b64>#<private_b64>` for a friend-request body.
    pub fn to_carrier_body(&self) -> String {
        format!(
            "{}{}{}",
            self.public_key_b64(),
            KEY_PAIR_SEPARATOR,
            self.private_key_b64()
        )
    }

    /// Parses a friend-request body produced by [`Self::to_carrier_body`].
    ///
    /// Surrounding whitespace is tolerated since some transports append a
    /// trailing newline to text bodies.
    pub fn from_carrier_body(body: &str) -> Result<Self, CryptoError> {
        let (public_key, private_key) = body
            .trim()
            .split_once(KEY_PAIR_SEPARATOR)
            .ok_or_else(|| CryptoError::Encoding("friend request body has no key separator".to_string()))?;

        if public_key.is_empty() || private_key.is_empty() {
            return Err(CryptoError::Encoding(
                "friend request body has an empty key half".to_string(),
            ));
        }

        Self::from_b64(public_key, private_key)
    }
}

impl fmt::Debug for KeyPairMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPairMaterial")
            .field("public_key_len", &self.public_key.len())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Ephemeral symmetric key + IV for a single envelope.
///
/// Never serialized, never logged; zeroed when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionKeyMaterial {
    key: Vec<u8>,
    iv: Vec<u8>,
}

impl SessionKeyMaterial {
    pub fn new(key: Vec<u8>, iv: Vec<u8>) -> Self {
        Self { key, iv }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }
}

impl fmt::Debug for SessionKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKeyMaterial(<redacted>)")
    }
}
