// Модели данных для хранилища

use crate::crypto::keys::KeyPairMaterial;
use crate::error::CryptoError;
use crate::utils::{time, uuid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Статус дружбы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FriendshipState {
    Pending,  // Запрос отправлен, ещё не принят
    Accepted, // Обе стороны могут шифровать и подписывать
}

/// Дружба в хранилище
///
/// Both halves of the key pair belong to the friendship, not to either
/// participant.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friendship {
    pub id: String,
    pub initiator: String,
    pub counterpart: String,
    pub public_key: String,  // Base64 PKCS#1 DER
    pub private_key: String, // Base64 PKCS#1 DER
    pub state: FriendshipState,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Friendship {
    pub fn pending(initiator: &str, counterpart: &str, key_pair: &KeyPairMaterial) -> Self {
        Self {
            id: uuid::generate_v4(),
            initiator: initiator.to_string(),
            counterpart: counterpart.to_string(),
            public_key: key_pair.public_key_b64(),
            private_key: key_pair.private_key_b64(),
            state: FriendshipState::Pending,
            created_at: time::now(),
            accepted_at: None,
        }
    }

    /// True when `a` and `b` are the two parties, in either order.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.initiator.eq_ignore_ascii_case(a) && self.counterpart.eq_ignore_ascii_case(b))
            || (self.initiator.eq_ignore_ascii_case(b) && self.counterpart.eq_ignore_ascii_case(a))
    }

    pub fn involves(&self, email: &str) -> bool {
        self.initiator.eq_ignore_ascii_case(email) || self.counterpart.eq_ignore_ascii_case(email)
    }

    /// The other party, if `email` is one of them.
    pub fn other_party(&self, email: &str) -> Option<&str> {
        if self.initiator.eq_ignore_ascii_case(email) {
            Some(&self.counterpart)
        } else if self.counterpart.eq_ignore_ascii_case(email) {
            Some(&self.initiator)
        } else {
            None
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.state == FriendshipState::Accepted
    }

    pub fn accept(&mut self) {
        self.state = FriendshipState::Accepted;
        self.accepted_at = Some(time::now());
    }

    pub fn key_pair(&self) -> Result<KeyPairMaterial, CryptoError> {
        KeyPairMaterial::from_b64(&self.public_key, &self.private_key)
    }
}

impl fmt::Debug for Friendship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Friendship")
            .field("id", &self.id)
            .field("initiator", &self.initiator)
            .field("counterpart", &self.counterpart)
            .field("state", &self.state)
            .field("created_at", &self.created_at)
            .field("accepted_at", &self.accepted_at)
            .finish_non_exhaustive()
    }
}
