// События дружбы
// Key exchange publishes these; the friendship store consumes them.

use crate::utils::error::{MailError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FriendshipEvent {
    /// A request went out; key halves are base64 PKCS#1 DER.
    Requested {
        from: String,
        to: String,
        public_key: String,
        private_key: String,
    },
    Accepted {
        from: String,
        to: String,
    },
    Deleted {
        from: String,
        to: String,
    },
}

impl FriendshipEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            FriendshipEvent::Requested { .. } => "requested",
            FriendshipEvent::Accepted { .. } => "accepted",
            FriendshipEvent::Deleted { .. } => "deleted",
        }
    }

    /// (from, to) of the event.
    pub fn parties(&self) -> (&str, &str) {
        match self {
            FriendshipEvent::Requested { from, to, .. }
            | FriendshipEvent::Accepted { from, to }
            | FriendshipEvent::Deleted { from, to } => (from.as_str(), to.as_str()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| MailError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MailError::Serialization(e.to_string()))
    }
}

impl fmt::Debug for FriendshipEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (from, to) = self.parties();
        f.debug_struct("FriendshipEvent")
            .field("kind", &self.kind())
            .field("from", &from)
            .field("to", &to)
            .finish()
    }
}

/// Consumer of friendship events.
pub trait FriendshipEventSink: Send + Sync {
    fn publish(&self, event: FriendshipEvent) -> Result<()>;
}
