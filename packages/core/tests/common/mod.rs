//! Shared fixtures for the integration tests

#![allow(dead_code)]

use mailseal_core::api::MailSealAPI;
use mailseal_core::crypto::keys::KeyPairMaterial;
use mailseal_core::crypto::provider::{AsymmetricProvider, CryptoProvider};
use mailseal_core::crypto::ClassicSuiteProvider;
use mailseal_core::envelope::{Attachment, Envelope};
use mailseal_core::protocol::transport::{InMemoryTransport, MailCredentials, ReceivedMessage};
use mailseal_core::storage::MemoryStorage;
use once_cell::sync::Lazy;
use std::sync::Arc;

pub type Suite = ClassicSuiteProvider;
pub type Api = MailSealAPI<InMemoryTransport, MemoryStorage, Suite>;

static KEY_PAIR: Lazy<KeyPairMaterial> = Lazy::new(|| {
    <Suite as CryptoProvider>::Asymmetric::generate_key_pair().expect("RSA key generation failed")
});

static OTHER_KEY_PAIR: Lazy<KeyPairMaterial> = Lazy::new(|| {
    <Suite as CryptoProvider>::Asymmetric::generate_key_pair().expect("RSA key generation failed")
});

/// Friendship key pair shared by most tests
pub fn key_pair() -> &'static KeyPairMaterial {
    &KEY_PAIR
}

/// An unrelated key pair
pub fn other_key_pair() -> &'static KeyPairMaterial {
    &OTHER_KEY_PAIR
}

pub fn alice() -> MailCredentials {
    MailCredentials::new("alice@example.com", "alice-password")
}

pub fn bob() -> MailCredentials {
    MailCredentials::new("bob@example.com", "bob-password")
}

pub fn carol() -> MailCredentials {
    MailCredentials::new("carol@example.com", "carol-password")
}

pub fn api() -> (Arc<InMemoryTransport>, Api) {
    let transport = Arc::new(InMemoryTransport::new());
    for credentials in [alice(), bob(), carol()] {
        transport.register(&credentials).unwrap();
    }
    let api = Api::new(Arc::clone(&transport), MemoryStorage::new());
    (transport, api)
}

/// Accepted friendship between alice and bob using [`key_pair`]
pub fn befriend(api: &Api) {
    let friendship = api
        .friendships()
        .insert_pending("alice@example.com", "bob@example.com", key_pair())
        .unwrap();
    api.friendships().confirm(&friendship.id).unwrap();
}

/// Rebuilds an envelope as a receiver would see it after transport, with
/// body and attachments replaced.
pub fn reassemble(envelope: &Envelope, body: Option<&str>, attachments: Vec<Attachment>) -> Envelope {
    let message = ReceivedMessage {
        id: 1,
        from: envelope.sender().to_string(),
        to: envelope.recipients().to_vec(),
        subject: envelope.subject().to_string(),
        body: body.unwrap_or_default().to_string(),
        attachment_names: attachments.iter().map(|a| a.file_name.clone()).collect(),
        date: chrono::Utc::now(),
    };
    Envelope::from_received(message, attachments).unwrap()
}

/// Transport round trip without changes
pub fn through_transport(envelope: &Envelope) -> Envelope {
    reassemble(envelope, envelope.body(), envelope.attachments().to_vec())
}
