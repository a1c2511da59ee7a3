// Подпись конверта
// Aggregate digest over the plaintext parts, signed with the friendship key.

use crate::crypto::provider::{AsymmetricProvider, CryptoProvider, DigestProvider};
use crate::envelope::{Attachment, Envelope};
use crate::protocol::tags::{self, SIGNATURE_FILE_NAME, SIGNED_TAG};
use crate::utils::error::{MailError, Result};
use tracing::debug;

/// Concatenated digests of the body and every user attachment, in order.
///
/// Reserved attachments (key, IV, signature) never contribute. Subject and
/// file names are not covered.
pub fn aggregate_digest<P: CryptoProvider>(envelope: &Envelope) -> String {
    let mut aggregate = String::new();

    if let Some(body) = envelope.body() {
        aggregate.push_str(&P::Digest::digest_hex(body.as_bytes()));
    }

    for attachment in envelope.user_attachments() {
        aggregate.push_str(&P::Digest::digest_hex(&attachment.content));
    }

    aggregate
}

/// Signs a plaintext envelope and appends the signature attachment.
///
/// Must run before encryption: an already-encrypted envelope is rejected so
/// the signature always covers plaintext.
pub fn sign<P: CryptoProvider>(envelope: Envelope, private_key: &[u8]) -> Result<Envelope> {
    if envelope.is_encrypted {
        return Err(MailError::ProtocolViolation(
            "signing must run on plaintext, before encryption".to_string(),
        ));
    }
    if envelope.is_signed {
        return Err(MailError::ProtocolViolation("envelope is already signed".to_string()));
    }
    if envelope.attachments.iter().any(Attachment::is_reserved) {
        return Err(MailError::ProtocolViolation(
            "plaintext envelope carries reserved attachment names".to_string(),
        ));
    }
    if !envelope.has_content() {
        return Err(MailError::EmptyContent);
    }

    let aggregate = aggregate_digest::<P>(&envelope);
    let signature = P::Asymmetric::sign(private_key, aggregate.as_bytes())?;

    debug!(
        parts = envelope.attachments.len() + usize::from(envelope.body.is_some()),
        "Envelope signed"
    );

    let mut signed = envelope;
    signed.subject = tags::append_tag(&signed.subject, SIGNED_TAG);
    signed.attachments.push(Attachment::new(SIGNATURE_FILE_NAME, signature));
    signed.is_signed = true;
    Ok(signed)
}
