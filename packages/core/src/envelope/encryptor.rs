// Шифрование конверта
// One fresh session key per envelope, shared by the body and every attachment,
// wrapped under the friendship public key.

use crate::crypto::provider::{AsymmetricProvider, CryptoProvider, SymmetricProvider};
use crate::envelope::{Attachment, Envelope};
use crate::protocol::tags::{
    self, ReservedKind, ENCRYPTED_TAG, SESSION_IV_FILE_NAME, SESSION_KEY_FILE_NAME,
};
use crate::utils::b64;
use crate::utils::error::{MailError, Result};
use tracing::debug;

/// Encrypts body and user attachments and appends the wrapped key and IV.
///
/// A signature attachment added by [`crate::envelope::signer::sign`] is
/// carried through untouched. Any other attachment with a reserved name is
/// rejected, since it would otherwise travel unencrypted.
pub fn encrypt<P: CryptoProvider>(envelope: Envelope, public_key: &[u8]) -> Result<Envelope> {
    if envelope.is_encrypted {
        return Err(MailError::ProtocolViolation("envelope is already encrypted".to_string()));
    }
    let is_signed = envelope.is_signed;
    if let Some(attachment) = envelope.attachments.iter().find(|a| match a.reserved_kind() {
        Some(ReservedKind::Signature) => !is_signed,
        Some(_) => true,
        None => false,
    }) {
        return Err(MailError::ProtocolViolation(format!(
            "plaintext envelope carries reserved attachment name {}",
            attachment.file_name
        )));
    }
    if !envelope.has_content() {
        return Err(MailError::EmptyContent);
    }

    let session = P::Symmetric::generate_session_key()?;
    let wrapped_key = P::Asymmetric::wrap_key(public_key, session.key())?;
    let wrapped_iv = P::Asymmetric::wrap_key(public_key, session.iv())?;

    let Envelope {
        from,
        to,
        subject,
        body,
        attachments,
        ..
    } = envelope;

    let body = match body {
        Some(body) => Some(b64::encode(&P::Symmetric::encrypt(body.as_bytes(), &session)?)),
        None => None,
    };

    let mut encrypted = Vec::with_capacity(attachments.len() + 2);
    for attachment in attachments {
        if attachment.is_reserved() {
            encrypted.push(attachment);
        } else {
            let content = P::Symmetric::encrypt(&attachment.content, &session)?;
            encrypted.push(Attachment::new(attachment.file_name, content));
        }
    }
    drop(session);

    encrypted.push(Attachment::new(SESSION_KEY_FILE_NAME, wrapped_key));
    encrypted.push(Attachment::new(SESSION_IV_FILE_NAME, wrapped_iv));

    debug!(suite = P::suite_name(), attachments = encrypted.len(), "Envelope encrypted");

    Ok(Envelope {
        from,
        to,
        subject: tags::append_tag(&subject, ENCRYPTED_TAG),
        body,
        attachments: encrypted,
        is_encrypted: true,
        is_signed,
    })
}
