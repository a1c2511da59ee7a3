// Расшифровка и проверка подписи
// Reverses `encryptor::encrypt`, then checks the signature over the recovered
// plaintext.

use crate::crypto::keys::{KeyPairMaterial, SessionKeyMaterial};
use crate::crypto::provider::{AsymmetricProvider, CryptoProvider, SymmetricProvider};
use crate::envelope::signer::aggregate_digest;
use crate::envelope::{Attachment, Envelope};
use crate::error::CryptoError;
use crate::protocol::tags::{self, ReservedKind, ENCRYPTED_TAG};
use crate::utils::b64;
use crate::utils::error::{MailError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Decrypted envelope plus the authenticity verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenedMessage {
    /// Plaintext with protocol metadata stripped.
    pub envelope: Envelope,
    /// `None` when the envelope was not signed.
    pub authenticity: Option<bool>,
}

impl OpenedMessage {
    /// Turns a failed verification into [`MailError::SignatureInvalid`].
    pub fn require_authentic(self) -> Result<Self> {
        match self.authenticity {
            Some(false) => Err(MailError::SignatureInvalid),
            _ => Ok(self),
        }
    }
}

/// Recovers the plaintext of an encrypted envelope. No-op for plain or
/// signed-only envelopes.
///
/// The key and IV attachments are consumed; a signature attachment is kept
/// so the result can still be verified.
pub fn decrypt<P: CryptoProvider>(envelope: Envelope, private_key: &[u8]) -> Result<Envelope> {
    if !envelope.is_encrypted {
        return Ok(envelope);
    }

    let wrapped_key = envelope.reserved(ReservedKind::SessionKey)?;
    let wrapped_iv = envelope.reserved(ReservedKind::SessionIv)?;

    let key = Zeroizing::new(P::Asymmetric::unwrap_key(private_key, &wrapped_key.content)?);
    let iv = Zeroizing::new(P::Asymmetric::unwrap_key(private_key, &wrapped_iv.content)?);
    let session = SessionKeyMaterial::new(key.to_vec(), iv.to_vec());

    let Envelope {
        from,
        to,
        subject,
        body,
        attachments,
        is_signed,
        ..
    } = envelope;

    let body = match body {
        Some(body) => {
            let ciphertext = b64::decode_wrapped(&body)?;
            let plaintext = P::Symmetric::decrypt(&ciphertext, &session)?;
            Some(String::from_utf8(plaintext).map_err(|e| {
                CryptoError::CipherFailure(format!("decrypted body is not UTF-8: {}", e))
            })?)
        }
        None => None,
    };

    let mut decrypted = Vec::with_capacity(attachments.len());
    for attachment in attachments {
        match attachment.reserved_kind() {
            Some(ReservedKind::SessionKey) | Some(ReservedKind::SessionIv) => {}
            Some(ReservedKind::Signature) => decrypted.push(attachment),
            None => {
                let content = P::Symmetric::decrypt(&attachment.content, &session)?;
                decrypted.push(Attachment::new(attachment.file_name, content));
            }
        }
    }
    drop(session);

    debug!(from = %from, attachments = decrypted.len(), "Envelope decrypted");

    Ok(Envelope {
        from,
        to,
        subject: tags::strip_tag(&subject, ENCRYPTED_TAG),
        body,
        attachments: decrypted,
        is_encrypted: false,
        is_signed,
    })
}

/// Checks the signature of a decrypted envelope.
///
/// `Ok(None)` when the envelope is not signed, `Ok(Some(false))` when the
/// content or signature was tampered with.
pub fn verify<P: CryptoProvider>(envelope: &Envelope, public_key: &[u8]) -> Result<Option<bool>> {
    if !envelope.is_signed {
        return Ok(None);
    }
    if envelope.is_encrypted {
        return Err(MailError::ProtocolViolation(
            "verification runs on decrypted content".to_string(),
        ));
    }

    let signature = envelope.reserved(ReservedKind::Signature)?;
    let aggregate = aggregate_digest::<P>(envelope);
    let verdict = P::Asymmetric::verify(public_key, aggregate.as_bytes(), &signature.content)?;

    if !verdict {
        warn!(from = %envelope.from, "Signature verification failed");
    }

    Ok(Some(verdict))
}

/// Full receive pipeline: metadata check, decrypt, verify.
pub fn open<P: CryptoProvider>(envelope: Envelope, key_pair: &KeyPairMaterial) -> Result<OpenedMessage> {
    envelope.validate_metadata()?;

    let plaintext = decrypt::<P>(envelope, key_pair.private_key())?;
    let authenticity = verify::<P>(&plaintext, key_pair.public_key())?;

    Ok(OpenedMessage {
        envelope: plaintext.without_reserved(),
        authenticity,
    })
}
