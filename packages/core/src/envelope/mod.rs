//! Wire-level envelope and the sign / encrypt / decrypt / verify pipeline.
//!
//! Sending:   plaintext → [`signer::sign`] → [`encryptor::encrypt`] → transport
//! Receiving: transport → [`decryptor::decrypt`] → [`decryptor::verify`]
//!
//! Every step consumes an envelope and returns a new one. A failing step
//! returns an error and nothing else, so a half-processed envelope can never
//! escape the pipeline.

pub mod decryptor;
pub mod encryptor;
pub mod signer;

use crate::protocol::tags::{self, ReservedKind};
use crate::protocol::transport::ReceivedMessage;
use crate::utils::error::{MailError, Result};
use serde::{Deserialize, Serialize};

/// Named binary blob. Content is fully owned; nothing holds a handle open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    #[serde(with = "serde_bytes")]
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    pub fn reserved_kind(&self) -> Option<ReservedKind> {
        ReservedKind::of(&self.file_name)
    }

    /// Protocol metadata rather than user content.
    pub fn is_reserved(&self) -> bool {
        self.reserved_kind().is_some()
    }
}

/// Protection state of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeState {
    Plain,
    Encrypted,
    Signed,
    EncryptedAndSigned,
}

impl EnvelopeState {
    pub fn from_flags(is_encrypted: bool, is_signed: bool) -> Self {
        match (is_encrypted, is_signed) {
            (false, false) => EnvelopeState::Plain,
            (true, false) => EnvelopeState::Encrypted,
            (false, true) => EnvelopeState::Signed,
            (true, true) => EnvelopeState::EncryptedAndSigned,
        }
    }
}

/// One message as the mail transport sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    from: String,
    to: Vec<String>,
    subject: String,
    body: Option<String>,
    attachments: Vec<Attachment>,
    is_encrypted: bool,
    is_signed: bool,
}

impl Envelope {
    /// Fresh plaintext envelope.
    pub fn new(from: impl Into<String>, to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: vec![to.into()],
            subject: subject.into(),
            body: None,
            attachments: Vec::new(),
            is_encrypted: false,
            is_signed: false,
        }
    }

    /// Sets the body; an empty body counts as no body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.body = if body.is_empty() { None } else { Some(body) };
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments.extend(attachments);
        self
    }

    /// Rebuilds an envelope from what the transport handed back.
    ///
    /// Flags come from the subject tags. The attachment list announced by the
    /// message must match the fetched attachments name-for-name and in
    /// order, since the aggregate digest depends on that order.
    pub fn from_received(message: ReceivedMessage, attachments: Vec<Attachment>) -> Result<Self> {
        let fetched: Vec<&str> = attachments.iter().map(|a| a.file_name.as_str()).collect();
        let announced: Vec<&str> = message.attachment_names.iter().map(String::as_str).collect();
        if fetched != announced {
            return Err(MailError::ProtocolViolation(format!(
                "attachment list mismatch: message announces {:?}, transport returned {:?}",
                announced, fetched
            )));
        }

        let is_encrypted = tags::has_tag(&message.subject, tags::ENCRYPTED_TAG);
        let is_signed = tags::has_tag(&message.subject, tags::SIGNED_TAG);

        Ok(Self {
            from: message.from,
            to: message.to,
            subject: message.subject,
            body: if message.body.is_empty() { None } else { Some(message.body) },
            attachments,
            is_encrypted,
            is_signed,
        })
    }

    pub fn sender(&self) -> &str {
        &self.from
    }

    pub fn recipients(&self) -> &[String] {
        &self.to
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// All attachments, reserved ones included, in transport order.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn attachment_names(&self) -> Vec<String> {
        self.attachments.iter().map(|a| a.file_name.clone()).collect()
    }

    /// Attachments a user should see.
    pub fn user_attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter().filter(|a| !a.is_reserved())
    }

    pub fn is_encrypted(&self) -> bool {
        self.is_encrypted
    }

    pub fn is_signed(&self) -> bool {
        self.is_signed
    }

    pub fn state(&self) -> EnvelopeState {
        EnvelopeState::from_flags(self.is_encrypted, self.is_signed)
    }

    pub fn has_content(&self) -> bool {
        self.body.is_some() || self.user_attachments().next().is_some()
    }

    /// The single reserved attachment of `kind`.
    ///
    /// Missing → [`MailError::ProtocolMetadataMissing`], duplicated →
    /// [`MailError::ProtocolViolation`].
    pub fn reserved(&self, kind: ReservedKind) -> Result<&Attachment> {
        let mut matches = self
            .attachments
            .iter()
            .filter(|a| a.reserved_kind() == Some(kind));

        let first = matches.next().ok_or_else(|| {
            MailError::ProtocolMetadataMissing(format!("no attachment ending in {}", kind.suffix()))
        })?;

        if matches.next().is_some() {
            return Err(MailError::ProtocolViolation(format!(
                "more than one attachment ends in {}",
                kind.suffix()
            )));
        }

        Ok(first)
    }

    /// Checks that the flags agree with the reserved attachments present.
    pub fn validate_metadata(&self) -> Result<()> {
        if self.is_encrypted {
            self.reserved(ReservedKind::SessionKey)?;
            self.reserved(ReservedKind::SessionIv)?;
        }
        if self.is_signed {
            self.reserved(ReservedKind::Signature)?;
        }
        Ok(())
    }

    /// Copy with protocol metadata removed, as shown to a reader.
    pub fn without_reserved(&self) -> Self {
        let mut visible = self.clone();
        visible.attachments.retain(|a| !a.is_reserved());
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn received(subject: &str, names: &[&str]) -> ReceivedMessage {
        ReceivedMessage {
            id: 1,
            from: "alice@example.com".to_string(),
            to: vec!["bob@example.com".to_string()],
            subject: subject.to_string(),
            body: "ciphertext".to_string(),
            attachment_names: names.iter().map(|n| n.to_string()).collect(),
            date: Utc::now(),
        }
    }

    #[test]
    fn test_state_from_flags() {
        assert_eq!(EnvelopeState::from_flags(false, false), EnvelopeState::Plain);
        assert_eq!(EnvelopeState::from_flags(true, false), EnvelopeState::Encrypted);
        assert_eq!(EnvelopeState::from_flags(false, true), EnvelopeState::Signed);
        assert_eq!(EnvelopeState::from_flags(true, true), EnvelopeState::EncryptedAndSigned);
    }

    #[test]
    fn test_empty_body_is_no_body() {
        let envelope = Envelope::new("a@x.com", "b@x.com", "hi").with_body("");
        assert!(envelope.body().is_none());
        assert!(!envelope.has_content());
    }

    #[test]
    fn test_from_received_reads_flags_from_subject() {
        let message = received(
            "Report#@Crypted#@Signed",
            &["report.txt", "session.key", "session.iv", "message.sign"],
        );
        let attachments = vec![
            Attachment::new("report.txt", b"x".to_vec()),
            Attachment::new("session.key", b"k".to_vec()),
            Attachment::new("session.iv", b"i".to_vec()),
            Attachment::new("message.sign", b"s".to_vec()),
        ];

        let envelope = Envelope::from_received(message, attachments).unwrap();
        assert_eq!(envelope.state(), EnvelopeState::EncryptedAndSigned);
        assert!(envelope.validate_metadata().is_ok());
        assert_eq!(envelope.user_attachments().count(), 1);
        assert_eq!(envelope.without_reserved().attachments().len(), 1);
    }

    #[test]
    fn test_from_received_rejects_reordered_attachments() {
        let message = received("Report", &["a.txt", "b.txt"]);
        let attachments = vec![
            Attachment::new("b.txt", b"b".to_vec()),
            Attachment::new("a.txt", b"a".to_vec()),
        ];

        let result = Envelope::from_received(message, attachments);
        assert!(matches!(result, Err(MailError::ProtocolViolation(_))));
    }

    #[test]
    fn test_validate_metadata_missing_and_duplicate() {
        let message = received("Report#@Crypted", &["session.key"]);
        let envelope =
            Envelope::from_received(message, vec![Attachment::new("session.key", b"k".to_vec())])
                .unwrap();
        assert!(matches!(
            envelope.validate_metadata(),
            Err(MailError::ProtocolMetadataMissing(_))
        ));

        let message = received("Report#@Signed", &["a.sign", "b.sign"]);
        let envelope = Envelope::from_received(
            message,
            vec![
                Attachment::new("a.sign", b"1".to_vec()),
                Attachment::new("b.sign", b"2".to_vec()),
            ],
        )
        .unwrap();
        assert!(matches!(
            envelope.validate_metadata(),
            Err(MailError::ProtocolViolation(_))
        ));
    }
}
