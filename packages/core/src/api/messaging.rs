// API для отправки и получения защищённой почты

use crate::api::friends::FriendshipKeyStore;
use crate::crypto::CryptoProvider;
use crate::envelope::decryptor::{self, OpenedMessage};
use crate::envelope::{encryptor, signer, Attachment, Envelope};
use crate::protocol::transport::{EmailFolder, MailCredentials, MailTransport};
use crate::protocol::validation::{
    validate_attachments, validate_credentials, validate_email, validate_subject,
};
use crate::storage::FriendshipRepository;
use crate::utils::error::{MailError, Result};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info};

/// Outgoing message and the protection asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    pub to: String,
    pub subject: String,
    pub body: Option<String>,
    pub attachments: Vec<Attachment>,
    pub encrypt: bool,
    pub sign: bool,
}

impl SendRequest {
    pub fn new(to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: None,
            attachments: Vec::new(),
            encrypt: false,
            sign: false,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn encrypted(mut self) -> Self {
        self.encrypt = true;
        self
    }

    pub fn signed(mut self) -> Self {
        self.sign = true;
        self
    }

    pub fn validate(&self, sender: &str) -> Result<()> {
        validate_email(&self.to)?;
        if sender.eq_ignore_ascii_case(&self.to) {
            return Err(MailError::Validation(
                "Sender and receiver must differ".to_string(),
            ));
        }
        if !self.encrypt && !self.sign {
            return Err(MailError::Validation(
                "Request neither encryption nor signing".to_string(),
            ));
        }
        validate_subject(&self.subject)?;
        validate_attachments(&self.attachments)?;

        let has_body = self.body.as_deref().is_some_and(|b| !b.is_empty());
        if !has_body && self.attachments.is_empty() {
            return Err(MailError::EmptyContent);
        }
        Ok(())
    }

    fn into_envelope(self, sender: &str) -> Envelope {
        let envelope = Envelope::new(sender, self.to, self.subject).with_attachments(self.attachments);
        match self.body {
            Some(body) => envelope.with_body(body),
            None => envelope,
        }
    }
}

/// Sends and opens friendship-protected mail.
pub struct SecureMailService<T, R, P>
where
    T: MailTransport,
    R: FriendshipRepository,
    P: CryptoProvider,
{
    transport: Arc<T>,
    store: Arc<FriendshipKeyStore<R>>,
    _suite: PhantomData<P>,
}

impl<T, R, P> SecureMailService<T, R, P>
where
    T: MailTransport,
    R: FriendshipRepository,
    P: CryptoProvider,
{
    pub fn new(transport: Arc<T>, store: Arc<FriendshipKeyStore<R>>) -> Self {
        Self {
            transport,
            store,
            _suite: PhantomData,
        }
    }

    /// Signs and/or encrypts the request and hands it to the transport.
    ///
    /// Returns the envelope exactly as sent. Nothing is sent unless every
    /// step succeeded.
    pub async fn send_protected(
        &self,
        credentials: &MailCredentials,
        request: SendRequest,
    ) -> Result<Envelope> {
        validate_credentials(credentials)?;
        request.validate(&credentials.email)?;

        let key_pair = self
            .store
            .lookup(&credentials.email, &request.to)?
            .ok_or(MailError::NotFriend)?;

        let (encrypt, sign) = (request.encrypt, request.sign);
        let mut envelope = request.into_envelope(&credentials.email);

        if sign {
            envelope = signer::sign::<P>(envelope, key_pair.private_key())?;
        }
        if encrypt {
            envelope = encryptor::encrypt::<P>(envelope, key_pair.public_key())?;
        }
        drop(key_pair);

        self.transport.send(credentials, &envelope).await?;

        info!(
            from = %credentials.email,
            state = ?envelope.state(),
            "Protected mail sent"
        );
        Ok(envelope)
    }

    /// Fetches, decrypts and verifies one message.
    pub async fn open_protected(
        &self,
        credentials: &MailCredentials,
        folder: EmailFolder,
        message_id: u32,
    ) -> Result<OpenedMessage> {
        validate_credentials(credentials)?;

        let message = self.transport.fetch(credentials, folder, message_id).await?;
        let attachments = self
            .transport
            .fetch_attachments(credentials, folder, message_id)
            .await?;
        let envelope = Envelope::from_received(message, attachments)?;

        let peer = Self::peer_of(&envelope, &credentials.email)?;
        let key_pair = self
            .store
            .lookup(&credentials.email, &peer)?
            .ok_or(MailError::NotFriend)?;

        debug!(id = message_id, state = ?envelope.state(), "Opening message");
        decryptor::open::<P>(envelope, &key_pair)
    }

    /// The correspondent on the other end: the sender for received mail,
    /// the recipient for our own sent mail.
    fn peer_of(envelope: &Envelope, me: &str) -> Result<String> {
        if !envelope.sender().eq_ignore_ascii_case(me) {
            return Ok(envelope.sender().to_string());
        }
        envelope
            .recipients()
            .iter()
            .find(|r| !r.eq_ignore_ascii_case(me))
            .cloned()
            .ok_or_else(|| MailError::ProtocolViolation("message has no correspondent".to_string()))
    }
}
