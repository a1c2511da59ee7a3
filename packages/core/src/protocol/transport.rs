// Почтовый транспорт
// The protocol rides on an ordinary mailbox. Credentials are passed on every
// call; nothing here keeps an ambient "current user".

use crate::envelope::{Attachment, Envelope};
use crate::utils::error::{MailError, Result};
use crate::utils::time;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Mailbox login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailCredentials {
    pub email: String,
    pub password: String,
}

impl MailCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Mailbox folders a message can be fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmailFolder {
    Inbox,
    Sent,
    Drafts,
    Junk,
    Trash,
}

impl EmailFolder {
    pub fn as_str(self) -> &'static str {
        match self {
            EmailFolder::Inbox => "INBOX",
            EmailFolder::Sent => "Sent",
            EmailFolder::Drafts => "Drafts",
            EmailFolder::Junk => "Junk",
            EmailFolder::Trash => "Trash",
        }
    }
}

/// Message headers and body as the mailbox returns them. Attachment content
/// is fetched separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedMessage {
    pub id: u32,
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachment_names: Vec<String>,
    pub date: DateTime<Utc>,
}

/// Mail transport collaborator.
#[allow(async_fn_in_trait)]
pub trait MailTransport: Send + Sync {
    /// Delivers the envelope exactly as given.
    async fn send(&self, credentials: &MailCredentials, envelope: &Envelope) -> Result<()>;

    async fn fetch(
        &self,
        credentials: &MailCredentials,
        folder: EmailFolder,
        message_id: u32,
    ) -> Result<ReceivedMessage>;

    /// Attachments of a message, in the order the message lists them.
    async fn fetch_attachments(
        &self,
        credentials: &MailCredentials,
        folder: EmailFolder,
        message_id: u32,
    ) -> Result<Vec<Attachment>>;
}

#[derive(Debug, Clone)]
struct StoredMail {
    message: ReceivedMessage,
    attachments: Vec<Attachment>,
}

type Mailbox = HashMap<(String, EmailFolder), Vec<StoredMail>>;

/// In-process mailbox. Registered accounts must authenticate; recipients
/// without an account still receive mail.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    accounts: Mutex<HashMap<String, String>>,
    folders: Mutex<Mailbox>,
    fail_next_send: AtomicBool,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, credentials: &MailCredentials) -> Result<()> {
        let mut accounts = self
            .accounts
            .lock()
            .map_err(|_| MailError::Transport("account table poisoned".to_string()))?;
        accounts.insert(mailbox_key(&credentials.email), credentials.password.clone());
        Ok(())
    }

    /// Makes the next `send` fail with a transport error.
    pub fn fail_next_send(&self) {
        self.fail_next_send.store(true, Ordering::SeqCst);
    }

    /// Number of messages in a folder.
    pub fn count(&self, email: &str, folder: EmailFolder) -> usize {
        self.folders
            .lock()
            .map(|folders| {
                folders
                    .get(&(mailbox_key(email), folder))
                    .map_or(0, Vec::len)
            })
            .unwrap_or(0)
    }

    /// Id of the newest message in a folder.
    pub fn latest_id(&self, email: &str, folder: EmailFolder) -> Option<u32> {
        let folders = self.folders.lock().ok()?;
        folders
            .get(&(mailbox_key(email), folder))
            .and_then(|mails| mails.last())
            .map(|mail| mail.message.id)
    }

    fn authenticate(&self, credentials: &MailCredentials) -> Result<()> {
        let accounts = self
            .accounts
            .lock()
            .map_err(|_| MailError::Transport("account table poisoned".to_string()))?;

        match accounts.get(&mailbox_key(&credentials.email)) {
            Some(password) if *password == credentials.password => Ok(()),
            Some(_) => {
                warn!(account = %credentials.email, "Authentication failed");
                Err(MailError::Transport(format!(
                    "authentication failed for {}",
                    credentials.email
                )))
            }
            None => Ok(()),
        }
    }

    fn deliver(folders: &mut Mailbox, owner: &str, folder: EmailFolder, mut mail: StoredMail) {
        let slot = folders.entry((mailbox_key(owner), folder)).or_default();
        mail.message.id = slot.last().map_or(1, |last| last.message.id + 1);
        slot.push(mail);
    }

    fn find(
        &self,
        credentials: &MailCredentials,
        folder: EmailFolder,
        message_id: u32,
    ) -> Result<StoredMail> {
        self.authenticate(credentials)?;

        let folders = self
            .folders
            .lock()
            .map_err(|_| MailError::Transport("mailbox poisoned".to_string()))?;

        folders
            .get(&(mailbox_key(&credentials.email), folder))
            .and_then(|mails| mails.iter().find(|mail| mail.message.id == message_id))
            .cloned()
            .ok_or_else(|| {
                MailError::NotFound(format!(
                    "message {} in {} of {}",
                    message_id,
                    folder.as_str(),
                    credentials.email
                ))
            })
    }
}

impl MailTransport for InMemoryTransport {
    async fn send(&self, credentials: &MailCredentials, envelope: &Envelope) -> Result<()> {
        self.authenticate(credentials)?;

        if self.fail_next_send.swap(false, Ordering::SeqCst) {
            warn!(from = %envelope.sender(), "Simulated send failure");
            return Err(MailError::Transport("connection reset".to_string()));
        }

        if !envelope.sender().eq_ignore_ascii_case(&credentials.email) {
            return Err(MailError::Transport(format!(
                "{} cannot send as {}",
                credentials.email,
                envelope.sender()
            )));
        }

        let mail = StoredMail {
            message: ReceivedMessage {
                id: 0,
                from: envelope.sender().to_string(),
                to: envelope.recipients().to_vec(),
                subject: envelope.subject().to_string(),
                body: envelope.body().unwrap_or_default().to_string(),
                attachment_names: envelope.attachment_names(),
                date: time::now(),
            },
            attachments: envelope.attachments().to_vec(),
        };

        let mut folders = self
            .folders
            .lock()
            .map_err(|_| MailError::Transport("mailbox poisoned".to_string()))?;

        Self::deliver(&mut folders, envelope.sender(), EmailFolder::Sent, mail.clone());
        for recipient in envelope.recipients() {
            Self::deliver(&mut folders, recipient, EmailFolder::Inbox, mail.clone());
        }

        info!(
            from = %envelope.sender(),
            recipients = envelope.recipients().len(),
            attachments = envelope.attachments().len(),
            "Mail delivered"
        );
        Ok(())
    }

    async fn fetch(
        &self,
        credentials: &MailCredentials,
        folder: EmailFolder,
        message_id: u32,
    ) -> Result<ReceivedMessage> {
        let mail = self.find(credentials, folder, message_id)?;
        debug!(id = message_id, folder = folder.as_str(), "Message fetched");
        Ok(mail.message)
    }

    async fn fetch_attachments(
        &self,
        credentials: &MailCredentials,
        folder: EmailFolder,
        message_id: u32,
    ) -> Result<Vec<Attachment>> {
        Ok(self.find(credentials, folder, message_id)?.attachments)
    }
}

fn mailbox_key(email: &str) -> String {
    email.to_ascii_lowercase()
}
