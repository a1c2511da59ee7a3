// Валидация входящих данных

use crate::config::Config;
use crate::envelope::Attachment;
use crate::protocol::tags::ReservedKind;
use crate::protocol::transport::MailCredentials;
use crate::utils::error::{MailError, Result};

/// Валидация адреса электронной почты
pub fn validate_email(email: &str) -> Result<()> {
    let invalid = || MailError::Validation(format!("Invalid e-mail address: {}", email));

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;

    let max_local = Config::global().email_local_part_max_length;
    if local.is_empty() || local.len() > max_local {
        return Err(invalid());
    }
    if !local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
    {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(invalid());
    }
    if labels.iter().any(|label| {
        label.is_empty()
            || !label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }) {
        return Err(invalid());
    }

    let top = labels.last().map_or(0, |label| label.len());
    if !(2..=4).contains(&top) {
        return Err(invalid());
    }

    Ok(())
}

pub fn validate_credentials(credentials: &MailCredentials) -> Result<()> {
    validate_email(&credentials.email)?;
    if credentials.password.is_empty() {
        return Err(MailError::Validation("Password must not be empty".to_string()));
    }
    Ok(())
}

/// Subject as typed by the user, before protocol tags are added.
pub fn validate_subject(subject: &str) -> Result<()> {
    let max = Config::global().max_subject_length;
    if subject.chars().count() > max {
        return Err(MailError::Validation(format!(
            "Subject longer than {} characters",
            max
        )));
    }
    Ok(())
}

pub fn validate_attachment(attachment: &Attachment) -> Result<()> {
    if attachment.file_name.trim().is_empty() {
        return Err(MailError::Validation("Attachment name must not be empty".to_string()));
    }
    if attachment.content.is_empty() {
        return Err(MailError::Validation(format!(
            "Attachment {} is empty",
            attachment.file_name
        )));
    }

    let max = Config::global().max_attachment_size;
    if attachment.content.len() > max {
        return Err(MailError::Validation(format!(
            "Attachment {} exceeds {} bytes",
            attachment.file_name, max
        )));
    }

    if let Some(kind) = ReservedKind::of(&attachment.file_name) {
        return Err(MailError::Validation(format!(
            "Attachment name {} uses the reserved suffix {}",
            attachment.file_name,
            kind.suffix()
        )));
    }

    Ok(())
}

/// User attachments of an outgoing message.
pub fn validate_attachments(attachments: &[Attachment]) -> Result<()> {
    let max = Config::global().max_attachments;
    if attachments.len() > max {
        return Err(MailError::Validation(format!(
            "Too many attachments: {} (max {})",
            attachments.len(),
            max
        )));
    }
    attachments.iter().try_for_each(validate_attachment)
}
