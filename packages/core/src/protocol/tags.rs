// Протокольные метки
// Subject tags and reserved attachment suffixes. These strings are part of
// the wire format; changing any of them breaks every existing correspondent.

/// Appended to the subject of a friend-request carrier.
pub const FRIEND_REQUEST_TAG: &str = "#@FriendRequest";
/// Appended to the subject of an encrypted envelope.
pub const ENCRYPTED_TAG: &str = "#@Crypted";
/// Appended to the subject of a signed envelope.
pub const SIGNED_TAG: &str = "#@Signed";

/// Suffix of the wrapped session key attachment.
pub const KEY_SUFFIX: &str = ".key";
/// Suffix of the wrapped IV attachment.
pub const IV_SUFFIX: &str = ".iv";
/// Suffix of the signature attachment.
pub const SIGNATURE_SUFFIX: &str = ".sign";

/// File names used when this implementation emits reserved attachments.
pub const SESSION_KEY_FILE_NAME: &str = "session.key";
pub const SESSION_IV_FILE_NAME: &str = "session.iv";
pub const SIGNATURE_FILE_NAME: &str = "message.sign";

/// Kind of protocol metadata an attachment name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedKind {
    SessionKey,
    SessionIv,
    Signature,
}

impl ReservedKind {
    /// Classifies a file name by exact, case-sensitive suffix.
    pub fn of(file_name: &str) -> Option<Self> {
        if file_name.ends_with(KEY_SUFFIX) {
            Some(ReservedKind::SessionKey)
        } else if file_name.ends_with(IV_SUFFIX) {
            Some(ReservedKind::SessionIv)
        } else if file_name.ends_with(SIGNATURE_SUFFIX) {
            Some(ReservedKind::Signature)
        } else {
            None
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            ReservedKind::SessionKey => KEY_SUFFIX,
            ReservedKind::SessionIv => IV_SUFFIX,
            ReservedKind::Signature => SIGNATURE_SUFFIX,
        }
    }
}

pub fn has_tag(subject: &str, tag: &str) -> bool {
    subject.contains(tag)
}

/// Appends `tag` unless the subject already carries it.
pub fn append_tag(subject: &str, tag: &str) -> String {
    if has_tag(subject, tag) {
        subject.to_string()
    } else {
        format!("{}{}", subject, tag)
    }
}

/// Removes every occurrence of `tag`.
pub fn strip_tag(subject: &str, tag: &str) -> String {
    subject.replace(tag, "")
}
