// Обмен ключами через почту
// A friend request is an ordinary mail whose body carries both halves of the
// freshly generated friendship key pair.

use crate::api::friends::FriendshipKeyStore;
use crate::crypto::keys::KeyPairMaterial;
use crate::crypto::provider::{AsymmetricProvider, CryptoProvider};
use crate::envelope::Envelope;
use crate::protocol::events::{FriendshipEvent, FriendshipEventSink};
use crate::protocol::tags::{self, FRIEND_REQUEST_TAG};
use crate::protocol::transport::{EmailFolder, MailCredentials, MailTransport, ReceivedMessage};
use crate::protocol::validation::{validate_credentials, validate_email};
use crate::storage::models::Friendship;
use crate::storage::FriendshipRepository;
use crate::utils::error::{MailError, Result};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{info, warn};

pub struct KeyExchange<T, R, P>
where
    T: MailTransport,
    R: FriendshipRepository,
    P: CryptoProvider,
{
    transport: Arc<T>,
    store: Arc<FriendshipKeyStore<R>>,
    _suite: PhantomData<P>,
}

impl<T, R, P> KeyExchange<T, R, P>
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

    /// Sends a friend request to `to` and records the Pending friendship.
    ///
    /// The Pending record is reserved before the carrier goes out, so of two
    /// concurrent requests for the same pair only one ever reaches the
    /// transport. Transport errors are returned as-is and the reservation is
    /// released. There is no retry.
    pub async fn initiate(&self, credentials: &MailCredentials, to: &str) -> Result<Friendship> {
        validate_credentials(credentials)?;
        validate_email(to)?;

        let from = credentials.email.as_str();
        if from.eq_ignore_ascii_case(to) {
            return Err(MailError::Validation(
                "Cannot befriend your own address".to_string(),
            ));
        }
        // Cheap rejection before key generation; insert_pending decides.
        if self.store.find(from, to)?.is_some() {
            return Err(MailError::FriendshipAlreadyExists(
                from.to_string(),
                to.to_string(),
            ));
        }

        let key_pair = P::Asymmetric::generate_key_pair()?;
        let friendship = self.store.insert_pending(from, to, &key_pair)?;
        let carrier = Envelope::new(from, to, FRIEND_REQUEST_TAG).with_body(key_pair.to_carrier_body());

        if let Err(err) = self.transport.send(credentials, &carrier).await {
            warn!(friendship_id = %friendship.id, "Friend request not sent, releasing reservation");
            if let Err(cleanup) = self.store.delete(&friendship.id) {
                warn!(friendship_id = %friendship.id, error = %cleanup, "Reservation already gone");
            }
            return Err(err);
        }

        info!(friendship_id = %friendship.id, from, to, suite = P::suite_name(), "Friend request sent");
        Ok(friendship)
    }

    /// Accepts the friend request carried by `carrier`.
    ///
    /// Only the invited party may accept, and the key pair in the carrier
    /// must be exactly the one recorded when the request went out.
    pub async fn accept(
        &self,
        credentials: &MailCredentials,
        carrier: &ReceivedMessage,
    ) -> Result<Friendship> {
        validate_credentials(credentials)?;

        if !tags::has_tag(&carrier.subject, FRIEND_REQUEST_TAG) {
            return Err(MailError::IncorrectSubjectFormat);
        }
        if carrier.from.eq_ignore_ascii_case(&credentials.email) {
            return Err(MailError::ProtocolViolation(
                "only the invited party can accept a friend request".to_string(),
            ));
        }

        let friendship = self
            .store
            .find(&carrier.from, &credentials.email)?
            .ok_or(MailError::FriendshipNotFound)?;

        if !friendship.counterpart.eq_ignore_ascii_case(&credentials.email) {
            return Err(MailError::ProtocolViolation(
                "only the invited party can accept a friend request".to_string(),
            ));
        }
        if friendship.is_accepted() {
            return Err(MailError::FriendshipAlreadyAccepted);
        }

        let carried = KeyPairMaterial::from_carrier_body(&carrier.body)?;
        if carried != friendship.key_pair()?
            || !P::Asymmetric::is_matching_pair(carried.public_key(), carried.private_key())?
        {
            warn!(friendship_id = %friendship.id, "Friend request key material does not match");
            return Err(MailError::KeyMismatch);
        }

        self.store.publish(FriendshipEvent::Accepted {
            from: credentials.email.clone(),
            to: carrier.from.clone(),
        })?;

        info!(friendship_id = %friendship.id, "Friend request accepted");
        self.store
            .get(&friendship.id)?
            .ok_or(MailError::FriendshipNotFound)
    }

    /// Fetches the carrier from the mailbox and accepts it.
    pub async fn accept_from_folder(
        &self,
        credentials: &MailCredentials,
        folder: EmailFolder,
        message_id: u32,
    ) -> Result<Friendship> {
        let carrier = self.transport.fetch(credentials, folder, message_id).await?;
        self.accept(credentials, &carrier).await
    }

    /// Ends the friendship with `friend`. Either party, any state.
    pub fn remove(&self, credentials: &MailCredentials, friend: &str) -> Result<()> {
        validate_credentials(credentials)?;

        self.store.publish(FriendshipEvent::Deleted {
            from: credentials.email.clone(),
            to: friend.to_string(),
        })?;

        info!(from = %credentials.email, to = friend, "Friendship removed");
        Ok(())
    }
}
