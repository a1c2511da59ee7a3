// Публичный API MailSeal
// Высокоуровневые методы поверх хранилища дружб и почтового транспорта

pub mod friends;
pub mod key_exchange;
pub mod messaging;

pub use friends::FriendshipKeyStore;
pub use key_exchange::KeyExchange;
pub use messaging::{SecureMailService, SendRequest};

use crate::crypto::CryptoProvider;
use crate::protocol::transport::MailTransport;
use crate::storage::FriendshipRepository;
use std::sync::Arc;

/// Главный API: key exchange and protected mail over one transport and one
/// friendship store.
pub struct MailSealAPI<T, R, P>
where
    T: MailTransport,
    R: FriendshipRepository,
    P: CryptoProvider,
{
    store: Arc<FriendshipKeyStore<R>>,
    key_exchange: KeyExchange<T, R, P>,
    mail: SecureMailService<T, R, P>,
}

impl<T, R, P> MailSealAPI<T, R, P>
where
    T: MailTransport,
    R: FriendshipRepository,
    P: CryptoProvider,
{
    pub fn new(transport: Arc<T>, repository: R) -> Self {
        let store = Arc::new(FriendshipKeyStore::new(repository));
        Self {
            key_exchange: KeyExchange::new(Arc::clone(&transport), Arc::clone(&store)),
            mail: SecureMailService::new(transport, Arc::clone(&store)),
            store,
        }
    }

    pub fn friendships(&self) -> &FriendshipKeyStore<R> {
        &self.store
    }

    pub fn key_exchange(&self) -> &KeyExchange<T, R, P> {
        &self.key_exchange
    }

    pub fn mail(&self) -> &SecureMailService<T, R, P> {
        &self.mail
    }
}
