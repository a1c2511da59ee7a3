// Хранилище ключей дружбы
// Lifecycle of the shared key pair per pair of correspondents.

use crate::crypto::keys::KeyPairMaterial;
use crate::crypto::provider::{AsymmetricProvider, CryptoProvider};
use crate::protocol::events::{FriendshipEvent, FriendshipEventSink};
use crate::storage::models::Friendship;
use crate::storage::FriendshipRepository;
use crate::utils::error::{MailError, Result};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Thread-safe friendship store.
///
/// Every public operation takes the lock once, so an envelope operation sees
/// a single consistent friendship state.
pub struct FriendshipKeyStore<R: FriendshipRepository> {
    repository: RwLock<R>,
}

impl<R: FriendshipRepository> FriendshipKeyStore<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: RwLock::new(repository),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, R>> {
        self.repository
            .read()
            .map_err(|_| MailError::Storage("friendship store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, R>> {
        self.repository
            .write()
            .map_err(|_| MailError::Storage("friendship store lock poisoned".to_string()))
    }

    /// Generates a key pair and stores a Pending friendship.
    pub fn create<P: CryptoProvider>(&self, initiator: &str, counterpart: &str) -> Result<Friendship> {
        let key_pair = P::Asymmetric::generate_key_pair()?;
        self.insert_pending(initiator, counterpart, &key_pair)
    }

    /// Stores a Pending friendship around an already generated key pair.
    pub fn insert_pending(
        &self,
        initiator: &str,
        counterpart: &str,
        key_pair: &KeyPairMaterial,
    ) -> Result<Friendship> {
        if initiator.eq_ignore_ascii_case(counterpart) {
            return Err(MailError::Validation(
                "Cannot befriend your own address".to_string(),
            ));
        }

        let friendship = Friendship::pending(initiator, counterpart, key_pair);
        self.write()?.insert(friendship.clone())?;

        info!(friendship_id = %friendship.id, initiator, counterpart, "Friendship requested");
        Ok(friendship)
    }

    /// Pending → Accepted.
    pub fn confirm(&self, friendship_id: &str) -> Result<Friendship> {
        let mut repository = self.write()?;
        let mut friendship = repository
            .get(friendship_id)?
            .ok_or(MailError::FriendshipNotFound)?;

        if friendship.is_accepted() {
            return Err(MailError::FriendshipAlreadyAccepted);
        }

        friendship.accept();
        repository.update(friendship.clone())?;

        info!(friendship_id = %friendship.id, "Friendship accepted");
        Ok(friendship)
    }

    /// Key pair of an Accepted friendship between `a` and `b`, in either
    /// order.
    ///
    /// Pending, deleted and unknown friendships all yield `None`.
    pub fn lookup(&self, a: &str, b: &str) -> Result<Option<KeyPairMaterial>> {
        let friendship = self.read()?.find_by_pair(a, b)?;

        match friendship {
            Some(friendship) if friendship.is_accepted() => Ok(Some(friendship.key_pair()?)),
            _ => {
                debug!("No key material for pair");
                Ok(None)
            }
        }
    }

    /// Removes the friendship permanently.
    pub fn delete(&self, friendship_id: &str) -> Result<()> {
        match self.write()?.remove(friendship_id)? {
            Some(friendship) => {
                info!(friendship_id = %friendship.id, "Friendship deleted");
                Ok(())
            }
            None => Err(MailError::FriendshipNotFound),
        }
    }

    pub fn delete_between(&self, a: &str, b: &str) -> Result<()> {
        let mut repository = self.write()?;
        let friendship = repository
            .find_by_pair(a, b)?
            .ok_or(MailError::FriendshipNotFound)?;
        repository.remove(&friendship.id)?;

        info!(friendship_id = %friendship.id, "Friendship deleted");
        Ok(())
    }

    /// Friendship between `a` and `b` in any state.
    pub fn find(&self, a: &str, b: &str) -> Result<Option<Friendship>> {
        self.read()?.find_by_pair(a, b)
    }

    pub fn get(&self, friendship_id: &str) -> Result<Option<Friendship>> {
        self.read()?.get(friendship_id)
    }

    /// Accepted counterparts of `email`.
    pub fn friends_of(&self, email: &str) -> Result<Vec<String>> {
        Ok(self
            .read()?
            .list_for(email)?
            .iter()
            .filter(|f| f.is_accepted())
            .filter_map(|f| f.other_party(email).map(str::to_string))
            .collect())
    }

    /// Direct access to the repository, for snapshots.
    pub fn with_repository<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut R) -> Result<T>,
    {
        f(&mut *self.write()?)
    }
}

impl<R: FriendshipRepository> FriendshipEventSink for FriendshipKeyStore<R> {
    fn publish(&self, event: FriendshipEvent) -> Result<()> {
        debug!(kind = event.kind(), "Applying friendship event");

        match event {
            FriendshipEvent::Requested {
                from,
                to,
                public_key,
                private_key,
            } => {
                let key_pair = KeyPairMaterial::from_b64(&public_key, &private_key)?;
                self.insert_pending(&from, &to, &key_pair).map(|_| ())
            }
            FriendshipEvent::Accepted { from, to } => {
                let friendship = self.find(&from, &to)?.ok_or_else(|| {
                    warn!(from = %from, to = %to, "Accept for unknown friendship");
                    MailError::FriendshipNotFound
                })?;
                self.confirm(&friendship.id).map(|_| ())
            }
            FriendshipEvent::Deleted { from, to } => self.delete_between(&from, &to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::test_utils::shared_key_pair;

    fn store() -> FriendshipKeyStore<MemoryStorage> {
        FriendshipKeyStore::new(MemoryStorage::new())
    }

    #[test]
    fn test_lookup_only_for_accepted() {
        let store = store();
        let friendship = store
            .insert_pending("alice@example.com", "bob@example.com", shared_key_pair())
            .unwrap();

        assert_eq!(store.lookup("alice@example.com", "bob@example.com").unwrap(), None);

        store.confirm(&friendship.id).unwrap();
        let forward = store.lookup("alice@example.com", "bob@example.com").unwrap();
        let backward = store.lookup("BOB@example.com", "alice@example.com").unwrap();
        assert_eq!(forward.as_ref(), Some(shared_key_pair()));
        assert_eq!(forward, backward);

        store.delete(&friendship.id).unwrap();
        assert_eq!(store.lookup("alice@example.com", "bob@example.com").unwrap(), None);
    }

    #[test]
    fn test_create_generates_matching_pair() {
        use crate::crypto::ClassicSuiteProvider;
        use crate::storage::models::FriendshipState;

        let store = store();
        let friendship = store
            .create::<ClassicSuiteProvider>("a@x.com", "b@x.com")
            .unwrap();
        assert_eq!(friendship.state, FriendshipState::Pending);

        let keys = friendship.key_pair().unwrap();
        assert!(
            <ClassicSuiteProvider as CryptoProvider>::Asymmetric::is_matching_pair(
                keys.public_key(),
                keys.private_key()
            )
            .unwrap(),
            "generated halves must belong together"
        );
    }

    #[test]
    fn test_lookup_unknown_pair_is_none() {
        assert_eq!(store().lookup("a@x.com", "z@x.com").unwrap(), None);
    }

    #[test]
    fn test_confirm_twice_is_rejected() {
        let store = store();
        let friendship = store
            .insert_pending("a@x.com", "b@x.com", shared_key_pair())
            .unwrap();
        store.confirm(&friendship.id).unwrap();

        assert_eq!(
            store.confirm(&friendship.id),
            Err(MailError::FriendshipAlreadyAccepted)
        );
        assert_eq!(store.confirm("missing"), Err(MailError::FriendshipNotFound));
    }

    #[test]
    fn test_snapshot_through_repository() {
        let store = store();
        store
            .insert_pending("a@x.com", "b@x.com", shared_key_pair())
            .unwrap();

        let snapshot = store.with_repository(|repo| repo.export_friendships()).unwrap();
        let copy = FriendshipKeyStore::new(MemoryStorage::new());
        let imported = copy
            .with_repository(|repo| repo.import_friendships(&snapshot))
            .unwrap();

        assert_eq!(imported, 1);
        assert_eq!(copy.find("b@x.com", "a@x.com").unwrap(), store.find("a@x.com", "b@x.com").unwrap());
    }

    #[test]
    fn test_no_self_friendship() {
        let result = store().insert_pending("a@x.com", "A@x.com", shared_key_pair());
        assert!(matches!(result, Err(MailError::Validation(_))));
    }

    #[test]
    fn test_events_drive_lifecycle() {
        let store = store();
        let keys = shared_key_pair();
        let requested = FriendshipEvent::Requested {
            from: "a@x.com".to_string(),
            to: "b@x.com".to_string(),
            public_key: keys.public_key_b64(),
            private_key: keys.private_key_b64(),
        };

        store.publish(requested.clone()).unwrap();
        assert!(matches!(
            store.publish(requested),
            Err(MailError::FriendshipAlreadyExists(_, _))
        ));

        let accepted = FriendshipEvent::Accepted {
            from: "b@x.com".to_string(),
            to: "a@x.com".to_string(),
        };
        store.publish(accepted.clone()).unwrap();
        assert_eq!(store.publish(accepted), Err(MailError::FriendshipAlreadyAccepted));
        assert_eq!(store.friends_of("a@x.com").unwrap(), vec!["b@x.com".to_string()]);

        let deleted = FriendshipEvent::Deleted {
            from: "a@x.com".to_string(),
            to: "b@x.com".to_string(),
        };
        store.publish(deleted.clone()).unwrap();
        assert_eq!(store.publish(deleted), Err(MailError::FriendshipNotFound));
        assert!(store.friends_of("a@x.com").unwrap().is_empty());
    }
}
