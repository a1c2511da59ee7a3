// In-memory хранилище для тестов и встраивания

use crate::storage::models::Friendship;
use crate::storage::FriendshipRepository;
use crate::utils::error::{MailError, Result};
use std::collections::HashMap;

/// In-memory хранилище дружб
#[derive(Debug, Default)]
pub struct MemoryStorage {
    friendships: HashMap<String, Friendship>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.friendships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.friendships.is_empty()
    }

    /// Экспорт дружб (bincode)
    pub fn export_friendships(&self) -> Result<Vec<u8>> {
        let mut friendships: Vec<&Friendship> = self.friendships.values().collect();
        friendships.sort_by_key(|f| f.created_at);
        bincode::serialize(&friendships)
            .map_err(|e| MailError::Serialization(format!("Failed to export friendships: {}", e)))
    }

    /// Импорт дружб
    ///
    /// Records whose pair already has a friendship are skipped.
    pub fn import_friendships(&mut self, data: &[u8]) -> Result<usize> {
        let friendships: Vec<Friendship> = bincode::deserialize(data)
            .map_err(|e| MailError::Serialization(format!("Failed to import friendships: {}", e)))?;

        let mut imported = 0;
        for friendship in friendships {
            if self
                .find_by_pair(&friendship.initiator, &friendship.counterpart)?
                .is_none()
            {
                self.friendships.insert(friendship.id.clone(), friendship);
                imported += 1;
            }
        }

        Ok(imported)
    }

    pub fn clear_all(&mut self) {
        self.friendships.clear();
    }
}

impl FriendshipRepository for MemoryStorage {
    fn insert(&mut self, friendship: Friendship) -> Result<()> {
        if self
            .find_by_pair(&friendship.initiator, &friendship.counterpart)?
            .is_some()
        {
            return Err(MailError::FriendshipAlreadyExists(
                friendship.initiator,
                friendship.counterpart,
            ));
        }
        self.friendships.insert(friendship.id.clone(), friendship);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Friendship>> {
        Ok(self.friendships.get(id).cloned())
    }

    fn find_by_pair(&self, a: &str, b: &str) -> Result<Option<Friendship>> {
        Ok(self
            .friendships
            .values()
            .find(|f| f.is_between(a, b))
            .cloned())
    }

    fn update(&mut self, friendship: Friendship) -> Result<()> {
        match self.friendships.get_mut(&friendship.id) {
            Some(slot) => {
                *slot = friendship;
                Ok(())
            }
            None => Err(MailError::FriendshipNotFound),
        }
    }

    fn remove(&mut self, id: &str) -> Result<Option<Friendship>> {
        Ok(self.friendships.remove(id))
    }

    fn list_for(&self, email: &str) -> Result<Vec<Friendship>> {
        let mut friendships: Vec<Friendship> = self
            .friendships
            .values()
            .filter(|f| f.involves(email))
            .cloned()
            .collect();
        friendships.sort_by_key(|f| f.created_at);
        Ok(friendships)
    }
}
