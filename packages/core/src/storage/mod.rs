// Модуль хранилища дружб

pub mod memory;
pub mod models;

pub use memory::MemoryStorage;

use crate::utils::error::Result;
use models::Friendship;

/// Persistence for friendships. Lookups by identity are ASCII
/// case-insensitive.
pub trait FriendshipRepository: Send + Sync {
    /// # Errors
    ///
    /// `FriendshipAlreadyExists` if a friendship between the pair exists
    fn insert(&mut self, friendship: Friendship) -> Result<()>;

    fn get(&self, id: &str) -> Result<Option<Friendship>>;

    /// Friendship between two identities in any state, either direction.
    fn find_by_pair(&self, a: &str, b: &str) -> Result<Option<Friendship>>;

    /// # Errors
    ///
    /// `FriendshipNotFound` if no friendship has this id
    fn update(&mut self, friendship: Friendship) -> Result<()>;

    fn remove(&mut self, id: &str) -> Result<Option<Friendship>>;

    fn list_for(&self, email: &str) -> Result<Vec<Friendship>>;
}
