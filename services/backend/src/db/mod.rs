use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::song::{Song, SongId};

#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod seed;

pub use postgres::PgSongStore;

/// Match/modify counts of a single-document update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
}

/// The songs collection. Every method is one store round-trip; lookups are
/// by the document's business `id`, never by the store-assigned key.
#[async_trait]
pub trait SongStore: Send + Sync {
    async fn count(&self) -> Result<i64, StoreError>;

    /// All documents in store order.
    async fn list(&self) -> Result<Vec<Song>, StoreError>;

    async fn find(&self, id: SongId) -> Result<Option<Song>, StoreError>;

    /// Inserts a new document and returns its store-assigned key.
    /// Fails with `StoreError::Duplicate` if the `id` is taken.
    async fn insert(&self, song: &Song) -> Result<Uuid, StoreError>;

    /// Shallow-merges `fields` into the document with the given `id`.
    async fn update(
        &self,
        id: SongId,
        fields: &Map<String, Value>,
    ) -> Result<UpdateResult, StoreError>;

    /// Returns the number of documents removed (0 or 1).
    async fn delete(&self, id: SongId) -> Result<u64, StoreError>;

    /// Drops the whole collection and loads `songs` in its place.
    async fn replace_all(&self, songs: &[Song]) -> Result<u64, StoreError>;
}
