use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{
    db::SongStore,
    errors::{ApiError, StoreError},
    models::song::{CountResponse, InsertedResponse, Song, SongId},
};

/// Result of a successful lookup-then-merge.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Song),
    Unchanged,
}

/// Song operations over an injected store. Cloning shares the store handle.
#[derive(Clone)]
pub struct SongController {
    store: Arc<dyn SongStore>,
}

impl SongController {
    pub fn new(store: Arc<dyn SongStore>) -> Self {
        SongController { store }
    }

    pub async fn count(&self) -> Result<CountResponse, ApiError> {
        let count = self.store.count().await?;
        debug!("song count={}", count);
        Ok(CountResponse { count })
    }

    pub async fn list(&self) -> Result<Vec<Song>, ApiError> {
        let songs = self.store.list().await?;
        debug!("listing {} songs", songs.len());
        Ok(songs)
    }

    pub async fn get(&self, id: SongId) -> Result<Song, ApiError> {
        self.store
            .find(id)
            .await?
            .ok_or(ApiError::SongNotFound(id))
    }

    /// Inserts `song` unless its `id` is already taken. The lookup and the
    /// insert are separate calls; the store's unique index catches the race.
    pub async fn create(&self, song: Song) -> Result<InsertedResponse, ApiError> {
        let id = song.id().ok_or_else(|| {
            ApiError::BadRequest("song must contain an integer \"id\" field".to_string())
        })?;

        if self.store.find(id).await?.is_some() {
            warn!("Rejected duplicate song id {}", id);
            return Err(ApiError::Conflict(id));
        }

        let key = match self.store.insert(&song).await {
            Ok(key) => key,
            Err(StoreError::Duplicate) => {
                warn!("Concurrent insert won the race for song id {}", id);
                return Err(ApiError::Conflict(id));
            }
            Err(e) => return Err(e.into()),
        };

        info!("Created song {} as {}", id, key);
        Ok(InsertedResponse {
            inserted_id: key.to_string(),
        })
    }

    pub async fn update(
        &self,
        id: SongId,
        fields: Map<String, Value>,
    ) -> Result<UpdateOutcome, ApiError> {
        if self.store.find(id).await?.is_none() {
            return Err(ApiError::NotFound);
        }

        // The patch may move the song to a new business key.
        let new_id = match fields.get("id") {
            Some(value) => value.as_i64().map(SongId).ok_or_else(|| {
                ApiError::BadRequest("\"id\" must be an integer".to_string())
            })?,
            None => id,
        };

        let result = match self.store.update(id, &fields).await {
            Ok(result) => result,
            Err(StoreError::Duplicate) => return Err(ApiError::Conflict(new_id)),
            Err(e) => return Err(e.into()),
        };

        if result.matched == 0 {
            // Deleted between the lookup and the update.
            return Err(ApiError::NotFound);
        }
        if result.modified == 0 {
            debug!("song {} not updated, no field changed", id);
            return Ok(UpdateOutcome::Unchanged);
        }

        info!("Updated song {}", id);
        let song = self.store.find(new_id).await?.ok_or(ApiError::NotFound)?;
        Ok(UpdateOutcome::Updated(song))
    }

    pub async fn delete(&self, id: SongId) -> Result<(), ApiError> {
        if self.store.delete(id).await? == 0 {
            return Err(ApiError::NotFound);
        }
        info!("Deleted song {}", id);
        Ok(())
    }
}
