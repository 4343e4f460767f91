use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{SongStore, UpdateResult};
use crate::errors::StoreError;
use crate::models::song::{Song, SongId};

/// In-process stand-in for the songs collection, with the same uniqueness
/// rule as the real index.
#[derive(Default)]
pub struct MemorySongStore {
    docs: RwLock<Vec<(Uuid, Song)>>,
}

impl MemorySongStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Shallow merge of `patch` into `song`, mirroring JSONB `||`. Returns
/// whether any field actually changed.
fn merge(song: &mut Song, patch: &Map<String, Value>) -> bool {
    let mut changed = false;
    for (key, value) in patch {
        if song.0.get(key) != Some(value) {
            song.0.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

fn id_taken(docs: &[(Uuid, Song)], id: Option<SongId>, except: Option<Uuid>) -> bool {
    id.is_some_and(|id| {
        docs.iter()
            .any(|(key, song)| Some(*key) != except && song.id() == Some(id))
    })
}

#[async_trait]
impl SongStore for MemorySongStore {
    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.docs.read().await.len() as i64)
    }

    async fn list(&self) -> Result<Vec<Song>, StoreError> {
        Ok(self.docs.read().await.iter().map(|(_, s)| s.clone()).collect())
    }

    async fn find(&self, id: SongId) -> Result<Option<Song>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .find(|(_, s)| s.id() == Some(id))
            .map(|(_, s)| s.clone()))
    }

    async fn insert(&self, song: &Song) -> Result<Uuid, StoreError> {
        let mut docs = self.docs.write().await;
        if id_taken(&docs, song.id(), None) {
            return Err(StoreError::Duplicate);
        }
        let key = Uuid::new_v4();
        docs.push((key, song.clone()));
        Ok(key)
    }

    async fn update(
        &self,
        id: SongId,
        fields: &Map<String, Value>,
    ) -> Result<UpdateResult, StoreError> {
        let mut docs = self.docs.write().await;
        let Some(pos) = docs.iter().position(|(_, s)| s.id() == Some(id)) else {
            return Ok(UpdateResult::default());
        };

        let mut merged = docs[pos].1.clone();
        let modified = merge(&mut merged, fields);
        if modified && id_taken(&docs, merged.id(), Some(docs[pos].0)) {
            return Err(StoreError::Duplicate);
        }
        docs[pos].1 = merged;

        Ok(UpdateResult {
            matched: 1,
            modified: modified as u64,
        })
    }

    async fn delete(&self, id: SongId) -> Result<u64, StoreError> {
        let mut docs = self.docs.write().await;
        let before = docs.len();
        docs.retain(|(_, s)| s.id() != Some(id));
        Ok((before - docs.len()) as u64)
    }

    async fn replace_all(&self, songs: &[Song]) -> Result<u64, StoreError> {
        let mut fresh: Vec<(Uuid, Song)> = Vec::with_capacity(songs.len());
        for song in songs {
            if id_taken(&fresh, song.id(), None) {
                return Err(StoreError::Duplicate);
            }
            fresh.push((Uuid::new_v4(), song.clone()));
        }
        *self.docs.write().await = fresh;
        Ok(songs.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn song(value: Value) -> Song {
        serde_json::from_value(value).unwrap()
    }

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn merge_keeps_untouched_fields() {
        let mut s = song(json!({"id": 1, "title": "A", "artist": "X"}));
        assert!(merge(&mut s, &fields(json!({"title": "B", "year": 1999}))));
        assert_eq!(s, song(json!({"id": 1, "title": "B", "artist": "X", "year": 1999})));
    }

    #[test]
    fn merge_with_same_values_reports_no_change() {
        let mut s = song(json!({"id": 1, "title": "A"}));
        assert!(!merge(&mut s, &fields(json!({"title": "A"}))));
        assert!(!merge(&mut s, &Map::new()));
        assert_eq!(s, song(json!({"id": 1, "title": "A"})));
    }

    #[tokio::test]
    async fn update_counts_matched_and_modified() {
        let store = MemorySongStore::new();
        store.insert(&song(json!({"id": 1, "title": "A"}))).await.unwrap();

        let same = store.update(SongId(1), &fields(json!({"title": "A"}))).await.unwrap();
        assert_eq!(same, UpdateResult { matched: 1, modified: 0 });

        let changed = store.update(SongId(1), &fields(json!({"title": "B"}))).await.unwrap();
        assert_eq!(changed, UpdateResult { matched: 1, modified: 1 });

        let missing = store.update(SongId(2), &fields(json!({"title": "B"}))).await.unwrap();
        assert_eq!(missing, UpdateResult::default());
    }
}
