use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{PgPool, postgres::PgPoolOptions, types::Json};
use tracing::debug;
use uuid::Uuid;

use crate::db::{SongStore, UpdateResult};
use crate::errors::StoreError;
use crate::models::song::{Song, SongId};
use crate::settings::DbSettings;

/// Songs collection kept as JSONB documents in PostgreSQL. The unique index
/// on `doc -> 'id'` (see migrations) enforces one document per business key.
#[derive(Clone)]
pub struct PgSongStore {
    pool: PgPool,
}

impl PgSongStore {
    pub async fn connect(settings: &DbSettings) -> Result<Self, StoreError> {
        debug!("DATABASE_URL={}", settings.redacted_url());

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(settings.connection_url().as_str())
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn write_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl SongStore for PgSongStore {
    async fn count(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM songs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list(&self) -> Result<Vec<Song>, StoreError> {
        let docs = sqlx::query_scalar::<_, Json<Song>>("SELECT doc FROM songs ORDER BY seq")
            .fetch_all(&self.pool)
            .await?;
        Ok(docs.into_iter().map(|Json(song)| song).collect())
    }

    async fn find(&self, id: SongId) -> Result<Option<Song>, StoreError> {
        let doc = sqlx::query_scalar::<_, Json<Song>>("SELECT doc FROM songs WHERE doc -> 'id' = $1")
            .bind(Json(id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc.map(|Json(song)| song))
    }

    async fn insert(&self, song: &Song) -> Result<Uuid, StoreError> {
        let key = Uuid::new_v4();
        sqlx::query("INSERT INTO songs (_id, doc) VALUES ($1, $2)")
            .bind(key)
            .bind(Json(song))
            .execute(&self.pool)
            .await
            .map_err(write_error)?;

        Ok(key)
    }

    async fn update(
        &self,
        id: SongId,
        fields: &Map<String, Value>,
    ) -> Result<UpdateResult, StoreError> {
        // `||` on two JSONB objects is a shallow merge, right side wins.
        let (matched, modified) = sqlx::query_as::<_, (i64, i64)>(
            "WITH matched AS (
                 SELECT _id, doc FROM songs WHERE doc -> 'id' = $1
             ), updated AS (
                 UPDATE songs SET doc = matched.doc || $2
                 FROM matched
                 WHERE songs._id = matched._id AND matched.doc || $2 <> matched.doc
                 RETURNING songs._id
             )
             SELECT (SELECT COUNT(*) FROM matched), (SELECT COUNT(*) FROM updated)",
        )
        .bind(Json(id))
        .bind(Json(fields))
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(UpdateResult {
            matched: matched as u64,
            modified: modified as u64,
        })
    }

    async fn delete(&self, id: SongId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM songs WHERE doc -> 'id' = $1")
            .bind(Json(id))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn replace_all(&self, songs: &[Song]) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM songs").execute(&mut *tx).await?;

        for song in songs {
            sqlx::query("INSERT INTO songs (_id, doc) VALUES ($1, $2)")
                .bind(Uuid::new_v4())
                .bind(Json(song))
                .execute(&mut *tx)
                .await
                .map_err(write_error)?;
        }

        tx.commit().await?;
        Ok(songs.len() as u64)
    }
}
