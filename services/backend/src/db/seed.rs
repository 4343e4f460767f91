use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use crate::db::SongStore;
use crate::models::song::Song;

/// Replaces the whole collection with the JSON array of songs in `path`.
///
/// Any failure, including a missing file, is an error: the caller must not
/// start serving over whatever the store held before.
pub async fn load_seed_file(store: &dyn SongStore, path: &Path) -> anyhow::Result<u64> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read seed file {}", path.display()))?;

    let songs: Vec<Song> = serde_json::from_str(&raw)
        .with_context(|| format!("seed file {} is not a JSON array of songs", path.display()))?;

    let without_id = songs.iter().filter(|s| s.id().is_none()).count();
    if without_id > 0 {
        warn!("{} seed songs have no integer id and cannot be fetched by id", without_id);
    }

    let loaded = store
        .replace_all(&songs)
        .await
        .context("failed to load seed songs into the store")?;

    info!("Data successfully inserted: {} songs from {}", loaded, path.display());
    Ok(loaded)
}
