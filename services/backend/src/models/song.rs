use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Business key of a song, assigned by clients and unique per collection.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SongId(pub i64);

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A stored song document. Only `id` is interpreted; every other field is
/// carried through untouched.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct Song(pub(crate) Map<String, Value>);

impl Song {
    /// The `id` field, if present and integral.
    pub fn id(&self) -> Option<SongId> {
        self.0.get("id").and_then(Value::as_i64).map(SongId)
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize, Clone, Debug)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Serialize, Clone, Debug)]
pub struct InsertedResponse {
    #[serde(rename = "inserted id")]
    pub inserted_id: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct MessageResponse {
    pub message: String,
}
