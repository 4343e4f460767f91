use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Map, Value};

use crate::controllers::{SongController, UpdateOutcome};
use crate::errors::ApiError;
use crate::models::song::{MessageResponse, Song, SongId};

pub fn song_routes() -> Router<SongController> {
    Router::new()
        .route("/count", get(count_route))
        .route("/song", get(list_songs_route).post(create_song_route))
        .route(
            "/song/{id}",
            get(get_song_route)
                .put(update_song_route)
                .delete(delete_song_route),
        )
}

pub async fn count_route(State(songs): State<SongController>) -> Result<Response, ApiError> {
    Ok(Json(songs.count().await?).into_response())
}

pub async fn list_songs_route(State(songs): State<SongController>) -> Result<Response, ApiError> {
    Ok(Json(songs.list().await?).into_response())
}

pub async fn get_song_route(
    State(songs): State<SongController>,
    id: Result<Path<SongId>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    Ok(Json(songs.get(id).await?).into_response())
}

pub async fn create_song_route(
    State(songs): State<SongController>,
    body: Result<Json<Song>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(song) = body?;
    let inserted = songs.create(song).await?;
    Ok((StatusCode::CREATED, Json(inserted)).into_response())
}

pub async fn update_song_route(
    State(songs): State<SongController>,
    id: Result<Path<SongId>, PathRejection>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let Json(fields) = body?;

    match songs.update(id, fields).await? {
        UpdateOutcome::Updated(song) => Ok((StatusCode::CREATED, Json(song)).into_response()),
        UpdateOutcome::Unchanged => Ok((
            StatusCode::OK,
            Json(MessageResponse {
                message: "song not updated".to_string(),
            }),
        )
            .into_response()),
    }
}

pub async fn delete_song_route(
    State(songs): State<SongController>,
    id: Result<Path<SongId>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    songs.delete(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
