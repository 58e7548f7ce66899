use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use santa_core::{Adjective, Category};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::store::normalize_code;
use crate::AppState;

pub const MAX_GENERATED_WORDS: usize = 20;

#[derive(Serialize)]
pub(crate) struct CategoryView {
    id: Category,
    label: &'static str,
    hint: &'static str,
}

pub(crate) async fn list_categories() -> Json<Vec<CategoryView>> {
    Json(
        Category::ALL
            .into_iter()
            .map(|category| CategoryView {
                id: category,
                label: category.label(),
                hint: category.hint(),
            })
            .collect(),
    )
}

#[derive(Deserialize)]
pub(crate) struct AddAdjectiveRequest {
    category: String,
    word: String,
}

#[derive(Deserialize)]
pub(crate) struct GenerateAdjectivesRequest {
    category: String,
    count: usize,
}

pub(crate) async fn add_adjective(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<AddAdjectiveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let code = normalize_code(&code);
    let category: Category = payload.category.parse()?;
    let adjective = {
        let mut rooms = state.rooms.write().await;
        let room = rooms
            .get_mut(&code)
            .ok_or_else(|| ApiError::not_found("room"))?;
        room.add_adjective(category, &payload.word, false)?
    };
    state.persist().await;
    tracing::debug!(room = %code, word = %adjective.word, %category, "word added");

    Ok((StatusCode::CREATED, Json(adjective)))
}

pub(crate) async fn list_adjectives(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<Adjective>>, ApiError> {
    let rooms = state.rooms.read().await;
    let room = rooms
        .get(&normalize_code(&code))
        .ok_or_else(|| ApiError::not_found("room"))?;
    Ok(Json(room.adjectives.clone()))
}

pub(crate) async fn delete_adjective(
    State(state): State<AppState>,
    Path((code, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let code = normalize_code(&code);
    {
        let mut rooms = state.rooms.write().await;
        let room = rooms
            .get_mut(&code)
            .ok_or_else(|| ApiError::not_found("room"))?;
        if !room.remove_adjective(&id) {
            return Err(ApiError::not_found("word"));
        }
    }
    state.persist().await;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn clear_adjectives(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    let code = normalize_code(&code);
    {
        let mut rooms = state.rooms.write().await;
        let room = rooms
            .get_mut(&code)
            .ok_or_else(|| ApiError::not_found("room"))?;
        room.clear_adjectives();
    }
    state.persist().await;
    tracing::info!(room = %code, "words cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// Asks the AI for words in one category. Words the room already has, or
/// that fail validation, are skipped rather than failing the batch.
pub(crate) async fn generate_adjectives(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<GenerateAdjectivesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let code = normalize_code(&code);
    let category: Category = payload.category.parse()?;
    if !(1..=MAX_GENERATED_WORDS).contains(&payload.count) {
        return Err(ApiError::bad_request(format!(
            "count must be between 1 and {MAX_GENERATED_WORDS}"
        )));
    }
    if !state.rooms.read().await.contains_key(&code) {
        return Err(ApiError::not_found("room"));
    }

    let words = state.ai.adjectives(category, payload.count).await?;

    let added = {
        let mut rooms = state.rooms.write().await;
        let room = rooms
            .get_mut(&code)
            .ok_or_else(|| ApiError::not_found("room"))?;
        words
            .iter()
            .filter_map(|word| room.add_adjective(category, word, true).ok())
            .collect::<Vec<_>>()
    };
    state.persist().await;
    tracing::info!(
        room = %code,
        %category,
        requested = payload.count,
        added = added.len(),
        "words generated"
    );

    Ok((StatusCode::CREATED, Json(added)))
}
