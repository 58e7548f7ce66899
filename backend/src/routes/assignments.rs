use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use santa_core::{assemble, check_pool, draw, resolve_triplets, shuffle_in_cycle};
use serde::Deserialize;

use crate::error::ApiError;
use crate::store::{normalize_code, AssignmentLink};
use crate::AppState;

#[derive(Deserialize)]
pub(crate) struct GenerateParams {
    seed: Option<u64>,
}

/// Replaces the room's assignments.
///
/// Old assignments are deleted (and persisted) before the AI is consulted and
/// the new set is only written once the draw succeeds. A failure in between
/// leaves the room without assignments. Two concurrent calls for the same
/// room race and the last write wins.
pub(crate) async fn generate_assignments(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(params): Query<GenerateParams>,
) -> Result<impl IntoResponse, ApiError> {
    let code = normalize_code(&code);
    let (participants, pool) = {
        let mut rooms = state.rooms.write().await;
        let room = rooms
            .get_mut(&code)
            .ok_or_else(|| ApiError::not_found("room"))?;
        check_pool(room.participants.len(), room.adjectives.len())?;
        room.clear_assignments();
        (room.participants.clone(), room.adjectives.clone())
    };
    state.persist().await;

    let proposed = state
        .ai
        .pair_words(pool.clone(), participants.len())
        .await?;

    let mut rng = params
        .seed
        .map(ChaCha8Rng::seed_from_u64)
        .unwrap_or_else(ChaCha8Rng::from_entropy);
    let drafts = match proposed {
        Some(words) => {
            let pairings = shuffle_in_cycle(&participants, &mut rng)?;
            let triplets = resolve_triplets(&pool, &words, participants.len())?;
            assemble(pairings, triplets)?
        }
        None => draw(&participants, &pool, &mut rng)?,
    };

    let links = {
        let mut rooms = state.rooms.write().await;
        let room = rooms
            .get_mut(&code)
            .ok_or_else(|| ApiError::not_found("room"))?;
        room.replace_assignments(drafts)?;
        room.links()
    };
    state.persist().await;
    tracing::info!(room = %code, assignments = links.len(), "assignments generated");

    Ok((StatusCode::CREATED, Json(links)))
}

pub(crate) async fn list_assignments(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<AssignmentLink>>, ApiError> {
    let rooms = state.rooms.read().await;
    let room = rooms
        .get(&normalize_code(&code))
        .ok_or_else(|| ApiError::not_found("room"))?;
    Ok(Json(room.links()))
}
