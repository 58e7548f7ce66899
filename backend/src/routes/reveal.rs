//! The PIN-gated assignment view, reached only through an assignment's
//! opaque `access_url`.

use axum::extract::{Path, State};
use axum::Json;
use futures::future::try_join_all;
use santa_core::AssignmentStatus;
use serde::Deserialize;

use crate::ai::AiError;
use crate::error::ApiError;
use crate::store::{locate, locate_mut, AssignmentReveal, GateStatus};
use crate::AppState;

#[derive(Deserialize)]
pub(crate) struct PinRequest {
    pin: String,
}

pub(crate) async fn gate_status(
    State(state): State<AppState>,
    Path(access_url): Path<String>,
) -> Result<Json<GateStatus>, ApiError> {
    let rooms = state.rooms.read().await;
    let (room, index) = locate(&rooms, &access_url).ok_or_else(|| ApiError::not_found("assignment"))?;
    Ok(Json(room.gate_status(index)?))
}

/// First visit: the gifter picks a PIN and sees their assignment.
pub(crate) async fn set_pin(
    State(state): State<AppState>,
    Path(access_url): Path<String>,
    Json(payload): Json<PinRequest>,
) -> Result<Json<AssignmentReveal>, ApiError> {
    let reveal = {
        let mut rooms = state.rooms.write().await;
        let (room, index) =
            locate_mut(&mut rooms, &access_url).ok_or_else(|| ApiError::not_found("assignment"))?;
        room.gifter_mut(index)?.set_pin(&payload.pin)?;
        room.reveal(index)?
    };
    state.persist().await;
    tracing::info!("pin set");
    Ok(Json(reveal))
}

pub(crate) async fn verify_pin(
    State(state): State<AppState>,
    Path(access_url): Path<String>,
    Json(payload): Json<PinRequest>,
) -> Result<Json<AssignmentReveal>, ApiError> {
    let reveal = unlock(&state, &access_url, &payload.pin).await?;
    Ok(Json(reveal))
}

/// Fills in gift ideas the first time they are asked for; afterwards the
/// stored ideas are returned as they are.
pub(crate) async fn gift_ideas(
    State(state): State<AppState>,
    Path(access_url): Path<String>,
    Json(payload): Json<PinRequest>,
) -> Result<Json<AssignmentReveal>, ApiError> {
    let reveal = unlock(&state, &access_url, &payload.pin).await?;
    if reveal.status != AssignmentStatus::PendingGiftIdeas {
        return Ok(Json(reveal));
    }

    let ideas = state.ai.gift_ideas(reveal.adjectives.clone()).await?;
    if ideas.is_empty() {
        return Err(AiError::Malformed("no gift ideas in the answer".into()).into());
    }

    let reveal = {
        let mut rooms = state.rooms.write().await;
        let (room, index) =
            locate_mut(&mut rooms, &access_url).ok_or_else(|| ApiError::not_found("assignment"))?;
        if !room.assignment_at_mut(index)?.record_gift_ideas(ideas) {
            tracing::debug!("gift ideas already recorded, discarding this answer");
        }
        room.reveal(index)?
    };
    state.persist().await;
    tracing::info!(ideas = reveal.gift_ideas.len(), "gift ideas generated");
    Ok(Json(reveal))
}

/// One image per idea. Requires ideas to exist; a completed assignment is
/// returned unchanged.
pub(crate) async fn images(
    State(state): State<AppState>,
    Path(access_url): Path<String>,
    Json(payload): Json<PinRequest>,
) -> Result<Json<AssignmentReveal>, ApiError> {
    let reveal = unlock(&state, &access_url, &payload.pin).await?;
    match reveal.status {
        AssignmentStatus::PendingGiftIdeas => {
            return Err(ApiError::bad_request("gift ideas have not been generated yet"))
        }
        AssignmentStatus::Completed => return Ok(Json(reveal)),
        AssignmentStatus::PendingImages => {}
    }

    let urls = try_join_all(
        reveal
            .gift_ideas
            .iter()
            .map(|idea| state.ai.illustrate(idea.title.clone())),
    )
    .await?;

    let reveal = {
        let mut rooms = state.rooms.write().await;
        let (room, index) =
            locate_mut(&mut rooms, &access_url).ok_or_else(|| ApiError::not_found("assignment"))?;
        if !room.assignment_at_mut(index)?.record_images(urls) {
            tracing::debug!("images already recorded, discarding this answer");
        }
        room.reveal(index)?
    };
    state.persist().await;
    tracing::info!("gift images generated");
    Ok(Json(reveal))
}

/// Checks the PIN and marks the gifter as having accessed their assignment.
/// A wrong PIN changes nothing and reveals nothing.
async fn unlock(state: &AppState, access_url: &str, pin: &str) -> Result<AssignmentReveal, ApiError> {
    let reveal = {
        let mut rooms = state.rooms.write().await;
        let (room, index) =
            locate_mut(&mut rooms, access_url).ok_or_else(|| ApiError::not_found("assignment"))?;
        if let Err(err) = room.gifter_mut(index)?.unlock(pin) {
            tracing::debug!(%err, "pin rejected");
            return Err(err.into());
        }
        room.reveal(index)?
    };
    state.persist().await;
    Ok(reveal)
}
