use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::store::{new_room_code, normalize_code, RoomRecord, RoomView};
use crate::{now_ms, AppState};

#[derive(Serialize)]
struct CreateRoomResponse {
    code: String,
    created_at: u64,
}

pub(crate) async fn create_room(State(state): State<AppState>) -> impl IntoResponse {
    let created_at = now_ms();
    let code = {
        let mut rooms = state.rooms.write().await;
        let code = unused_code(&rooms);
        rooms.insert(code.clone(), RoomRecord::new(code.clone(), created_at));
        code
    };
    state.persist().await;
    tracing::info!(room = %code, "room created");

    (
        StatusCode::CREATED,
        Json(CreateRoomResponse { code, created_at }),
    )
}

fn unused_code(rooms: &HashMap<String, RoomRecord>) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let code = new_room_code(&mut rng);
        if !rooms.contains_key(&code) {
            return code;
        }
    }
}

pub(crate) async fn get_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<RoomView>, ApiError> {
    let rooms = state.rooms.read().await;
    let room = rooms
        .get(&normalize_code(&code))
        .ok_or_else(|| ApiError::not_found("room"))?;
    Ok(Json(room.view()))
}

/// Children go first: assignments, then words, then participants.
pub(crate) async fn delete_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    let code = normalize_code(&code);
    {
        let mut rooms = state.rooms.write().await;
        let room = rooms
            .get_mut(&code)
            .ok_or_else(|| ApiError::not_found("room"))?;
        room.clear_all();
        rooms.remove(&code);
    }
    state.persist().await;
    tracing::info!(room = %code, "room deleted");
    Ok(StatusCode::NO_CONTENT)
}
