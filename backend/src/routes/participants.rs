use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::store::{normalize_code, ParticipantView};
use crate::{now_ms, AppState};

#[derive(Deserialize)]
pub(crate) struct AddParticipantRequest {
    name: String,
}

pub(crate) async fn add_participant(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<AddParticipantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let code = normalize_code(&code);
    let participant = {
        let mut rooms = state.rooms.write().await;
        let room = rooms
            .get_mut(&code)
            .ok_or_else(|| ApiError::not_found("room"))?;
        room.add_participant(&payload.name, now_ms())?
    };
    state.persist().await;
    tracing::info!(room = %code, participant = %participant.id, "participant added");

    Ok((StatusCode::CREATED, Json(participant)))
}

pub(crate) async fn list_participants(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<ParticipantView>>, ApiError> {
    let rooms = state.rooms.read().await;
    let room = rooms
        .get(&normalize_code(&code))
        .ok_or_else(|| ApiError::not_found("room"))?;
    Ok(Json(room.participant_views()))
}

pub(crate) async fn delete_participant(
    State(state): State<AppState>,
    Path((code, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let code = normalize_code(&code);
    {
        let mut rooms = state.rooms.write().await;
        let room = rooms
            .get_mut(&code)
            .ok_or_else(|| ApiError::not_found("room"))?;
        if !room.remove_participant(&id) {
            return Err(ApiError::not_found("participant"));
        }
    }
    state.persist().await;
    tracing::info!(room = %code, participant = %id, "participant removed");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn clear_participants(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    let code = normalize_code(&code);
    {
        let mut rooms = state.rooms.write().await;
        let room = rooms
            .get_mut(&code)
            .ok_or_else(|| ApiError::not_found("room"))?;
        room.clear_participants();
    }
    state.persist().await;
    tracing::info!(room = %code, "participants cleared");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn add_list_and_reject_duplicates() {
        let (app, _) = test_app();
        let code = create_room(&app).await;

        let res = send(
            &app,
            Method::POST,
            &format!("/rooms/{code}/participants"),
            Some(json!({ "name": " alice " })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let alice = json_body(res).await;
        assert_eq!(alice["name"], "alice");
        assert_eq!(alice["has_pin"], false);
        assert!(alice.get("pin").is_none());

        let res = send(
            &app,
            Method::POST,
            &format!("/rooms/{code}/participants"),
            Some(json!({ "name": "ALICE" })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = send(
            &app,
            Method::POST,
            &format!("/rooms/{code}/participants"),
            Some(json!({ "name": "" })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = send(&app, Method::GET, &format!("/rooms/{code}/participants"), None).await;
        let listed = json_body(res).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let res = send(
            &app,
            Method::POST,
            "/rooms/ZZZZZZ/participants",
            Some(json!({ "name": "bob" })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleting_participant_cascades_to_assignments() {
        let (app, state) = test_app();
        let code = create_room(&app).await;
        let ids = seed_room(&app, &code, &["ann", "ben", "cat", "dan"]).await;
        generate(&app, &code).await;

        let res = send(
            &app,
            Method::DELETE,
            &format!("/rooms/{code}/participants/{}", ids[0]),
            None,
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let rooms = state.rooms.read().await;
        let room = &rooms[&code];
        assert_eq!(room.participants.len(), 3);
        assert_eq!(room.assignments.len(), 2);
        assert!(room.assignments.iter().all(|a| !a.involves(&ids[0])));
        drop(rooms);

        let res = send(
            &app,
            Method::DELETE,
            &format!("/rooms/{code}/participants/{}", ids[0]),
            None,
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn clearing_participants_leaves_no_assignments() {
        let (app, state) = test_app();
        let code = create_room(&app).await;
        seed_room(&app, &code, &["ann", "ben", "cat"]).await;
        generate(&app, &code).await;

        let res = send(&app, Method::DELETE, &format!("/rooms/{code}/participants"), None).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let rooms = state.rooms.read().await;
        let room = &rooms[&code];
        assert!(room.participants.is_empty());
        assert!(room.assignments.is_empty());
        assert_eq!(room.adjectives.len(), 9);
    }
}
