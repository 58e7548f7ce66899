mod adjectives;
mod assignments;
mod participants;
mod reveal;
mod rooms;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/categories", get(adjectives::list_categories))
        .route("/rooms", post(rooms::create_room))
        .route(
            "/rooms/:code",
            get(rooms::get_room).delete(rooms::delete_room),
        )
        .route(
            "/rooms/:code/participants",
            post(participants::add_participant)
                .get(participants::list_participants)
                .delete(participants::clear_participants),
        )
        .route(
            "/rooms/:code/participants/:id",
            delete(participants::delete_participant),
        )
        .route(
            "/rooms/:code/adjectives",
            post(adjectives::add_adjective)
                .get(adjectives::list_adjectives)
                .delete(adjectives::clear_adjectives),
        )
        .route(
            "/rooms/:code/adjectives/generate",
            post(adjectives::generate_adjectives),
        )
        .route(
            "/rooms/:code/adjectives/:id",
            delete(adjectives::delete_adjective),
        )
        .route(
            "/rooms/:code/assignments",
            get(assignments::list_assignments),
        )
        .route(
            "/rooms/:code/assignments/generate",
            post(assignments::generate_assignments),
        )
        .route("/reveal/:access_url", get(reveal::gate_status))
        .route("/reveal/:access_url/pin", post(reveal::set_pin))
        .route("/reveal/:access_url/verify", post(reveal::verify_pin))
        .route("/reveal/:access_url/gift-ideas", post(reveal::gift_ideas))
        .route("/reveal/:access_url/images", post(reveal::images))
}

async fn health() -> &'static str {
    "ok"
}
