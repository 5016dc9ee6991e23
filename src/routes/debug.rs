//! Operator debug routes.

use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::debug::DebugSnapshot, services::debug_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/debug/rooms",
    tag = "debug",
    responses((status = 200, description = "Snapshot of every room", body = DebugSnapshot))
)]
/// Read-only dump of room state and event fabric counters.
pub async fn rooms_snapshot(State(state): State<SharedState>) -> Json<DebugSnapshot> {
    Json(debug_service::snapshot(&state).await)
}

/// Read-only operator endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/debug/rooms", get(rooms_snapshot))
}
