//! Server-sent event streams for the lobby and rooms.

use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{error::AppError, services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/lobby",
    tag = "sse",
    responses((status = 200, description = "Room list changes", content_type = "text/event-stream", body = String))
)]
/// Stream `RoomListUpdate` events to lobby screens.
pub async fn lobby_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = sse_service::subscribe_lobby(&state);
    info!("New lobby SSE connection");
    sse_service::to_sse_stream(subscription)
}

#[utoipa::path(
    get,
    path = "/sse/rooms/{name}",
    tag = "sse",
    params(("name" = String, Path, description = "Room name")),
    responses(
        (status = 200, description = "Room events", content_type = "text/event-stream", body = String),
        (status = 404, description = "Unknown room")
    )
)]
/// Stream one room's events; the stream ends when the room is deleted.
pub async fn room_stream(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let subscription = sse_service::subscribe_room(&state, &name)?;
    info!(room = %name, "New room SSE connection");
    Ok(sse_service::to_sse_stream(subscription))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/sse/lobby", get(lobby_stream))
        .route("/sse/rooms/{name}", get(room_stream))
}
