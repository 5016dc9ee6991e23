//! Lobby and room membership routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tracing::warn;
use validator::Validate;

use crate::{
    dto::room::{
        CreateRoomRequest, MessageView, PlayerView, ReadyResponse, RoomSummary, RoomView,
        SendMessageRequest,
    },
    error::AppError,
    routes::identity::CurrentUser,
    services::{room_service, view_service},
    state::SharedState,
};

/// Room lifecycle, membership, readiness and chat.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{name}", get(get_room).delete(end_room))
        .route("/rooms/{name}/me", get(get_me))
        .route("/rooms/{name}/join", post(join_room))
        .route("/rooms/{name}/leave", post(leave_room))
        .route("/rooms/{name}/ready", post(toggle_ready))
        .route("/rooms/{name}/start", post(start_game))
        .route("/rooms/{name}/messages", post(send_message))
}

/// List every live room for the lobby.
#[utoipa::path(
    get,
    path = "/rooms",
    tag = "rooms",
    responses((status = 200, description = "Live rooms ordered by name", body = [RoomSummary]))
)]
pub async fn list_rooms(State(state): State<SharedState>) -> Json<Vec<RoomSummary>> {
    Json(view_service::list_rooms(&state).await)
}

/// Open a room; the caller becomes its host and first player.
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    params(("X-Username" = String, Header, description = "Caller display name")),
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = RoomView),
        (status = 400, description = "Invalid name or limits"),
        (status = 409, description = "A room with this name already exists")
    )
)]
pub async fn create_room(
    State(state): State<SharedState>,
    CurrentUser(username): CurrentUser,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomView>), AppError> {
    payload.validate()?;
    room_service::add_room(&state, &payload.name, payload.room_config(), &username)?;
    if let Err(err) = room_service::add_player(&state, &payload.name, &username).await {
        warn!(room = %payload.name, error = %err, "host could not join the new room");
        room_service::delete_room(&state, &payload.name).await;
        return Err(err.into());
    }
    let view = view_service::room_view(&state, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Full view of one room.
#[utoipa::path(
    get,
    path = "/rooms/{name}",
    tag = "rooms",
    params(("name" = String, Path, description = "Room name")),
    responses(
        (status = 200, description = "Room view", body = RoomView),
        (status = 404, description = "Unknown room")
    )
)]
pub async fn get_room(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<RoomView>, AppError> {
    Ok(Json(view_service::room_view(&state, &name).await?))
}

/// End the room for everyone. Host only.
#[utoipa::path(
    delete,
    path = "/rooms/{name}",
    tag = "rooms",
    params(
        ("X-Username" = String, Header, description = "Caller display name"),
        ("name" = String, Path, description = "Room name")
    ),
    responses(
        (status = 204, description = "Room ended"),
        (status = 403, description = "Caller is not the host"),
        (status = 404, description = "Unknown room")
    )
)]
pub async fn end_room(
    State(state): State<SharedState>,
    CurrentUser(username): CurrentUser,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    room_service::end_room(&state, &name, &username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's own selections and flags.
#[utoipa::path(
    get,
    path = "/rooms/{name}/me",
    tag = "rooms",
    params(
        ("X-Username" = String, Header, description = "Caller display name"),
        ("name" = String, Path, description = "Room name")
    ),
    responses(
        (status = 200, description = "Player view", body = PlayerView),
        (status = 404, description = "Unknown room or player")
    )
)]
pub async fn get_me(
    State(state): State<SharedState>,
    CurrentUser(username): CurrentUser,
    Path(name): Path<String>,
) -> Result<Json<PlayerView>, AppError> {
    Ok(Json(view_service::player_view(&state, &name, &username).await?))
}

/// Join a room waiting in its lobby.
#[utoipa::path(
    post,
    path = "/rooms/{name}/join",
    tag = "rooms",
    params(
        ("X-Username" = String, Header, description = "Caller display name"),
        ("name" = String, Path, description = "Room name")
    ),
    responses(
        (status = 204, description = "Joined"),
        (status = 404, description = "Unknown room"),
        (status = 409, description = "Room full, already started, or name taken")
    )
)]
pub async fn join_room(
    State(state): State<SharedState>,
    CurrentUser(username): CurrentUser,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    room_service::add_player(&state, &name, &username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Leave a room; the last player out deletes it.
#[utoipa::path(
    post,
    path = "/rooms/{name}/leave",
    tag = "rooms",
    params(
        ("X-Username" = String, Header, description = "Caller display name"),
        ("name" = String, Path, description = "Room name")
    ),
    responses(
        (status = 204, description = "Left"),
        (status = 404, description = "Unknown room or player")
    )
)]
pub async fn leave_room(
    State(state): State<SharedState>,
    CurrentUser(username): CurrentUser,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    room_service::remove_player(&state, &name, &username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Flip the caller's lobby readiness.
#[utoipa::path(
    post,
    path = "/rooms/{name}/ready",
    tag = "rooms",
    params(
        ("X-Username" = String, Header, description = "Caller display name"),
        ("name" = String, Path, description = "Room name")
    ),
    responses(
        (status = 200, description = "New readiness", body = ReadyResponse),
        (status = 409, description = "Room is not in its lobby")
    )
)]
pub async fn toggle_ready(
    State(state): State<SharedState>,
    CurrentUser(username): CurrentUser,
    Path(name): Path<String>,
) -> Result<Json<ReadyResponse>, AppError> {
    let ready = room_service::toggle_ready(&state, &name, &username).await?;
    Ok(Json(ReadyResponse { ready }))
}

/// Start drafting. Host only.
#[utoipa::path(
    post,
    path = "/rooms/{name}/start",
    tag = "rooms",
    params(
        ("X-Username" = String, Header, description = "Caller display name"),
        ("name" = String, Path, description = "Room name")
    ),
    responses(
        (status = 204, description = "Draft started"),
        (status = 403, description = "Caller is not the host"),
        (status = 409, description = "Room is not in its lobby"),
        (status = 503, description = "Movie catalog unavailable")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    CurrentUser(username): CurrentUser,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    room_service::start_game(&state, &name, &username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Post a chat message.
#[utoipa::path(
    post,
    path = "/rooms/{name}/messages",
    tag = "rooms",
    params(
        ("X-Username" = String, Header, description = "Caller display name"),
        ("name" = String, Path, description = "Room name")
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = MessageView),
        (status = 400, description = "Empty or oversized message")
    )
)]
pub async fn send_message(
    State(state): State<SharedState>,
    CurrentUser(username): CurrentUser,
    Path(name): Path<String>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageView>), AppError> {
    payload.validate()?;
    let message = room_service::add_message(&state, &name, &username, &payload.body).await?;
    Ok((StatusCode::CREATED, Json(MessageView::from(&message))))
}
