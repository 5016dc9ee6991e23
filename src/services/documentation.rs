//! OpenAPI document assembly.

use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Watchma Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::lobby_stream,
        crate::routes::sse::room_stream,
        crate::routes::rooms::list_rooms,
        crate::routes::rooms::create_room,
        crate::routes::rooms::get_room,
        crate::routes::rooms::end_room,
        crate::routes::rooms::get_me,
        crate::routes::rooms::join_room,
        crate::routes::rooms::leave_room,
        crate::routes::rooms::toggle_ready,
        crate::routes::rooms::start_game,
        crate::routes::rooms::send_message,
        crate::routes::game::toggle_draft_movie,
        crate::routes::game::remove_draft_movie,
        crate::routes::game::submit_draft,
        crate::routes::game::toggle_voting_movie,
        crate::routes::game::submit_vote,
        crate::routes::game::get_results,
        crate::routes::movies::list_movies,
        crate::routes::movies::movie_of_the_day,
        crate::routes::debug::rooms_snapshot,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::EventPayload,
            crate::dto::movie::MovieSummary,
            crate::dto::room::CreateRoomRequest,
            crate::dto::room::SendMessageRequest,
            crate::dto::room::StepDto,
            crate::dto::room::RoomLimits,
            crate::dto::room::RoomSummary,
            crate::dto::room::PlayerSummary,
            crate::dto::room::MessageView,
            crate::dto::room::DialogueLineView,
            crate::dto::room::RoomView,
            crate::dto::room::PlayerView,
            crate::dto::room::VoteCount,
            crate::dto::room::ResultsView,
            crate::dto::room::ToggleOutcome,
            crate::dto::room::SelectionResponse,
            crate::dto::room::SubmitResponse,
            crate::dto::room::ReadyResponse,
            crate::dto::debug::DebugSnapshot,
            crate::dto::debug::DebugRoom,
            crate::dto::debug::DebugPlayer,
            crate::dto::debug::EventStats,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "rooms", description = "Room lifecycle, membership and chat"),
        (name = "game", description = "Draft, voting and results"),
        (name = "movies", description = "Movie catalog"),
        (name = "debug", description = "Read-only diagnostics"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_room_and_game_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/rooms",
            "/rooms/{name}",
            "/rooms/{name}/draft/movies/{movie_id}",
            "/rooms/{name}/voting/submit",
            "/movies/of-the-day",
            "/sse/rooms/{name}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
