//! Draft, voting and results routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::room::{ResultsView, SelectionResponse, StepDto, SubmitResponse},
    error::AppError,
    routes::identity::CurrentUser,
    services::{
        room_service::{self, Submission},
        view_service,
    },
    state::{GameStep, SharedState},
};

/// Draft, voting and results endpoints of a running game.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/rooms/{name}/draft/movies/{movie_id}",
            post(toggle_draft_movie).delete(remove_draft_movie),
        )
        .route("/rooms/{name}/draft/submit", post(submit_draft))
        .route(
            "/rooms/{name}/voting/movies/{movie_id}",
            post(toggle_voting_movie),
        )
        .route("/rooms/{name}/voting/submit", post(submit_vote))
        .route("/rooms/{name}/results", get(get_results))
}

fn submit_response(submission: Submission, waiting_in: GameStep) -> SubmitResponse {
    match submission {
        Submission::Pending => SubmitResponse {
            step: StepDto::from(waiting_in),
            advanced: false,
        },
        Submission::Advanced(step) => SubmitResponse {
            step: StepDto::from(step),
            advanced: true,
        },
    }
}

/// Add or remove a movie from the caller's draft.
#[utoipa::path(
    post,
    path = "/rooms/{name}/draft/movies/{movie_id}",
    tag = "game",
    params(
        ("X-Username" = String, Header, description = "Caller display name"),
        ("name" = String, Path, description = "Room name"),
        ("movie_id" = String, Path, description = "Catalog movie id")
    ),
    responses(
        (status = 200, description = "Draft updated", body = SelectionResponse),
        (status = 404, description = "Unknown room, player or movie"),
        (status = 409, description = "Not drafting, or draft already submitted")
    )
)]
pub async fn toggle_draft_movie(
    State(state): State<SharedState>,
    CurrentUser(username): CurrentUser,
    Path((name, movie_id)): Path<(String, String)>,
) -> Result<Json<SelectionResponse>, AppError> {
    let (outcome, selected) =
        room_service::toggle_draft_movie(&state, &name, &username, &movie_id).await?;
    Ok(Json(SelectionResponse { outcome, selected }))
}

/// Remove a movie from the caller's draft.
#[utoipa::path(
    delete,
    path = "/rooms/{name}/draft/movies/{movie_id}",
    tag = "game",
    params(
        ("X-Username" = String, Header, description = "Caller display name"),
        ("name" = String, Path, description = "Room name"),
        ("movie_id" = String, Path, description = "Catalog movie id")
    ),
    responses(
        (status = 200, description = "Draft updated", body = SelectionResponse),
        (status = 409, description = "Not drafting, or draft already submitted")
    )
)]
pub async fn remove_draft_movie(
    State(state): State<SharedState>,
    CurrentUser(username): CurrentUser,
    Path((name, movie_id)): Path<(String, String)>,
) -> Result<Json<SelectionResponse>, AppError> {
    let (outcome, selected) =
        room_service::remove_draft_movie(&state, &name, &username, &movie_id).await?;
    Ok(Json(SelectionResponse { outcome, selected }))
}

/// Lock in the caller's draft.
#[utoipa::path(
    post,
    path = "/rooms/{name}/draft/submit",
    tag = "game",
    params(
        ("X-Username" = String, Header, description = "Caller display name"),
        ("name" = String, Path, description = "Room name")
    ),
    responses(
        (status = 200, description = "Draft submitted", body = SubmitResponse),
        (status = 409, description = "Not drafting, or empty draft")
    )
)]
pub async fn submit_draft(
    State(state): State<SharedState>,
    CurrentUser(username): CurrentUser,
    Path(name): Path<String>,
) -> Result<Json<SubmitResponse>, AppError> {
    let submission = room_service::submit_draft(&state, &name, &username).await?;
    Ok(Json(submit_response(submission, GameStep::Draft)))
}

/// Add or remove a candidate from the caller's ballot.
#[utoipa::path(
    post,
    path = "/rooms/{name}/voting/movies/{movie_id}",
    tag = "game",
    params(
        ("X-Username" = String, Header, description = "Caller display name"),
        ("name" = String, Path, description = "Room name"),
        ("movie_id" = String, Path, description = "Candidate movie id")
    ),
    responses(
        (status = 200, description = "Ballot updated", body = SelectionResponse),
        (status = 404, description = "Movie is not a candidate"),
        (status = 409, description = "Not voting, or ballot already submitted")
    )
)]
pub async fn toggle_voting_movie(
    State(state): State<SharedState>,
    CurrentUser(username): CurrentUser,
    Path((name, movie_id)): Path<(String, String)>,
) -> Result<Json<SelectionResponse>, AppError> {
    let (outcome, selected) =
        room_service::toggle_voting_movie(&state, &name, &username, &movie_id).await?;
    Ok(Json(SelectionResponse { outcome, selected }))
}

/// Lock in the caller's ballot.
#[utoipa::path(
    post,
    path = "/rooms/{name}/voting/submit",
    tag = "game",
    params(
        ("X-Username" = String, Header, description = "Caller display name"),
        ("name" = String, Path, description = "Room name")
    ),
    responses(
        (status = 200, description = "Ballot submitted", body = SubmitResponse),
        (status = 409, description = "Not voting, or empty ballot")
    )
)]
pub async fn submit_vote(
    State(state): State<SharedState>,
    CurrentUser(username): CurrentUser,
    Path(name): Path<String>,
) -> Result<Json<SubmitResponse>, AppError> {
    let submission = room_service::submit_vote(&state, &name, &username).await?;
    Ok(Json(submit_response(submission, GameStep::Voting)))
}

/// Winner and tally of a finished game.
#[utoipa::path(
    get,
    path = "/rooms/{name}/results",
    tag = "game",
    params(("name" = String, Path, description = "Room name")),
    responses(
        (status = 200, description = "Results", body = ResultsView),
        (status = 409, description = "Game has not finished yet")
    )
)]
pub async fn get_results(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<ResultsView>, AppError> {
    Ok(Json(view_service::results(&state, &name).await?))
}
