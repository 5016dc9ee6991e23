//! Catalog browsing route.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::movie::{MovieListParams, MovieSummary},
    error::AppError,
    services::movie_service,
    state::SharedState,
};

/// Catalog browsing endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/of-the-day", get(movie_of_the_day))
}

/// Browse the catalog with optional genre, search and sort.
#[utoipa::path(
    get,
    path = "/movies",
    tag = "movies",
    params(MovieListParams),
    responses(
        (status = 200, description = "Matching movies", body = [MovieSummary]),
        (status = 503, description = "Movie catalog unavailable")
    )
)]
pub async fn list_movies(
    State(state): State<SharedState>,
    Query(params): Query<MovieListParams>,
) -> Result<Json<Vec<MovieSummary>>, AppError> {
    let movies = movie_service::list_movies(&state, &params.into()).await?;
    Ok(Json(movies))
}

/// Today's pick, stable for the whole UTC day.
#[utoipa::path(
    get,
    path = "/movies/of-the-day",
    tag = "movies",
    responses(
        (status = 200, description = "Movie of the day", body = MovieSummary),
        (status = 503, description = "Movie catalog unavailable")
    )
)]
pub async fn movie_of_the_day(
    State(state): State<SharedState>,
) -> Result<Json<MovieSummary>, AppError> {
    Ok(Json(movie_service::movie_of_the_day(&state).await?))
}
