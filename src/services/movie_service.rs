//! Catalog listing for clients browsing before a draft.

use tracing::warn;

use crate::{
    catalog::MovieQuery,
    dto::movie::MovieSummary,
    error::ServiceError,
    state::SharedState,
};

/// Filtered, searched and sorted catalog listing.
pub async fn list_movies(
    state: &SharedState,
    query: &MovieQuery,
) -> Result<Vec<MovieSummary>, ServiceError> {
    let movies = state.movies().query(query).await.map_err(|err| {
        warn!(error = %err, "movie catalog query failed");
        ServiceError::from(err)
    })?;
    Ok(movies.iter().map(MovieSummary::from).collect())
}

/// Today's deterministic pick.
pub async fn movie_of_the_day(state: &SharedState) -> Result<MovieSummary, ServiceError> {
    let movie = state.movies().get_movie_of_the_day().await.map_err(|err| {
        warn!(error = %err, "movie of the day unavailable");
        ServiceError::from(err)
    })?;
    Ok(MovieSummary::from(&movie))
}
