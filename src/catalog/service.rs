//! Catalog facade applying genre filters and sorting.

use std::{cmp::Ordering, sync::Arc};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::info;

use super::{CatalogError, CatalogResult, Movie, MovieProvider, MovieQuery, SortField};

/// Read-side façade over the configured [`MovieProvider`].
pub struct MovieService {
    provider: Arc<dyn MovieProvider>,
    of_the_day: Mutex<Option<(i64, Movie)>>,
}

impl MovieService {
    /// Facade over `provider`.
    pub fn new(provider: Arc<dyn MovieProvider>) -> Self {
        Self {
            provider,
            of_the_day: Mutex::new(None),
        }
    }

    /// Full catalog in provider order.
    pub async fn get_movies(&self) -> CatalogResult<Vec<Movie>> {
        self.provider.fetch_movies().await
    }

    /// Uniformly shuffled copy of the catalog.
    pub async fn get_shuffled_movies(&self) -> CatalogResult<Vec<Movie>> {
        let mut movies = self.get_movies().await?;
        movies.shuffle(&mut rand::rng());
        Ok(movies)
    }

    /// Apply `query` to the current catalog.
    pub async fn query(&self, query: &MovieQuery) -> CatalogResult<Vec<Movie>> {
        let movies = self.get_movies().await?;
        Ok(apply_query(movies, query))
    }

    /// Deterministic pick for the current UTC calendar day.
    pub async fn get_movie_of_the_day(&self) -> CatalogResult<Movie> {
        self.movie_of_the_day_at(OffsetDateTime::now_utc()).await
    }

    async fn movie_of_the_day_at(&self, now: OffsetDateTime) -> CatalogResult<Movie> {
        let seed = utc_midnight_seconds(now);

        let mut cached = self.of_the_day.lock().await;
        if let Some((day, movie)) = cached.as_ref() {
            if *day == seed {
                return Ok(movie.clone());
            }
        }

        let movies = self.get_movies().await?;
        let movie = pick_for_day(&movies, seed)
            .cloned()
            .ok_or(CatalogError::Empty)?;

        info!(movie_id = %movie.id, name = %movie.name, "selected movie of the day");
        *cached = Some((seed, movie.clone()));
        Ok(movie)
    }
}

fn utc_midnight_seconds(now: OffsetDateTime) -> i64 {
    now.to_offset(time::UtcOffset::UTC)
        .date()
        .midnight()
        .assume_utc()
        .unix_timestamp()
}

fn pick_for_day(movies: &[Movie], seed: i64) -> Option<&Movie> {
    if movies.is_empty() {
        return None;
    }
    let mut rng = StdRng::seed_from_u64(seed as u64);
    movies.get(rng.random_range(0..movies.len()))
}

/// Filter by genre, then search by name, then sort. Sorting is stable.
pub fn apply_query(movies: Vec<Movie>, query: &MovieQuery) -> Vec<Movie> {
    let needle = query.search.trim().to_lowercase();

    let mut filtered = movies
        .into_iter()
        .filter(|movie| query.genre.is_empty() || movie.has_genre(&query.genre))
        .filter(|movie| needle.is_empty() || movie.name.to_lowercase().contains(&needle))
        .collect::<Vec<_>>();

    if let Some(field) = query.sort_by {
        filtered.sort_by(|a, b| {
            let ordering = compare_by(field, a, b);
            if query.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }

    filtered
}

fn compare_by(field: SortField, a: &Movie, b: &Movie) -> Ordering {
    match field {
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::Year => a.production_year.cmp(&b.production_year),
        SortField::CriticRating => a.critic_rating.cmp(&b.critic_rating),
        SortField::CommunityRating => a.community_rating.total_cmp(&b.community_rating),
    }
}
