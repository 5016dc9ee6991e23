//! Fixed in-memory catalog for local runs and tests.

use futures::future::BoxFuture;

use super::{CatalogResult, Movie, MovieProvider};

/// Static catalog of well-known films, used for local play and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyMovieProvider;

impl MovieProvider for DummyMovieProvider {
    fn fetch_movies(&self) -> BoxFuture<'static, CatalogResult<Vec<Movie>>> {
        Box::pin(async { Ok(dummy_movies()) })
    }
}

fn movie(
    index: usize,
    name: &str,
    year: i32,
    critic: i32,
    community: f64,
    genres: &[&str],
    premiere: &str,
) -> Movie {
    Movie {
        id: format!("movie-{index}"),
        name: name.to_owned(),
        production_year: year,
        critic_rating: critic,
        community_rating: community,
        genres: genres.iter().map(|genre| (*genre).to_owned()).collect(),
        premiere_date: format!("{premiere}T00:00:00.0000000Z"),
        primary_image_tag: format!("dummy-primary-{index}"),
    }
}

/// The eight films served by [`DummyMovieProvider`], ids `movie-1` to `movie-8`.
pub fn dummy_movies() -> Vec<Movie> {
    vec![
        movie(1, "The Matrix", 1999, 88, 8.7, &["Action", "Science Fiction"], "1999-03-31"),
        movie(2, "Inception", 2010, 87, 8.8, &["Action", "Science Fiction", "Adventure"], "2010-07-16"),
        movie(3, "Pulp Fiction", 1994, 94, 8.9, &["Thriller", "Crime"], "1994-10-14"),
        movie(4, "The Shawshank Redemption", 1994, 91, 9.3, &["Drama", "Crime"], "1994-09-23"),
        movie(5, "The Dark Knight", 2008, 94, 9.0, &["Drama", "Action", "Crime", "Thriller"], "2008-07-18"),
        movie(6, "Forrest Gump", 1994, 82, 8.8, &["Comedy", "Drama", "Romance"], "1994-07-06"),
        movie(7, "Fight Club", 1999, 79, 8.8, &["Drama"], "1999-10-15"),
        movie(8, "Goodfellas", 1990, 96, 8.7, &["Drama", "Crime"], "1990-09-19"),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[tokio::test]
    async fn serves_eight_movies_with_unique_ids() {
        let movies = DummyMovieProvider.fetch_movies().await.unwrap();
        assert_eq!(movies.len(), 8);

        let ids = movies.iter().map(|m| m.id.as_str()).collect::<HashSet<_>>();
        assert_eq!(ids.len(), 8);
        assert!(ids.contains("movie-1"));
        assert!(ids.contains("movie-8"));
    }
}
