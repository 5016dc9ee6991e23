//! Catalog movie payloads.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::catalog::{Movie, MovieQuery};

/// Movie card as rendered by clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MovieSummary {
    /// Catalog id.
    pub id: String,
    /// Display title.
    pub name: String,
    /// Release year.
    pub production_year: i32,
    /// Critic score out of 100.
    pub critic_rating: i32,
    /// Audience score out of 10.
    pub community_rating: f64,
    /// Genre names.
    pub genres: Vec<String>,
    /// Premiere date.
    pub premiere_date: String,
    /// Poster image tag.
    pub primary_image_tag: String,
}

impl From<&Movie> for MovieSummary {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id.clone(),
            name: movie.name.clone(),
            production_year: movie.production_year,
            critic_rating: movie.critic_rating,
            community_rating: movie.community_rating,
            genres: movie.genres.clone(),
            premiere_date: movie.premiere_date.clone(),
            primary_image_tag: movie.primary_image_tag.clone(),
        }
    }
}

/// Catalog listing filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MovieListParams {
    /// Case-insensitive substring of the movie name.
    #[serde(default)]
    pub search: String,
    /// Exact genre.
    #[serde(default)]
    pub genre: String,
    /// One of `name-asc`, `name-desc`, `year-asc`, `year-desc`, `critic-asc`,
    /// `critic-desc`, `community-asc`, `community-desc`; anything else keeps catalog order.
    #[serde(default)]
    pub sort: String,
}

impl From<MovieListParams> for MovieQuery {
    fn from(params: MovieListParams) -> Self {
        MovieQuery {
            genre: params.genre.trim().to_owned(),
            search: params.search,
            ..MovieQuery::default()
        }
        .with_sort_token(params.sort.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SortField;

    #[test]
    fn params_convert_to_query() {
        let query = MovieQuery::from(MovieListParams {
            search: "matrix".into(),
            genre: " Action ".into(),
            sort: "year-desc".into(),
        });

        assert_eq!(query.genre, "Action");
        assert_eq!(query.search, "matrix");
        assert_eq!(query.sort_by, Some(SortField::Year));
        assert!(query.descending);
    }
}
