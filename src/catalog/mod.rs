//! Movie catalog: the record type, provider abstraction and query model.

pub mod caching;
pub mod dummy;
#[cfg(feature = "jellyfin")]
pub mod jellyfin;
pub mod service;

use futures::future::BoxFuture;
use thiserror::Error;

pub use self::service::MovieService;

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Immutable movie record as exposed by any catalog source.
///
/// Identity is [`Movie::id`]; two records with the same id are the same movie.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    /// Source-assigned identifier.
    pub id: String,
    /// Display title.
    pub name: String,
    /// Release year.
    pub production_year: i32,
    /// Critic score out of 100.
    pub critic_rating: i32,
    /// Audience score out of 10.
    pub community_rating: f64,
    /// Genre names as reported by the source.
    pub genres: Vec<String>,
    /// Premiere date as reported by the source.
    pub premiere_date: String,
    /// Poster image tag; empty when the source has none.
    pub primary_image_tag: String,
}

impl Movie {
    /// Exact, case-sensitive genre membership.
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|candidate| candidate == genre)
    }
}

/// Failures raised while acquiring the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The upstream source could not be reached or answered with an error.
    #[error("movie source unavailable: {message}")]
    SourceUnavailable {
        /// Underlying error text.
        message: String,
    },
    /// The upstream payload could not be decoded.
    #[error("failed to decode movie source payload: {message}")]
    Decode {
        /// Underlying error text.
        message: String,
    },
    /// A required setting (base url, api key) is missing.
    #[error("movie source is not configured: missing {what}")]
    MissingConfig {
        /// Name of the missing setting.
        what: &'static str,
    },
    /// The catalog is reachable but holds no movies.
    #[error("movie catalog is empty")]
    Empty,
}

/// Abstraction over the origin of the movie catalog.
pub trait MovieProvider: Send + Sync {
    /// Load the full catalog.
    fn fetch_movies(&self) -> BoxFuture<'static, CatalogResult<Vec<Movie>>>;
}

/// Field used to order query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Title, alphabetical.
    Name,
    /// Production year.
    Year,
    /// Critic score.
    CriticRating,
    /// Audience score.
    CommunityRating,
}

/// Filter, search and ordering applied on top of the full catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieQuery {
    /// Exact genre match; empty means no genre filter.
    pub genre: String,
    /// Case-insensitive substring match on the name; empty means no search.
    pub search: String,
    /// `None` keeps the input order.
    pub sort_by: Option<SortField>,
    /// Reverse the order given by `sort_by`.
    pub descending: bool,
}

impl MovieQuery {
    /// Build a query from the `<field>-<asc|desc>` sort tokens used by clients.
    ///
    /// Unknown or empty tokens leave the results in catalog order.
    pub fn with_sort_token(mut self, token: &str) -> Self {
        let (sort_by, descending) = match token {
            "name-asc" => (Some(SortField::Name), false),
            "name-desc" => (Some(SortField::Name), true),
            "year-asc" => (Some(SortField::Year), false),
            "year-desc" => (Some(SortField::Year), true),
            "critic-asc" => (Some(SortField::CriticRating), false),
            "critic-desc" => (Some(SortField::CriticRating), true),
            "community-asc" => (Some(SortField::CommunityRating), false),
            "community-desc" => (Some(SortField::CommunityRating), true),
            _ => (None, false),
        };
        self.sort_by = sort_by;
        self.descending = descending;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_tokens_map_to_fields() {
        let query = MovieQuery::default().with_sort_token("critic-desc");
        assert_eq!(query.sort_by, Some(SortField::CriticRating));
        assert!(query.descending);

        let query = MovieQuery::default().with_sort_token("year-asc");
        assert_eq!(query.sort_by, Some(SortField::Year));
        assert!(!query.descending);
    }

    #[test]
    fn unknown_sort_token_keeps_input_order() {
        let query = MovieQuery::default().with_sort_token("rating-sideways");
        assert_eq!(query.sort_by, None);
        assert!(!query.descending);
    }
}
