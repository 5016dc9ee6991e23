//! Jellyfin-backed movie catalog.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::{CatalogError, CatalogResult, Movie, MovieProvider};

const ITEMS_QUERY: &str = "Items?IncludeItemTypes=Movie&Recursive=true&Fields=Genres";
const TOKEN_HEADER: &str = "X-Emby-Token";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct JellyfinItems {
    items: Vec<JellyfinItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct JellyfinItem {
    id: String,
    name: String,
    production_year: i32,
    critic_rating: i32,
    community_rating: f64,
    genres: Vec<String>,
    premiere_date: String,
    image_tags: ImageTags,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ImageTags {
    primary: String,
}

impl From<JellyfinItem> for Movie {
    fn from(item: JellyfinItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            production_year: item.production_year,
            critic_rating: item.critic_rating,
            community_rating: item.community_rating,
            genres: item.genres,
            premiere_date: item.premiere_date,
            primary_image_tag: item.image_tags.primary,
        }
    }
}

/// Reads every movie from a Jellyfin server's item library.
#[derive(Clone)]
pub struct JellyfinMovieProvider {
    client: Client,
    base_url: Arc<str>,
    api_key: Arc<str>,
}

impl JellyfinMovieProvider {
    /// Client for the server at `base_url`; both settings are required.
    pub fn new(base_url: Option<&str>, api_key: Option<String>) -> CatalogResult<Self> {
        let base_url = base_url
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .ok_or(CatalogError::MissingConfig {
                what: "catalog.jellyfin_base_url",
            })?;
        let api_key = api_key.ok_or(CatalogError::MissingConfig {
            what: crate::config::JELLYFIN_API_KEY_ENV,
        })?;

        let client = Client::builder()
            .build()
            .map_err(|err| CatalogError::SourceUnavailable {
                message: err.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url),
            api_key: Arc::from(api_key),
        })
    }

    fn items_url(&self) -> String {
        format!("{}/{}", self.base_url, ITEMS_QUERY)
    }
}

impl MovieProvider for JellyfinMovieProvider {
    fn fetch_movies(&self) -> BoxFuture<'static, CatalogResult<Vec<Movie>>> {
        let client = self.client.clone();
        let url = self.items_url();
        let api_key = self.api_key.clone();

        Box::pin(async move {
            let response = client
                .get(&url)
                .header(TOKEN_HEADER, api_key.as_ref())
                .send()
                .await
                .map_err(|err| CatalogError::SourceUnavailable {
                    message: err.to_string(),
                })?;

            match response.status() {
                StatusCode::OK => {}
                status => {
                    return Err(CatalogError::SourceUnavailable {
                        message: format!("jellyfin answered with status {status}"),
                    });
                }
            }

            let payload = response
                .json::<JellyfinItems>()
                .await
                .map_err(|err| CatalogError::Decode {
                    message: err.to_string(),
                })?;

            debug!(count = payload.items.len(), "fetched movies from jellyfin");
            Ok(payload.items.into_iter().map(Movie::from).collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_items_payload() {
        let payload = r#"{
            "Items": [{
                "Id": "abc",
                "Name": "Alien",
                "ProductionYear": 1979,
                "CriticRating": 98,
                "CommunityRating": 8.5,
                "Genres": ["Horror", "Science Fiction"],
                "PremiereDate": "1979-05-25T00:00:00.0000000Z",
                "ImageTags": { "Primary": "tag-1", "Logo": "ignored" },
                "RunTimeTicks": 70000000000
            }]
        }"#;

        let items = serde_json::from_str::<JellyfinItems>(payload).unwrap();
        let movie = Movie::from(items.items.into_iter().next().unwrap());

        assert_eq!(movie.id, "abc");
        assert_eq!(movie.production_year, 1979);
        assert!(movie.has_genre("Horror"));
        assert_eq!(movie.primary_image_tag, "tag-1");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let items = serde_json::from_str::<JellyfinItems>(r#"{"Items":[{"Id":"x","Name":"X"}]}"#)
            .unwrap();
        let movie = Movie::from(items.items.into_iter().next().unwrap());
        assert_eq!(movie.critic_rating, 0);
        assert!(movie.genres.is_empty());
    }

    #[test]
    fn requires_base_url_and_key() {
        assert!(matches!(
            JellyfinMovieProvider::new(None, Some("k".into())),
            Err(CatalogError::MissingConfig { .. })
        ));
        assert!(matches!(
            JellyfinMovieProvider::new(Some("http://media.local"), None),
            Err(CatalogError::MissingConfig { .. })
        ));
    }

    #[test]
    fn builds_items_url_without_double_slash() {
        let provider =
            JellyfinMovieProvider::new(Some("http://media.local/"), Some("key".into())).unwrap();
        assert_eq!(
            provider.items_url(),
            "http://media.local/Items?IncludeItemTypes=Movie&Recursive=true&Fields=Genres"
        );
    }
}
