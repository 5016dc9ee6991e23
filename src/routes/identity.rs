//! Caller identity extracted from the `X-Username` header.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// Header carrying the caller's display name.
pub const USERNAME_HEADER: &str = "x-username";

/// Caller identity taken from the `x-username` header.
///
/// Identity is asserted by the client; there is no authentication beyond a
/// non-empty name.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let username = parts
            .headers
            .get(USERNAME_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Unauthorized(format!("missing {USERNAME_HEADER} header")))?;

        Ok(Self(username.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(header: Option<&str>) -> Result<CurrentUser, AppError> {
        let mut builder = Request::builder().uri("/rooms");
        if let Some(value) = header {
            builder = builder.header(USERNAME_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CurrentUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn trims_username_header() {
        let CurrentUser(name) = extract(Some("  alice ")).await.unwrap();
        assert_eq!(name, "alice");
    }

    #[tokio::test]
    async fn missing_or_blank_header_is_unauthorized() {
        assert!(matches!(extract(None).await, Err(AppError::Unauthorized(_))));
        assert!(matches!(extract(Some("   ")).await, Err(AppError::Unauthorized(_))));
    }
}
