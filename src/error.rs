//! Engine errors and their HTTP mapping.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    catalog::CatalogError,
    state::{GameStep, state_machine::InvalidTransition},
};

/// Coarse classification of engine failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Room, player or movie missing.
    NotFound,
    /// Wrong step, cap exceeded, empty submission or missing privilege.
    PreconditionViolated,
    /// Duplicate room name or duplicate join.
    Conflict,
    /// Catalog source failed.
    TransientSource,
    /// Invariant breach discovered at runtime.
    Internal,
}

/// Errors that can occur in room engine operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No live room with this name.
    #[error("room `{0}` not found")]
    RoomNotFound(String),
    /// Username is not a member of the room.
    #[error("player `{username}` is not in room `{room}`")]
    PlayerNotFound {
        /// Room that was searched.
        room: String,
        /// Missing member.
        username: String,
    },
    /// Movie id is absent from the catalog snapshot or the candidates.
    #[error("movie `{0}` is not available in this game")]
    MovieNotFound(String),
    /// Room name already taken.
    #[error("room `{0}` already exists")]
    RoomExists(String),
    /// Username already present in the room.
    #[error("`{0}` already joined this room")]
    AlreadyJoined(String),
    /// Room reached its player limit.
    #[error("room `{room}` is full ({max} players)")]
    RoomFull {
        /// Room that refused the join.
        room: String,
        /// Configured player limit.
        max: usize,
    },
    /// Operation is not allowed in the room's current step.
    #[error("not allowed during the {0} step")]
    WrongStep(GameStep),
    /// Caller is not the room host.
    #[error("only the host can do this (`{0}` is not the host)")]
    NotHost(String),
    /// Draft submitted with no picks.
    #[error("pick at least one movie before submitting the draft")]
    EmptyDraft,
    /// Vote submitted with no picks.
    #[error("pick at least one movie before submitting the vote")]
    EmptyVote,
    /// Picks are locked after submitting for the current step.
    #[error("selection already submitted")]
    AlreadySubmitted,
    /// Chat message is blank after trimming.
    #[error("message is empty")]
    EmptyMessage,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Step machine rejected the event.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    /// Catalog source failed while binding a game.
    #[error("movie catalog unavailable")]
    CatalogUnavailable(#[from] CatalogError),
    /// Invariant breach.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Classify the error for callers mapping it onto a transport.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::RoomNotFound(_)
            | ServiceError::PlayerNotFound { .. }
            | ServiceError::MovieNotFound(_) => ErrorKind::NotFound,
            ServiceError::RoomExists(_) | ServiceError::AlreadyJoined(_) => ErrorKind::Conflict,
            ServiceError::RoomFull { .. }
            | ServiceError::WrongStep(_)
            | ServiceError::NotHost(_)
            | ServiceError::EmptyDraft
            | ServiceError::EmptyVote
            | ServiceError::AlreadySubmitted
            | ServiceError::EmptyMessage
            | ServiceError::InvalidInput(_)
            | ServiceError::InvalidTransition(_) => ErrorKind::PreconditionViolated,
            ServiceError::CatalogUnavailable(_) => ErrorKind::TransientSource,
            ServiceError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Caller identity missing.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Caller lacks the privilege for this action.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Upstream dependency unavailable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match (&err, err.kind()) {
            (ServiceError::NotHost(_), _) => AppError::Forbidden(message),
            (ServiceError::InvalidInput(_) | ServiceError::EmptyMessage, _) => {
                AppError::BadRequest(message)
            }
            (ServiceError::CatalogUnavailable(source), _) => {
                AppError::ServiceUnavailable(source.to_string())
            }
            (_, ErrorKind::NotFound) => AppError::NotFound(message),
            (_, ErrorKind::Conflict | ErrorKind::PreconditionViolated) => {
                AppError::Conflict(message)
            }
            (_, ErrorKind::TransientSource) => AppError::ServiceUnavailable(message),
            (_, ErrorKind::Internal) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(ServiceError::RoomNotFound("r".into()).kind(), ErrorKind::NotFound);
        assert_eq!(ServiceError::RoomExists("r".into()).kind(), ErrorKind::Conflict);
        assert_eq!(
            ServiceError::WrongStep(GameStep::Draft).kind(),
            ErrorKind::PreconditionViolated
        );
        assert_eq!(
            ServiceError::CatalogUnavailable(CatalogError::Empty).kind(),
            ErrorKind::TransientSource
        );
    }

    #[test]
    fn http_status_mapping() {
        let cases = [
            (ServiceError::RoomNotFound("r".into()), StatusCode::NOT_FOUND),
            (ServiceError::AlreadyJoined("bob".into()), StatusCode::CONFLICT),
            (ServiceError::EmptyDraft, StatusCode::CONFLICT),
            (ServiceError::NotHost("bob".into()), StatusCode::FORBIDDEN),
            (ServiceError::EmptyMessage, StatusCode::BAD_REQUEST),
            (
                ServiceError::CatalogUnavailable(CatalogError::Empty),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (ServiceError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }
}
