//! Business operations invoked by the HTTP routes.

/// Vote counting and winner resolution.
pub mod aggregator;
/// Read-only room snapshots for diagnostics.
pub mod debug_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Catalog browsing for clients.
pub mod movie_service;
/// Timed winner reveal task.
pub mod reveal;
/// Room lifecycle and game step operations.
pub mod room_service;
/// Server-Sent Events forwarding.
pub mod sse_service;
/// Renderer-facing room projections.
pub mod view_service;
