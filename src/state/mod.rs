//! Shared engine state: room registry, event fabric and step machine.

pub mod events;
pub mod game;
pub mod registry;
pub mod state_machine;

use std::sync::Arc;

use crate::{
    catalog::{MovieProvider, MovieService},
    config::AppConfig,
    dialogue::AiProvider,
};

pub use self::events::{EventBus, LOBBY_SUBJECT, RoomEvent, room_subject};
pub use self::game::{Room, RoomConfig};
pub use self::registry::RoomRegistry;
pub use self::state_machine::GameStep;

/// Handle passed to every service and route.
pub type SharedState = Arc<AppState>;

/// Process-wide engine state: rooms, event fabric and external collaborators.
pub struct AppState {
    config: AppConfig,
    rooms: RoomRegistry,
    events: EventBus,
    movies: MovieService,
    ai: Option<Arc<dyn AiProvider>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// Starts with no rooms; without an AI provider reveals contain only announcer lines.
    pub fn new(
        config: AppConfig,
        movies: Arc<dyn MovieProvider>,
        ai: Option<Arc<dyn AiProvider>>,
    ) -> SharedState {
        Arc::new(Self {
            rooms: RoomRegistry::new(),
            events: EventBus::new(config.events.capacity),
            movies: MovieService::new(movies),
            ai,
            config,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Live rooms.
    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    /// Event fabric.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Catalog access.
    pub fn movies(&self) -> &MovieService {
        &self.movies
    }

    /// Dialogue backend, if one is configured.
    pub fn ai(&self) -> Option<Arc<dyn AiProvider>> {
        self.ai.clone()
    }
}
