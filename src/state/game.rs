//! Room, player and game session model guarded by each room's lock.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::SystemTime,
};

use indexmap::IndexMap;
use tokio::{sync::RwLock, task::JoinHandle};

use crate::{
    catalog::Movie,
    dialogue::DialogueLine,
    state::state_machine::{GameStep, StepMachine},
};

/// Limits chosen by the host when creating a room; fixed for the room's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomConfig {
    /// Most members the room admits.
    pub max_players: usize,
    /// Most draft picks per player.
    pub max_draft_count: usize,
    /// Most vote picks per player.
    pub max_votes: usize,
    /// Replay voting among tied movies instead of taking the first one.
    pub display_ties: bool,
}

/// Participant of a single room, keyed by username.
#[derive(Debug, Clone)]
pub struct Player {
    /// Display name, unique within the room.
    pub username: String,
    /// Orders host hand-off.
    pub joined_at: SystemTime,
    /// Toggled in the lobby; informational only.
    pub ready: bool,
    /// Draft picks in selection order, at most `max_draft_count`, distinct by id.
    pub draft_movies: Vec<Movie>,
    /// Vote picks in selection order, at most `max_votes`, drawn from the candidates.
    pub voting_movies: Vec<Movie>,
    /// Draft locked in for this game.
    pub has_finished_draft: bool,
    /// Ballot locked in for the current round.
    pub has_finished_voting: bool,
}

impl Player {
    /// Fresh member joining now.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            joined_at: SystemTime::now(),
            ready: false,
            draft_movies: Vec::new(),
            voting_movies: Vec::new(),
            has_finished_draft: false,
            has_finished_voting: false,
        }
    }
}

/// Chat entry; the log is append-only.
#[derive(Debug, Clone)]
pub struct Message {
    /// Author.
    pub username: String,
    /// Trimmed text.
    pub body: String,
    /// Server receive time.
    pub timestamp: SystemTime,
}

/// Winner and ranked tally recorded when voting settles.
#[derive(Debug, Clone)]
pub struct GameResult {
    /// Movie the room settled on.
    pub winner: Movie,
    /// Candidates ranked by votes descending.
    pub tally: Vec<(Movie, u32)>,
}

/// Step, per-step artifacts and the catalog snapshot of one room's game.
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Limits fixed at creation.
    pub config: RoomConfig,
    /// Username holding host privileges.
    pub host: String,
    /// Catalog snapshot bound at game start.
    pub all_movies: Vec<Movie>,
    /// Index into `all_movies` by movie id.
    pub movies_by_id: HashMap<String, usize>,
    /// Candidates pooled from every draft, distinct by id.
    pub voting_movies: Vec<Movie>,
    /// Movie id to vote count for the current round.
    pub votes: IndexMap<String, u32>,
    /// Current step and its allowed transitions.
    pub machine: StepMachine,
    /// Currently visible reveal lines.
    pub announcement: Vec<DialogueLine>,
    /// Set once voting produced a winner.
    pub result: Option<GameResult>,
}

impl GameSession {
    /// Session in the lobby with no catalog bound.
    pub fn new(config: RoomConfig, host: impl Into<String>) -> Self {
        Self {
            config,
            host: host.into(),
            all_movies: Vec::new(),
            movies_by_id: HashMap::new(),
            voting_movies: Vec::new(),
            votes: IndexMap::new(),
            machine: StepMachine::new(),
            announcement: Vec::new(),
            result: None,
        }
    }

    /// Step the game is in.
    pub fn step(&self) -> GameStep {
        self.machine.step()
    }

    /// Replace the catalog snapshot and rebuild the id index.
    pub fn bind_catalog(&mut self, movies: Vec<Movie>) {
        self.movies_by_id = movies
            .iter()
            .enumerate()
            .map(|(index, movie)| (movie.id.clone(), index))
            .collect();
        self.all_movies = movies;
    }

    /// Catalog movie by id.
    pub fn movie(&self, id: &str) -> Option<&Movie> {
        self.movies_by_id
            .get(id)
            .and_then(|index| self.all_movies.get(*index))
    }

    /// Voting candidate by id.
    pub fn candidate(&self, id: &str) -> Option<&Movie> {
        self.voting_movies.iter().find(|movie| movie.id == id)
    }
}

/// Interior of a room, guarded by the room's lock.
#[derive(Debug)]
pub struct RoomState {
    /// Game progress and artifacts.
    pub game: GameSession,
    /// Members keyed by username.
    pub players: HashMap<String, Player>,
    /// Chat log in arrival order.
    pub chat: Vec<Message>,
    /// Set once the room left the registry; late writers must not emit.
    pub closed: bool,
}

impl RoomState {
    /// Players ordered by join time, ties broken by username.
    pub fn players_by_join_order(&self) -> Vec<&Player> {
        let mut players = self.players.values().collect::<Vec<_>>();
        players.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.username.cmp(&b.username))
        });
        players
    }

    /// Every member locked in a draft.
    pub fn all_finished_draft(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|p| p.has_finished_draft)
    }

    /// Every member locked in a ballot.
    pub fn all_finished_voting(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|p| p.has_finished_voting)
    }
}

/// Named coordination unit owned by the registry.
pub struct Room {
    name: String,
    state: RwLock<RoomState>,
    reveal: Mutex<Option<JoinHandle<()>>>,
}

impl Room {
    /// Empty room in the lobby step; the host joins separately.
    pub fn new(name: impl Into<String>, config: RoomConfig, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(RoomState {
                game: GameSession::new(config, host),
                players: HashMap::new(),
                chat: Vec::new(),
                closed: false,
            }),
            reveal: Mutex::new(None),
        }
    }

    /// Registry key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lock guarding the room interior.
    pub fn state(&self) -> &RwLock<RoomState> {
        &self.state
    }

    /// Store the running reveal task. Returns `false` if one is already active.
    pub fn install_reveal(&self, handle: JoinHandle<()>) -> bool {
        let mut slot = match self.reveal.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if slot.as_ref().is_some_and(|active| !active.is_finished()) {
            handle.abort();
            return false;
        }
        *slot = Some(handle);
        true
    }

    /// Whether a reveal task is still running.
    pub fn reveal_active(&self) -> bool {
        let slot = match self.reveal.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.as_ref().is_some_and(|active| !active.is_finished())
    }

    /// Abort the in-flight reveal, if any.
    pub fn cancel_reveal(&self) {
        let handle = match self.reveal.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::catalog::dummy::dummy_movies;

    fn config() -> RoomConfig {
        RoomConfig {
            max_players: 4,
            max_draft_count: 2,
            max_votes: 1,
            display_ties: true,
        }
    }

    #[test]
    fn bind_catalog_indexes_by_id() {
        let mut session = GameSession::new(config(), "alice");
        session.bind_catalog(dummy_movies());

        assert_eq!(session.movie("movie-3").map(|m| m.name.as_str()), Some("Pulp Fiction"));
        assert!(session.movie("missing").is_none());
    }

    #[test]
    fn join_order_breaks_ties_by_username() {
        let room = Room::new("r1", config(), "bob");
        let mut state = room.state().try_write().unwrap();
        let now = SystemTime::now();

        for (name, offset) in [("carol", 0), ("bob", 0), ("alice", 5)] {
            let mut player = Player::new(name);
            player.joined_at = now + Duration::from_secs(offset);
            state.players.insert(name.into(), player);
        }

        let order = state
            .players_by_join_order()
            .into_iter()
            .map(|p| p.username.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, ["bob", "carol", "alice"]);
    }

    #[test]
    fn nobody_finished_in_an_empty_room() {
        let room = Room::new("r1", config(), "bob");
        let state = room.state().try_read().unwrap();
        assert!(!state.all_finished_draft());
        assert!(!state.all_finished_voting());
    }

    #[tokio::test]
    async fn only_one_reveal_may_run() {
        let room = Room::new("r1", config(), "bob");
        let first = tokio::spawn(std::future::pending::<()>());
        let second = tokio::spawn(std::future::pending::<()>());

        assert!(room.install_reveal(first));
        assert!(!room.install_reveal(second));
        assert!(room.reveal_active());

        room.cancel_reveal();
        tokio::task::yield_now().await;
        assert!(!room.reveal_active());
    }
}
