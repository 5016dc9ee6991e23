//! Room, lobby, draft and voting payloads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::{format_system_time, movie::MovieSummary, validation::validate_room_name},
    state::{
        GameStep,
        game::{Message, Player, RoomConfig, RoomState},
    },
};

/// Payload used by a host to open a new room.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateRoomRequest {
    /// Unique room name without whitespace, `.`, `*` or `>`.
    #[validate(length(min = 1, max = 64), custom(function = "validate_room_name"))]
    pub name: String,
    /// Most members the room admits.
    #[validate(range(min = 1))]
    pub max_players: usize,
    /// Most draft picks per player.
    #[validate(range(min = 1))]
    pub max_draft_count: usize,
    /// Most vote picks per player.
    #[validate(range(min = 1))]
    pub max_votes: usize,
    /// Replay voting among tied movies instead of taking the first one.
    #[serde(default)]
    pub display_ties: bool,
}

impl CreateRoomRequest {
    /// Limits for the new room.
    pub fn room_config(&self) -> RoomConfig {
        RoomConfig {
            max_players: self.max_players,
            max_draft_count: self.max_draft_count,
            max_votes: self.max_votes,
            display_ties: self.display_ties,
        }
    }
}

/// Chat message posted to a room.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SendMessageRequest {
    /// Message text; trimmed before storing.
    #[validate(length(max = 1000))]
    pub body: String,
}

/// Step names as exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum StepDto {
    /// Waiting for the host to start.
    Lobby,
    /// Players pick movies.
    Draft,
    /// Players vote among candidates.
    Voting,
    /// Winner reveal in progress.
    Announce,
    /// Winner and tally shown.
    Results,
}

impl From<GameStep> for StepDto {
    fn from(step: GameStep) -> Self {
        match step {
            GameStep::Lobby => StepDto::Lobby,
            GameStep::Draft => StepDto::Draft,
            GameStep::Voting => StepDto::Voting,
            GameStep::Announce => StepDto::Announce,
            GameStep::Results => StepDto::Results,
        }
    }
}

/// Host-chosen limits of a room.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomLimits {
    /// Most members the room admits.
    pub max_players: usize,
    /// Most draft picks per player.
    pub max_draft_count: usize,
    /// Most vote picks per player.
    pub max_votes: usize,
    /// Replay voting among tied movies.
    pub display_ties: bool,
}

impl From<RoomConfig> for RoomLimits {
    fn from(config: RoomConfig) -> Self {
        Self {
            max_players: config.max_players,
            max_draft_count: config.max_draft_count,
            max_votes: config.max_votes,
            display_ties: config.display_ties,
        }
    }
}

/// Lobby list entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomSummary {
    /// Room name.
    pub name: String,
    /// Host username.
    pub host: String,
    /// Current member count.
    pub players: usize,
    /// Player limit.
    pub max_players: usize,
    /// Current step.
    pub step: StepDto,
}

impl RoomSummary {
    /// Summary of a room read under its lock.
    pub fn from_state(name: &str, state: &RoomState) -> Self {
        Self {
            name: name.to_owned(),
            host: state.game.host.clone(),
            players: state.players.len(),
            max_players: state.game.config.max_players,
            step: state.game.step().into(),
        }
    }
}

/// Public per-player progress; picks themselves stay private until results.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerSummary {
    /// Display name.
    pub username: String,
    /// RFC 3339 join time.
    pub joined_at: String,
    /// Whether this member hosts the room.
    pub is_host: bool,
    /// Lobby readiness flag.
    pub ready: bool,
    /// Draft picks held.
    pub draft_count: usize,
    /// Vote picks held.
    pub vote_count: usize,
    /// Draft locked in.
    pub has_finished_draft: bool,
    /// Ballot locked in.
    pub has_finished_voting: bool,
}

impl PlayerSummary {
    /// Progress of `player`, flagging the host.
    pub fn from_player(player: &Player, host: &str) -> Self {
        Self {
            username: player.username.clone(),
            joined_at: format_system_time(player.joined_at),
            is_host: player.username == host,
            ready: player.ready,
            draft_count: player.draft_movies.len(),
            vote_count: player.voting_movies.len(),
            has_finished_draft: player.has_finished_draft,
            has_finished_voting: player.has_finished_voting,
        }
    }
}

/// Stored chat line.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageView {
    /// Author.
    pub username: String,
    /// Trimmed text.
    pub body: String,
    /// RFC 3339 receive time.
    pub timestamp: String,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            username: message.username.clone(),
            body: message.body.clone(),
            timestamp: format_system_time(message.timestamp),
        }
    }
}

/// One visible reveal line.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DialogueLineView {
    /// Speaker.
    pub character: String,
    /// Spoken text.
    pub dialogue: String,
}

/// Everything a renderer needs to draw a room.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomView {
    /// Room name.
    pub name: String,
    /// Current step.
    pub step: StepDto,
    /// Host username.
    pub host: String,
    /// Limits chosen at creation.
    pub limits: RoomLimits,
    /// Ordered by join time.
    pub players: Vec<PlayerSummary>,
    /// Chat log in arrival order.
    pub chat: Vec<MessageView>,
    /// Candidates of the current voting round.
    pub voting_movies: Vec<MovieSummary>,
    /// Reveal lines shown so far; empty outside Announce.
    pub announcement: Vec<DialogueLineView>,
    /// Set once the reveal is over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<MovieSummary>,
}

/// The caller's own selections.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerView {
    /// Display name.
    pub username: String,
    /// Whether the caller hosts the room.
    pub is_host: bool,
    /// Lobby readiness flag.
    pub ready: bool,
    /// Draft picks in selection order.
    pub draft_movies: Vec<MovieSummary>,
    /// Vote picks in selection order.
    pub voting_movies: Vec<MovieSummary>,
    /// Draft locked in.
    pub has_finished_draft: bool,
    /// Ballot locked in.
    pub has_finished_voting: bool,
}

/// Final vote count for one candidate.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VoteCount {
    /// Candidate.
    pub movie: MovieSummary,
    /// Votes received in the final round.
    pub votes: u32,
}

/// Winner and ranked tally.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResultsView {
    /// Winning movie.
    pub winner: MovieSummary,
    /// Candidates by votes descending.
    pub tally: Vec<VoteCount>,
}

/// Result of toggling a movie in a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// Movie was added.
    Added,
    /// Movie was removed.
    Removed,
    /// The selection was full and the movie was not in it.
    Unchanged,
}

/// Response of a toggle or removal.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SelectionResponse {
    /// What the toggle did.
    pub outcome: ToggleOutcome,
    /// Selection size after the operation.
    pub selected: usize,
}

/// Response of a draft or vote submission.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmitResponse {
    /// Step after the submission.
    pub step: StepDto,
    /// Whether this submission completed the round.
    pub advanced: bool,
}

/// Response after toggling readiness.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Readiness after the toggle.
    pub ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, max_players: usize) -> CreateRoomRequest {
        CreateRoomRequest {
            name: name.into(),
            max_players,
            max_draft_count: 2,
            max_votes: 1,
            display_ties: true,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(request("friday", 4).validate().is_ok());
    }

    #[test]
    fn rejects_bad_names_and_limits() {
        assert!(request("", 4).validate().is_err());
        assert!(request("movie night", 4).validate().is_err());
        assert!(request("app.room", 4).validate().is_err());
        assert!(request(&"x".repeat(65), 4).validate().is_err());
        assert!(request("friday", 0).validate().is_err());
    }
}
