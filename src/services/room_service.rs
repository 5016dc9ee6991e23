//! Room lifecycle and game-step orchestration.
//!
//! Every operation follows the same shape: clone the room handle out of the registry,
//! mutate under the room's write lock, release it, then publish. Nothing here awaits
//! while a room lock is held except the lock acquisition itself.

use std::{sync::Arc, time::SystemTime};

use tracing::{debug, error, info};

use crate::{
    catalog::{CatalogError, Movie},
    dialogue::DialogueLine,
    dto::{room::ToggleOutcome, validation::validate_room_name},
    error::ServiceError,
    services::{
        aggregator::{self, Outcome},
        reveal,
    },
    state::{
        GameStep, LOBBY_SUBJECT, Room, RoomConfig, RoomEvent, SharedState,
        game::{GameResult, Message, Player, RoomState},
        room_subject,
        state_machine::GameEvent,
    },
};

/// Speaker name used for scripted reveal lines.
pub const ANNOUNCER: &str = "Announcer";
/// Opening line of every reveal.
pub const DRUM_ROLL_LINE: &str = "Drum Roll Please";

/// Whether a submission completed the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Other players still have to submit.
    Pending,
    /// The round closed; carries the step entered (Voting again on a replayed tie).
    Advanced(GameStep),
}

/// Side effects collected under the lock and applied once it is released.
#[derive(Debug, Default)]
struct Effects {
    room: Vec<RoomEvent>,
    lobby: bool,
    start_reveal: Option<String>,
}

impl Effects {
    fn room_event(event: RoomEvent) -> Self {
        Self {
            room: vec![event],
            ..Self::default()
        }
    }
}

fn apply_effects(state: &SharedState, room: &Arc<Room>, effects: Effects) {
    let subject = room_subject(room.name());
    for event in effects.room {
        state.events().publish(&subject, event);
    }
    if effects.lobby {
        state.events().publish(LOBBY_SUBJECT, RoomEvent::RoomListUpdate);
    }
    if let Some(winner) = effects.start_reveal {
        reveal::spawn_reveal(state.clone(), room.clone(), winner);
    }
}

/// Look up a live room handle; the registry shard is released before returning.
pub fn find_room(state: &SharedState, name: &str) -> Result<Arc<Room>, ServiceError> {
    state
        .rooms()
        .get(name)
        .ok_or_else(|| ServiceError::RoomNotFound(name.to_owned()))
}

fn ensure_open(room: &Room, guard: &RoomState) -> Result<(), ServiceError> {
    if guard.closed {
        return Err(ServiceError::RoomNotFound(room.name().to_owned()));
    }
    Ok(())
}

fn ensure_step(guard: &RoomState, expected: GameStep) -> Result<(), ServiceError> {
    let step = guard.game.step();
    if step != expected {
        return Err(ServiceError::WrongStep(step));
    }
    Ok(())
}

fn player_mut<'a>(
    room: &Room,
    players: &'a mut std::collections::HashMap<String, Player>,
    username: &str,
) -> Result<&'a mut Player, ServiceError> {
    players
        .get_mut(username)
        .ok_or_else(|| ServiceError::PlayerNotFound {
            room: room.name().to_owned(),
            username: username.to_owned(),
        })
}

/// Create an empty room in the lobby step.
pub fn add_room(
    state: &SharedState,
    name: &str,
    config: RoomConfig,
    host: &str,
) -> Result<Arc<Room>, ServiceError> {
    validate_room_name(name).map_err(|err| ServiceError::InvalidInput(err.to_string()))?;
    if config.max_players == 0 || config.max_draft_count == 0 || config.max_votes == 0 {
        return Err(ServiceError::InvalidInput(
            "room limits must be at least 1".into(),
        ));
    }

    let room = state
        .rooms()
        .insert(Room::new(name, config, host))
        .ok_or_else(|| ServiceError::RoomExists(name.to_owned()))?;

    info!(room = %name, host = %host, ?config, "room added");
    state
        .events()
        .publish(LOBBY_SUBJECT, RoomEvent::RoomListUpdate);
    Ok(room)
}

/// Remove a room, cancelling its reveal. Returns `false` if it did not exist.
pub async fn delete_room(state: &SharedState, name: &str) -> bool {
    let Some(room) = state.rooms().remove(name) else {
        return false;
    };
    retire(state, &room).await;
    state
        .events()
        .publish(LOBBY_SUBJECT, RoomEvent::RoomListUpdate);
    true
}

/// Mark a room as gone once it has left the registry.
async fn retire(state: &SharedState, room: &Arc<Room>) {
    room.cancel_reveal();
    room.state().write().await.closed = true;
    state.events().close(&room_subject(room.name()));
    info!(room = %room.name(), "room deleted");
}

/// Host-only explicit end of a room.
pub async fn end_room(state: &SharedState, name: &str, username: &str) -> Result<(), ServiceError> {
    let room = find_room(state, name)?;
    {
        let guard = room.state().read().await;
        ensure_open(&room, &guard)?;
        if guard.game.host != username {
            return Err(ServiceError::NotHost(username.to_owned()));
        }
    }

    if state.rooms().remove_instance(&room) {
        retire(state, &room).await;
        state
            .events()
            .publish(LOBBY_SUBJECT, RoomEvent::RoomListUpdate);
    }
    Ok(())
}

/// Join a room during the lobby step.
pub async fn add_player(state: &SharedState, name: &str, username: &str) -> Result<(), ServiceError> {
    let room = find_room(state, name)?;
    {
        let mut guard = room.state().write().await;
        ensure_open(&room, &guard)?;
        ensure_step(&guard, GameStep::Lobby)?;
        if guard.players.contains_key(username) {
            return Err(ServiceError::AlreadyJoined(username.to_owned()));
        }
        if guard.players.len() >= guard.game.config.max_players {
            return Err(ServiceError::RoomFull {
                room: name.to_owned(),
                max: guard.game.config.max_players,
            });
        }

        guard
            .players
            .insert(username.to_owned(), Player::new(username));
        if !guard.players.contains_key(&guard.game.host) {
            guard.game.host = username.to_owned();
        }
        info!(room = %name, username = %username, players = guard.players.len(), "player joined");
    }

    apply_effects(
        state,
        &room,
        Effects {
            room: vec![RoomEvent::RoomUpdate],
            lobby: true,
            start_reveal: None,
        },
    );
    Ok(())
}

/// Leave a room. The host role moves to the earliest remaining joiner and an empty
/// room is deleted. Leaving can complete a round the others already submitted.
pub async fn remove_player(
    state: &SharedState,
    name: &str,
    username: &str,
) -> Result<(), ServiceError> {
    let room = find_room(state, name)?;
    let mut effects = Effects {
        room: vec![RoomEvent::RoomUpdate],
        lobby: true,
        start_reveal: None,
    };

    let now_empty = {
        let mut guard = room.state().write().await;
        ensure_open(&room, &guard)?;
        if guard.players.remove(username).is_none() {
            return Err(ServiceError::PlayerNotFound {
                room: name.to_owned(),
                username: username.to_owned(),
            });
        }
        info!(room = %name, username = %username, "player left");

        if guard.players.is_empty() {
            guard.closed = true;
            true
        } else {
            if guard.game.host == username {
                transfer_host(name, &mut guard)?;
            }
            match guard.game.step() {
                GameStep::Draft if guard.all_finished_draft() => {
                    effects.room.push(close_draft(name, &mut guard)?);
                }
                GameStep::Voting if guard.all_finished_voting() => {
                    let (event, winner) = settle_votes(name, &mut guard)?;
                    effects.room.push(event);
                    effects.start_reveal = winner;
                }
                _ => {}
            }
            false
        }
    };

    if now_empty {
        state.rooms().remove_instance(&room);
        retire(state, &room).await;
        state
            .events()
            .publish(LOBBY_SUBJECT, RoomEvent::RoomListUpdate);
        return Ok(());
    }

    apply_effects(state, &room, effects);
    Ok(())
}

fn transfer_host(name: &str, guard: &mut RoomState) -> Result<(), ServiceError> {
    debug_assert!(!guard.players.is_empty(), "host transfer on an empty room");
    let next = guard
        .players_by_join_order()
        .first()
        .map(|player| player.username.clone())
        .ok_or_else(|| {
            error!(room = %name, "host transfer attempted on an empty room");
            ServiceError::Internal("no player left to become host".into())
        })?;
    info!(room = %name, from = %guard.game.host, to = %next, "host transferred");
    guard.game.host = next;
    Ok(())
}

/// Flip the caller's readiness in the lobby.
pub async fn toggle_ready(
    state: &SharedState,
    name: &str,
    username: &str,
) -> Result<bool, ServiceError> {
    let room = find_room(state, name)?;
    let ready = {
        let mut guard = room.state().write().await;
        ensure_open(&room, &guard)?;
        ensure_step(&guard, GameStep::Lobby)?;
        let player = player_mut(&room, &mut guard.players, username)?;
        player.ready = !player.ready;
        debug!(room = %name, username = %username, ready = player.ready, "toggled ready");
        player.ready
    };

    apply_effects(state, &room, Effects::room_event(RoomEvent::RoomUpdate));
    Ok(ready)
}

/// Append to the room chat; allowed in every step.
pub async fn add_message(
    state: &SharedState,
    name: &str,
    username: &str,
    body: &str,
) -> Result<Message, ServiceError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(ServiceError::EmptyMessage);
    }

    let room = find_room(state, name)?;
    let message = {
        let mut guard = room.state().write().await;
        ensure_open(&room, &guard)?;
        let message = Message {
            username: username.to_owned(),
            body: body.to_owned(),
            timestamp: SystemTime::now(),
        };
        guard.chat.push(message.clone());
        message
    };

    debug!(room = %name, username = %username, "message sent");
    apply_effects(state, &room, Effects::room_event(RoomEvent::MessageSent));
    Ok(message)
}

fn check_can_start(room: &Room, guard: &RoomState, username: &str) -> Result<(), ServiceError> {
    ensure_open(room, guard)?;
    ensure_step(guard, GameStep::Lobby)?;
    if guard.game.host != username {
        return Err(ServiceError::NotHost(username.to_owned()));
    }
    Ok(())
}

/// Host moves the room from the lobby to the draft, binding a catalog snapshot.
pub async fn start_game(state: &SharedState, name: &str, username: &str) -> Result<(), ServiceError> {
    let room = find_room(state, name)?;
    {
        let guard = room.state().read().await;
        check_can_start(&room, &guard, username)?;
    }

    // Fetched without holding the room lock; preconditions are checked again below.
    let movies = state.movies().get_movies().await?;
    if movies.is_empty() {
        return Err(CatalogError::Empty.into());
    }

    {
        let mut guard = room.state().write().await;
        check_can_start(&room, &guard, username)?;
        let count = movies.len();
        guard.game.bind_catalog(movies);
        guard.game.machine.apply(GameEvent::StartGame)?;
        info!(room = %name, movies = count, players = guard.players.len(), "game started");
    }

    apply_effects(state, &room, Effects::room_event(RoomEvent::RoomStart));
    Ok(())
}

fn toggle_in(selection: &mut Vec<Movie>, movie: Movie, cap: usize) -> ToggleOutcome {
    if let Some(position) = selection.iter().position(|m| m.id == movie.id) {
        selection.remove(position);
        ToggleOutcome::Removed
    } else if selection.len() < cap {
        selection.push(movie);
        ToggleOutcome::Added
    } else {
        ToggleOutcome::Unchanged
    }
}

/// Add a catalog movie to the caller's draft, or remove it if already picked.
///
/// Adding to a full draft leaves it unchanged.
pub async fn toggle_draft_movie(
    state: &SharedState,
    name: &str,
    username: &str,
    movie_id: &str,
) -> Result<(ToggleOutcome, usize), ServiceError> {
    let room = find_room(state, name)?;
    let result = {
        let mut guard = room.state().write().await;
        ensure_open(&room, &guard)?;
        ensure_step(&guard, GameStep::Draft)?;
        let RoomState { game, players, .. } = &mut *guard;
        let player = player_mut(&room, players, username)?;
        if player.has_finished_draft {
            return Err(ServiceError::AlreadySubmitted);
        }
        let movie = game
            .movie(movie_id)
            .cloned()
            .ok_or_else(|| ServiceError::MovieNotFound(movie_id.to_owned()))?;

        let outcome = toggle_in(&mut player.draft_movies, movie, game.config.max_draft_count);
        debug!(room = %name, username = %username, movie_id = %movie_id, ?outcome, "toggled draft movie");
        (outcome, player.draft_movies.len())
    };

    apply_effects(state, &room, Effects::room_event(RoomEvent::RoomUpdate));
    Ok(result)
}

/// Remove a movie from the caller's draft if present.
pub async fn remove_draft_movie(
    state: &SharedState,
    name: &str,
    username: &str,
    movie_id: &str,
) -> Result<(ToggleOutcome, usize), ServiceError> {
    let room = find_room(state, name)?;
    let result = {
        let mut guard = room.state().write().await;
        ensure_open(&room, &guard)?;
        ensure_step(&guard, GameStep::Draft)?;
        let player = player_mut(&room, &mut guard.players, username)?;
        if player.has_finished_draft {
            return Err(ServiceError::AlreadySubmitted);
        }
        let before = player.draft_movies.len();
        player.draft_movies.retain(|movie| movie.id != movie_id);
        let outcome = if player.draft_movies.len() < before {
            ToggleOutcome::Removed
        } else {
            ToggleOutcome::Unchanged
        };
        (outcome, player.draft_movies.len())
    };

    apply_effects(state, &room, Effects::room_event(RoomEvent::RoomUpdate));
    Ok(result)
}

/// Lock in the caller's draft; the last submission pools every draft into the candidates.
pub async fn submit_draft(
    state: &SharedState,
    name: &str,
    username: &str,
) -> Result<Submission, ServiceError> {
    let room = find_room(state, name)?;
    let (submission, effects) = {
        let mut guard = room.state().write().await;
        ensure_open(&room, &guard)?;
        ensure_step(&guard, GameStep::Draft)?;
        let player = player_mut(&room, &mut guard.players, username)?;
        if player.draft_movies.is_empty() {
            return Err(ServiceError::EmptyDraft);
        }
        player.has_finished_draft = true;
        debug!(room = %name, username = %username, picks = player.draft_movies.len(), "draft submitted");

        if guard.all_finished_draft() {
            let event = close_draft(name, &mut guard)?;
            (Submission::Advanced(GameStep::Voting), Effects::room_event(event))
        } else {
            (Submission::Pending, Effects::room_event(RoomEvent::RoomUpdate))
        }
    };

    apply_effects(state, &room, effects);
    Ok(submission)
}

/// Pool drafts (join order, then pick order, distinct by id) and enter voting.
fn close_draft(name: &str, guard: &mut RoomState) -> Result<RoomEvent, ServiceError> {
    let mut pooled: Vec<Movie> = Vec::new();
    for player in guard.players_by_join_order() {
        for movie in &player.draft_movies {
            if guard.game.movie(&movie.id).is_none() {
                error!(room = %name, movie_id = %movie.id, "drafted movie missing from catalog snapshot");
                continue;
            }
            if !pooled.iter().any(|candidate| candidate.id == movie.id) {
                pooled.push(movie.clone());
            }
        }
    }

    guard.game.machine.apply(GameEvent::DraftCompleted)?;
    guard.game.voting_movies = pooled;
    guard.game.votes.clear();
    for player in guard.players.values_mut() {
        player.voting_movies.clear();
        player.has_finished_voting = false;
    }
    info!(room = %name, candidates = guard.game.voting_movies.len(), "draft closed; voting started");
    Ok(RoomEvent::RoomVoting)
}

/// Add a candidate to the caller's votes, or remove it if already picked.
pub async fn toggle_voting_movie(
    state: &SharedState,
    name: &str,
    username: &str,
    movie_id: &str,
) -> Result<(ToggleOutcome, usize), ServiceError> {
    let room = find_room(state, name)?;
    let result = {
        let mut guard = room.state().write().await;
        ensure_open(&room, &guard)?;
        ensure_step(&guard, GameStep::Voting)?;
        let RoomState { game, players, .. } = &mut *guard;
        let player = player_mut(&room, players, username)?;
        if player.has_finished_voting {
            return Err(ServiceError::AlreadySubmitted);
        }
        let movie = game
            .candidate(movie_id)
            .cloned()
            .ok_or_else(|| ServiceError::MovieNotFound(movie_id.to_owned()))?;

        let outcome = toggle_in(&mut player.voting_movies, movie, game.config.max_votes);
        debug!(room = %name, username = %username, movie_id = %movie_id, ?outcome, "toggled vote");
        (outcome, player.voting_movies.len())
    };

    apply_effects(state, &room, Effects::room_event(RoomEvent::RoomUpdate));
    Ok(result)
}

/// Lock in the caller's votes; the last submission settles the round.
///
/// A single winner moves the room to Announce: the opening drum roll is visible and
/// `RoomAnnounce` published before this returns, and the reveal continues in the
/// background.
pub async fn submit_vote(
    state: &SharedState,
    name: &str,
    username: &str,
) -> Result<Submission, ServiceError> {
    let room = find_room(state, name)?;
    let (submission, effects) = {
        let mut guard = room.state().write().await;
        ensure_open(&room, &guard)?;
        ensure_step(&guard, GameStep::Voting)?;
        let player = player_mut(&room, &mut guard.players, username)?;
        if player.voting_movies.is_empty() {
            return Err(ServiceError::EmptyVote);
        }
        player.has_finished_voting = true;
        debug!(room = %name, username = %username, picks = player.voting_movies.len(), "vote submitted");

        if guard.all_finished_voting() {
            let (event, winner) = settle_votes(name, &mut guard)?;
            let effects = Effects {
                room: vec![event],
                lobby: false,
                start_reveal: winner,
            };
            (Submission::Advanced(guard.game.step()), effects)
        } else {
            (Submission::Pending, Effects::room_event(RoomEvent::RoomUpdate))
        }
    };

    apply_effects(state, &room, effects);
    Ok(submission)
}

/// Count votes and either replay a tie or enter Announce.
///
/// Returns the event to publish and, when a winner was decided, its name for the reveal.
fn settle_votes(
    name: &str,
    guard: &mut RoomState,
) -> Result<(RoomEvent, Option<String>), ServiceError> {
    let votes = aggregator::count_votes(&guard.game, guard.players.values());
    let ranked = aggregator::rank(&guard.game, &votes);
    debug_assert!(!ranked.is_empty(), "voting closed without candidates");
    let outcome = aggregator::resolve(&ranked, guard.game.config.display_ties).ok_or_else(|| {
        error!(room = %name, "voting closed without candidates");
        ServiceError::Internal("no candidates to rank".into())
    })?;

    match outcome {
        Outcome::Tie(tied) => {
            guard.game.machine.apply(GameEvent::TieDetected)?;
            info!(room = %name, tied = tied.len(), "tie detected; voting restarts");
            guard.game.voting_movies = tied;
            guard.game.votes.clear();
            for player in guard.players.values_mut() {
                player.voting_movies.clear();
                player.has_finished_voting = false;
            }
            Ok((RoomEvent::RoomVoting, None))
        }
        Outcome::Winner(winner) => {
            guard.game.machine.apply(GameEvent::WinnerDecided)?;
            guard.game.votes = votes;
            info!(room = %name, movie_id = %winner.id, winner = %winner.name, "winner decided");
            let winner_name = winner.name.clone();
            guard.game.result = Some(GameResult {
                winner,
                tally: ranked,
            });
            guard.game.announcement = vec![DialogueLine::new(ANNOUNCER, DRUM_ROLL_LINE)];
            Ok((RoomEvent::RoomAnnounce, Some(winner_name)))
        }
    }
}

/// Close the reveal and show results.
pub async fn finish_game(state: &SharedState, name: &str) -> Result<(), ServiceError> {
    let room = find_room(state, name)?;
    {
        let mut guard = room.state().write().await;
        ensure_open(&room, &guard)?;
        ensure_step(&guard, GameStep::Announce)?;
        guard.game.machine.apply(GameEvent::RevealFinished)?;
        guard.game.announcement.clear();
        info!(room = %name, "game finished");
    }

    apply_effects(state, &room, Effects::room_event(RoomEvent::RoomFinish));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::dummy::dummy_movies, state::RoomConfig};

    fn movie(id: &str) -> Movie {
        dummy_movies()
            .into_iter()
            .find(|m| m.id == id)
            .unwrap()
    }

    #[test]
    fn toggle_respects_cap_and_removes() {
        let mut selection = Vec::new();
        assert_eq!(toggle_in(&mut selection, movie("movie-1"), 2), ToggleOutcome::Added);
        assert_eq!(toggle_in(&mut selection, movie("movie-2"), 2), ToggleOutcome::Added);
        assert_eq!(toggle_in(&mut selection, movie("movie-3"), 2), ToggleOutcome::Unchanged);
        assert_eq!(toggle_in(&mut selection, movie("movie-1"), 2), ToggleOutcome::Removed);
        assert_eq!(toggle_in(&mut selection, movie("movie-3"), 2), ToggleOutcome::Added);

        let ids = selection.iter().map(|m| m.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["movie-2", "movie-3"]);
    }

    #[test]
    fn host_moves_to_earliest_joiner() {
        let room = Room::new(
            "r1",
            RoomConfig {
                max_players: 3,
                max_draft_count: 1,
                max_votes: 1,
                display_ties: false,
            },
            "alice",
        );
        let mut guard = room.state().try_write().unwrap();
        let base = SystemTime::now();
        for (offset, name) in [(2, "carol"), (1, "bob")] {
            let mut player = Player::new(name);
            player.joined_at = base + std::time::Duration::from_secs(offset);
            guard.players.insert(name.into(), player);
        }

        transfer_host("r1", &mut guard).unwrap();
        assert_eq!(guard.game.host, "bob");
    }
}
