//! Read-lock projections of rooms for renderers.

use crate::{
    dto::{
        movie::MovieSummary,
        room::{
            DialogueLineView, MessageView, PlayerSummary, PlayerView, ResultsView, RoomSummary,
            RoomView, VoteCount,
        },
    },
    error::ServiceError,
    services::room_service::find_room,
    state::{GameStep, SharedState},
};

/// Lobby list, ordered by room name. Rooms closing concurrently are skipped.
pub async fn list_rooms(state: &SharedState) -> Vec<RoomSummary> {
    let mut summaries = Vec::new();
    for room in state.rooms().rooms() {
        let guard = room.state().read().await;
        if !guard.closed {
            summaries.push(RoomSummary::from_state(room.name(), &guard));
        }
    }
    summaries
}

/// Shared room view: members, chat, candidates, reveal lines and winner.
pub async fn room_view(state: &SharedState, name: &str) -> Result<RoomView, ServiceError> {
    let room = find_room(state, name)?;
    let guard = room.state().read().await;
    if guard.closed {
        return Err(ServiceError::RoomNotFound(name.to_owned()));
    }

    let game = &guard.game;
    let winner = match game.step() {
        GameStep::Results => game.result.as_ref().map(|result| MovieSummary::from(&result.winner)),
        _ => None,
    };

    Ok(RoomView {
        name: room.name().to_owned(),
        step: game.step().into(),
        host: game.host.clone(),
        limits: game.config.into(),
        players: guard
            .players_by_join_order()
            .into_iter()
            .map(|player| PlayerSummary::from_player(player, &game.host))
            .collect(),
        chat: guard.chat.iter().map(MessageView::from).collect(),
        voting_movies: game.voting_movies.iter().map(MovieSummary::from).collect(),
        announcement: game
            .announcement
            .iter()
            .map(|line| DialogueLineView {
                character: line.character.clone(),
                dialogue: line.dialogue.clone(),
            })
            .collect(),
        winner,
    })
}

/// The caller's own picks and flags.
pub async fn player_view(
    state: &SharedState,
    name: &str,
    username: &str,
) -> Result<PlayerView, ServiceError> {
    let room = find_room(state, name)?;
    let guard = room.state().read().await;
    if guard.closed {
        return Err(ServiceError::RoomNotFound(name.to_owned()));
    }
    let player = guard
        .players
        .get(username)
        .ok_or_else(|| ServiceError::PlayerNotFound {
            room: name.to_owned(),
            username: username.to_owned(),
        })?;

    Ok(PlayerView {
        username: player.username.clone(),
        is_host: guard.game.host == player.username,
        ready: player.ready,
        draft_movies: player.draft_movies.iter().map(MovieSummary::from).collect(),
        voting_movies: player.voting_movies.iter().map(MovieSummary::from).collect(),
        has_finished_draft: player.has_finished_draft,
        has_finished_voting: player.has_finished_voting,
    })
}

/// Winner and ranked tally once the room reached Results.
pub async fn results(state: &SharedState, name: &str) -> Result<ResultsView, ServiceError> {
    let room = find_room(state, name)?;
    let guard = room.state().read().await;
    if guard.closed {
        return Err(ServiceError::RoomNotFound(name.to_owned()));
    }
    let step = guard.game.step();
    if step != GameStep::Results {
        return Err(ServiceError::WrongStep(step));
    }
    let result = guard
        .game
        .result
        .as_ref()
        .ok_or_else(|| ServiceError::Internal("results step without a recorded winner".into()))?;

    Ok(ResultsView {
        winner: MovieSummary::from(&result.winner),
        tally: result
            .tally
            .iter()
            .map(|(movie, votes)| VoteCount {
                movie: MovieSummary::from(movie),
                votes: *votes,
            })
            .collect(),
    })
}
