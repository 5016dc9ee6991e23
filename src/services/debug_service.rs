//! Builds the operator debug snapshot.

use crate::{
    dto::debug::{DebugPlayer, DebugRoom, DebugSnapshot},
    state::SharedState,
};

/// Point-in-time view of every room plus fabric counters.
///
/// Each room is read under its own read lock, one at a time, so the snapshot is
/// consistent per room but not across rooms.
pub async fn snapshot(state: &SharedState) -> DebugSnapshot {
    let mut rooms = Vec::new();
    for room in state.rooms().rooms() {
        let reveal_running = room.reveal_active();
        let guard = room.state().read().await;
        if guard.closed {
            continue;
        }
        let game = &guard.game;

        rooms.push(DebugRoom {
            name: room.name().to_owned(),
            step: game.step().into(),
            host: game.host.clone(),
            limits: game.config.into(),
            players: guard
                .players_by_join_order()
                .into_iter()
                .map(|player| DebugPlayer {
                    username: player.username.clone(),
                    ready: player.ready,
                    draft_count: player.draft_movies.len(),
                    vote_count: player.voting_movies.len(),
                    has_finished_draft: player.has_finished_draft,
                    has_finished_voting: player.has_finished_voting,
                })
                .collect(),
            voting_movies: game.voting_movies.iter().map(|m| m.name.clone()).collect(),
            reveal_running,
        });
    }

    DebugSnapshot {
        rooms,
        events: state.events().stats().into(),
    }
}
