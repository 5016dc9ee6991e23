//! Timed winner reveal: drum roll, generated dialogue, winner line, results.

use std::sync::Arc;

use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::{
    dialogue::{DialogueLine, build_reveal_prompt, parse_dialogue},
    services::room_service::{self, ANNOUNCER},
    state::{GameStep, Room, RoomEvent, SharedState, room_subject},
};

/// Closing announcer line shown right before results.
pub const WINNER_LINE: &str = "And the Winner Is...";

/// Start the reveal task for a room that just entered Announce.
///
/// The drum roll is already visible when this is called. At most one reveal runs per
/// room; deleting the room aborts it.
pub fn spawn_reveal(state: SharedState, room: Arc<Room>, winner: String) {
    let handle = tokio::spawn(run_reveal(state, room.clone(), winner));
    if !room.install_reveal(handle) {
        warn!(room = %room.name(), "reveal already running; ignoring second start");
    }
}

async fn run_reveal(state: SharedState, room: Arc<Room>, winner: String) {
    let pacing = state.config().reveal;
    info!(room = %room.name(), winner = %winner, "reveal started");

    sleep(pacing.drum_roll()).await;
    if !update_announcement(&state, &room, false, Vec::clear).await {
        return;
    }

    let text = fetch_dialogue(&state, &room, &winner).await;
    for line in parse_dialogue(&text) {
        if !update_announcement(&state, &room, true, |lines| lines.push(line)).await {
            return;
        }
        sleep(pacing.line()).await;
    }

    sleep(pacing.suspense()).await;
    let announced = update_announcement(&state, &room, true, |lines| {
        *lines = vec![DialogueLine::new(ANNOUNCER, WINNER_LINE)];
    })
    .await;
    if !announced {
        return;
    }
    sleep(pacing.winner()).await;

    if let Err(err) = room_service::finish_game(&state, room.name()).await {
        debug!(room = %room.name(), error = %err, "reveal ended without finishing the game");
    }
}

/// Mutate the visible announcement and optionally publish `RoomAnnounce`.
///
/// Returns `false` when the room is gone or no longer announcing; the reveal stops then.
async fn update_announcement<F>(state: &SharedState, room: &Room, emit: bool, update: F) -> bool
where
    F: FnOnce(&mut Vec<DialogueLine>),
{
    {
        let mut guard = room.state().write().await;
        if guard.closed || guard.game.step() != GameStep::Announce {
            debug!(room = %room.name(), "reveal aborted");
            return false;
        }
        update(&mut guard.game.announcement);
    }

    if emit {
        state
            .events()
            .publish(&room_subject(room.name()), RoomEvent::RoomAnnounce);
    }
    true
}

/// Ask the AI provider for the scene; every failure degrades to an empty string.
async fn fetch_dialogue(state: &SharedState, room: &Room, winner: &str) -> String {
    let Some(ai) = state.ai() else {
        return String::new();
    };

    let ceiling = state.config().ai.timeout();
    match timeout(ceiling, ai.fetch(build_reveal_prompt(winner))).await {
        Ok(Ok(text)) => text,
        Ok(Err(err)) => {
            warn!(room = %room.name(), error = %err, "dialogue generation failed; revealing without dialogue");
            String::new()
        }
        Err(_) => {
            warn!(room = %room.name(), timeout_ms = ceiling.as_millis() as u64, "dialogue generation timed out");
            String::new()
        }
    }
}
