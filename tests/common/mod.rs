#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use tokio::time::{sleep, timeout};
use watchma_back::{
    catalog::{MovieProvider, dummy::DummyMovieProvider},
    config::{AppConfig, RevealPacing},
    dialogue::{AiError, AiProvider, AiResult},
    services::room_service,
    state::{
        AppState, GameStep, RoomConfig, RoomEvent, SharedState,
        events::{EventSubscription, Published},
    },
};

/// Dialogue backend answering every prompt with the same text.
pub struct ScriptedAi(pub &'static str);

impl AiProvider for ScriptedAi {
    fn fetch(&self, _prompt: String) -> BoxFuture<'static, AiResult<String>> {
        let text = self.0.to_owned();
        Box::pin(async move { Ok(text) })
    }
}

/// Dialogue backend that always fails.
pub struct FailingAi;

impl AiProvider for FailingAi {
    fn fetch(&self, _prompt: String) -> BoxFuture<'static, AiResult<String>> {
        Box::pin(async { Err(AiError::Status { status: 503 }) })
    }
}

/// Dialogue backend that never answers.
pub struct HangingAi;

impl AiProvider for HangingAi {
    fn fetch(&self, _prompt: String) -> BoxFuture<'static, AiResult<String>> {
        Box::pin(futures::future::pending())
    }
}

pub const TWO_LINE_SCENE: &str = "**Cobb:** *\"You mustn't be afraid to dream a little bigger.\"*\n\
**Arthur:** *\"Darling.\"*";

pub fn app_with(pacing: RevealPacing, ai: Option<Arc<dyn AiProvider>>) -> SharedState {
    let config = AppConfig {
        reveal: pacing,
        ..AppConfig::default()
    };
    app_with_config(config, ai)
}

pub fn app_with_config(config: AppConfig, ai: Option<Arc<dyn AiProvider>>) -> SharedState {
    let movies: Arc<dyn MovieProvider> = Arc::new(DummyMovieProvider);
    AppState::new(config, movies, ai)
}

pub fn app() -> SharedState {
    app_with(RevealPacing::instant(), None)
}

pub fn limits(max_players: usize, max_draft_count: usize, max_votes: usize, display_ties: bool) -> RoomConfig {
    RoomConfig {
        max_players,
        max_draft_count,
        max_votes,
        display_ties,
    }
}

/// Create a room and seat its host, like the create endpoint does.
pub async fn open_room(state: &SharedState, name: &str, config: RoomConfig, host: &str) {
    room_service::add_room(state, name, config, host).unwrap();
    room_service::add_player(state, name, host).await.unwrap();
}

pub async fn step_of(state: &SharedState, name: &str) -> GameStep {
    let room = state.rooms().get(name).unwrap();
    let guard = room.state().read().await;
    guard.game.step()
}

/// Poll until the room reaches `step`, failing after two seconds.
pub async fn wait_for_step(state: &SharedState, name: &str, step: GameStep) {
    timeout(Duration::from_secs(2), async {
        while step_of(state, name).await != step {
            sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("room {name} never reached {step}"));
}

/// Draft the given movies for `username` and submit.
pub async fn draft(state: &SharedState, name: &str, username: &str, movie_ids: &[&str]) -> room_service::Submission {
    for id in movie_ids {
        room_service::toggle_draft_movie(state, name, username, id)
            .await
            .unwrap();
    }
    room_service::submit_draft(state, name, username).await.unwrap()
}

/// Vote for the given candidates for `username` and submit.
pub async fn vote(state: &SharedState, name: &str, username: &str, movie_ids: &[&str]) -> room_service::Submission {
    for id in movie_ids {
        room_service::toggle_voting_movie(state, name, username, id)
            .await
            .unwrap();
    }
    room_service::submit_vote(state, name, username).await.unwrap()
}

/// Collect events until `last` arrives or the subject closes.
pub async fn collect_until(subscription: &mut EventSubscription, last: RoomEvent) -> Vec<Published> {
    let mut seen = Vec::new();
    timeout(Duration::from_secs(2), async {
        while let Some(published) = subscription.next().await {
            let done = published.event == last;
            seen.push(published);
            if done {
                break;
            }
        }
    })
    .await
    .expect("event stream stalled");
    seen
}
