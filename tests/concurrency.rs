mod common;

use futures::future::join_all;
use watchma_back::{
    error::ServiceError,
    services::{room_service, view_service},
    state::GameStep,
};

use common::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_joins_never_overfill_a_room() {
    let state = app();
    open_room(&state, "crowd", limits(5, 1, 1, false), "host").await;

    let joins = (0..32).map(|i| {
        let state = state.clone();
        tokio::spawn(async move { room_service::add_player(&state, "crowd", &format!("guest-{i}")).await })
    });
    let outcomes = join_all(joins).await;

    let mut joined = 0;
    let mut full = 0;
    for outcome in outcomes {
        match outcome.unwrap() {
            Ok(()) => joined += 1,
            Err(ServiceError::RoomFull { .. }) => full += 1,
            Err(other) => panic!("unexpected join error: {other}"),
        }
    }
    assert_eq!(joined, 4);
    assert_eq!(full, 28);

    let view = view_service::room_view(&state, "crowd").await.unwrap();
    assert_eq!(view.players.len(), 5);
    assert_eq!(view.host, "host");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_deletes_remove_each_room_exactly_once() {
    let state = app();
    for i in 0..16 {
        open_room(&state, &format!("room-{i}"), limits(2, 1, 1, false), "alice").await;
    }

    let deletes = (0..16).flat_map(|i| {
        let name = format!("room-{i}");
        [state.clone(), state.clone()].map(|state| {
            let name = name.clone();
            tokio::spawn(async move { room_service::delete_room(&state, &name).await })
        })
    });
    let removed = join_all(deletes)
        .await
        .into_iter()
        .filter(|outcome| *outcome.as_ref().unwrap())
        .count();

    assert_eq!(removed, 16);
    assert!(state.rooms().is_empty());
    assert!(view_service::list_rooms(&state).await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_advance_exactly_once() {
    let state = app();
    open_room(&state, "race", limits(8, 1, 1, false), "p-0").await;
    for i in 1..8 {
        room_service::add_player(&state, "race", &format!("p-{i}")).await.unwrap();
    }
    room_service::start_game(&state, "race", "p-0").await.unwrap();
    for i in 0..8 {
        room_service::toggle_draft_movie(&state, "race", &format!("p-{i}"), &format!("movie-{}", i + 1))
            .await
            .unwrap();
    }

    let submits = (0..8).map(|i| {
        let state = state.clone();
        tokio::spawn(async move { room_service::submit_draft(&state, "race", &format!("p-{i}")).await })
    });
    let advanced = join_all(submits)
        .await
        .into_iter()
        .map(|outcome| outcome.unwrap().unwrap())
        .filter(|submission| *submission == room_service::Submission::Advanced(GameStep::Voting))
        .count();

    assert_eq!(advanced, 1);
    let view = view_service::room_view(&state, "race").await.unwrap();
    assert_eq!(view.voting_movies.len(), 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_toggles_respect_the_vote_cap() {
    let state = app();
    open_room(&state, "cap", limits(2, 3, 2, false), "alice").await;
    room_service::add_player(&state, "cap", "bob").await.unwrap();
    room_service::start_game(&state, "cap", "alice").await.unwrap();
    draft(&state, "cap", "alice", &["movie-1", "movie-2", "movie-3"]).await;
    draft(&state, "cap", "bob", &["movie-4"]).await;

    let toggles = ["movie-1", "movie-2", "movie-3", "movie-4"].map(|id| {
        let state = state.clone();
        tokio::spawn(async move { room_service::toggle_voting_movie(&state, "cap", "bob", id).await })
    });
    for outcome in join_all(toggles).await {
        outcome.unwrap().unwrap();
    }

    let bob = view_service::player_view(&state, "cap", "bob").await.unwrap();
    assert_eq!(bob.voting_movies.len(), 2);
}
