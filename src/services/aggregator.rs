//! Vote counting, ranking and tie resolution.

use indexmap::IndexMap;
use tracing::warn;

use crate::{
    catalog::Movie,
    state::game::{GameSession, Player},
};

/// How a completed voting round settles.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A single movie leads, or ties fall to the first pooled one.
    Winner(Movie),
    /// Two or more movies share the top count and ties are replayed.
    Tie(Vec<Movie>),
}

/// Count every player's picks per movie id.
///
/// Every candidate starts at zero, in candidate order, so ranking is stable with
/// respect to the order candidates were pooled. Picks that do not resolve through the
/// catalog snapshot are skipped.
pub fn count_votes<'a>(
    session: &GameSession,
    players: impl IntoIterator<Item = &'a Player>,
) -> IndexMap<String, u32> {
    let mut votes = session
        .voting_movies
        .iter()
        .map(|movie| (movie.id.clone(), 0))
        .collect::<IndexMap<_, _>>();

    for player in players {
        for pick in &player.voting_movies {
            if session.movie(&pick.id).is_none() {
                warn!(movie_id = %pick.id, username = %player.username, "vote for unknown movie ignored");
                continue;
            }
            *votes.entry(pick.id.clone()).or_insert(0) += 1;
        }
    }

    votes
}

/// `(movie, count)` ordered by count descending; equal counts keep their input order.
pub fn rank(session: &GameSession, votes: &IndexMap<String, u32>) -> Vec<(Movie, u32)> {
    let mut ranked = votes
        .iter()
        .filter_map(|(id, count)| session.movie(id).map(|movie| (movie.clone(), *count)))
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Leading entries sharing the top count.
pub fn winners(ranked: &[(Movie, u32)]) -> &[(Movie, u32)] {
    let Some((_, top)) = ranked.first() else {
        return &[];
    };
    let end = ranked
        .iter()
        .position(|(_, count)| count != top)
        .unwrap_or(ranked.len());
    &ranked[..end]
}

/// Decide the round; `None` when there is nothing to rank.
pub fn resolve(ranked: &[(Movie, u32)], display_ties: bool) -> Option<Outcome> {
    let leaders = winners(ranked);
    match leaders {
        [] => None,
        [(winner, _)] => Some(Outcome::Winner(winner.clone())),
        [(first, _), ..] if !display_ties => Some(Outcome::Winner(first.clone())),
        tied => Some(Outcome::Tie(
            tied.iter().map(|(movie, _)| movie.clone()).collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::dummy::dummy_movies, state::game::RoomConfig};

    fn session(candidates: &[&str]) -> GameSession {
        let mut session = GameSession::new(
            RoomConfig {
                max_players: 4,
                max_draft_count: 3,
                max_votes: 2,
                display_ties: true,
            },
            "alice",
        );
        session.bind_catalog(dummy_movies());
        session.voting_movies = candidates
            .iter()
            .filter_map(|id| session.movie(id).cloned())
            .collect();
        session
    }

    fn voter(session: &GameSession, name: &str, picks: &[&str]) -> Player {
        let mut player = Player::new(name);
        player.voting_movies = picks
            .iter()
            .filter_map(|id| session.movie(id).cloned())
            .collect();
        player
    }

    fn ids(ranked: &[(Movie, u32)]) -> Vec<(&str, u32)> {
        ranked.iter().map(|(m, c)| (m.id.as_str(), *c)).collect()
    }

    #[test]
    fn counts_include_unvoted_candidates() {
        let session = session(&["movie-1", "movie-2", "movie-3"]);
        let players = [
            voter(&session, "alice", &["movie-2"]),
            voter(&session, "bob", &["movie-2"]),
        ];

        let votes = count_votes(&session, &players);
        let ranked = rank(&session, &votes);
        assert_eq!(
            ids(&ranked),
            [("movie-2", 2), ("movie-1", 0), ("movie-3", 0)]
        );
        assert_eq!(
            resolve(&ranked, true),
            session.movie("movie-2").cloned().map(Outcome::Winner)
        );
    }

    #[test]
    fn tie_is_replayed_when_ties_are_displayed() {
        let session = session(&["movie-1", "movie-2", "movie-3"]);
        let players = [
            voter(&session, "alice", &["movie-1"]),
            voter(&session, "bob", &["movie-2"]),
        ];

        let ranked = rank(&session, &count_votes(&session, &players));
        assert_eq!(ids(winners(&ranked)), [("movie-1", 1), ("movie-2", 1)]);

        match resolve(&ranked, true) {
            Some(Outcome::Tie(tied)) => {
                let tied_ids = tied.iter().map(|m| m.id.as_str()).collect::<Vec<_>>();
                assert_eq!(tied_ids, ["movie-1", "movie-2"]);
            }
            other => panic!("expected tie, got {other:?}"),
        }
    }

    #[test]
    fn first_tied_entry_wins_when_ties_are_hidden() {
        let session = session(&["movie-3", "movie-1", "movie-2"]);
        let players = [
            voter(&session, "alice", &["movie-1"]),
            voter(&session, "bob", &["movie-2"]),
        ];

        let ranked = rank(&session, &count_votes(&session, &players));
        assert_eq!(
            resolve(&ranked, false),
            session.movie("movie-1").cloned().map(Outcome::Winner)
        );
    }

    #[test]
    fn unknown_picks_are_ignored() {
        let session = session(&["movie-1"]);
        let mut stray = Player::new("mallory");
        stray.voting_movies = vec![Movie {
            id: "not-in-catalog".into(),
            ..dummy_movies()[0].clone()
        }];

        let votes = count_votes(&session, [&stray]);
        assert_eq!(votes.get("movie-1"), Some(&0));
        assert!(!votes.contains_key("not-in-catalog"));
    }

    #[test]
    fn nothing_to_rank() {
        assert!(winners(&[]).is_empty());
        assert_eq!(resolve(&[], true), None);
    }
}
